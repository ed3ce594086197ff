// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{fmt, sync::Arc};

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use indoc::formatdoc;
use rand::distributions::{Alphanumeric, DistString};
use tracing::debug;

use crate::{
    Attributes, Chunk, EntryRequest, Error, Manifest, ManifestStore, ResolveAttributes,
    ViteOptions, graph::TagMap, tags::is_style_path,
};

/// Entry injected first in hot mode, to connect to the dev server
pub const CLIENT_ENTRY: &str = "@vite/client";

/// Module served by the dev server for the React fast refresh runtime
pub const REACT_REFRESH_ENTRY: &str = "@react-refresh";

/// Length of the nonces generated by [`Vite::use_random_nonce`]
const NONCE_LENGTH: usize = 40;

type Resolvers = Vec<Arc<dyn ResolveAttributes>>;

/// Generates the HTML tags for Vite entry points.
///
/// An instance is meant to be owned by a single render context. It is
/// configured through the `use_*` builder methods, and remembers the preload
/// tags it emitted so that a URL always gets the same tag.
#[derive(Clone)]
pub struct Vite {
    options: ViteOptions,
    store: Arc<ManifestStore>,
    entries: Vec<EntryRequest>,
    pub(crate) script_tag_attributes: Resolvers,
    pub(crate) style_tag_attributes: Resolvers,
    pub(crate) preload_tag_attributes: Resolvers,
    pub(crate) preloaded_assets: IndexMap<String, String>,
}

impl fmt::Debug for Vite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vite")
            .field("options", &self.options)
            .field("entries", &self.entries)
            .field("script_tag_attributes", &self.script_tag_attributes.len())
            .field("style_tag_attributes", &self.style_tag_attributes.len())
            .field("preload_tag_attributes", &self.preload_tag_attributes.len())
            .field("preloaded_assets", &self.preloaded_assets.len())
            .finish_non_exhaustive()
    }
}

impl Vite {
    /// Create a new instance using the process-wide manifest store
    #[must_use]
    pub fn new(options: ViteOptions) -> Self {
        Self::with_store(options, ManifestStore::global())
    }

    /// Create a new instance using the given manifest store
    #[must_use]
    pub fn with_store(options: ViteOptions, store: Arc<ManifestStore>) -> Self {
        Self {
            options,
            store,
            entries: Vec::new(),
            script_tag_attributes: Vec::new(),
            style_tag_attributes: Vec::new(),
            preload_tag_attributes: Vec::new(),
            preloaded_assets: IndexMap::new(),
        }
    }

    /// The options this instance currently uses
    #[must_use]
    pub fn options(&self) -> &ViteOptions {
        &self.options
    }

    /// Set the Content Security Policy nonce to apply to all generated tags
    #[must_use]
    pub fn use_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.options.nonce = Some(nonce.into());
        self
    }

    /// Generate a random Content Security Policy nonce to apply to all
    /// generated tags
    #[must_use]
    pub fn use_random_nonce(self) -> Self {
        let nonce = Alphanumeric.sample_string(&mut rand::thread_rng(), NONCE_LENGTH);
        self.use_nonce(nonce)
    }

    /// Set the file name of the manifest
    #[must_use]
    pub fn use_manifest(mut self, name: impl Into<String>) -> Self {
        self.options.manifest = name.into();
        self
    }

    /// Read integrity hashes from the given manifest field
    #[must_use]
    pub fn use_integrity(mut self, key: impl Into<String>) -> Self {
        self.options.integrity = Some(key.into());
        self
    }

    /// Never emit `integrity` attributes from the manifest
    #[must_use]
    pub fn without_integrity(mut self) -> Self {
        self.options.integrity = None;
        self
    }

    /// Set the path of the hot file
    #[must_use]
    pub fn use_hot_file(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.options.hot_file = path.into();
        self
    }

    /// Set the default build directory
    #[must_use]
    pub fn use_build_directory(mut self, path: impl Into<String>) -> Self {
        self.options.build_directory = path.into();
        self
    }

    /// Add a resolver for the attributes of script tags.
    ///
    /// Resolvers run in registration order, later ones overriding earlier ones.
    #[must_use]
    pub fn use_script_tag_attributes(mut self, resolver: impl ResolveAttributes + 'static) -> Self {
        self.script_tag_attributes.push(Arc::new(resolver));
        self
    }

    /// Add a resolver for the attributes of stylesheet tags
    #[must_use]
    pub fn use_style_tag_attributes(mut self, resolver: impl ResolveAttributes + 'static) -> Self {
        self.style_tag_attributes.push(Arc::new(resolver));
        self
    }

    /// Add a resolver for the attributes of preload tags
    #[must_use]
    pub fn use_preload_tag_attributes(
        mut self,
        resolver: impl ResolveAttributes + 'static,
    ) -> Self {
        self.preload_tag_attributes.push(Arc::new(resolver));
        self
    }

    /// Set the entries rendered by [`Vite::tags`]
    #[must_use]
    pub fn with_entries<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<EntryRequest>,
    {
        self.entries = entries.into_iter().map(Into::into).collect();
        self
    }

    /// The Content Security Policy nonce applied to all generated tags
    #[must_use]
    pub fn nonce(&self) -> Option<&str> {
        self.options.nonce.as_deref()
    }

    /// The configured entries
    #[must_use]
    pub fn entries(&self) -> &[EntryRequest] {
        &self.entries
    }

    /// The preload tags emitted so far, keyed by URL
    #[must_use]
    pub fn preloaded_assets(&self) -> &IndexMap<String, String> {
        &self.preloaded_assets
    }

    /// Render the entries set with [`Vite::with_entries`]
    ///
    /// # Errors
    ///
    /// See [`Vite::render`]
    pub fn tags(&mut self) -> Result<String, Error> {
        let entries = self.entries.clone();
        self.render(entries, None)
    }

    /// Generate the tags for the given entry points.
    ///
    /// Entries can be given in their textual form, where a leading `@` marks
    /// them as optional. `build_directory` overrides the configured one.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest can't be loaded, if a required entry
    /// or any import is missing from the manifest, or if the hot file can't be
    /// read. Nothing is rendered in that case.
    #[tracing::instrument(name = "vite.render", skip_all, err)]
    pub fn render<I>(&mut self, entries: I, build_directory: Option<&str>) -> Result<String, Error>
    where
        I: IntoIterator,
        I::Item: Into<EntryRequest>,
    {
        let entries: Vec<EntryRequest> = entries.into_iter().map(Into::into).collect();

        if self.is_running_hot() {
            return self.render_hot(&entries);
        }

        let build_directory = build_directory
            .unwrap_or(&self.options.build_directory)
            .to_owned();
        self.render_manifest(&entries, &build_directory)
    }

    fn render_hot(&self, entries: &[EntryRequest]) -> Result<String, Error> {
        let base = self.hot_base_url()?;
        let chunk = Chunk::default();
        let manifest = Manifest::default();
        let client = EntryRequest::required(CLIENT_ENTRY);

        let mut html = String::new();
        for entry in std::iter::once(&client).chain(entries) {
            if entry.is_optional() && !self.source_exists(entry.key()) {
                debug!(entry = entry.key(), "Skipping optional entry without a source file");
                continue;
            }

            let url = format!("{base}/{}", entry.key());
            html.push_str(&self.make_tag(entry.key(), &url, &chunk, &manifest));
        }

        Ok(html)
    }

    fn render_manifest(
        &mut self,
        entries: &[EntryRequest],
        build_directory: &str,
    ) -> Result<String, Error> {
        let manifest = self.manifest(build_directory)?;

        let mut preloads = TagMap::new();
        let mut assets = TagMap::new();

        for entry in entries {
            let chunk = match manifest.chunk(entry.key()) {
                Ok(chunk) => chunk,
                Err(error) if entry.is_optional() => {
                    debug!(entry = entry.key(), %error, "Skipping optional entry");
                    continue;
                }
                Err(error) => return Err(error),
            };

            let file = chunk.file();
            let url = self.build_url(build_directory, file);

            if !preloads.contains_key(file) {
                let tag = self.make_preload_tag(entry.key(), &url, chunk, &manifest);
                preloads.insert(file.to_owned(), tag);
            }

            if !assets.contains_key(file) {
                let tag = self.make_tag(entry.key(), &url, chunk, &manifest);
                assets.insert(file.to_owned(), tag);
            }

            self.resolve_imports(chunk, build_directory, &manifest, &mut assets, &mut preloads)?;
            self.resolve_css(chunk, build_directory, &manifest, &mut assets, &mut preloads);
        }

        sort_styles_first(&mut preloads);
        sort_styles_first(&mut assets);

        Ok(preloads.values().chain(assets.values()).map(String::as_str).collect())
    }

    /// Get the URL of a single asset, without generating any tag
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest can't be loaded, if the asset is not
    /// in it, or if the hot file can't be read
    pub fn asset(&self, asset: &str, build_directory: Option<&str>) -> Result<String, Error> {
        if self.is_running_hot() {
            return self.hot_asset(asset);
        }

        let build_directory = build_directory.unwrap_or(&self.options.build_directory);
        let manifest = self.manifest(build_directory)?;
        let chunk = manifest.chunk(asset)?;

        Ok(self.build_url(build_directory, chunk.file()))
    }

    /// Generate the React fast refresh preamble, when the dev server runs
    ///
    /// # Errors
    ///
    /// Returns an error if the hot file can't be read
    pub fn react_refresh(&self) -> Result<String, Error> {
        if !self.is_running_hot() {
            return Ok(String::new());
        }

        let attributes = Attributes::new()
            .with("type", "module")
            .with("nonce", self.nonce());
        let url = self.hot_asset(REACT_REFRESH_ENTRY)?;

        Ok(formatdoc! {r#"
            <script {attributes}>
                import RefreshRuntime from '{url}'
                RefreshRuntime.injectIntoGlobalHook(window)
                window.$RefreshReg$ = () => {{}}
                window.$RefreshSig$ = () => (type) => type
                window.__vite_plugin_react_preamble_installed__ = true
            </script>"#,
            attributes = attributes.render(),
        })
    }

    /// Get the manifest for the given build directory
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest can't be loaded
    pub fn manifest(&self, build_directory: &str) -> Result<Arc<Manifest>, Error> {
        self.store.load(&self.manifest_path(build_directory))
    }

    /// Path to the manifest file for the given build directory
    #[must_use]
    pub fn manifest_path(&self, build_directory: &str) -> Utf8PathBuf {
        self.options
            .root_path
            .join(build_directory.trim_start_matches('/'))
            .join(&self.options.manifest)
    }

    /// Whether the dev server is running, as signalled by the hot file
    #[must_use]
    pub fn is_running_hot(&self) -> bool {
        self.hot_file().is_file()
    }

    /// Path to the hot file
    #[must_use]
    pub fn hot_file(&self) -> Utf8PathBuf {
        self.options.root_path.join(&self.options.hot_file)
    }

    /// URL of the given asset on the dev server
    ///
    /// # Errors
    ///
    /// Returns an error if the hot file can't be read
    pub fn hot_asset(&self, asset: &str) -> Result<String, Error> {
        Ok(format!("{}/{asset}", self.hot_base_url()?))
    }

    fn hot_base_url(&self) -> Result<String, Error> {
        let path = self.hot_file();
        let content =
            std::fs::read_to_string(&path).map_err(|source| Error::HotFileRead { path, source })?;
        Ok(content.trim_end().to_owned())
    }

    /// Public URL of a path relative to the root
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.options.root_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Public URL of a file of the given build directory, as listed in its
    /// manifest
    #[must_use]
    pub fn build_url(&self, build_directory: &str, file: &str) -> String {
        self.url(&format!("{}/{file}", build_directory.trim_end_matches('/')))
    }

    /// Whether the source file of an entry exists under one of the source roots
    fn source_exists(&self, key: &str) -> bool {
        let relative = key.trim_start_matches('/');
        std::iter::once(&self.options.root_path)
            .chain(&self.options.source_roots)
            .any(|root| root.join(relative).exists())
    }
}

/// Move the tags of style files first, keeping the discovery order otherwise
fn sort_styles_first(tags: &mut TagMap) {
    tags.sort_by(|a, _, b, _| is_style_path(b).cmp(&is_style_path(a)));
}
