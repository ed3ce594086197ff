// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::sync::Arc;

use crate::{AttributeValue, Attributes, Chunk, Manifest, ResolveAttributes, Vite};

/// Extensions of the files Vite treats as stylesheets
const STYLE_EXTENSIONS: [&str; 8] = [
    "css", "less", "sass", "scss", "styl", "stylus", "pcss", "postcss",
];

/// Determine whether the given path is a style file
#[must_use]
pub fn is_style_path(path: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, extension)| STYLE_EXTENSIONS.contains(&extension))
}

impl Vite {
    /// Make the tag loading `url`: a stylesheet link for style files, a module
    /// script otherwise
    #[must_use]
    pub fn make_tag(&self, src: &str, url: &str, chunk: &Chunk, manifest: &Manifest) -> String {
        if is_style_path(url) {
            let attributes = self.resolve_style_tag_attributes(src, url, chunk, manifest);
            self.make_style_tag(url, attributes)
        } else {
            let attributes = self.resolve_script_tag_attributes(src, url, chunk, manifest);
            self.make_script_tag(url, attributes)
        }
    }

    fn make_script_tag(&self, url: &str, attributes: Attributes) -> String {
        let mut base = Attributes::new()
            .with("type", "module")
            .with("src", url)
            .with("nonce", self.nonce());
        base.merge(attributes);

        format!("<script {base}></script>")
    }

    fn make_style_tag(&self, url: &str, attributes: Attributes) -> String {
        let mut base = Attributes::new()
            .with("rel", "stylesheet")
            .with("href", url)
            .with("nonce", self.nonce());
        base.merge(attributes);

        format!("<link {base}>")
    }

    /// Make the preload tag for `url`.
    ///
    /// The first tag made for a given URL is remembered and returned for every
    /// subsequent call on this instance.
    pub fn make_preload_tag(
        &mut self,
        src: &str,
        url: &str,
        chunk: &Chunk,
        manifest: &Manifest,
    ) -> String {
        if let Some(tag) = self.preloaded_assets.get(url) {
            return tag.clone();
        }

        let attributes = self.resolve_preload_tag_attributes(src, url, chunk, manifest);
        let tag = format!("<link {attributes}>");
        self.preloaded_assets.insert(url.to_owned(), tag.clone());
        tag
    }

    /// Resolve the attributes of the script tag of a chunk
    #[must_use]
    pub fn resolve_script_tag_attributes(
        &self,
        src: &str,
        url: &str,
        chunk: &Chunk,
        manifest: &Manifest,
    ) -> Attributes {
        let attributes = self.integrity_attributes(chunk);
        apply(&self.script_tag_attributes, attributes, src, url, chunk, manifest)
    }

    /// Resolve the attributes of the stylesheet tag of a chunk
    #[must_use]
    pub fn resolve_style_tag_attributes(
        &self,
        src: &str,
        url: &str,
        chunk: &Chunk,
        manifest: &Manifest,
    ) -> Attributes {
        let attributes = self.integrity_attributes(chunk);
        apply(&self.style_tag_attributes, attributes, src, url, chunk, manifest)
    }

    /// Resolve the attributes of the preload tag of a chunk.
    ///
    /// The `crossorigin` attribute follows what the matching script or
    /// stylesheet tag would get.
    #[must_use]
    pub fn resolve_preload_tag_attributes(
        &self,
        src: &str,
        url: &str,
        chunk: &Chunk,
        manifest: &Manifest,
    ) -> Attributes {
        let mut attributes = if is_style_path(url) {
            let crossorigin = self
                .resolve_style_tag_attributes(src, url, chunk, manifest)
                .get("crossorigin")
                .cloned()
                .unwrap_or(AttributeValue::Flag(false));

            Attributes::new()
                .with("rel", "preload")
                .with("as", "style")
                .with("href", url)
                .with("nonce", self.nonce())
                .with("crossorigin", crossorigin)
        } else {
            let crossorigin = self
                .resolve_script_tag_attributes(src, url, chunk, manifest)
                .get("crossorigin")
                .cloned()
                .unwrap_or(AttributeValue::Flag(false));

            Attributes::new()
                .with("rel", "modulepreload")
                .with("href", url)
                .with("nonce", self.nonce())
                .with("crossorigin", crossorigin)
        };

        attributes.merge(self.integrity_attributes(chunk));
        apply(&self.preload_tag_attributes, attributes, src, url, chunk, manifest)
    }

    /// The `integrity` attribute of a chunk, if integrity hashes are enabled
    fn integrity_attributes(&self, chunk: &Chunk) -> Attributes {
        match self.options().integrity.as_deref() {
            Some(field) => {
                let integrity = chunk
                    .field(field)
                    .map_or(AttributeValue::Flag(false), AttributeValue::from);
                Attributes::new().with("integrity", integrity)
            }
            None => Attributes::new(),
        }
    }
}

/// Merge the output of each resolver over `attributes`, in order
fn apply(
    resolvers: &[Arc<dyn ResolveAttributes>],
    mut attributes: Attributes,
    src: &str,
    url: &str,
    chunk: &Chunk,
    manifest: &Manifest,
) -> Attributes {
    for resolver in resolvers {
        attributes.merge(resolver.resolve(src, url, chunk, manifest));
    }

    attributes
}
