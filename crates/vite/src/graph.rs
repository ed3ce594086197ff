// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Walk the imports and stylesheets of a chunk

use indexmap::IndexMap;

use crate::{Chunk, Error, Manifest, Vite};

/// Rendered tags keyed by the output file they load, in discovery order
pub type TagMap = IndexMap<String, String>;

impl Vite {
    /// Add the preload tags of the chunks imported by `chunk`, and the tags
    /// of their stylesheets.
    ///
    /// Only the direct imports are preloaded; their own imports are not
    /// followed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChunkNotFound`] if an imported chunk is missing from
    /// the manifest
    pub fn resolve_imports(
        &mut self,
        chunk: &Chunk,
        build_directory: &str,
        manifest: &Manifest,
        assets: &mut TagMap,
        preloads: &mut TagMap,
    ) -> Result<(), Error> {
        for key in chunk.imports() {
            let imported = manifest.chunk(key)?;
            let file = imported.file();

            if !preloads.contains_key(file) {
                let url = self.build_url(build_directory, file);
                let tag = self.make_preload_tag(key, &url, imported, manifest);
                preloads.insert(file.to_owned(), tag);
            }

            self.resolve_css(imported, build_directory, manifest, assets, preloads);
        }

        Ok(())
    }

    /// Add the stylesheet and preload tags of the CSS files used by `chunk`.
    ///
    /// CSS files which don't have their own chunk in the manifest get a
    /// minimal one, keyed by their path.
    pub fn resolve_css(
        &mut self,
        chunk: &Chunk,
        build_directory: &str,
        manifest: &Manifest,
        assets: &mut TagMap,
        preloads: &mut TagMap,
    ) {
        for css in chunk.css() {
            let synthetic;
            let (key, css_chunk) = if let Some(found) = manifest.find_by_file(css) {
                found
            } else {
                synthetic = Chunk::for_file(css.as_str());
                (css.as_str(), &synthetic)
            };

            let file = css_chunk.file();
            let url = self.build_url(build_directory, file);

            if !assets.contains_key(file) {
                let tag = self.make_tag(key, &url, css_chunk, manifest);
                assets.insert(file.to_owned(), tag);
            }

            if !preloads.contains_key(file) {
                let tag = self.make_preload_tag(key, &url, css_chunk, manifest);
                preloads.insert(file.to_owned(), tag);
            }
        }
    }
}
