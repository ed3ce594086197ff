// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use anyhow::Context;
use vtag_config::{TemplatesConfig, ViteConfig};
use vtag_templates::Templates;
use vtag_vite::{Vite, ViteOptions};

/// Build the [`Vite`] instance for the given configuration.
///
/// The templates directory is looked up for the source of optional entries
/// while the dev server runs, after the configured source roots.
pub fn vite_from_config(config: &ViteConfig, templates: &TemplatesConfig) -> Vite {
    let mut source_roots = config.source_roots.clone();
    if !source_roots.contains(&templates.path) {
        source_roots.push(templates.path.clone());
    }

    let options = ViteOptions {
        root_path: config.root_path.clone(),
        root_url: config.root_url.clone(),
        build_directory: config.build_directory.clone(),
        hot_file: config.hot_file.clone(),
        manifest: config.manifest.clone(),
        integrity: config.integrity.clone(),
        nonce: config.nonce.clone(),
        source_roots,
    };

    Vite::new(options)
}

pub fn templates_from_config(
    config: &TemplatesConfig,
    vite: Vite,
) -> Result<Templates, anyhow::Error> {
    Templates::load(&config.path, vite)
        .with_context(|| format!("Failed to load the templates at {}", config.path))
}
