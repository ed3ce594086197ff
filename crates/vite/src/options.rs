// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use camino::Utf8PathBuf;

/// Base settings used to create [`crate::Vite`] instances, usually supplied by
/// the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViteOptions {
    /// Directory containing the build directory and the hot file
    pub root_path: Utf8PathBuf,

    /// URL prefix under which `root_path` is served
    pub root_url: String,

    /// Build directory, relative to `root_path` and `root_url`
    pub build_directory: String,

    /// Path to the hot file. Relative paths are resolved against `root_path`.
    pub hot_file: Utf8PathBuf,

    /// File name of the manifest inside the build directory
    pub manifest: String,

    /// Manifest field holding integrity hashes, or `None` to never emit them
    pub integrity: Option<String>,

    /// Content Security Policy nonce applied to every generated tag
    pub nonce: Option<String>,

    /// Extra directories searched for the source file of optional entries, on
    /// top of `root_path`
    pub source_roots: Vec<Utf8PathBuf>,
}

impl Default for ViteOptions {
    fn default() -> Self {
        Self {
            root_path: Utf8PathBuf::from("."),
            root_url: "/".to_owned(),
            build_directory: "build".to_owned(),
            hot_file: Utf8PathBuf::from("hot"),
            manifest: "manifest.json".to_owned(),
            integrity: Some("integrity".to_owned()),
            nonce: None,
            source_roots: Vec::new(),
        }
    }
}

impl ViteOptions {
    /// Default options for the given root directory and URL prefix
    #[must_use]
    pub fn new(root_path: impl Into<Utf8PathBuf>, root_url: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            root_url: root_url.into(),
            ..Self::default()
        }
    }
}
