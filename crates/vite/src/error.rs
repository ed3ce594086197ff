// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors which can happen while resolving Vite tags
#[derive(Debug, Error)]
pub enum Error {
    /// There is no manifest file at the computed path
    #[error("Vite manifest not found at: {path}")]
    ManifestNotFound {
        /// The path where the manifest was expected
        path: Utf8PathBuf,
    },

    /// The manifest file exists but could not be read
    #[error("failed to read the Vite manifest at {path}")]
    ManifestRead {
        /// Path to the manifest
        path: Utf8PathBuf,

        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// The manifest file is not a valid manifest
    #[error("invalid Vite manifest at {path}")]
    ManifestParse {
        /// Path to the manifest
        path: Utf8PathBuf,

        /// The underlying error
        #[source]
        source: serde_json::Error,
    },

    /// A requested or imported key is missing from the manifest
    #[error("Unable to locate file in Vite manifest: {key}")]
    ChunkNotFound {
        /// The key which was looked up
        key: String,
    },

    /// The hot file disappeared or could not be read
    #[error("failed to read the Vite hot file at {path}")]
    HotFileRead {
        /// Path to the hot file
        path: Utf8PathBuf,

        /// The underlying error
        #[source]
        source: std::io::Error,
    },
}
