// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use camino::Utf8PathBuf;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{ConfigurationSection, util::field_error};

const SECTION: &str = "vite";

fn default_root_path() -> Utf8PathBuf {
    ".".into()
}

fn default_root_url() -> String {
    "/".to_owned()
}

fn default_build_directory() -> String {
    "build".to_owned()
}

fn default_hot_file() -> Utf8PathBuf {
    "hot".into()
}

fn default_manifest() -> String {
    "manifest.json".to_owned()
}

#[allow(clippy::unnecessary_wraps)]
fn default_integrity() -> Option<String> {
    Some("integrity".to_owned())
}

/// Configuration related to the Vite build and dev server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ViteConfig {
    /// Directory containing the build directory and the hot file
    #[serde(default = "default_root_path")]
    #[schemars(with = "String")]
    pub root_path: Utf8PathBuf,

    /// URL prefix under which the root directory is served
    #[serde(default = "default_root_url")]
    pub root_url: String,

    /// Directory of the production build, relative to the root
    #[serde(default = "default_build_directory")]
    pub build_directory: String,

    /// File written by the dev server while it runs. Relative paths are
    /// resolved against the root directory.
    #[serde(default = "default_hot_file")]
    #[schemars(with = "String")]
    pub hot_file: Utf8PathBuf,

    /// File name of the manifest inside the build directory
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// Manifest field holding the integrity hash of each chunk. Set to `null`
    /// to never emit `integrity` attributes.
    #[serde(default = "default_integrity")]
    pub integrity: Option<String>,

    /// Content Security Policy nonce added to every generated tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Additional directories where the source of optional entries is looked
    /// up while the dev server runs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schemars(with = "Vec<String>")]
    pub source_roots: Vec<Utf8PathBuf>,
}

impl Default for ViteConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            root_url: default_root_url(),
            build_directory: default_build_directory(),
            hot_file: default_hot_file(),
            manifest: default_manifest(),
            integrity: default_integrity(),
            nonce: None,
            source_roots: Vec::new(),
        }
    }
}

impl ViteConfig {
    /// Returns true if the configuration is the default one
    pub(crate) fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl ConfigurationSection for ViteConfig {
    const PATH: Option<&'static str> = Some(SECTION);

    fn validate(
        &self,
        figment: &figment::Figment,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
        if self.build_directory.trim_matches('/').is_empty() {
            return Err(field_error(
                figment,
                SECTION,
                "build_directory",
                "The build directory can't be empty",
            )
            .into());
        }

        if self.manifest.is_empty() {
            return Err(
                field_error(figment, SECTION, "manifest", "The manifest name can't be empty")
                    .into(),
            );
        }

        Ok(())
    }
}
