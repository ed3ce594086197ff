// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod templates;
mod vite;

pub use self::{templates::TemplatesConfig, vite::ViteConfig};
use crate::util::ConfigurationSection;

/// Application configuration root
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct RootConfig {
    /// Configuration related to the Vite build and dev server
    #[serde(default, skip_serializing_if = "ViteConfig::is_default")]
    pub vite: ViteConfig,

    /// Configuration related to templates
    #[serde(default, skip_serializing_if = "TemplatesConfig::is_default")]
    pub templates: TemplatesConfig,
}

impl ConfigurationSection for RootConfig {
    fn validate(
        &self,
        figment: &figment::Figment,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
        self.vite.validate(figment)?;
        self.templates.validate(figment)?;

        Ok(())
    }
}
