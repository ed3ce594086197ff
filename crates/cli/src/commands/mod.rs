// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use figment::Figment;

mod config;
mod manifest;
mod templates;
mod vite;

#[derive(Parser, Debug)]
enum Subcommand {
    /// Render the tags loading the given entries
    Render(self::vite::RenderOptions),

    /// Print the URL of a single asset
    Asset(self::vite::AssetOptions),

    /// Print the React fast refresh preamble, when the dev server runs
    ReactRefresh(self::vite::ReactRefreshOptions),

    /// Inspect the Vite manifest
    Manifest(self::manifest::Options),

    /// Configuration-related commands
    Config(self::config::Options),

    /// Templates-related commands
    Templates(self::templates::Options),
}

#[derive(Parser, Debug)]
#[command(version = crate::VERSION)]
pub struct Options {
    /// Path to the configuration file
    #[arg(short, long, global = true, action = clap::ArgAction::Append)]
    config: Vec<Utf8PathBuf>,

    #[command(subcommand)]
    subcommand: Subcommand,
}

impl Options {
    pub fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        use Subcommand as S;
        match self.subcommand {
            S::Render(c) => c.run(figment),
            S::Asset(c) => c.run(figment),
            S::ReactRefresh(c) => c.run(figment),
            S::Manifest(c) => c.run(figment),
            S::Config(c) => c.run(figment),
            S::Templates(c) => c.run(figment),
        }
    }

    /// Get a [`Figment`] instance with the configuration loaded
    pub fn figment(&self) -> Figment {
        let configs = if self.config.is_empty() {
            // Read the VTAG_CONFIG environment variable
            std::env::var("VTAG_CONFIG")
                // Default to "config.yaml"
                .unwrap_or_else(|_| "config.yaml".to_owned())
                // Split the file list on `:`
                .split(':')
                .map(Utf8PathBuf::from)
                .collect()
        } else {
            self.config.clone()
        };

        vtag_config::figment(&configs)
    }
}
