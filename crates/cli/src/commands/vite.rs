// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{io::Write, process::ExitCode};

use clap::Parser;
use figment::Figment;
use tracing::info_span;
use vtag_config::{ConfigurationSectionExt, TemplatesConfig, ViteConfig};
use vtag_vite::{EntryRequest, Vite};

use crate::util::vite_from_config;

fn load_vite(figment: &Figment) -> anyhow::Result<Vite> {
    let config = ViteConfig::extract_or_default(figment).map_err(anyhow::Error::from_boxed)?;
    let templates =
        TemplatesConfig::extract_or_default(figment).map_err(anyhow::Error::from_boxed)?;
    Ok(vite_from_config(&config, &templates))
}

fn print(output: &str) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}

#[derive(Parser, Debug)]
pub(super) struct RenderOptions {
    /// Entries to render, prefixed with `@` when optional
    #[arg(required = true)]
    entries: Vec<String>,

    /// Use this build directory instead of the configured one
    #[arg(long)]
    build_directory: Option<String>,

    /// Content Security Policy nonce to add to the tags
    #[arg(long, conflicts_with = "random_nonce")]
    nonce: Option<String>,

    /// Generate a random Content Security Policy nonce
    #[arg(long)]
    random_nonce: bool,
}

impl RenderOptions {
    pub fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        let _span = info_span!("cli.render").entered();

        let mut vite = load_vite(figment)?;
        if let Some(nonce) = self.nonce {
            vite = vite.use_nonce(nonce);
        } else if self.random_nonce {
            vite = vite.use_random_nonce();
        }

        let entries: Vec<EntryRequest> = self.entries.iter().map(EntryRequest::from).collect();
        let html = vite.render(entries, self.build_directory.as_deref())?;

        if let Some(nonce) = vite.nonce() {
            tracing::info!(%nonce, "Rendered tags with a nonce");
        }
        print(&html)?;

        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Parser, Debug)]
pub(super) struct AssetOptions {
    /// Manifest key of the asset
    path: String,

    /// Use this build directory instead of the configured one
    #[arg(long)]
    build_directory: Option<String>,
}

impl AssetOptions {
    pub fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        let _span = info_span!("cli.asset").entered();

        let vite = load_vite(figment)?;
        let url = vite.asset(&self.path, self.build_directory.as_deref())?;
        print(&url)?;

        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Parser, Debug)]
pub(super) struct ReactRefreshOptions {
    /// Content Security Policy nonce to add to the script
    #[arg(long)]
    nonce: Option<String>,
}

impl ReactRefreshOptions {
    pub fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        let _span = info_span!("cli.react_refresh").entered();

        let mut vite = load_vite(figment)?;
        if let Some(nonce) = self.nonce {
            vite = vite.use_nonce(nonce);
        }

        let preamble = vite.react_refresh()?;
        if preamble.is_empty() {
            tracing::warn!(hot_file = %vite.hot_file(), "The dev server is not running");
        } else {
            print(&preamble)?;
        }

        Ok(ExitCode::SUCCESS)
    }
}
