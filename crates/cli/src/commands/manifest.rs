// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{io::Write, process::ExitCode};

use clap::Parser;
use figment::Figment;
use tracing::{info, info_span};
use vtag_config::{ConfigurationSectionExt, TemplatesConfig, ViteConfig};
use vtag_vite::{Manifest, Vite};

use crate::util::vite_from_config;

#[derive(Parser, Debug)]
pub(super) struct Options {
    #[command(subcommand)]
    subcommand: Subcommand,
}

#[derive(Parser, Debug)]
enum Subcommand {
    /// List the chunks of the manifest with their URL
    List {
        /// Use this build directory instead of the configured one
        #[arg(long)]
        build_directory: Option<String>,

        /// Include the chunks which are not entry points
        #[arg(long)]
        all: bool,
    },
}

impl Options {
    pub fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        use Subcommand as SC;
        match self.subcommand {
            SC::List {
                build_directory,
                all,
            } => {
                let _span = info_span!("cli.manifest.list").entered();

                let config =
                    ViteConfig::extract_or_default(figment).map_err(anyhow::Error::from_boxed)?;
                let templates = TemplatesConfig::extract_or_default(figment)
                    .map_err(anyhow::Error::from_boxed)?;
                let vite = vite_from_config(&config, &templates);
                let build_directory = build_directory.unwrap_or(config.build_directory);

                let manifest = vite.manifest(&build_directory)?;
                info!(
                    path = %vite.manifest_path(&build_directory),
                    chunks = manifest.len(),
                    "Loaded the manifest"
                );

                let mut stdout = std::io::stdout().lock();
                for (key, url) in chunk_urls(&vite, &manifest, &build_directory, all) {
                    writeln!(stdout, "{key}\t{url}")?;
                }

                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// The chunks of the manifest with the URL of their output file, whether or
/// not the dev server runs
fn chunk_urls<'a>(
    vite: &'a Vite,
    manifest: &'a Manifest,
    build_directory: &'a str,
    all: bool,
) -> impl Iterator<Item = (&'a str, String)> + 'a {
    manifest
        .iter()
        .filter(move |(_, chunk)| all || chunk.is_entry())
        .map(move |(key, chunk)| (key, vite.build_url(build_directory, chunk.file())))
}
