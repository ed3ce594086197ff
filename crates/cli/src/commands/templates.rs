// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{io::Write, process::ExitCode};

use anyhow::Context as _;
use camino::Utf8PathBuf;
use clap::Parser;
use figment::Figment;
use tracing::{info, info_span};
use vtag_config::{ConfigurationSectionExt, TemplatesConfig, ViteConfig};
use vtag_templates::NONCE_VARIABLE;

use crate::util::{templates_from_config, vite_from_config};

#[derive(Parser, Debug)]
pub(super) struct Options {
    #[clap(subcommand)]
    subcommand: Subcommand,
}

#[derive(Parser, Debug)]
enum Subcommand {
    /// Check that the templates specified in the config compile
    Check,

    /// Render a single template
    Render {
        /// Name of the template, relative to the templates directory
        name: String,

        /// Content Security Policy nonce made available to the template
        #[arg(long)]
        nonce: Option<String>,

        /// Write the render to this file instead of the standard output
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },
}

impl Options {
    pub fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        use Subcommand as SC;

        let templates_config =
            TemplatesConfig::extract_or_default(figment).map_err(anyhow::Error::from_boxed)?;
        let vite_config =
            ViteConfig::extract_or_default(figment).map_err(anyhow::Error::from_boxed)?;
        let vite = vite_from_config(&vite_config, &templates_config);

        match self.subcommand {
            SC::Check => {
                let _span = info_span!("cli.templates.check").entered();

                let templates = templates_from_config(&templates_config, vite)?;
                info!(count = templates.names().count(), "Templates look good");
            }

            SC::Render {
                name,
                nonce,
                output,
            } => {
                let _span = info_span!("cli.templates.render", %name).entered();

                let templates = templates_from_config(&templates_config, vite)?;
                let mut context = serde_json::Map::new();
                if let Some(nonce) = nonce {
                    context.insert(NONCE_VARIABLE.to_owned(), nonce.into());
                }

                let render = templates.render(&name, context)?;

                if let Some(output) = output {
                    info!("Writing render to {output:?}");
                    std::fs::write(&output, render.as_bytes())
                        .with_context(|| format!("could not write render to {output}"))?;
                } else {
                    std::io::stdout().lock().write_all(render.as_bytes())?;
                }
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}
