// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

//! Templates rendering, with the Vite tags available as functions

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use minijinja::UndefinedBehavior;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use vtag_vite::Vite;
use walkdir::DirEntry;

mod functions;

pub use self::functions::NONCE_VARIABLE;

/// Extensions of the files loaded as templates
const TEMPLATE_EXTENSIONS: [&str; 3] = ["html", "txt", "xml"];

/// Wrapper around [`minijinja::Environment`] exposing the Vite functions to
/// the templates
#[derive(Debug, Clone)]
pub struct Templates {
    environment: Arc<minijinja::Environment<'static>>,
}

/// There was an issue while loading the templates
#[derive(Error, Debug)]
pub enum TemplateLoadingError {
    /// I/O error
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// Failed to traverse the filesystem
    #[error("failed to traverse the filesystem")]
    WalkDir(#[from] walkdir::Error),

    /// Encountered non-UTF-8 path
    #[error("encountered non-UTF-8 path")]
    NonUtf8PathBuf(#[from] camino::FromPathBufError),

    /// Encountered invalid path
    #[error("encountered invalid path")]
    InvalidPath(#[from] std::path::StripPrefixError),

    /// Some templates failed to compile
    #[error("could not load and compile some templates")]
    Compile(#[from] minijinja::Error),
}

/// Failed to render a template
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Missing template
    #[error("missing template {template:?}")]
    Missing {
        /// The name of the template being rendered
        template: String,

        /// The underlying error
        #[source]
        source: minijinja::Error,
    },

    /// Failed to render the template
    #[error("could not render template {template:?}")]
    Render {
        /// The name of the template being rendered
        template: String,

        /// The underlying error
        #[source]
        source: minijinja::Error,
    },
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|s| s.starts_with('.'))
}

fn environment(vite: Vite) -> minijinja::Environment<'static> {
    let mut env = minijinja::Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::SemiStrict);
    self::functions::register(&mut env, vite);
    env
}

impl Templates {
    /// Load the templates from the given directory.
    ///
    /// Every `.html`, `.txt` and `.xml` file is registered under its path
    /// relative to `path`. Hidden files and directories are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the templates could not be loaded from disk.
    #[tracing::instrument(name = "templates.load", skip_all, fields(%path))]
    pub fn load(path: &Utf8Path, vite: Vite) -> Result<Self, TemplateLoadingError> {
        let mut env = environment(vite);

        let root = path.canonicalize_utf8()?;
        info!(%root, "Loading templates from filesystem");
        for entry in walkdir::WalkDir::new(&root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = Utf8PathBuf::try_from(entry.into_path())?;
            let Some(ext) = path.extension() else {
                continue;
            };

            if TEMPLATE_EXTENSIONS.contains(&ext) {
                let relative = path.strip_prefix(&root)?;
                debug!(%relative, "Registering template");
                let template = std::fs::read_to_string(&path)?;
                env.add_template_owned(relative.as_str().to_owned(), template)?;
            }
        }

        Ok(Self {
            environment: Arc::new(env),
        })
    }

    /// Build the templates from in-memory sources, given as `(name, source)`
    /// pairs
    ///
    /// # Errors
    ///
    /// Returns an error if one of the templates doesn't compile
    pub fn from_sources<I, N, S>(sources: I, vite: Vite) -> Result<Self, TemplateLoadingError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let mut env = environment(vite);
        for (name, source) in sources {
            env.add_template_owned(name.into(), source.into())?;
        }

        Ok(Self {
            environment: Arc::new(env),
        })
    }

    /// Names of the loaded templates
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.environment.templates().map(|(name, _)| name)
    }

    /// Render the template `name` with the given context
    ///
    /// # Errors
    ///
    /// Returns an error if the template doesn't exist or fails to render
    #[tracing::instrument(name = "templates.render", skip(self, context), err)]
    pub fn render<C: Serialize>(&self, name: &str, context: C) -> Result<String, TemplateError> {
        let template =
            self.environment
                .get_template(name)
                .map_err(|source| TemplateError::Missing {
                    template: name.to_owned(),
                    source,
                })?;

        template
            .render(context)
            .map_err(|source| TemplateError::Render {
                template: name.to_owned(),
                source,
            })
    }
}
