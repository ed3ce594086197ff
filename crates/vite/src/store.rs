// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{
    collections::HashMap,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::{Error, Manifest};

/// The store shared by everything in the process which does not bring its own
static GLOBAL: LazyLock<Arc<ManifestStore>> = LazyLock::new(Arc::default);

/// A cache of parsed manifests, keyed by the path they were loaded from.
///
/// Manifests are loaded once and never invalidated: a changed manifest file is
/// only picked up by a new store (or after an explicit [`ManifestStore::clear`]).
/// Concurrent loads of the same path may both parse the file, in which case the
/// first one to finish wins.
#[derive(Debug, Default)]
pub struct ManifestStore {
    manifests: RwLock<HashMap<Utf8PathBuf, Arc<Manifest>>>,
}

impl ManifestStore {
    /// Create a new, empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the process-wide store
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Get the manifest at `path`, parsing it on first access.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, could not be read or is not
    /// a valid manifest
    #[tracing::instrument(name = "vite.manifest.load", skip_all, fields(%path), err)]
    pub fn load(&self, path: &Utf8Path) -> Result<Arc<Manifest>, Error> {
        if let Some(manifest) = self.get(path) {
            debug!("Using cached manifest");
            return Ok(manifest);
        }

        if !path.is_file() {
            return Err(Error::ManifestNotFound {
                path: path.to_owned(),
            });
        }

        let raw = std::fs::read(path).map_err(|source| Error::ManifestRead {
            path: path.to_owned(),
            source,
        })?;

        let manifest: Manifest =
            serde_json::from_slice(&raw).map_err(|source| Error::ManifestParse {
                path: path.to_owned(),
                source,
            })?;

        debug!(chunks = manifest.len(), "Parsed manifest");

        let mut manifests = self
            .manifests
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let manifest = manifests
            .entry(path.to_owned())
            .or_insert_with(|| Arc::new(manifest));
        Ok(Arc::clone(manifest))
    }

    /// Get the manifest cached for `path`, without touching the filesystem
    #[must_use]
    pub fn get(&self, path: &Utf8Path) -> Option<Arc<Manifest>> {
        self.manifests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// Put an already parsed manifest in the cache, replacing any previous one
    pub fn insert(&self, path: impl Into<Utf8PathBuf>, manifest: Manifest) {
        self.manifests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), Arc::new(manifest));
    }

    /// Forget every cached manifest
    pub fn clear(&self) {
        self.manifests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached manifests
    #[must_use]
    pub fn len(&self) -> usize {
        self.manifests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing was cached yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
