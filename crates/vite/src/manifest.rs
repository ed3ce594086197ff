// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{borrow::Cow, str::FromStr};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::Error;

/// A single chunk of a Vite manifest.
///
/// Only the fields needed to resolve tags are typed. Everything else is kept
/// as is, so an unexpected value there never makes the manifest unreadable.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Chunk {
    /// The output file, relative to the build directory
    #[serde(default)]
    file: Option<String>,

    /// Keys of other chunks this one statically imports
    #[serde(default)]
    imports: Vec<String>,

    /// Output CSS files this chunk depends on
    #[serde(default)]
    css: Vec<String>,

    /// Anything else, like `isEntry` or integrity hashes added by plugins
    #[serde(flatten)]
    extra: serde_json::Map<String, Value>,
}

impl Chunk {
    /// A minimal chunk which only knows its output file
    #[must_use]
    pub fn for_file(file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            ..Self::default()
        }
    }

    /// The output file of this chunk.
    ///
    /// Chunks without a `file` are tolerated and resolve to an empty path.
    #[must_use]
    pub fn file(&self) -> &str {
        self.file.as_deref().unwrap_or_default()
    }

    /// The source file this chunk was built from, if recorded
    #[must_use]
    pub fn src(&self) -> Option<&str> {
        self.extra.get("src").and_then(Value::as_str)
    }

    /// Whether this chunk is an entry point
    #[must_use]
    pub fn is_entry(&self) -> bool {
        self.flag("isEntry")
    }

    /// Whether this chunk is the target of a dynamic import
    #[must_use]
    pub fn is_dynamic_entry(&self) -> bool {
        self.flag("isDynamicEntry")
    }

    /// Keys of the chunks statically imported by this one, in manifest order
    #[must_use]
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Keys of the chunks dynamically imported by this one
    pub fn dynamic_imports(&self) -> impl Iterator<Item = &str> {
        self.strings("dynamicImports")
    }

    /// CSS files used by this chunk, in manifest order
    #[must_use]
    pub fn css(&self) -> &[String] {
        &self.css
    }

    /// Static assets referenced by this chunk
    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.strings("assets")
    }

    fn flag(&self, name: &str) -> bool {
        self.extra
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or_default()
    }

    /// The string items of a list field, anything else is ignored
    fn strings(&self, name: &str) -> impl Iterator<Item = &str> {
        self.extra
            .get(name)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// Look up an arbitrary field by its name in the manifest, as text.
    ///
    /// Numbers and booleans are converted to their textual form, other
    /// non-string values are ignored.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "file" => self.file.as_deref().map(Cow::Borrowed),
            _ => match self.extra.get(name)? {
                Value::String(value) => Some(Cow::Borrowed(value)),
                Value::Number(value) => Some(Cow::Owned(value.to_string())),
                Value::Bool(value) => Some(Cow::Owned(value.to_string())),
                Value::Null | Value::Array(_) | Value::Object(_) => None,
            },
        }
    }
}

/// A parsed Vite manifest, mapping source keys to their chunk.
///
/// Chunks keep the order in which they appear in the manifest file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Manifest {
    chunks: IndexMap<String, Chunk>,
}

impl Manifest {
    /// Get the chunk for the given entry point or asset
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChunkNotFound`] if the key is not in the manifest
    pub fn chunk(&self, key: &str) -> Result<&Chunk, Error> {
        self.chunks.get(key).ok_or_else(|| Error::ChunkNotFound {
            key: key.to_owned(),
        })
    }

    /// Find the first chunk whose output file is `file`, with its key
    #[must_use]
    pub fn find_by_file(&self, file: &str) -> Option<(&str, &Chunk)> {
        self.chunks
            .iter()
            .find(|(_, chunk)| chunk.file.as_deref() == Some(file))
            .map(|(key, chunk)| (key.as_str(), chunk))
    }

    /// Iterate over all the chunks, in manifest order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Chunk)> {
        self.chunks.iter().map(|(key, chunk)| (key.as_str(), chunk))
    }

    /// Iterate over the entry point chunks, in manifest order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Chunk)> {
        self.iter().filter(|(_, chunk)| chunk.is_entry())
    }

    /// Number of chunks in the manifest
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the manifest has no chunks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl FromStr for Manifest {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

impl<K: Into<String>> FromIterator<(K, Chunk)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (K, Chunk)>>(iter: I) -> Self {
        Self {
            chunks: iter.into_iter().map(|(key, chunk)| (key.into(), chunk)).collect(),
        }
    }
}
