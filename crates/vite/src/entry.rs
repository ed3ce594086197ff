// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{convert::Infallible, fmt, str::FromStr};

/// Prefix marking an entry as optional in its textual form
pub const OPTIONAL_MARKER: char = '@';

/// An entry point requested for rendering.
///
/// An optional entry never fails the render when it is missing from the
/// manifest, and is skipped in hot mode when its source file does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryRequest {
    key: String,
    optional: bool,
}

impl EntryRequest {
    /// An entry which must be in the manifest
    #[must_use]
    pub fn required(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            optional: false,
        }
    }

    /// An entry which is silently skipped when it can't be found
    #[must_use]
    pub fn optional(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            optional: true,
        }
    }

    /// Parse the textual form of an entry, where a leading `@` marks it as
    /// optional
    #[must_use]
    pub fn parse(input: &str) -> Self {
        match input.strip_prefix(OPTIONAL_MARKER) {
            Some(key) => Self::optional(key),
            None => Self::required(input),
        }
    }

    /// The manifest key of this entry
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether this entry is optional
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

impl FromStr for EntryRequest {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for EntryRequest {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<&String> for EntryRequest {
    fn from(value: &String) -> Self {
        Self::parse(value)
    }
}

impl From<String> for EntryRequest {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&EntryRequest> for EntryRequest {
    fn from(value: &EntryRequest) -> Self {
        value.clone()
    }
}

impl fmt::Display for EntryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "{OPTIONAL_MARKER}")?;
        }
        f.write_str(&self.key)
    }
}
