// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{borrow::Cow, fmt};

use indexmap::IndexMap;

use crate::{Chunk, Manifest};

/// Characters which must be escaped inside a double-quoted attribute value
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Escape a string so it can be used as a double-quoted HTML attribute value.
///
/// Only allocates when something actually needs escaping.
#[must_use]
pub fn escape_attr(input: &str) -> Cow<'_, str> {
    if !input.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(input);
    }

    let mut escaped = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            c => escaped.push(c),
        }
    }

    Cow::Owned(escaped)
}

/// The value of a single HTML attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// A regular `key="value"` attribute
    Text(String),

    /// `true` renders a bare boolean attribute, `false` suppresses it
    Flag(bool),

    /// Suppresses the attribute
    Null,
}

impl AttributeValue {
    /// Get the value as text, if it is one
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Flag(_) | Self::Null => None,
        }
    }

    /// Whether this value would be left out of the rendered attributes
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Flag(false) | Self::Null)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<&String> for AttributeValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Cow<'_, str>> for AttributeValue {
    fn from(value: Cow<'_, str>) -> Self {
        Self::Text(value.into_owned())
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// An ordered set of HTML attributes.
///
/// Keys keep the position of their first insertion: overriding an existing
/// key through [`Attributes::insert`] or [`Attributes::merge`] replaces the
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    inner: IndexMap<String, AttributeValue>,
}

impl Attributes {
    /// Create an empty set of attributes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an attribute, builder-style
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace an attribute, returning the previous value
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Option<AttributeValue> {
        self.inner.insert(key.into(), value.into())
    }

    /// Get the value of an attribute
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.inner.get(key)
    }

    /// Merge another set of attributes over this one. Values from `other` win.
    pub fn merge(&mut self, other: Self) {
        self.inner.extend(other.inner);
    }

    /// Number of attributes, including suppressed ones
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether there are no attributes at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over the attributes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.inner.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Render the attributes as they would appear inside an HTML tag
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.inner {
            let rendered_value = match value {
                AttributeValue::Flag(false) | AttributeValue::Null => continue,
                AttributeValue::Flag(true) => None,
                AttributeValue::Text(text) => Some(escape_attr(text)),
            };

            if !first {
                f.write_str(" ")?;
            }
            first = false;

            match rendered_value {
                Some(text) => write!(f, "{key}=\"{text}\"")?,
                None => f.write_str(key)?,
            }
        }

        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Attributes
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from(attributes: [(K, V); N]) -> Self {
        attributes.into_iter().collect()
    }
}

/// Something which computes extra attributes for a generated tag.
///
/// It is implemented for closures taking the entry key, the resolved URL, the
/// chunk and the manifest, and for a static [`Attributes`] set which is always
/// returned as-is.
pub trait ResolveAttributes: Send + Sync {
    /// Compute the attributes for the tag of `src`, served at `url`
    fn resolve(&self, src: &str, url: &str, chunk: &Chunk, manifest: &Manifest) -> Attributes;
}

impl<F> ResolveAttributes for F
where
    F: Fn(&str, &str, &Chunk, &Manifest) -> Attributes + Send + Sync,
{
    fn resolve(&self, src: &str, url: &str, chunk: &Chunk, manifest: &Manifest) -> Attributes {
        self(src, url, chunk, manifest)
    }
}

impl ResolveAttributes for Attributes {
    fn resolve(&self, _src: &str, _url: &str, _chunk: &Chunk, _manifest: &Manifest) -> Attributes {
        self.clone()
    }
}
