// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

#![deny(missing_docs, rustdoc::missing_crate_level_docs)]
#![allow(clippy::module_name_repetitions)]

//! Resolve a Vite build manifest into the `<script>` and `<link>` tags needed
//! to load one or more entry points in a server-rendered page.
//!
//! When the Vite dev server is running (signalled by the presence of a "hot"
//! file), tags point directly at the dev server. Otherwise the manifest is
//! loaded, each entry's chunk is resolved and its imports and stylesheets are
//! walked to produce deduplicated preload and asset tags.
//!
//! ```no_run
//! use vtag_vite::{Vite, ViteOptions};
//!
//! let mut vite = Vite::new(ViteOptions::new("/srv/site/", "/")).use_nonce("r4nd0m");
//! let html = vite.render(["resources/js/app.js", "@resources/css/print.css"], None)?;
//! # Ok::<(), vtag_vite::Error>(())
//! ```

mod attributes;
mod entry;
mod error;
mod graph;
mod manifest;
mod options;
mod store;
mod tags;
mod vite;

pub use self::{
    attributes::{AttributeValue, Attributes, ResolveAttributes, escape_attr},
    entry::{EntryRequest, OPTIONAL_MARKER},
    error::Error,
    graph::TagMap,
    manifest::{Chunk, Manifest},
    options::ViteOptions,
    store::ManifestStore,
    tags::is_style_path,
    vite::{CLIENT_ENTRY, REACT_REFRESH_ENTRY, Vite},
};
