// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Functions exposed to the templates

use std::sync::Arc;

use minijinja::{
    Environment, Error, ErrorKind, State, Value,
    value::{Object, from_args},
};
use vtag_vite::{EntryRequest, Vite, escape_attr};

/// Context variable holding the Content Security Policy nonce of the page
pub const NONCE_VARIABLE: &str = "csp_nonce";

pub fn register(env: &mut Environment<'static>, vite: Vite) {
    let vite = Arc::new(vite);
    env.add_global(
        "vite",
        Value::from_object(ViteTags {
            vite: Arc::clone(&vite),
        }),
    );
    env.add_global(
        "vite_asset",
        Value::from_object(ViteAsset {
            vite: Arc::clone(&vite),
        }),
    );
    env.add_global("vite_react_refresh", Value::from_object(ViteReactRefresh { vite }));
}

/// A fresh [`Vite`] for a single call, using the nonce of the page if any
fn scoped(vite: &Vite, state: &State) -> Vite {
    let vite = vite.clone();
    match state.lookup(NONCE_VARIABLE).as_ref().and_then(Value::as_str) {
        Some(nonce) => vite.use_nonce(nonce),
        None => vite,
    }
}

fn vite_error(message: &'static str, source: vtag_vite::Error) -> Error {
    Error::new(ErrorKind::InvalidOperation, message).with_source(source)
}

/// Accept either a single entry or a list of entries
fn entries(value: &Value) -> Result<Vec<EntryRequest>, Error> {
    if let Some(entry) = value.as_str() {
        return Ok(vec![EntryRequest::parse(entry)]);
    }

    value
        .try_iter()?
        .map(|entry| {
            entry.as_str().map(EntryRequest::parse).ok_or_else(|| {
                Error::new(ErrorKind::InvalidOperation, "Vite entries must be strings")
            })
        })
        .collect()
}

/// `vite(entries, build_directory=none)`: the tags loading the given entries
#[derive(Debug)]
struct ViteTags {
    vite: Arc<Vite>,
}

impl Object for ViteTags {
    fn call(self: &Arc<Self>, state: &State, args: &[Value]) -> Result<Value, Error> {
        let (entries_value, build_directory): (Value, Option<&str>) = from_args(args)?;
        let entries = entries(&entries_value)?;

        let tags = scoped(&self.vite, state)
            .render(entries, build_directory)
            .map_err(|e| vite_error("Could not render the Vite tags", e))?;

        Ok(Value::from_safe_string(tags))
    }
}

/// `vite_asset(path, build_directory=none)`: the URL of a single asset
#[derive(Debug)]
struct ViteAsset {
    vite: Arc<Vite>,
}

impl Object for ViteAsset {
    fn call(self: &Arc<Self>, _state: &State, args: &[Value]) -> Result<Value, Error> {
        let (path, build_directory): (&str, Option<&str>) = from_args(args)?;

        let url = self
            .vite
            .asset(path, build_directory)
            .map_err(|e| vite_error("Could not find the Vite asset", e))?;

        // Escaped for attribute values, without the `/` escaping of the HTML filter
        Ok(Value::from_safe_string(escape_attr(&url).into_owned()))
    }
}

/// `vite_react_refresh()`: the React fast refresh preamble, empty unless the
/// dev server runs
#[derive(Debug)]
struct ViteReactRefresh {
    vite: Arc<Vite>,
}

impl Object for ViteReactRefresh {
    fn call(self: &Arc<Self>, state: &State, args: &[Value]) -> Result<Value, Error> {
        let () = from_args(args)?;

        let preamble = scoped(&self.vite, state)
            .react_refresh()
            .map_err(|e| vite_error("Could not render the React refresh preamble", e))?;

        Ok(Value::from_safe_string(preamble))
    }
}
