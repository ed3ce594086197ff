// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::sync::Arc;

use assert_matches::assert_matches;
use indoc::indoc;
use vtag_vite::{Error, ManifestStore, Vite, ViteOptions};

use crate::Site;

const DEV_SERVER: &str = "http://localhost:5173\n";

fn hot_site() -> Site {
    let site = Site::new();
    site.write("hot", DEV_SERVER);
    site
}

#[test]
fn test_hot_entries() {
    let site = hot_site();
    let html = site.vite().render(["app.js"], None).unwrap();

    assert_eq!(
        html,
        r#"<script type="module" src="http://localhost:5173/@vite/client"></script><script type="module" src="http://localhost:5173/app.js"></script>"#
    );
}

#[test]
fn test_hot_file_wins_over_the_manifest() {
    let site = Site::with_manifest();
    site.write("hot", DEV_SERVER);

    let mut vite = site.vite();
    assert!(vite.is_running_hot());

    let html = vite.render(["app.js", "theme.css"], None).unwrap();
    assert_eq!(
        html,
        r#"<script type="module" src="http://localhost:5173/@vite/client"></script><script type="module" src="http://localhost:5173/app.js"></script><link rel="stylesheet" href="http://localhost:5173/theme.css">"#
    );
    assert!(vite.preloaded_assets().is_empty());
}

#[test]
fn test_hot_missing_entries_are_not_checked() {
    let site = hot_site();

    // Required entries are rendered as is, no manifest is involved
    let html = site.vite().render(["missing.js"], Some("nowhere")).unwrap();
    assert!(html.ends_with(r#"<script type="module" src="http://localhost:5173/missing.js"></script>"#));
}

#[test]
fn test_hot_optional_entries() {
    let site = hot_site();
    site.write("resources/js/extra.js", "export {}");

    let mut vite = Vite::with_store(
        ViteOptions {
            source_roots: vec![site.root().join("resources/js")],
            ..ViteOptions::new(site.root(), "/")
        },
        Arc::new(ManifestStore::new()),
    );

    let html = vite.render(["@admin.js", "@extra.js"], None).unwrap();
    assert_eq!(
        html,
        r#"<script type="module" src="http://localhost:5173/@vite/client"></script><script type="module" src="http://localhost:5173/extra.js"></script>"#
    );

    site.write("admin.js", "export {}");
    let html = vite.render(["@admin.js"], None).unwrap();
    assert!(html.contains(r#"src="http://localhost:5173/admin.js""#));
}

#[test]
fn test_hot_nonce() {
    let site = hot_site();
    let html = site
        .vite()
        .use_nonce("n0nce")
        .render(["app.js", "app.css"], None)
        .unwrap();

    assert_eq!(
        html,
        r#"<script type="module" src="http://localhost:5173/@vite/client" nonce="n0nce"></script><script type="module" src="http://localhost:5173/app.js" nonce="n0nce"></script><link rel="stylesheet" href="http://localhost:5173/app.css" nonce="n0nce">"#
    );
}

#[test]
fn test_hot_asset() {
    let site = hot_site();
    let vite = site.vite();

    assert_eq!(
        vite.asset("logo.svg", None).unwrap(),
        "http://localhost:5173/logo.svg"
    );
}

#[test]
fn test_custom_hot_file() {
    let site = Site::with_manifest();
    site.write("storage/vite.hot", "https://vite.test:3000");

    let vite = site.vite();
    assert!(!vite.is_running_hot());

    let mut vite = vite.use_hot_file("storage/vite.hot");
    assert!(vite.is_running_hot());
    assert_eq!(
        vite.asset("app.js", None).unwrap(),
        "https://vite.test:3000/app.js"
    );
    assert!(vite.render(["app.js"], None).unwrap().contains("https://vite.test:3000/@vite/client"));
}

#[test]
fn test_react_refresh() {
    let site = hot_site();

    let html = site.vite().use_nonce("n0nce").react_refresh().unwrap();
    assert_eq!(
        html,
        indoc! {r#"
            <script type="module" nonce="n0nce">
                import RefreshRuntime from 'http://localhost:5173/@react-refresh'
                RefreshRuntime.injectIntoGlobalHook(window)
                window.$RefreshReg$ = () => {}
                window.$RefreshSig$ = () => (type) => type
                window.__vite_plugin_react_preamble_installed__ = true
            </script>"#}
    );

    // Nothing to inject without the dev server
    let site = Site::with_manifest();
    assert_eq!(site.vite().react_refresh().unwrap(), "");
}

#[test]
fn test_hot_directory_is_ignored() {
    let site = Site::new();
    std::fs::create_dir_all(site.root().join("hot")).unwrap();

    // A directory is not a hot file
    let mut vite = site.vite();
    assert!(!vite.is_running_hot());
    assert_matches!(
        vite.render(["app.js"], None),
        Err(Error::ManifestNotFound { .. })
    );
}
