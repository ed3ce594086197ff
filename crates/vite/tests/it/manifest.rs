// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use assert_matches::assert_matches;
use vtag_vite::{Attributes, Chunk, EntryRequest, Error, Manifest, is_style_path};

use crate::Site;

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

/// Split rendered HTML into its individual tags
fn tags(html: &str) -> Vec<String> {
    html.split_inclusive('>')
        .filter(|tag| !tag.starts_with("</"))
        .map(ToOwned::to_owned)
        .collect()
}

/// The URL loaded by a tag
fn url_of(tag: &str) -> &str {
    let (_, rest) = tag
        .split_once(" href=\"")
        .or_else(|| tag.split_once(" src=\""))
        .unwrap();
    rest.split('"').next().unwrap()
}

#[test]
fn test_worked_example() {
    let site = Site::new();
    site.write(
        "build/manifest.json",
        r#"{
            "app.js": {"file": "app-123.js", "css": ["app-456.css"], "imports": ["util.js"]},
            "util.js": {"file": "util-789.js"}
        }"#,
    );

    let html = site.vite().render(["app.js"], None).unwrap();
    insta::assert_snapshot!(
        html,
        @r#"<link rel="preload" as="style" href="/build/app-456.css"><link rel="modulepreload" href="/build/app-123.js"><link rel="modulepreload" href="/build/util-789.js"><link rel="stylesheet" href="/build/app-456.css"><script type="module" src="/build/app-123.js"></script>"#
    );
}

#[test]
fn test_single_entry() {
    let site = Site::with_manifest();
    let html = site.vite().render(["app.js"], None).unwrap();

    assert_eq!(
        tags(&html),
        [
            r#"<link rel="preload" as="style" href="/build/util-000.css">"#,
            r#"<link rel="preload" as="style" href="/build/app-456.css">"#,
            r#"<link rel="modulepreload" href="/build/app-123.js">"#,
            r#"<link rel="modulepreload" href="/build/util-789.js">"#,
            r#"<link rel="stylesheet" href="/build/util-000.css">"#,
            r#"<link rel="stylesheet" href="/build/app-456.css">"#,
            r#"<script type="module" src="/build/app-123.js">"#,
        ]
    );

    // Imports of imports are not preloaded
    assert_eq!(count(&html, "vendor-aaa.js"), 0);
}

#[test]
fn test_shared_chunks_are_rendered_once() {
    let site = Site::with_manifest();
    let html = site.vite().render(["app.js", "admin.js"], None).unwrap();

    assert_eq!(count(&html, r#"href="/build/util-789.js""#), 1);
    assert_eq!(count(&html, r#"href="/build/util-000.css""#), 2);
    assert_eq!(count(&html, "/build/app-123.js"), 2);
    assert_eq!(count(&html, "/build/admin-bbb.js"), 2);
    assert_eq!(count(&html, "/build/admin-ccc.css"), 2);
    assert_eq!(count(&html, r#"integrity="sha384-admin""#), 2);
    assert_eq!(tags(&html).len(), 11);

    // Requesting the same entry twice doesn't duplicate anything
    let twice = site.vite().render(["app.js", "app.js"], None).unwrap();
    let once = site.vite().render(["app.js"], None).unwrap();
    assert_eq!(twice, once);
}

#[test]
fn test_styles_come_first() {
    let site = Site::with_manifest();
    let html = site
        .vite()
        .render(["app.js", "theme.css", "admin.js"], None)
        .unwrap();

    let tags = tags(&html);
    let (preloads, assets): (Vec<_>, Vec<_>) = tags.iter().partition(|tag| {
        tag.contains(r#"rel="preload""#) || tag.contains(r#"rel="modulepreload""#)
    });

    // Preloads come before assets
    assert_eq!(preloads.len() + assets.len(), tags.len());
    assert!(tags[..preloads.len()].iter().all(|tag| preloads.contains(&tag)));

    for group in [&preloads, &assets] {
        let styles: Vec<bool> = group.iter().map(|tag| is_style_path(url_of(tag))).collect();
        let first_script = styles.iter().position(|is_style| !is_style).unwrap();
        assert!(styles[first_script..].iter().all(|is_style| !is_style));
    }

    // Discovery order is kept within the style bucket
    let app_css = html.find(r#"<link rel="stylesheet" href="/build/app-456.css">"#).unwrap();
    let theme_css = html.find(r#"<link rel="stylesheet" href="/build/theme-ddd.css">"#).unwrap();
    let admin_css = html.find(r#"<link rel="stylesheet" href="/build/admin-ccc.css">"#).unwrap();
    assert!(app_css < theme_css && theme_css < admin_css);
}

#[test]
fn test_missing_required_entry_fails_the_whole_render() {
    let site = Site::with_manifest();
    let mut vite = site.vite();

    assert_matches!(
        vite.render(["app.js", "missing.js"], None),
        Err(Error::ChunkNotFound { key }) if key == "missing.js"
    );
    assert_matches!(
        vite.render(["missing.js", "app.js"], None),
        Err(Error::ChunkNotFound { .. })
    );
}

#[test]
fn test_optional_entries() {
    let site = Site::with_manifest();

    // Missing from the manifest: silently skipped
    let with_optional = site.vite().render(["app.js", "@missing.js"], None).unwrap();
    let without = site.vite().render(["app.js"], None).unwrap();
    assert_eq!(with_optional, without);

    // Present in the manifest: rendered, even without a source file on disk
    let html = site.vite().render(["@admin.js"], None).unwrap();
    assert_eq!(count(&html, "/build/admin-bbb.js"), 2);

    // The source file existing doesn't change anything for missing chunks
    site.write("missing.js", "export {}");
    let html = site.vite().render([EntryRequest::optional("missing.js")], None).unwrap();
    assert_eq!(html, "");
}

#[test]
fn test_missing_import_is_always_fatal() {
    let site = Site::with_manifest();

    for entry in ["broken.js", "@broken.js"] {
        assert_matches!(
            site.vite().render([entry], None),
            Err(Error::ChunkNotFound { key }) if key == "gone.js"
        );
    }
}

#[test]
fn test_missing_manifest() {
    let site = Site::new();
    let mut vite = site.vite();

    assert_matches!(
        vite.render(["app.js"], None),
        Err(Error::ManifestNotFound { path }) if path == site.root().join("build/manifest.json")
    );
    assert_matches!(
        vite.asset("app.js", None),
        Err(Error::ManifestNotFound { .. })
    );
}

#[test]
fn test_invalid_manifest() {
    let site = Site::new();
    site.write("build/manifest.json", r#"{"app.js": "#);

    assert_matches!(
        site.vite().render(["app.js"], None),
        Err(Error::ManifestParse { .. })
    );
}

#[test]
fn test_build_directory_and_manifest_name() {
    let site = Site::with_manifest();
    site.write("public/manifest.json", r#"{"app.js": {"file": "app-999.js"}}"#);
    site.write("public/assets.json", r#"{"app.js": {"file": "app-888.js"}}"#);

    let html = site.vite().render(["app.js"], Some("public")).unwrap();
    assert_eq!(
        html,
        r#"<link rel="modulepreload" href="/public/app-999.js"><script type="module" src="/public/app-999.js"></script>"#
    );

    let mut vite = site.vite().use_build_directory("public").use_manifest("assets.json");
    let html = vite.render(["app.js"], None).unwrap();
    assert!(html.contains(r#"src="/public/app-888.js""#));

    // The override wins over the configured build directory
    let html = vite.render(["app.js"], Some("public")).unwrap();
    assert!(html.contains(r#"src="/public/app-888.js""#));
}

#[test]
fn test_asset_matches_rendered_url() {
    let site = Site::with_manifest();
    let vite = site.vite();

    for (entry, expected) in [
        ("app.js", "/build/app-123.js"),
        ("theme.css", "/build/theme-ddd.css"),
    ] {
        let url = vite.asset(entry, None).unwrap();
        assert_eq!(url, expected);

        let html = site.vite().render([entry], None).unwrap();
        assert!(html.contains(&format!("=\"{url}\"")));
    }

    assert_eq!(vite.asset("logo.svg", None).unwrap(), "/build/logo-eee.svg");
    assert_matches!(
        vite.asset("missing.svg", None),
        Err(Error::ChunkNotFound { .. })
    );
}

#[test]
fn test_render_is_idempotent() {
    let site = Site::with_manifest();
    let mut vite = site.vite().use_nonce("n0nce");

    let first = vite.render(["app.js", "admin.js"], None).unwrap();
    let second = vite.render(["app.js", "admin.js"], None).unwrap();
    let fresh = site
        .vite()
        .use_nonce("n0nce")
        .render(["app.js", "admin.js"], None)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first, fresh);
    assert_eq!(count(&first, r#"nonce="n0nce""#), tags(&first).len());
}

#[test]
fn test_preloaded_assets_are_remembered() {
    let site = Site::with_manifest();
    let mut vite = site.vite();
    vite.render(["app.js"], None).unwrap();

    let urls: Vec<_> = vite.preloaded_assets().keys().map(String::as_str).collect();
    assert_eq!(
        urls,
        [
            "/build/app-123.js",
            "/build/util-789.js",
            "/build/util-000.css",
            "/build/app-456.css",
        ]
    );

    // Preload tags made before the nonce was set are reused as they were
    let mut vite = vite.use_nonce("late");
    let html = vite.render(["app.js"], None).unwrap();
    assert!(html.contains(r#"<link rel="modulepreload" href="/build/app-123.js">"#));
    assert!(html.contains(r#"<script type="module" src="/build/app-123.js" nonce="late"></script>"#));
}

#[test]
fn test_configured_entries() {
    let site = Site::with_manifest();
    let mut vite = site.vite().with_entries(["app.js", "@missing.js"]);

    assert_eq!(vite.tags().unwrap(), site.vite().render(["app.js"], None).unwrap());
}

#[test]
fn test_resolvers_see_the_chunk() {
    let site = Site::with_manifest();
    let mut vite = site
        .vite()
        .use_integrity("src")
        .use_script_tag_attributes(
            |src: &str, _url: &str, chunk: &Chunk, manifest: &Manifest| {
                Attributes::new()
                    .with("data-src", src)
                    .with("data-entry", chunk.is_entry())
                    .with("data-chunks", manifest.len().to_string())
            },
        )
        .use_preload_tag_attributes(Attributes::from([("crossorigin", "anonymous")]));

    let html = vite.render(["app.js"], None).unwrap();
    assert!(html.contains(
        r#"<script type="module" src="/build/app-123.js" integrity="app.js" data-src="app.js" data-entry data-chunks="7"></script>"#
    ));
    assert!(html.contains(
        r#"<link rel="modulepreload" href="/build/util-789.js" crossorigin="anonymous">"#
    ));
}

#[test]
fn test_chunk_without_file() {
    let site = Site::new();
    site.write("build/manifest.json", r#"{"app.js": {"css": []}}"#);

    let html = site.vite().render(["app.js"], None).unwrap();
    assert_eq!(
        html,
        r#"<link rel="modulepreload" href="/build/"><script type="module" src="/build/"></script>"#
    );
}

#[test]
fn test_unexpected_metadata_is_ignored() {
    let site = Site::new();
    site.write(
        "build/manifest.json",
        r#"{"app.js": {"file": "app-1.js", "isEntry": "yes", "assets": null}}"#,
    );

    let html = site.vite().render(["app.js"], None).unwrap();
    assert_eq!(
        html,
        r#"<link rel="modulepreload" href="/build/app-1.js"><script type="module" src="/build/app-1.js"></script>"#
    );
}
