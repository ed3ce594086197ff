// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use vtag_vite::{ManifestStore, Vite, ViteOptions};

mod hot;
mod manifest;

/// The manifest used by most tests.
///
/// `app.js` pulls `util.js` and a stylesheet, `admin.js` shares `util.js` and
/// brings its own styles, `vendor.js` is only reachable through `util.js`.
const MANIFEST: &str = r#"{
    "app.js": {
        "file": "app-123.js",
        "src": "app.js",
        "isEntry": true,
        "css": ["app-456.css"],
        "imports": ["util.js"]
    },
    "util.js": {
        "file": "util-789.js",
        "imports": ["vendor.js"],
        "css": ["util-000.css"]
    },
    "vendor.js": {
        "file": "vendor-aaa.js"
    },
    "admin.js": {
        "file": "admin-bbb.js",
        "src": "admin.js",
        "isEntry": true,
        "imports": ["util.js"],
        "css": ["admin-ccc.css"],
        "integrity": "sha384-admin"
    },
    "theme.css": {
        "file": "theme-ddd.css",
        "src": "theme.css",
        "isEntry": true
    },
    "logo.svg": {
        "file": "logo-eee.svg"
    },
    "broken.js": {
        "file": "broken-fff.js",
        "imports": ["gone.js"]
    }
}"#;

/// A temporary site root with a build directory
struct Site {
    _dir: TempDir,
    root: Utf8PathBuf,
    store: Arc<ManifestStore>,
}

impl Site {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).unwrap();
        Self {
            _dir: dir,
            root,
            store: Arc::new(ManifestStore::new()),
        }
    }

    /// A site with [`MANIFEST`] in the `build` directory
    fn with_manifest() -> Self {
        let site = Self::new();
        site.write("build/manifest.json", MANIFEST);
        site
    }

    fn write(&self, relative: &str, contents: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn vite(&self) -> Vite {
        Vite::with_store(
            ViteOptions::new(self.root.clone(), "/"),
            Arc::clone(&self.store),
        )
    }
}
