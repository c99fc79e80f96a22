//! Test helpers for writing CLI input files into temporary workspaces.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Hazard document with one high risk zone around the Catedral.
pub(super) const CATEDRAL_HAZARDS: &str = r#"{
    "version": 11,
    "zones": [
        {"id": "catedral", "name": "Catedral", "lat": 28.6353, "lon": -106.0772,
         "radius_km": 0.9, "level": "high"}
    ],
    "reports": [
        {"id": "r1", "lat": 28.6354, "lon": -106.0773, "severity": "medium",
         "verified": true, "created_at": "2024-04-30T21:15:00Z"}
    ]
}"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents)
        .unwrap_or_else(|err| panic!("failed to write {path}: {err}"));
}

/// A temporary directory addressed through UTF-8 paths.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        write_utf8(&path, contents.as_bytes());
        path
    }
}
