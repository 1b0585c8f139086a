use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A SQLite file inside a private temporary directory, removed on drop.
pub struct TempDatabase {
    _dir: TempDir,
    path: PathBuf,
}

impl TempDatabase {
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("taskboard-test-").tempdir()?;
        let path = dir.path().join("db.sqlite");
        Ok(Self { _dir: dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Connection string that creates the file on first open.
    pub fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::TempDatabase;

    #[test]
    fn directory_is_removed_on_drop() {
        let db = TempDatabase::new().unwrap();
        let dir = db.path().parent().unwrap().to_path_buf();
        assert!(dir.exists());
        assert!(db.url().starts_with("sqlite://"));
        assert!(db.url().ends_with("db.sqlite?mode=rwc"));

        drop(db);
        assert!(!dir.exists());
    }
}
