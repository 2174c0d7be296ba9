use std::path::PathBuf;

/// The single-file layout this store persists to: the main JSON document,
/// a lockfile sibling for cross-process exclusion, and a temp file used as
/// the atomic-rename staging area.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub main_path: PathBuf,
    pub lock_path: PathBuf,
}

impl StorageLayout {
    pub fn new(main_path: PathBuf) -> Self {
        let mut lock_path = main_path.clone();
        let lock_file_name = format!(
            "{}.lock",
            main_path.file_name().and_then(|n| n.to_str()).unwrap_or("store")
        );
        lock_path.set_file_name(lock_file_name);

        StorageLayout { main_path, lock_path }
    }

    /// A sibling temp file in the same directory as the main file, so the
    /// final rename is guaranteed to stay on one filesystem.
    pub fn temp_path(&self) -> PathBuf {
        let file_name = format!(
            "{}.tmp",
            self.main_path.file_name().and_then(|n| n.to_str()).unwrap_or("store")
        );
        let mut path = self.main_path.clone();
        path.set_file_name(file_name);
        path
    }
}
