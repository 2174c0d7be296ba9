use std::fs;

use crate::core::error::{Error, Result};
use crate::core::types::StoreSnapshot;
use crate::storage::layout::StorageLayout;

/// Load the whole-file snapshot. A missing or empty file is not an error --
/// both yield an empty snapshot, which is how a store is "created" the
/// first time something is added to it.
pub fn load(storage: &StorageLayout) -> Result<StoreSnapshot> {
    let bytes = match fs::read(&storage.main_path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StoreSnapshot::default()),
        Err(e) => return Err(Error::io_at(&storage.main_path, e)),
    };

    if bytes.is_empty() {
        return Ok(StoreSnapshot::default());
    }

    let snapshot: StoreSnapshot = serde_json::from_slice(&bytes)?;
    Ok(snapshot)
}

/// Encode the snapshot as pretty JSON, write it to a sibling temp file, then
/// rename it over the target. The rename is what makes a concurrent reader
/// (or a crash mid-write) see either the whole pre-state or the whole
/// post-state, never a truncated file.
pub fn save(storage: &StorageLayout, snapshot: &StoreSnapshot) -> Result<()> {
    let temp_path = storage.temp_path();
    let json = serde_json::to_vec_pretty(snapshot)?;

    fs::write(&temp_path, &json).map_err(|e| Error::io_at(&temp_path, e))?;

    if let Err(e) = fs::rename(&temp_path, &storage.main_path) {
        let _ = fs::remove_file(&temp_path);
        tracing::error!(path = %storage.main_path.display(), error = %e, "atomic rename failed, temp file removed");
        return Err(Error::io_at(&storage.main_path, e));
    }

    tracing::debug!(path = %storage.main_path.display(), documents = snapshot.documents.len(), "saved snapshot");
    Ok(())
}
