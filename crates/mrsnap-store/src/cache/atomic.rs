//! Atomic write primitives
//!
//! Uses temp→rename pattern to ensure no partial writes

use crate::errors::{io_error, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Atomically replace `target_path` with `content`
///
/// The temp file lives next to the target so the rename stays on one
/// filesystem, and it is synced before the rename.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| io_error("create_cache_dir", parent, e))?;
        }
    }

    let temp_path = target_path.with_extension("tmp");

    let mut file = File::create(&temp_path).map_err(|e| io_error("create_cache_temp", &temp_path, e))?;
    file.write_all(content)
        .map_err(|e| io_error("write_cache_temp", &temp_path, e))?;
    file.sync_all()
        .map_err(|e| io_error("sync_cache_temp", &temp_path, e))?;
    drop(file);

    fs::rename(&temp_path, target_path).map_err(|e| io_error("rename_cache_temp", target_path, e))?;

    Ok(())
}
