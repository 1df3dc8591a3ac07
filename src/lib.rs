pub mod attachment;
pub mod audit;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod header;
pub mod library;
pub mod matcher;
pub mod note;
pub mod sync;
pub mod vault;


use std::fs;
use std::path::Path;

pub use error::{Error, Result};

/// Atomic file write: write to a temp file in the same directory, then rename.
/// A note or PDF is therefore either fully replaced or left as it was; a sync
/// client watching the vault never sees a truncated file.
pub(crate) fn atomic_write_file(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    let temp_path = path.with_file_name(format!("{}.refsync-tmp", file_name));

    let mut file = fs::File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;
    file.write_all(content).map_err(|e| Error::io(&temp_path, e))?;
    file.sync_all().map_err(|e| Error::io(&temp_path, e))?;
    drop(file);

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(path, e));
    }

    Ok(())
}
