/// Artifact relocation with `mv` semantics.
/// A missing source is not an error: the goal is that no stale file remains.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::SweepError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relocation {
    Moved { to: PathBuf },
    Absent,
}

/// Destination of `src` inside `holding_dir`, keeping the file name.
pub fn holding_path(src: &Path, holding_dir: &Path) -> PathBuf {
    match src.file_name() {
        Some(name) => holding_dir.join(name),
        None => holding_dir.join(src),
    }
}

/// Whether a failed rename should fall back to copy + unlink, as `mv` does (EXDEV).
#[cfg(unix)]
fn crosses_devices(e: &io::Error) -> bool {
    e.raw_os_error() == Some(18)
}

/// ERROR_NOT_SAME_DEVICE.
#[cfg(not(unix))]
fn crosses_devices(e: &io::Error) -> bool {
    e.raw_os_error() == Some(17)
}

/// Move `src` into `holding_dir`, overwriting any previous copy there.
pub fn relocate(src: &Path, holding_dir: &Path) -> Result<Relocation, SweepError> {
    let dst = holding_path(src, holding_dir);
    let err = |source: io::Error| SweepError::Relocate {
        from: src.to_path_buf(),
        to: dst.clone(),
        source,
    };

    match fs::symlink_metadata(src) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Relocation::Absent),
        Err(e) => return Err(err(e)),
    }

    fs::create_dir_all(holding_dir).map_err(err)?;

    match fs::rename(src, &dst) {
        Ok(()) => {}
        Err(e) if crosses_devices(&e) => {
            fs::copy(src, &dst).map_err(err)?;
            fs::remove_file(src).map_err(err)?;
        }
        Err(e) => return Err(err(e)),
    }

    Ok(Relocation::Moved { to: dst })
}
