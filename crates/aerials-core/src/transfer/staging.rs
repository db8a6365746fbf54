//! Staging file lifecycle: open for append or truncate, sequential writes,
//! fsync, and atomic rename onto the final path.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::url_model::{asset_file_name, STAGING_SUFFIX};

/// Final and staging paths for one asset. Both live in the same directory so
/// the final rename stays on one filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    pub final_path: PathBuf,
    pub staging_path: PathBuf,
}

impl AssetPaths {
    pub fn new(dest_dir: &Path, id: &str) -> Self {
        let final_path = dest_dir.join(asset_file_name(id));
        let mut staging = final_path.clone().into_os_string();
        staging.push(STAGING_SUFFIX);
        Self {
            final_path,
            staging_path: PathBuf::from(staging),
        }
    }

    /// What is on disk for this asset right now (no network).
    pub fn local_state(&self) -> io::Result<LocalState> {
        if let Some(size) = file_len(&self.final_path)? {
            return Ok(LocalState::Complete { size });
        }
        if let Some(size) = file_len(&self.staging_path)? {
            return Ok(LocalState::Partial { size });
        }
        Ok(LocalState::Missing)
    }
}

/// Local view of an asset, used by status listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalState {
    /// Final file present (size not checked against the remote).
    Complete { size: u64 },
    /// Only a staging file is present.
    Partial { size: u64 },
    Missing,
}

fn file_len(path: &Path) -> io::Result<Option<u64>> {
    match fs::metadata(path) {
        Ok(m) => Ok(Some(m.len())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Size of the staging file, 0 if it does not exist.
pub fn staging_len(staging_path: &Path) -> io::Result<u64> {
    Ok(file_len(staging_path)?.unwrap_or(0))
}

/// Atomically rename the staging file onto the final path.
pub fn publish(staging_path: &Path, final_path: &Path) -> io::Result<()> {
    fs::rename(staging_path, final_path)
}

/// Sequential writer for a staging file. Every chunk goes straight to the
/// file, so bytes written before a failure survive for the next attempt.
pub struct StagingWriter {
    file: File,
    staging_path: PathBuf,
    written: u64,
}

impl StagingWriter {
    /// Open for append when `offset > 0` (resume), truncate-create otherwise.
    pub fn open(staging_path: &Path, offset: u64) -> io::Result<Self> {
        let mut opts = OpenOptions::new();
        if offset > 0 {
            opts.append(true);
        } else {
            opts.write(true).create(true).truncate(true);
        }
        let file = opts.open(staging_path)?;
        Ok(Self {
            file,
            staging_path: staging_path.to_path_buf(),
            written: 0,
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes written through this writer (not counting the resumed prefix).
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Sync file data to disk. Call before `finalize` for durability.
    pub fn sync(&self) -> io::Result<()> {
        self.file.sync_all()
    }

    /// Atomically rename the staging file to the final path. Consumes the writer and closes the file.
    pub fn finalize(self, final_path: &Path) -> io::Result<()> {
        let staging_path = self.staging_path;
        drop(self.file);
        publish(&staging_path, final_path)
    }
}
