//! Scratch files for a single pipeline run
//!
//! A [`ScratchFile`] owns one local path and removes it when cleaned up or dropped,
//! whichever happens first. Cleanup is idempotent.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tubely_core::constants::SCRATCH_FILE_PREFIX;

#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    file: Option<File>,
    removed: bool,
}

impl ScratchFile {
    /// Create a new, empty, uniquely named file in `dir` and keep it open for writing.
    pub async fn create_in(dir: &Path) -> io::Result<Self> {
        let dir = dir.to_path_buf();
        let (file, path) = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(SCRATCH_FILE_PREFIX)
                .tempfile_in(&dir)?
                .keep()
                .map_err(|e| e.error)
        })
        .await
        .map_err(io::Error::other)??;

        Ok(Self {
            path,
            file: Some(File::from_std(file)),
            removed: false,
        })
    }

    /// Take ownership of a path some other process will write, so it is
    /// removed even if that process fails halfway.
    pub fn adopt(path: PathBuf) -> Self {
        Self {
            path,
            file: None,
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open handle, opening the file for reading first if none is held.
    pub async fn file_mut(&mut self) -> io::Result<&mut File> {
        if self.removed {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "scratch file already removed",
            ));
        }
        if self.file.is_none() {
            self.file = Some(File::open(&self.path).await?);
        }
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("scratch file handle unavailable"))
    }

    /// Hand the open handle to the caller. The path stays owned by this guard.
    pub async fn take_file(&mut self) -> io::Result<File> {
        self.file_mut().await?;
        self.file
            .take()
            .ok_or_else(|| io::Error::other("scratch file handle unavailable"))
    }

    /// Close the handle and remove the file. Already-removed files are not an error.
    pub async fn cleanup(&mut self) -> io::Result<()> {
        self.file = None;
        if self.removed {
            return Ok(());
        }
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        self.removed = true;
        Ok(())
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        self.file = None;
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "Failed to remove scratch file"
                );
            }
        }
    }
}
