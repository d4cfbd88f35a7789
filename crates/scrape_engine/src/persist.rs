use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory {} missing or not writable: {source}", dir.display())]
    OutputDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("io error writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PersistError {
    pub fn path(&self) -> &Path {
        match self {
            PersistError::OutputDir { dir, .. } => dir,
            PersistError::Io { path, .. } => path,
        }
    }

    pub fn into_source(self) -> io::Error {
        match self {
            PersistError::OutputDir { source, .. } | PersistError::Io { source, .. } => source,
        }
    }
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let output_dir = |source| PersistError::OutputDir {
        dir: dir.to_path_buf(),
        source,
    };
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(output_dir)?;
        if !meta.is_dir() {
            return Err(output_dir(io::Error::other("path is not a directory")));
        }
    } else {
        fs::create_dir_all(dir).map_err(output_dir)?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(output_dir)?;
    Ok(())
}

/// Writes `{dir}/{filename}` through a temp file and a rename, so readers
/// never observe a half-written artifact.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Writer for the directory containing `path` (the current directory for bare names).
    pub fn for_target(path: &Path) -> Self {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir)
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let io_err = |source| PersistError::Io {
            path: target.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(content).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.as_file_mut().sync_all().map_err(io_err)?;

        // Rename replaces an existing target in one step; callers that must
        // not clobber pick a free name first.
        tmp.persist(&target).map_err(|e| io_err(e.error))?;
        Ok(target)
    }
}
