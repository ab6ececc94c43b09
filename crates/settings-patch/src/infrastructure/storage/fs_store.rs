//! Disk-backed [`FileStore`] rooted at the project directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::application::orchestrator::FileStore;

/// Resolves every path against `root` and performs whole-file I/O.
///
/// Absolute paths are used as given.  Writes create missing parent
/// directories.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl FileStore for FsStore {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(self.resolve(path))
    }

    fn write(&mut self, path: &Path, content: &str) -> io::Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        debug!(path = %full.display(), bytes = content.len(), "writing");
        fs::write(&full, content)
    }

    fn remove(&mut self, path: &Path) -> io::Result<()> {
        fs::remove_file(self.resolve(path))
    }
}
