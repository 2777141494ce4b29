//! Sources of program text that can be mounted into a [`Vfs`](crate::Vfs).

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::VfsError;

/// Serves files under one mount prefix. Paths are relative to the prefix.
pub trait VfsProvider: Send + Sync {
    fn read(&self, path: &str) -> Result<String, VfsError>;

    /// Providers are read-only unless they say otherwise.
    fn write(&self, path: &str, _contents: &str) -> Result<(), VfsError> {
        Err(VfsError::Unsupported {
            operation: "write",
            path: path.to_string(),
        })
    }
}

/// Files held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    files: BTreeMap<String, String>,
}

impl InMemoryProvider {
    pub fn new<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: Into<String>,
        C: Into<String>,
    {
        Self {
            files: files
                .into_iter()
                .map(|(p, c)| (p.into(), c.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl VfsProvider for InMemoryProvider {
    fn read(&self, path: &str) -> Result<String, VfsError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| VfsError::NotFound(path.to_string()))
    }
}

/// Files under a directory on disk. Paths may not leave the directory.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl VfsProvider for DirectoryProvider {
    fn read(&self, path: &str) -> Result<String, VfsError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(VfsError::NotFound(path.to_string()));
        }
        std::fs::read_to_string(self.root.join(relative)).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                VfsError::NotFound(path.to_string())
            } else {
                VfsError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        })
    }
}
