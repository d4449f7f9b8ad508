use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;

/// Filesystem operations the image upload flow depends on.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Directory new images are written into.
    fn root(&self) -> &Path;

    async fn ensure_dir(&self) -> io::Result<()>;

    async fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    async fn remove(&self, path: &Path) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        tokio::fs::write(path, bytes).await
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}
