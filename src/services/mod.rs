pub mod storage;

use async_trait::async_trait;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Streams the local file at `local_path` to remote storage as `file_name`.
    async fn upload_file(&self, local_path: &Path, file_name: &str) -> anyhow::Result<()>;
}

pub type ImplStorageService = Box<dyn StorageService>;
