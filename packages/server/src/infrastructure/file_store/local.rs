//! ローカルディスクを使った FileStore 実装
//!
//! 書き込み先は構築時に渡されたディレクトリ直下に限られます。
//! ファイル名の検証は `FileName` 値オブジェクトで済んでいる前提です。

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{FileName, FileStore, FileStoreError};

pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &FileName) -> PathBuf {
        self.root.join(name.as_str())
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn write(&self, name: &FileName, content: &str) -> Result<(), FileStoreError> {
        let path = self.path_of(name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| FileStoreError::Write {
                name: name.as_str().to_string(),
                source,
            })?;
        tracing::info!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }
}
