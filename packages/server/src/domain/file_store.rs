//! FileStore trait 定義
//!
//! `/send_file` のファイル書き込みを抽象化します。
//! インメモリの状態モデルから外に出る唯一の副作用なので、失敗し得る I/O として扱います。

use async_trait::async_trait;
use thiserror::Error;

use super::FileName;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("failed to write '{name}': {source}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// ファイルの保存先
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStore: Send + Sync {
    /// `name` に `content` を書き込む（既存のファイルは上書き）
    async fn write(&self, name: &FileName, content: &str) -> Result<(), FileStoreError>;
}
