//! Server configuration.

use std::path::PathBuf;

use crate::{coordinator::DEFAULT_QUEUE_CAPACITY, domain::DEFAULT_OUTBOUND_CAPACITY};

/// 1 行の最大バイト数のデフォルト
pub const DEFAULT_MAX_LINE_BYTES: usize = 8 * 1024;

/// `ui::Server` の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// 待ち受けるホスト
    pub host: String,
    /// チャット用 TCP ポート（0 で空いているポートを使う）
    pub port: u16,
    /// HTTP API のポート（`None` なら起動しない）
    pub http_port: Option<u16>,
    /// `/send_file` の書き込み先ディレクトリ
    pub files_dir: PathBuf,
    /// Coordinator のキューの容量
    pub queue_capacity: usize,
    /// クライアントごとの送信キューの容量。溢れたクライアントは切断される
    pub outbound_capacity: usize,
    /// 受信する 1 行の最大バイト数。超えたクライアントは切断される
    pub max_line_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8888,
            http_port: None,
            files_dir: PathBuf::from("."),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn chat_bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn http_bind_addr(&self) -> Option<String> {
        self.http_port
            .map(|port| format!("{}:{}", self.host, port))
    }
}
