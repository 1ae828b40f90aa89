//! MessagePusher trait 定義
//!
//! クライアントへの行の配送（deliver）と接続のクローズを抽象化します。
//! Coordinator はこの trait だけに依存し、ソケットを直接触りません。

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::ConnectionKey;

/// 接続の writer タスクへ渡す指示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// 1 行を送信する（改行は writer 側で付与）
    Line(String),
    /// キューに積まれた行を送り切った後に接続を閉じる
    Close,
}

/// 接続ごとの送信キューの容量のデフォルト値
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 256;

/// 接続ごとの送信キュー
///
/// 容量付きのキューで、送信側（Coordinator）は空きを待たずに `try_send` で積みます。
/// 満杯になったクライアントは読み取りが止まっているものとして切り離されます。
pub type PusherChannel = mpsc::Sender<Outbound>;

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    #[error("outbound queue of client '{0}' is full")]
    QueueFull(String),
}

/// クライアントへメッセージを届けるためのインターフェース
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信キューを登録
    async fn register_client(&self, key: ConnectionKey, sender: PusherChannel);

    /// 接続の送信キューを登録解除
    async fn unregister_client(&self, key: &ConnectionKey);

    /// 特定のクライアントに 1 行送信
    async fn push_to(&self, key: &ConnectionKey, content: &str) -> Result<(), MessagePushError>;

    /// 複数のクライアントに同じ行を送信
    ///
    /// 一部のクライアントへの送信失敗は許容します。
    async fn broadcast(
        &self,
        targets: Vec<ConnectionKey>,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 送信済みの行を送り切った後に接続を閉じるよう I/O 層に指示
    async fn close(&self, key: &ConnectionKey) -> Result<(), MessagePushError>;
}
