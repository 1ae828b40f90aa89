//! 行単位の MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの送信キュー（`PusherChannel`）を管理
//! - クライアントへの 1 行送信（push_to, broadcast）とクローズ指示（close）
//! - 送信キューが満杯のクライアントの切り離し
//!
//! 送信キューの生成は UI 層（`ui::connection`）で行われ、
//! 受信側は接続ごとの writer タスクがソケットへ書き出します。
//! 送信は `try_send` のみで、キューの空きを待つことはありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::error::TrySendError};

use crate::domain::{ConnectionKey, MessagePushError, MessagePusher, Outbound, PusherChannel};

/// 行単位の MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = LineMessagePusher::default();
/// pusher.register_client(key, tx).await;
/// pusher.push_to(&key, "welcome to lobby").await?;
/// ```
#[derive(Default)]
pub struct LineMessagePusher {
    /// 接続中のクライアントの送信キュー
    clients: Arc<Mutex<HashMap<ConnectionKey, PusherChannel>>>,
}

impl LineMessagePusher {
    pub fn new(clients: Arc<Mutex<HashMap<ConnectionKey, PusherChannel>>>) -> Self {
        Self { clients }
    }

    /// 送信キューに 1 件積む
    ///
    /// キューが満杯なら送信キューを破棄する。writer タスクは積まれた分を書き終えると終了し、
    /// 接続は切断として処理される。
    fn send(
        clients: &mut HashMap<ConnectionKey, PusherChannel>,
        key: &ConnectionKey,
        outbound: Outbound,
    ) -> Result<(), MessagePushError> {
        let sender = clients
            .get(key)
            .ok_or_else(|| MessagePushError::ClientNotFound(key.to_string()))?;

        match sender.try_send(outbound) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                clients.remove(key);
                tracing::warn!(
                    "Outbound queue of client '{}' is full, dropping the client",
                    key
                );
                Err(MessagePushError::QueueFull(key.to_string()))
            }
            Err(TrySendError::Closed(_)) => Err(MessagePushError::PushFailed(format!(
                "{}: channel closed",
                key
            ))),
        }
    }
}

#[async_trait]
impl MessagePusher for LineMessagePusher {
    async fn register_client(&self, key: ConnectionKey, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(key, sender);
        tracing::debug!("Client '{}' registered to MessagePusher", key);
    }

    async fn unregister_client(&self, key: &ConnectionKey) {
        let mut clients = self.clients.lock().await;
        clients.remove(key);
        tracing::debug!("Client '{}' unregistered from MessagePusher", key);
    }

    async fn push_to(&self, key: &ConnectionKey, content: &str) -> Result<(), MessagePushError> {
        let mut clients = self.clients.lock().await;
        Self::send(&mut clients, key, Outbound::Line(content.to_string()))?;
        tracing::debug!("Pushed message to client '{}'", key);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionKey>,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let mut clients = self.clients.lock().await;

        for target in targets {
            // ブロードキャストでは一部の送信失敗を許容
            if let Err(e) = Self::send(&mut clients, &target, Outbound::Line(content.to_string()))
            {
                tracing::warn!("Skipped client '{}' during broadcast: {}", target, e);
            }
        }

        Ok(())
    }

    async fn close(&self, key: &ConnectionKey) -> Result<(), MessagePushError> {
        let mut clients = self.clients.lock().await;
        Self::send(&mut clients, key, Outbound::Close)?;
        tracing::debug!("Requested close of client '{}'", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn key(port: u16) -> ConnectionKey {
        ConnectionKey::new(format!("127.0.0.1:{}", port).parse().unwrap())
    }

    fn create_test_pusher() -> (
        LineMessagePusher,
        Arc<Mutex<HashMap<ConnectionKey, PusherChannel>>>,
    ) {
        let clients = Arc::new(Mutex::new(HashMap::new()));
        let pusher = LineMessagePusher::new(clients.clone());
        (pusher, clients)
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定のクライアントに 1 行送信できる
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (tx, mut rx) = mpsc::channel(8);
        pusher.register_client(key(1), tx).await;

        // when (操作):
        let result = pusher.push_to(&key(1), "Hello").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some(Outbound::Line("Hello".to_string())));
    }

    #[tokio::test]
    async fn test_push_to_client_not_found() {
        // テスト項目: 存在しないクライアントへの送信はエラーを返す
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();

        // when (操作):
        let result = pusher.push_to(&key(9), "Hello").await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MessagePushError::ClientNotFound("127.0.0.1:9".to_string()))
        );
    }

    #[tokio::test]
    async fn test_push_to_dropped_receiver() {
        // テスト項目: writer 側が終了済みのクライアントへの送信は PushFailed になる
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (tx, rx) = mpsc::channel(8);
        pusher.register_client(key(1), tx).await;
        drop(rx);

        // when (操作):
        let result = pusher.push_to(&key(1), "Hello").await;

        // then (期待する結果):
        assert!(matches!(result, Err(MessagePushError::PushFailed(_))));
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        // テスト項目: ブロードキャスト時、一部のクライアントが存在しなくても成功する
        // given (前提条件):
        let (pusher, clients) = create_test_pusher();
        let (tx1, mut rx1) = mpsc::channel(8);
        {
            let mut clients_lock = clients.lock().await;
            clients_lock.insert(key(1), tx1);
        }

        // when (操作):
        let result = pusher.broadcast(vec![key(1), key(2)], "Broadcast").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(
            rx1.recv().await,
            Some(Outbound::Line("Broadcast".to_string()))
        );
    }

    #[tokio::test]
    async fn test_close_is_queued_after_pending_lines() {
        // テスト項目: close 指示は先に積まれた行の後に届く
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (tx, mut rx) = mpsc::channel(8);
        pusher.register_client(key(1), tx).await;

        // when (操作):
        pusher.push_to(&key(1), "bye").await.unwrap();
        pusher.close(&key(1)).await.unwrap();

        // then (期待する結果):
        assert_eq!(rx.recv().await, Some(Outbound::Line("bye".to_string())));
        assert_eq!(rx.recv().await, Some(Outbound::Close));
    }

    #[tokio::test]
    async fn test_unregister_client() {
        // テスト項目: 登録解除後は送信できず、送信キューも解放される
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (tx, mut rx) = mpsc::channel(8);
        pusher.register_client(key(1), tx).await;

        // when (操作):
        pusher.unregister_client(&key(1)).await;
        let result = pusher.push_to(&key(1), "late").await;

        // then (期待する結果):
        assert!(matches!(result, Err(MessagePushError::ClientNotFound(_))));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_full_queue_drops_client() {
        // テスト項目: 読み取られない送信キューが満杯になると、それ以上積まれずクライアントが切り離される
        // given (前提条件):
        let (pusher, clients) = create_test_pusher();
        let (tx, mut rx) = mpsc::channel(2);
        pusher.register_client(key(1), tx).await;

        // when (操作):
        let results = vec![
            pusher.push_to(&key(1), "one").await,
            pusher.push_to(&key(1), "two").await,
            pusher.push_to(&key(1), "three").await,
            pusher.push_to(&key(1), "four").await,
        ];

        // then (期待する結果):
        assert_eq!(
            results,
            vec![
                Ok(()),
                Ok(()),
                Err(MessagePushError::QueueFull("127.0.0.1:1".to_string())),
                Err(MessagePushError::ClientNotFound("127.0.0.1:1".to_string())),
            ]
        );
        assert!(!clients.lock().await.contains_key(&key(1)));
        assert_eq!(rx.recv().await, Some(Outbound::Line("one".to_string())));
        assert_eq!(rx.recv().await, Some(Outbound::Line("two".to_string())));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_broadcast_skips_full_client() {
        // テスト項目: ブロードキャストで満杯のクライアントは切り離され、他のクライアントには届き続ける
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (slow_tx, mut slow_rx) = mpsc::channel(1);
        let (fast_tx, mut fast_rx) = mpsc::channel(8);
        pusher.register_client(key(1), slow_tx).await;
        pusher.register_client(key(2), fast_tx).await;

        // when (操作):
        for line in ["a", "b", "c"] {
            let result = pusher.broadcast(vec![key(1), key(2)], line).await;
            assert!(result.is_ok());
            // 速いクライアントだけが読み進める
            assert_eq!(fast_rx.recv().await, Some(Outbound::Line(line.to_string())));
        }

        // then (期待する結果):
        assert_eq!(slow_rx.recv().await, Some(Outbound::Line("a".to_string())));
        assert_eq!(slow_rx.recv().await, None);
    }
}
