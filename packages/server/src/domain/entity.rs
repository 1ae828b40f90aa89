//! エンティティ: 接続（ConnectionHandle）と Room

use std::collections::HashMap;

use super::{ConnectionKey, DisplayName, MessagePusher, RoomName, Timestamp};

/// 接続ごとの状態
///
/// フィールドを書き換えるのは Coordinator だけです。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionHandle {
    pub key: ConnectionKey,
    pub identity: DisplayName,
    /// 参加中の Room（高々 1 つ）
    pub current_room: Option<RoomName>,
    pub connected_at: Timestamp,
}

impl ConnectionHandle {
    pub fn new(key: ConnectionKey, connected_at: Timestamp) -> Self {
        Self {
            key,
            identity: DisplayName::default(),
            current_room: None,
            connected_at,
        }
    }
}

/// 名前付きのチャット Room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub name: RoomName,
    pub created_at: Timestamp,
    /// メンバーの接続キー → 参加時刻
    members: HashMap<ConnectionKey, Timestamp>,
}

impl Room {
    pub fn new(name: RoomName, created_at: Timestamp) -> Self {
        Self {
            name,
            created_at,
            members: HashMap::new(),
        }
    }

    /// メンバーを追加。新規に追加された場合 `true`
    pub fn add_member(&mut self, key: ConnectionKey, joined_at: Timestamp) -> bool {
        if self.members.contains_key(&key) {
            return false;
        }
        self.members.insert(key, joined_at);
        true
    }

    /// メンバーを削除。存在していた場合 `true`
    pub fn remove_member(&mut self, key: &ConnectionKey) -> bool {
        self.members.remove(key).is_some()
    }

    pub fn contains(&self, key: &ConnectionKey) -> bool {
        self.members.contains_key(key)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = (&ConnectionKey, &Timestamp)> {
        self.members.iter()
    }

    /// ブロードキャスト対象（送信者以外の全メンバー）
    pub fn broadcast_targets(&self, sender: &ConnectionKey) -> Vec<ConnectionKey> {
        self.members
            .keys()
            .filter(|key| *key != sender)
            .copied()
            .collect()
    }

    /// 送信者以外の全メンバーに `text` を配送し、配送対象を返す
    ///
    /// 配送は各接続の送信キューへの受け渡しで完了するため、遅いクライアントに引きずられません。
    pub async fn broadcast(
        &self,
        sender: &ConnectionKey,
        text: &str,
        message_pusher: &dyn MessagePusher,
    ) -> Vec<ConnectionKey> {
        let targets = self.broadcast_targets(sender);
        if targets.is_empty() {
            return targets;
        }

        if let Err(e) = message_pusher.broadcast(targets.clone(), text).await {
            tracing::warn!("Failed to broadcast to room '{}': {}", self.name, e);
        }
        targets
    }
}
