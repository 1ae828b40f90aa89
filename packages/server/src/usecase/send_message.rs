//! UseCase: メッセージ送信（`/msg MESSAGE...`）
//!
//! 単語を半角スペース 1 つで連結し、`表示名: メッセージ` の形で
//! 要求者が参加中の Room の他のメンバーへブロードキャストします。

use std::sync::Arc;

use crate::{
    coordinator::ChatState,
    domain::{ConnectionKey, MessagePusher},
};

use super::{error::SendMessageError, notice};

pub struct SendMessageUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionKey>)` - ブロードキャスト対象
    /// * `Err(SendMessageError)` - 空のメッセージ、または Room に未参加
    pub async fn execute(
        &self,
        state: &ChatState,
        requester: &ConnectionKey,
        words: &[String],
    ) -> Result<Vec<ConnectionKey>, SendMessageError> {
        if words.is_empty() {
            return Err(SendMessageError::EmptyMessage);
        }

        let handle = state
            .connection(requester)
            .ok_or_else(|| SendMessageError::ConnectionNotFound(requester.to_string()))?;
        let room = handle
            .current_room
            .as_ref()
            .and_then(|name| state.room(name))
            .ok_or(SendMessageError::NotInChannel)?;

        let text = notice::chat(&handle.identity, &words.join(" "));
        let targets = room
            .broadcast(requester, &text, &*self.message_pusher)
            .await;
        tracing::debug!(
            "Client '{}' sent a message to room '{}' ({} recipients)",
            requester,
            room.name,
            targets.len()
        );
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DisplayName, RoomName},
        usecase::{
            UserNotice,
            testing::{Harness, args},
        },
    };

    async fn create_lobby(harness: &mut Harness, members: &[(u16, &str)]) -> Vec<ConnectionKey> {
        let lobby = RoomName::new("lobby".to_string()).unwrap();
        let mut keys = Vec::new();
        for (port, name) in members {
            let key = harness.connect(*port).await;
            harness.state.connection_mut(&key).unwrap().identity =
                DisplayName::new(name.to_string()).unwrap();
            harness.state.attach(&key, &lobby);
            keys.push(key);
        }
        keys
    }

    #[tokio::test]
    async fn test_send_message_success() {
        // テスト項目: メッセージが送信者以外のメンバーに届き、送信者には返ってこない
        // given (前提条件):
        let mut harness = Harness::new();
        let keys = create_lobby(&mut harness, &[(1, "Alice"), (2, "Bob"), (3, "Carol")]).await;
        let usecase = SendMessageUseCase::new(harness.message_pusher());

        // when (操作):
        let targets = usecase
            .execute(&harness.state, &keys[0], &args(&["hello", "there"]))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(targets.len(), 2);
        assert!(harness.lines(&keys[0]).is_empty());
        assert_eq!(harness.lines(&keys[1]), vec!["Alice: hello there".to_string()]);
        assert_eq!(harness.lines(&keys[2]), vec!["Alice: hello there".to_string()]);
    }

    #[tokio::test]
    async fn test_send_empty_message() {
        // テスト項目: 空のメッセージは通知 1 件だけでブロードキャストされない
        // given (前提条件):
        let mut harness = Harness::new();
        let keys = create_lobby(&mut harness, &[(1, "Alice"), (2, "Bob")]).await;
        let usecase = SendMessageUseCase::new(harness.message_pusher());

        // when (操作):
        let result = usecase.execute(&harness.state, &keys[0], &[]).await;

        // then (期待する結果):
        assert_eq!(result, Err(SendMessageError::EmptyMessage));
        assert_eq!(
            result.unwrap_err().notice(),
            Some(notice::MSG_USAGE.to_string())
        );
        assert!(harness.lines(&keys[1]).is_empty());
    }

    #[tokio::test]
    async fn test_send_message_outside_room() {
        // テスト項目: Room に参加していない場合はエラーになりクラッシュしない
        // given (前提条件):
        let mut harness = Harness::new();
        let alice = harness.connect(1).await;
        let usecase = SendMessageUseCase::new(harness.message_pusher());

        // when (操作):
        let result = usecase
            .execute(&harness.state, &alice, &args(&["hello"]))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(SendMessageError::NotInChannel));
        assert_eq!(
            result.unwrap_err().notice(),
            Some(notice::NOT_IN_CHANNEL.to_string())
        );
    }
}
