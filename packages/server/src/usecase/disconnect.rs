//! UseCase: 切断（`/quit` または EOF）
//!
//! ## 処理の流れ
//!
//! 1. 参加中の Room から離脱し、残ったメンバーに通知
//! 2. 要求者に別れの挨拶を送信
//! 3. I/O 層に接続のクローズを指示（挨拶の後に処理される）
//! 4. 送信キューと ConnectionHandle を破棄

use std::sync::Arc;

use crate::{
    coordinator::ChatState,
    domain::{ConnectionKey, MessagePusher, RoomName},
};

use super::{error::DisconnectError, leave_current_room, notice, notify};

pub struct DisconnectUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Option<RoomName>)` - 離脱した Room
    /// * `Err(DisconnectError)` - 既に切断済みの接続
    pub async fn execute(
        &self,
        state: &mut ChatState,
        requester: &ConnectionKey,
    ) -> Result<Option<RoomName>, DisconnectError> {
        if state.connection(requester).is_none() {
            return Err(DisconnectError::ConnectionNotFound(requester.to_string()));
        }

        let left = leave_current_room(state, &*self.message_pusher, requester).await;

        notify(&*self.message_pusher, requester, notice::FAREWELL).await;
        self.close_and_forget(state, requester).await;
        tracing::info!("Client '{}' has left the chat", requester);

        Ok(left)
    }

    /// 停止の通知を送ってから接続を閉じる（サーバー停止時）
    ///
    /// 全員が同時に切断されるため、離脱の通知は送りません。
    pub async fn shutdown(&self, state: &mut ChatState, key: &ConnectionKey) {
        state.detach(key);
        notify(&*self.message_pusher, key, notice::SHUTTING_DOWN).await;
        self.close_and_forget(state, key).await;
    }

    async fn close_and_forget(&self, state: &mut ChatState, key: &ConnectionKey) {
        if let Err(e) = self.message_pusher.close(key).await {
            tracing::debug!("Connection '{}' was already gone: {}", key, e);
        }
        self.message_pusher.unregister_client(key).await;
        state.remove_connection(key);
    }
}
