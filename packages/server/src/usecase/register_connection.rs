//! UseCase: 接続の登録
//!
//! 接続の受け付け時に ConnectionHandle を作成し、送信キューを MessagePusher に登録します。

use std::sync::Arc;

use crate::{
    coordinator::ChatState,
    domain::{ConnectionHandle, ConnectionKey, MessagePusher, PusherChannel},
};

use super::error::RegisterError;

pub struct RegisterConnectionUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl RegisterConnectionUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 接続を登録
    ///
    /// 同じキーが登録済みの場合は既存の接続を優先し、エラーを返します。
    pub async fn execute(
        &self,
        state: &mut ChatState,
        key: ConnectionKey,
        sender: PusherChannel,
    ) -> Result<(), RegisterError> {
        let handle = ConnectionHandle::new(key, state.now());
        if !state.insert_connection(handle) {
            return Err(RegisterError::DuplicateConnection(key.to_string()));
        }
        self.message_pusher.register_client(key, sender).await;
        tracing::info!("Client '{}' registered", key);
        Ok(())
    }
}
