//! UseCase: Room への参加（`/join CHANNEL_NAME`）
//!
//! ## 処理の流れ
//!
//! 1. 別の Room に参加中なら離脱し、残ったメンバーに通知
//! 2. 参加先の Room を取得（なければ作成）してメンバーに追加
//! 3. 参加先の他のメンバーに参加を通知
//! 4. 要求者に歓迎メッセージを送信
//!
//! 全てが 1 回のディスパッチの中で完了するため、離脱と参加の間に他の操作が割り込むことはありません。

use std::sync::Arc;

use crate::{
    coordinator::ChatState,
    domain::{ConnectionKey, MessagePusher, RoomName},
};

use super::{error::JoinRoomError, leave_current_room, notice, notify};

/// 参加の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub room: RoomName,
    /// 離脱した Room
    pub left: Option<RoomName>,
    /// 参加通知を受け取ったメンバー
    pub notified: Vec<ConnectionKey>,
}

pub struct JoinRoomUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    pub async fn execute(
        &self,
        state: &mut ChatState,
        requester: &ConnectionKey,
        args: &[String],
    ) -> Result<JoinOutcome, JoinRoomError> {
        let room_name = args
            .first()
            .cloned()
            .and_then(|name| RoomName::new(name).ok())
            .ok_or(JoinRoomError::MissingRoomName)?;

        let handle = state
            .connection(requester)
            .ok_or_else(|| JoinRoomError::ConnectionNotFound(requester.to_string()))?;
        if handle.current_room.as_ref() == Some(&room_name) {
            return Err(JoinRoomError::AlreadyInRoom(room_name.into_string()));
        }
        let identity = handle.identity.clone();

        let left = leave_current_room(state, &*self.message_pusher, requester).await;

        let room = state
            .attach(requester, &room_name)
            .ok_or_else(|| JoinRoomError::ConnectionNotFound(requester.to_string()))?;
        let notified = room
            .broadcast(requester, &notice::joined(&identity), &*self.message_pusher)
            .await;
        tracing::info!("Client '{}' joined room '{}'", requester, room_name);

        notify(&*self.message_pusher, requester, &notice::welcome(&room_name)).await;

        Ok(JoinOutcome {
            room: room_name,
            left,
            notified,
        })
    }
}
