//! UseCase: Room 一覧（`/channels`）

use std::sync::Arc;

use crate::{
    coordinator::ChatState,
    domain::{ConnectionKey, MessagePusher, RoomName},
};

use super::{notice, notify};

pub struct ListRoomsUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl ListRoomsUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 全ての Room 名を 1 行にまとめて要求者に送る（空の Room も含む）
    pub async fn execute(&self, state: &ChatState, requester: &ConnectionKey) -> Vec<RoomName> {
        let rooms = state.room_names();
        notify(&*self.message_pusher, requester, &notice::channel_list(&rooms)).await;
        rooms
    }
}
