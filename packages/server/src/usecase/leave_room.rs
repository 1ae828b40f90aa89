//! 現在の Room からの離脱
//!
//! `/join` による移動と切断の両方から使われます。

use crate::{
    coordinator::ChatState,
    domain::{ConnectionKey, MessagePusher, RoomName},
};

use super::notice;

/// `key` を現在の Room から外し、残ったメンバーに離脱を通知する
///
/// どの Room にも参加していなければ何もせず `None` を返します。
pub async fn leave_current_room(
    state: &mut ChatState,
    message_pusher: &dyn MessagePusher,
    key: &ConnectionKey,
) -> Option<RoomName> {
    let (room_name, identity) = state.detach(key)?;
    if let Some(room) = state.room(&room_name) {
        room.broadcast(key, &notice::left(&identity), message_pusher)
            .await;
    }
    tracing::info!("Client '{}' left room '{}'", key, room_name);
    Some(room_name)
}
