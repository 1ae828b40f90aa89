//! UseCase 層
//!
//! 操作ごとに 1 つのユースケースを定義します。
//! どのユースケースも `&mut ChatState` を受け取るため、Coordinator のディスパッチループからしか呼べません。

mod disconnect;
mod error;
mod get_rooms;
mod join_room;
mod leave_room;
mod list_rooms;
pub mod notice;
mod register_connection;
mod send_file;
mod send_message;
mod set_identity;

#[cfg(test)]
pub(crate) mod testing;

pub use disconnect::DisconnectUseCase;
pub use error::{
    DisconnectError, JoinRoomError, RegisterError, SendFileError, SendMessageError,
    SetIdentityError, UserNotice,
};
pub use get_rooms::{GetRoomsUseCase, MemberSnapshot, RoomSnapshot};
pub use join_room::{JoinOutcome, JoinRoomUseCase};
pub use leave_room::leave_current_room;
pub use list_rooms::ListRoomsUseCase;
pub use register_connection::RegisterConnectionUseCase;
pub use send_file::SendFileUseCase;
pub use send_message::SendMessageUseCase;
pub use set_identity::SetIdentityUseCase;

use crate::domain::{ConnectionKey, MessagePusher};

/// 要求者 1 人に通知を送る。送れなかった場合はログに残すだけ
pub(crate) async fn notify(message_pusher: &dyn MessagePusher, key: &ConnectionKey, text: &str) {
    if let Err(e) = message_pusher.push_to(key, text).await {
        tracing::warn!("Failed to notify client '{}': {}", key, e);
    }
}
