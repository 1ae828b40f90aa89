//! ドメイン層
//!
//! チャットの状態を構成する値オブジェクト・エンティティと、
//! 外部との境界になる trait（`MessagePusher`, `FileStore`）を定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

pub mod entity;
pub mod envelope;
pub mod file_store;
pub mod message_pusher;
pub mod value_object;

pub use entity::{ConnectionHandle, Room};
pub use envelope::{Command, RequestEnvelope};
pub use file_store::{FileStore, FileStoreError};
pub use message_pusher::{
    DEFAULT_OUTBOUND_CAPACITY, MessagePushError, MessagePusher, Outbound, PusherChannel,
};
pub use value_object::{
    ConnectionKey, DEFAULT_DISPLAY_NAME, DisplayName, FileName, RoomName, Timestamp,
    ValueObjectError,
};
