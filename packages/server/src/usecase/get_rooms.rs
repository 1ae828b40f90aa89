//! UseCase: Room 状態のスナップショット取得（HTTP API 用）
//!
//! HTTP ハンドラは状態に直接触れず、Coordinator のキュー経由でこのスナップショットを受け取ります。

use crate::{
    coordinator::ChatState,
    domain::{ConnectionKey, DisplayName, RoomName, Timestamp},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub name: RoomName,
    pub created_at: Timestamp,
    /// 接続キー順
    pub members: Vec<MemberSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSnapshot {
    pub key: ConnectionKey,
    pub identity: DisplayName,
    pub joined_at: Timestamp,
}

#[derive(Debug, Default)]
pub struct GetRoomsUseCase;

impl GetRoomsUseCase {
    pub fn new() -> Self {
        Self
    }

    /// 全ての Room のスナップショット（Room 名順）
    pub fn execute(&self, state: &ChatState) -> Vec<RoomSnapshot> {
        state
            .rooms()
            .map(|room| {
                let mut members: Vec<MemberSnapshot> = room
                    .members()
                    .filter_map(|(key, joined_at)| {
                        state.connection(key).map(|handle| MemberSnapshot {
                            key: *key,
                            identity: handle.identity.clone(),
                            joined_at: *joined_at,
                        })
                    })
                    .collect();
                members.sort_by(|a, b| a.key.cmp(&b.key));

                RoomSnapshot {
                    name: room.name.clone(),
                    created_at: room.created_at,
                    members,
                }
            })
            .collect()
    }
}
