//! Coordinator が単独で所有するチャットの状態
//!
//! Room テーブルと接続テーブルをまとめて保持します。
//! この構造体は Coordinator タスクの外に出ないため、ロックは持ちません。
//!
//! ## 不変条件
//!
//! - 接続の `current_room` が `Some(name)` なら、`name` の Room が存在し、そのメンバーに接続キーが含まれる
//! - Room のメンバーの接続キーは、`current_room` がその Room を指す接続のものに限られる

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use irori_shared::time::Clock;

use crate::domain::{ConnectionHandle, ConnectionKey, DisplayName, Room, RoomName, Timestamp};

pub struct ChatState {
    /// Room テーブル（名前順で列挙できるよう BTreeMap）
    rooms: BTreeMap<RoomName, Room>,
    connections: HashMap<ConnectionKey, ConnectionHandle>,
    clock: Arc<dyn Clock>,
}

impl ChatState {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: BTreeMap::new(),
            connections: HashMap::new(),
            clock,
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    pub fn connection(&self, key: &ConnectionKey) -> Option<&ConnectionHandle> {
        self.connections.get(key)
    }

    pub fn connection_mut(&mut self, key: &ConnectionKey) -> Option<&mut ConnectionHandle> {
        self.connections.get_mut(key)
    }

    /// 接続を登録。同じキーが既に存在する場合は何もせず `false`
    pub fn insert_connection(&mut self, handle: ConnectionHandle) -> bool {
        if self.connections.contains_key(&handle.key) {
            return false;
        }
        self.connections.insert(handle.key, handle);
        true
    }

    /// 接続を削除
    ///
    /// Room からの離脱は呼び出し側で `detach` 済みである必要があります。
    pub fn remove_connection(&mut self, key: &ConnectionKey) -> Option<ConnectionHandle> {
        self.connections.remove(key)
    }

    pub fn connection_keys(&self) -> Vec<ConnectionKey> {
        self.connections.keys().copied().collect()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn room(&self, name: &RoomName) -> Option<&Room> {
        self.rooms.get(name)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// 全ての Room 名（名前順）
    pub fn room_names(&self) -> Vec<RoomName> {
        self.rooms.keys().cloned().collect()
    }

    /// 接続を現在の Room から外し、(Room 名, 表示名) を返す
    ///
    /// 空になった Room もテーブルに残します。
    pub fn detach(&mut self, key: &ConnectionKey) -> Option<(RoomName, DisplayName)> {
        let handle = self.connections.get_mut(key)?;
        let room_name = handle.current_room.take()?;
        let identity = handle.identity.clone();
        if let Some(room) = self.rooms.get_mut(&room_name) {
            room.remove_member(key);
        }
        Some((room_name, identity))
    }

    /// 接続を `room_name` の Room に参加させる（Room がなければ作成）
    ///
    /// 別の Room に参加中ならそこからは黙って外します（通知が必要なら先に `detach` する）。
    /// 接続が存在しない場合は `None`。
    pub fn attach(&mut self, key: &ConnectionKey, room_name: &RoomName) -> Option<&Room> {
        let now = self.now();
        let handle = self.connections.get_mut(key)?;
        let previous = handle.current_room.replace(room_name.clone());
        if let Some(previous) = previous.filter(|previous| previous != room_name)
            && let Some(room) = self.rooms.get_mut(&previous)
        {
            room.remove_member(key);
        }

        let room = self.rooms.entry(room_name.clone()).or_insert_with(|| {
            tracing::info!("Room '{}' created", room_name);
            Room::new(room_name.clone(), now)
        });
        room.add_member(*key, now);
        Some(room)
    }

    /// メンバーシップの不変条件が成り立っているか
    #[cfg(test)]
    pub fn membership_is_consistent(&self) -> bool {
        let handles_ok = self.connections.values().all(|handle| match &handle.current_room {
            Some(name) => self
                .rooms
                .get(name)
                .is_some_and(|room| room.contains(&handle.key)),
            None => true,
        });
        let members_ok = self.rooms.values().all(|room| {
            room.members().all(|(key, _)| {
                self.connections
                    .get(key)
                    .is_some_and(|handle| handle.current_room.as_ref() == Some(&room.name))
            })
        });
        handles_ok && members_ok
    }
}
