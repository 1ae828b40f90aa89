//! ユースケースのテスト用ヘルパー

use std::{collections::HashMap, sync::Arc};

use irori_shared::time::FixedClock;
use tokio::sync::mpsc;

use crate::{
    coordinator::ChatState,
    domain::{
        ConnectionHandle, ConnectionKey, DEFAULT_OUTBOUND_CAPACITY, MessagePusher, Outbound,
        Timestamp,
    },
    infrastructure::message_pusher::LineMessagePusher,
};

pub(crate) const TEST_NOW: i64 = 1_000;

pub(crate) fn key(port: u16) -> ConnectionKey {
    ConnectionKey::new(format!("127.0.0.1:{}", port).parse().unwrap())
}

pub(crate) fn args(words: &[&str]) -> Vec<String> {
    words.iter().map(|word| word.to_string()).collect()
}

/// ChatState と、接続ごとの送信キューの受信側をまとめたもの
pub(crate) struct Harness {
    pub state: ChatState,
    pub pusher: Arc<LineMessagePusher>,
    receivers: HashMap<ConnectionKey, mpsc::Receiver<Outbound>>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            state: ChatState::new(Arc::new(FixedClock::new(TEST_NOW))),
            pusher: Arc::new(LineMessagePusher::default()),
            receivers: HashMap::new(),
        }
    }

    pub fn message_pusher(&self) -> Arc<dyn MessagePusher> {
        self.pusher.clone()
    }

    pub async fn connect(&mut self, port: u16) -> ConnectionKey {
        let key = key(port);
        let (tx, rx) = mpsc::channel(DEFAULT_OUTBOUND_CAPACITY);
        self.pusher.register_client(key, tx).await;
        self.state
            .insert_connection(ConnectionHandle::new(key, Timestamp::new(TEST_NOW)));
        self.receivers.insert(key, rx);
        key
    }

    /// これまでに届いた指示を全て取り出す
    pub fn outbound(&mut self, key: &ConnectionKey) -> Vec<Outbound> {
        let mut received = Vec::new();
        if let Some(rx) = self.receivers.get_mut(key) {
            while let Ok(outbound) = rx.try_recv() {
                received.push(outbound);
            }
        }
        received
    }

    /// これまでに届いた行を全て取り出す
    pub fn lines(&mut self, key: &ConnectionKey) -> Vec<String> {
        self.outbound(key)
            .into_iter()
            .filter_map(|outbound| match outbound {
                Outbound::Line(line) => Some(line),
                Outbound::Close => None,
            })
            .collect()
    }
}
