//! Coordinator: チャット状態の唯一の所有者
//!
//! ## 設計
//!
//! - Room テーブルと接続テーブル（`ChatState`）はこのタスクだけが所有し、ロックは使わない
//! - 接続ごとの読み取りタスクは `CoordinatorHandle` を通じてリクエストをキューに積むだけ
//! - キューは容量付き（満杯なら投入側が待たされる）で、投入された順に 1 件ずつ処理する
//! - 1 件の処理が失敗しても次のリクエストの処理は続ける
//!
//! ## 停止
//!
//! `shutdown` を受け取るとキューを閉じ、それ以降の投入は `SubmitError::Closed` になります。
//! すでにキューに積まれていたリクエストは処理してから（drain）、残った全接続に通知して閉じます。

mod state;

pub use state::ChatState;

use std::sync::Arc;

use irori_shared::time::Clock;
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    domain::{Command, ConnectionKey, FileStore, MessagePusher, PusherChannel, RequestEnvelope},
    usecase::{
        DisconnectUseCase, GetRoomsUseCase, JoinRoomUseCase, ListRoomsUseCase,
        RegisterConnectionUseCase, RegisterError, RoomSnapshot, SendFileUseCase,
        SendMessageUseCase, SetIdentityUseCase, UserNotice, notify,
    },
};

/// キューの容量のデフォルト値
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Coordinator のキューに積まれるメッセージ
#[derive(Debug)]
pub enum CoordinatorMessage {
    /// 新しい接続の登録（結果は `reply` で返す）
    Register {
        key: ConnectionKey,
        sender: PusherChannel,
        reply: oneshot::Sender<Result<(), RegisterError>>,
    },
    /// クライアントからのリクエスト
    Request(RequestEnvelope),
    /// 全 Room のスナップショットの問い合わせ
    Rooms {
        reply: oneshot::Sender<Vec<RoomSnapshot>>,
    },
    /// キューを閉じて停止する
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("coordinator is no longer accepting requests")]
    Closed,
}

/// 接続の登録の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Rejected(#[from] RegisterError),
}

/// Coordinator のキューへの投入口
///
/// 複製して接続ごとのタスクに配ります。
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::Sender<CoordinatorMessage>,
}

impl CoordinatorHandle {
    async fn send(&self, message: CoordinatorMessage) -> Result<(), SubmitError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SubmitError::Closed)
    }

    /// 接続を登録し、Coordinator が受け入れたかどうかを待つ
    ///
    /// 拒否された場合、接続側はリクエストを投入せずに接続を閉じる必要があります。
    pub async fn register(
        &self,
        key: ConnectionKey,
        sender: PusherChannel,
    ) -> Result<(), RegistrationError> {
        let (reply, response) = oneshot::channel();
        self.send(CoordinatorMessage::Register { key, sender, reply }).await?;
        response.await.map_err(|_| SubmitError::Closed)??;
        Ok(())
    }

    /// リクエストを 1 件投入する
    ///
    /// キューが満杯の間は待たされます。
    pub async fn submit(&self, envelope: RequestEnvelope) -> Result<(), SubmitError> {
        self.send(CoordinatorMessage::Request(envelope)).await
    }

    /// 全 Room のスナップショットを取得する
    ///
    /// それ以前に投入されたリクエストが全て処理された後の状態が返ります。
    pub async fn rooms(&self) -> Result<Vec<RoomSnapshot>, SubmitError> {
        let (reply, response) = oneshot::channel();
        self.send(CoordinatorMessage::Rooms { reply }).await?;
        response.await.map_err(|_| SubmitError::Closed)
    }

    /// 停止を要求する
    pub async fn shutdown(&self) -> Result<(), SubmitError> {
        self.send(CoordinatorMessage::Shutdown).await
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

pub struct Coordinator {
    state: ChatState,
    receiver: mpsc::Receiver<CoordinatorMessage>,
    message_pusher: Arc<dyn MessagePusher>,
    register_connection: RegisterConnectionUseCase,
    set_identity: SetIdentityUseCase,
    join_room: JoinRoomUseCase,
    list_rooms: ListRoomsUseCase,
    send_message: SendMessageUseCase,
    disconnect: DisconnectUseCase,
    send_file: SendFileUseCase,
    get_rooms: GetRoomsUseCase,
}

impl Coordinator {
    /// Coordinator とその投入口を作成
    ///
    /// # Arguments
    ///
    /// * `queue_capacity` - キューの容量（0 は 1 として扱う）
    /// * `message_pusher` - クライアントへの配送
    /// * `file_store` - `/send_file` の保存先
    /// * `clock` - 接続・Room の時刻
    pub fn new(
        queue_capacity: usize,
        message_pusher: Arc<dyn MessagePusher>,
        file_store: Arc<dyn FileStore>,
        clock: Arc<dyn Clock>,
    ) -> (Self, CoordinatorHandle) {
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        let coordinator = Self {
            state: ChatState::new(clock),
            receiver,
            register_connection: RegisterConnectionUseCase::new(message_pusher.clone()),
            set_identity: SetIdentityUseCase::new(message_pusher.clone()),
            join_room: JoinRoomUseCase::new(message_pusher.clone()),
            list_rooms: ListRoomsUseCase::new(message_pusher.clone()),
            send_message: SendMessageUseCase::new(message_pusher.clone()),
            disconnect: DisconnectUseCase::new(message_pusher.clone()),
            send_file: SendFileUseCase::new(message_pusher.clone(), file_store),
            get_rooms: GetRoomsUseCase::new(),
            message_pusher,
        };
        (coordinator, CoordinatorHandle { sender })
    }

    /// ディスパッチループを tokio タスクとして起動
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// キューが閉じられ空になるか、全ての投入口が破棄されるまでリクエストを処理する
    pub async fn run(mut self) {
        tracing::info!("Coordinator started");
        while let Some(message) = self.receiver.recv().await {
            self.handle(message).await;
        }
        self.close_all().await;
        tracing::info!("Coordinator stopped");
    }

    async fn handle(&mut self, message: CoordinatorMessage) {
        match message {
            CoordinatorMessage::Register { key, sender, reply } => {
                let result = self
                    .register_connection
                    .execute(&mut self.state, key, sender)
                    .await;
                if let Err(e) = &result {
                    tracing::warn!("Rejected registration: {}", e);
                }
                if reply.send(result).is_err() {
                    tracing::debug!("Client '{}' went away before registration finished", key);
                }
            }
            CoordinatorMessage::Request(envelope) => self.dispatch(envelope).await,
            CoordinatorMessage::Rooms { reply } => {
                let rooms = self.get_rooms.execute(&self.state);
                if reply.send(rooms).is_err() {
                    tracing::debug!("Room snapshot requester went away");
                }
            }
            CoordinatorMessage::Shutdown => {
                tracing::info!("Coordinator shutting down, draining queued requests");
                self.receiver.close();
            }
        }
    }

    async fn dispatch(&mut self, envelope: RequestEnvelope) {
        let (command, requester, args) = envelope.into_parts();
        tracing::debug!("Dispatching {} from '{}'", command.keyword(), requester);

        match command {
            Command::SetIdentity => {
                let result = self
                    .set_identity
                    .execute(&mut self.state, &requester, &args)
                    .await;
                self.report(command, &requester, result).await;
            }
            Command::JoinRoom => {
                let result = self
                    .join_room
                    .execute(&mut self.state, &requester, &args)
                    .await;
                self.report(command, &requester, result).await;
            }
            Command::ListRooms => {
                self.list_rooms.execute(&self.state, &requester).await;
            }
            Command::SendMessage => {
                let result = self
                    .send_message
                    .execute(&self.state, &requester, &args)
                    .await;
                self.report(command, &requester, result).await;
            }
            Command::Disconnect => {
                let result = self.disconnect.execute(&mut self.state, &requester).await;
                self.report(command, &requester, result).await;
            }
            Command::SendFile => {
                let result = self
                    .send_file
                    .execute(&self.state, &requester, &args)
                    .await;
                self.report(command, &requester, result).await;
            }
        }
    }

    /// 失敗したリクエストをログに残し、可能なら要求者に通知する
    async fn report<T, E>(&self, command: Command, requester: &ConnectionKey, result: Result<T, E>)
    where
        E: UserNotice + std::fmt::Display,
    {
        let Err(error) = result else {
            return;
        };

        match error.notice() {
            Some(text) => {
                tracing::info!(
                    "Rejected {} from '{}': {}",
                    command.keyword(),
                    requester,
                    error
                );
                notify(&*self.message_pusher, requester, &text).await;
            }
            None => {
                tracing::debug!(
                    "Ignored {} from '{}': {}",
                    command.keyword(),
                    requester,
                    error
                );
            }
        }
    }

    async fn close_all(&mut self) {
        let keys = self.state.connection_keys();
        if !keys.is_empty() {
            tracing::info!("Closing {} remaining connections", keys.len());
        }
        for key in keys {
            self.disconnect.shutdown(&mut self.state, &key).await;
        }
    }
}
