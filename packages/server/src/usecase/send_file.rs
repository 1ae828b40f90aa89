//! UseCase: ファイル送信（`/send_file NAME CONTENT...`）
//!
//! `NAME` のファイルに残りの単語を連結した内容を書き込み、
//! 成功したら参加中の Room の他のメンバーに 2 行の通知を送ります。
//! 書き込みの失敗は要求者への通知に変換し、ディスパッチループは止めません。

use std::sync::Arc;

use crate::{
    coordinator::ChatState,
    domain::{ConnectionKey, FileName, FileStore, MessagePusher},
};

use super::{error::SendFileError, notice};

pub struct SendFileUseCase {
    message_pusher: Arc<dyn MessagePusher>,
    file_store: Arc<dyn FileStore>,
}

impl SendFileUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>, file_store: Arc<dyn FileStore>) -> Self {
        Self {
            message_pusher,
            file_store,
        }
    }

    pub async fn execute(
        &self,
        state: &ChatState,
        requester: &ConnectionKey,
        args: &[String],
    ) -> Result<Vec<ConnectionKey>, SendFileError> {
        let [name, content @ ..] = args else {
            return Err(SendFileError::MissingArguments);
        };
        if content.is_empty() {
            return Err(SendFileError::MissingArguments);
        }

        let handle = state
            .connection(requester)
            .ok_or_else(|| SendFileError::ConnectionNotFound(requester.to_string()))?;
        let room = handle
            .current_room
            .as_ref()
            .and_then(|room_name| state.room(room_name))
            .ok_or(SendFileError::NotInChannel)?;

        let file_name = FileName::new(name.clone()).map_err(SendFileError::InvalidFileName)?;
        let content = content.join(" ");

        self.file_store
            .write(&file_name, &content)
            .await
            .map_err(|e| SendFileError::WriteFailed {
                name: file_name.to_string(),
                reason: e.to_string(),
            })?;

        let sent = notice::file_sent(&handle.identity, &file_name);
        let targets = room
            .broadcast(requester, &sent, &*self.message_pusher)
            .await;
        room.broadcast(requester, &notice::file_contents(&content), &*self.message_pusher)
            .await;
        tracing::info!(
            "Client '{}' sent file '{}' to room '{}'",
            requester,
            file_name,
            room.name
        );

        Ok(targets)
    }
}
