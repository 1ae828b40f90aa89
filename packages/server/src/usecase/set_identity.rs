//! UseCase: 表示名の変更（`/nick NAME`）

use std::sync::Arc;

use crate::{
    coordinator::ChatState,
    domain::{ConnectionKey, DisplayName, MessagePusher},
};

use super::{error::SetIdentityError, notice, notify};

pub struct SetIdentityUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl SetIdentityUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 表示名を `args[0]` に変更し、要求者に通知する
    ///
    /// 2 つ目以降の引数は無視します。
    pub async fn execute(
        &self,
        state: &mut ChatState,
        requester: &ConnectionKey,
        args: &[String],
    ) -> Result<DisplayName, SetIdentityError> {
        let name = args
            .first()
            .cloned()
            .and_then(|name| DisplayName::new(name).ok())
            .ok_or(SetIdentityError::MissingName)?;

        let handle = state
            .connection_mut(requester)
            .ok_or_else(|| SetIdentityError::ConnectionNotFound(requester.to_string()))?;
        let previous = std::mem::replace(&mut handle.identity, name.clone());
        tracing::info!("Client '{}' renamed from '{}' to '{}'", requester, previous, name);

        notify(&*self.message_pusher, requester, &notice::renamed(&name)).await;
        Ok(name)
    }
}
