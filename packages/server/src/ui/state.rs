//! HTTP API の共有状態

use crate::coordinator::CoordinatorHandle;

/// Shared application state
///
/// Room の状態はハンドラから直接触らず、Coordinator にスナップショットを問い合わせます。
pub struct AppState {
    /// Coordinator のキューへの投入口
    pub coordinator: CoordinatorHandle,
}

impl AppState {
    pub fn new(coordinator: CoordinatorHandle) -> Self {
        Self { coordinator }
    }
}
