//! HTTP API endpoint handlers.
//!
//! Room の状態は Coordinator のキュー経由で取得するため、
//! それ以前に投入されたチャットのリクエストが全て反映された状態が返ります。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
    usecase::RoomSnapshot,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn snapshot(state: &AppState) -> Result<Vec<RoomSnapshot>, StatusCode> {
    state.coordinator.rooms().await.map_err(|e| {
        tracing::warn!("Room snapshot unavailable: {}", e);
        StatusCode::SERVICE_UNAVAILABLE
    })
}

/// Get list of rooms
pub async fn get_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoomSummaryDto>>, StatusCode> {
    let rooms = snapshot(&state).await?;

    // Snapshot から DTO への変換
    Ok(Json(rooms.into_iter().map(Into::into).collect()))
}

/// Get room detail by name
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_name): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let rooms = snapshot(&state).await?;

    rooms
        .into_iter()
        .find(|room| room.name.as_str() == room_name)
        .map(|room| Json(room.into()))
        .ok_or(StatusCode::NOT_FOUND)
}
