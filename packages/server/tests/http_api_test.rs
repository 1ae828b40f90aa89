//! Integration tests for the HTTP status API.

use std::{sync::Arc, time::Duration};

use irori_server::{
    infrastructure::dto::http::{RoomDetailDto, RoomSummaryDto},
    ui::{RunningServer, Server, ServerConfig},
};
use irori_shared::time::FixedClock;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpStream,
};

/// 2023-01-01T00:00:00.000Z
const FIXED_NOW: i64 = 1672531200000;

async fn start_server() -> (RunningServer, String) {
    let config = ServerConfig {
        port: 0,
        http_port: Some(0),
        ..ServerConfig::default()
    };
    let server = Server::with_clock(config, Arc::new(FixedClock::new(FIXED_NOW)))
        .start()
        .await
        .expect("Failed to start server");
    let http_addr = server.http_addr().expect("HTTP API should be enabled");
    (server, format!("http://{}", http_addr))
}

/// Connect, send the given lines and wait for `expected` replies
async fn chat(server: &RunningServer, lines: &[&str], expected: usize) -> TcpStream {
    let mut stream = TcpStream::connect(server.chat_addr()).await.unwrap();
    for line in lines {
        stream
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .unwrap();
    }

    let (reader, writer) = stream.into_split();
    let mut replies = BufReader::new(reader).lines();
    for _ in 0..expected {
        tokio::time::timeout(Duration::from_secs(2), replies.next_line())
            .await
            .expect("Timed out waiting for a reply")
            .unwrap()
            .expect("Connection closed unexpectedly");
    }
    replies.into_inner().into_inner().reunite(writer).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックが status ok を返す
    // given (前提条件):
    let (server, base_url) = start_server().await;

    // when (操作):
    let response = reqwest::get(format!("{}/api/health", base_url))
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"status": "ok"}));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_get_rooms_lists_rooms_in_order() {
    // テスト項目: Room 一覧が名前順に、メンバーの表示名付きで返る
    // given (前提条件):
    let (server, base_url) = start_server().await;
    let _alice = chat(&server, &["/nick Alice", "/join lobby"], 2).await;
    let _bob = chat(&server, &["/nick Bob", "/join general"], 2).await;

    // when (操作):
    let rooms: Vec<RoomSummaryDto> = reqwest::get(format!("{}/api/rooms", base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(
        rooms,
        vec![
            RoomSummaryDto {
                name: "general".to_string(),
                members: vec!["Bob".to_string()],
                created_at: "2023-01-01T00:00:00.000Z".to_string(),
            },
            RoomSummaryDto {
                name: "lobby".to_string(),
                members: vec!["Alice".to_string()],
                created_at: "2023-01-01T00:00:00.000Z".to_string(),
            },
        ]
    );

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_get_room_detail() {
    // テスト項目: Room の詳細にメンバーの表示名・接続元・参加時刻が含まれる
    // given (前提条件):
    let (server, base_url) = start_server().await;
    let alice = chat(&server, &["/nick Alice", "/join lobby"], 2).await;
    let alice_addr = alice.local_addr().unwrap().to_string();

    // when (操作):
    let response = reqwest::get(format!("{}/api/rooms/lobby", base_url))
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let room: RoomDetailDto = response.json().await.unwrap();
    assert_eq!(room.name, "lobby");
    assert_eq!(room.members.len(), 1);
    assert_eq!(room.members[0].identity, "Alice");
    assert_eq!(room.members[0].connection, alice_addr);
    assert_eq!(room.members[0].joined_at, "2023-01-01T00:00:00.000Z");

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_get_unknown_room_returns_not_found() {
    // テスト項目: 存在しない Room の詳細は 404 になる
    // given (前提条件):
    let (server, base_url) = start_server().await;

    // when (操作):
    let response = reqwest::get(format!("{}/api/rooms/nowhere", base_url))
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_rooms_unavailable_after_coordinator_stops() {
    // テスト項目: Coordinator が停止した後の Room 一覧は 503 になる
    // given (前提条件):
    let (server, base_url) = start_server().await;
    server.coordinator().shutdown().await.unwrap();
    while !server.coordinator().is_closed() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // when (操作):
    let response = reqwest::get(format!("{}/api/rooms", base_url))
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

    server.shutdown().await.unwrap();
}
