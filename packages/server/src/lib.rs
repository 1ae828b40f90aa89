//! Irori chat server library.
//!
//! 行ベースの TCP チャットサーバーです。Room とメンバーシップは
//! 1 つの Coordinator タスクだけが所有し、全ての変更は順序付きキューを通じて直列に処理されます。

pub mod coordinator;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
