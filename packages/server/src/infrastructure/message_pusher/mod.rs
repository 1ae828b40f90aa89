//! メッセージ送信（通知）の実装
//!
//! - `line`: 接続ごとの送信キューに 1 行ずつ積む実装

pub mod line;

pub use line::LineMessagePusher;
