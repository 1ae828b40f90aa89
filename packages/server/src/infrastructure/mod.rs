//! Infrastructure 層
//!
//! ドメイン層の trait（`MessagePusher`, `FileStore`）の具体的な実装と、
//! HTTP API 用の DTO を提供します。

pub mod dto;
pub mod file_store;
pub mod message_pusher;
