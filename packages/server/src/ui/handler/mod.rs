//! HTTP API handlers.

mod http;

pub use http::{get_room_detail, get_rooms, health_check};
