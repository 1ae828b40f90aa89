//! Data Transfer Objects (DTOs) for the HTTP status API.

pub mod conversion;
pub mod http;
