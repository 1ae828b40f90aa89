//! クライアントに届く文言

use crate::domain::{DisplayName, FileName, RoomName, ValueObjectError};

pub const NICK_USAGE: &str = "nick is required. usage: /nick NAME";
pub const JOIN_USAGE: &str = "channel name is required. usage: /join CHANNEL_NAME";
pub const MSG_USAGE: &str = "message is required, usage: /msg MSG";
pub const SEND_FILE_USAGE: &str =
    "file name and content are required. usage: /send_file NAME CONTENT";
pub const NOT_IN_CHANNEL: &str = "you are not in a channel. usage: /join CHANNEL_NAME";
pub const FAREWELL: &str = "sad to see you go =(";
pub const SHUTTING_DOWN: &str = "server is shutting down";

pub fn renamed(name: &DisplayName) -> String {
    format!("all right, I will call you {}", name)
}

pub fn welcome(room: &RoomName) -> String {
    format!("welcome to {}", room)
}

pub fn already_in(room: &str) -> String {
    format!("you are already in {}", room)
}

pub fn joined(identity: &DisplayName) -> String {
    format!("{} joined the channel", identity)
}

pub fn left(identity: &DisplayName) -> String {
    format!("{} has left the channel", identity)
}

pub fn channel_list(rooms: &[RoomName]) -> String {
    let names: Vec<&str> = rooms.iter().map(RoomName::as_str).collect();
    format!("available channels: {}", names.join(", "))
}

pub fn chat(identity: &DisplayName, message: &str) -> String {
    format!("{}: {}", identity, message)
}

pub fn file_sent(identity: &DisplayName, file: &FileName) -> String {
    format!("{}: Sent you this file: {}", identity, file)
}

pub fn file_contents(content: &str) -> String {
    format!("The file contains: {}", content)
}

pub fn invalid_file_name(error: &ValueObjectError) -> String {
    format!("invalid file name: {}", error)
}

pub fn file_write_failed(name: &str) -> String {
    format!("could not save file {}, please try again later", name)
}

pub fn unknown_command(keyword: &str) -> String {
    format!("unknown command: {}", keyword)
}

pub fn line_too_long(max_line_bytes: usize) -> String {
    format!("line too long, the limit is {} bytes", max_line_bytes)
}
