//! UseCase 層のエラー定義
//!
//! どのエラーも要求者向けの 1 行の通知に変換できます（`UserNotice`）。
//! 接続がすでに存在しない場合は通知先がないため `None` を返します。

use thiserror::Error;

use crate::domain::ValueObjectError;

use super::notice;

/// 要求者に返す 1 行の通知
pub trait UserNotice {
    fn notice(&self) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("connection '{0}' is already registered")]
    DuplicateConnection(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetIdentityError {
    #[error("nick is missing")]
    MissingName,

    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),
}

impl UserNotice for SetIdentityError {
    fn notice(&self) -> Option<String> {
        match self {
            Self::MissingName => Some(notice::NICK_USAGE.to_string()),
            Self::ConnectionNotFound(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("channel name is missing")]
    MissingRoomName,

    #[error("already in channel '{0}'")]
    AlreadyInRoom(String),

    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),
}

impl UserNotice for JoinRoomError {
    fn notice(&self) -> Option<String> {
        match self {
            Self::MissingRoomName => Some(notice::JOIN_USAGE.to_string()),
            Self::AlreadyInRoom(room) => Some(notice::already_in(room)),
            Self::ConnectionNotFound(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("sender is not in a channel")]
    NotInChannel,

    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),
}

impl UserNotice for SendMessageError {
    fn notice(&self) -> Option<String> {
        match self {
            Self::EmptyMessage => Some(notice::MSG_USAGE.to_string()),
            Self::NotInChannel => Some(notice::NOT_IN_CHANNEL.to_string()),
            Self::ConnectionNotFound(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),
}

impl UserNotice for DisconnectError {
    fn notice(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendFileError {
    #[error("file name or content is missing")]
    MissingArguments,

    #[error("sender is not in a channel")]
    NotInChannel,

    #[error("invalid file name: {0}")]
    InvalidFileName(ValueObjectError),

    #[error("failed to write '{name}': {reason}")]
    WriteFailed { name: String, reason: String },

    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),
}

impl UserNotice for SendFileError {
    fn notice(&self) -> Option<String> {
        match self {
            Self::MissingArguments => Some(notice::SEND_FILE_USAGE.to_string()),
            Self::NotInChannel => Some(notice::NOT_IN_CHANNEL.to_string()),
            Self::InvalidFileName(e) => Some(notice::invalid_file_name(e)),
            Self::WriteFailed { name, .. } => Some(notice::file_write_failed(name)),
            Self::ConnectionNotFound(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_connection_has_no_notice() {
        // テスト項目: 接続が存在しないエラーは通知に変換されない
        // given (前提条件):
        let key = "127.0.0.1:1".to_string();

        // when (操作):
        let notices = [
            SetIdentityError::ConnectionNotFound(key.clone()).notice(),
            JoinRoomError::ConnectionNotFound(key.clone()).notice(),
            SendMessageError::ConnectionNotFound(key.clone()).notice(),
            DisconnectError::ConnectionNotFound(key.clone()).notice(),
            SendFileError::ConnectionNotFound(key).notice(),
        ];

        // then (期待する結果):
        assert!(notices.iter().all(Option::is_none));
    }

    #[test]
    fn test_write_failure_notice_hides_io_details() {
        // テスト項目: 書き込み失敗の通知には OS のエラー詳細を含めない
        // given (前提条件):
        let error = SendFileError::WriteFailed {
            name: "report.txt".to_string(),
            reason: "Permission denied (os error 13)".to_string(),
        };

        // when (操作):
        let notice = error.notice().unwrap();

        // then (期待する結果):
        assert!(notice.contains("report.txt"));
        assert!(!notice.contains("os error"));
    }
}
