//! Request Envelope
//!
//! クライアントの意図 1 件（誰が・何を・どの引数で）を表す不変の値です。
//! 読み取りタスクが組み立てて Coordinator のキューに投入し、ちょうど 1 回だけ消費されます。

use super::ConnectionKey;

/// クライアントが要求できる操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    SetIdentity,
    JoinRoom,
    ListRooms,
    SendMessage,
    Disconnect,
    SendFile,
}

impl Command {
    /// 行の先頭トークン（大文字小文字は区別する）から操作を引く
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "/nick" => Some(Self::SetIdentity),
            "/join" => Some(Self::JoinRoom),
            "/channels" => Some(Self::ListRooms),
            "/msg" => Some(Self::SendMessage),
            "/quit" => Some(Self::Disconnect),
            "/send_file" => Some(Self::SendFile),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::SetIdentity => "/nick",
            Self::JoinRoom => "/join",
            Self::ListRooms => "/channels",
            Self::SendMessage => "/msg",
            Self::Disconnect => "/quit",
            Self::SendFile => "/send_file",
        }
    }
}

/// 1 件のリクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEnvelope {
    command: Command,
    requester: ConnectionKey,
    args: Vec<String>,
}

impl RequestEnvelope {
    /// `args` にはコマンドのキーワード自体は含めない
    pub fn new(command: Command, requester: ConnectionKey, args: Vec<String>) -> Self {
        Self {
            command,
            requester,
            args,
        }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn requester(&self) -> &ConnectionKey {
        &self.requester
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn into_parts(self) -> (Command, ConnectionKey, Vec<String>) {
        (self.command, self.requester, self.args)
    }
}
