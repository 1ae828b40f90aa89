//! 1 本の TCP 接続の入出力
//!
//! 接続ごとに 2 つのタスクが動きます。
//!
//! - 読み取り: 1 行ずつ読み、コマンドに変換して Coordinator のキューに投入する
//! - 書き込み: 送信キュー（`Outbound`）を取り出してソケットに書く。`Outbound::Close` で終了する
//!
//! 書き込みが終わった（サーバー側から閉じた、送信キューが破棄された、または送信に失敗した）時点で
//! 読み取りも止めます。

use std::{net::SocketAddr, time::Duration};

use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
    task::JoinHandle,
};

use crate::{
    coordinator::CoordinatorHandle,
    domain::{Command, ConnectionKey, Outbound, RequestEnvelope},
    usecase::notice,
};

use super::command::{ParsedLine, parse_line};

/// 1 行の書き込みを待つ上限
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// 接続ごとの上限
#[derive(Debug, Clone, Copy)]
pub(super) struct ConnectionLimits {
    /// 送信キューの容量
    pub outbound_capacity: usize,
    /// 1 行の最大バイト数（改行を除く）
    pub max_line_bytes: usize,
}

/// 読み取りループが終わった理由
enum ReadEnd {
    /// `/quit` を投入済み
    Quit,
    /// EOF か読み取りエラー、または長すぎる行
    Closed,
    /// 書き込みタスクが先に終わった
    WriterFinished,
    /// Coordinator がリクエストを受け付けなくなった
    Rejected,
}

/// 1 行の読み取り結果
#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    Line(String),
    Eof,
    TooLong,
}

pub(super) async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    coordinator: CoordinatorHandle,
    limits: ConnectionLimits,
) {
    let key = ConnectionKey::new(peer);
    let (reader, writer) = stream.into_split();
    let (sender, outbound) = mpsc::channel(limits.outbound_capacity.max(1));
    // 読み取り側は弱い参照だけを持つ。送信キューが破棄されたら writer が終われるように
    let local = sender.downgrade();

    if let Err(e) = coordinator.register(key, sender).await {
        tracing::warn!("Could not register client '{}': {}", key, e);
        return;
    }

    let mut writer_task = tokio::spawn(write_outbound(key, writer, outbound));
    let end = read_requests(key, reader, &coordinator, &local, limits, &mut writer_task).await;

    match end {
        ReadEnd::Quit | ReadEnd::Rejected => {}
        ReadEnd::Closed | ReadEnd::WriterFinished => {
            // 暗黙の /quit
            let envelope = RequestEnvelope::new(Command::Disconnect, key, Vec::new());
            if let Err(e) = coordinator.submit(envelope).await {
                tracing::debug!("Disconnect of '{}' not queued: {}", key, e);
            }
        }
    }

    if !writer_task.is_finished()
        && let Err(e) = writer_task.await
    {
        tracing::warn!("Writer task for '{}' failed: {}", key, e);
    }
    tracing::info!("Client '{}' connection closed", key);
}

/// Coordinator を通さずに要求者へ通知する。送信キューが既にない場合は `false`
fn notify_local(local: &mpsc::WeakSender<Outbound>, text: String) -> bool {
    match local.upgrade() {
        Some(sender) => sender.try_send(Outbound::Line(text)).is_ok(),
        None => false,
    }
}

async fn read_requests(
    key: ConnectionKey,
    reader: OwnedReadHalf,
    coordinator: &CoordinatorHandle,
    local: &mpsc::WeakSender<Outbound>,
    limits: ConnectionLimits,
    writer_task: &mut JoinHandle<()>,
) -> ReadEnd {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        let line = tokio::select! {
            line = next_line(&mut reader, &mut buf, limits.max_line_bytes) => line,
            _ = &mut *writer_task => return ReadEnd::WriterFinished,
        };

        let line = match line {
            Ok(LineRead::Line(line)) => line,
            Ok(LineRead::Eof) => {
                tracing::debug!("Client '{}' reached EOF", key);
                return ReadEnd::Closed;
            }
            Ok(LineRead::TooLong) => {
                tracing::warn!(
                    "Client '{}' sent a line over {} bytes, closing",
                    key,
                    limits.max_line_bytes
                );
                notify_local(local, notice::line_too_long(limits.max_line_bytes));
                return ReadEnd::Closed;
            }
            Err(e) => {
                tracing::warn!("Failed to read from '{}': {}", key, e);
                return ReadEnd::Closed;
            }
        };

        match parse_line(&line) {
            ParsedLine::Empty => {}
            ParsedLine::Unknown(keyword) => {
                tracing::debug!("Client '{}' sent unknown command '{}'", key, keyword);
                if !notify_local(local, notice::unknown_command(&keyword)) {
                    return ReadEnd::WriterFinished;
                }
            }
            ParsedLine::Request { command, args } => {
                let envelope = RequestEnvelope::new(command, key, args);
                if let Err(e) = coordinator.submit(envelope).await {
                    tracing::info!("Request from '{}' rejected: {}", key, e);
                    return ReadEnd::Rejected;
                }
                if command == Command::Disconnect {
                    return ReadEnd::Quit;
                }
            }
        }
    }
}

/// 改行までを最大 `max_line_bytes` バイト読む
///
/// 行末の `\n` と `\r\n` は取り除く。上限を超えた行は読み切らずに `LineRead::TooLong` を返す。
/// 不正な UTF-8 は置換文字に変換する。
async fn next_line<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_line_bytes: usize,
) -> std::io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    // 改行の分を 1 バイト足す
    let limit = max_line_bytes as u64 + 1;
    let read = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
    if read == 0 {
        return Ok(LineRead::Eof);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() > max_line_bytes {
        return Ok(LineRead::TooLong);
    }
    Ok(LineRead::Line(String::from_utf8_lossy(buf).into_owned()))
}

async fn write_outbound(
    key: ConnectionKey,
    mut writer: OwnedWriteHalf,
    mut outbound: mpsc::Receiver<Outbound>,
) {
    while let Some(item) = outbound.recv().await {
        match item {
            Outbound::Line(line) => {
                match tokio::time::timeout(WRITE_TIMEOUT, write_line(&mut writer, &line)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::warn!("Failed to write to '{}': {}", key, e);
                        return;
                    }
                    Err(_) => {
                        tracing::warn!("Timed out writing to '{}'", key);
                        return;
                    }
                }
            }
            Outbound::Close => break,
        }
    }

    if let Err(e) = writer.shutdown().await {
        tracing::debug!("Failed to shut down '{}': {}", key, e);
    }
}

async fn write_line(writer: &mut OwnedWriteHalf, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
