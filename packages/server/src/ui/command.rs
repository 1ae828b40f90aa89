//! 受信した 1 行をコマンドに変換する

use crate::domain::Command;

/// 1 行の解析結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// 既知のコマンドと、コマンド名を除いた引数
    Request { command: Command, args: Vec<String> },
    /// 空行（空白のみを含む）
    Empty,
    /// 未知のコマンド
    Unknown(String),
}

/// 行を空白で区切り、先頭のトークンをコマンド名として解釈する
pub fn parse_line(line: &str) -> ParsedLine {
    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return ParsedLine::Empty;
    };

    match Command::from_keyword(keyword) {
        Some(command) => ParsedLine::Request {
            command,
            args: words.map(str::to_string).collect(),
        },
        None => ParsedLine::Unknown(keyword.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_with_arguments() {
        // テスト項目: コマンド名の後ろの単語が引数として順番通りに並ぶ
        // given (前提条件):
        let line = "/msg hello   there\r";

        // when (操作):
        let parsed = parse_line(line);

        // then (期待する結果):
        assert_eq!(
            parsed,
            ParsedLine::Request {
                command: Command::SendMessage,
                args: vec!["hello".to_string(), "there".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_line_without_arguments() {
        // テスト項目: 引数のないコマンドは空の引数になる
        // given (前提条件):
        let line = "/channels";

        // when (操作):
        let parsed = parse_line(line);

        // then (期待する結果):
        assert_eq!(
            parsed,
            ParsedLine::Request {
                command: Command::ListRooms,
                args: Vec::new(),
            }
        );
    }

    #[test]
    fn test_parse_blank_line() {
        // テスト項目: 空白だけの行は無視される
        // given (前提条件):
        let line = "   \t ";

        // when (操作):
        let parsed = parse_line(line);

        // then (期待する結果):
        assert_eq!(parsed, ParsedLine::Empty);
    }

    #[test]
    fn test_parse_unknown_command() {
        // テスト項目: 未知のコマンドと大文字のコマンドは Unknown になる
        // given (前提条件):
        let lines = ["/dance now", "/NICK Alice", "hello"];

        // when (操作):
        let parsed: Vec<ParsedLine> = lines.iter().map(|line| parse_line(line)).collect();

        // then (期待する結果):
        assert_eq!(
            parsed,
            vec![
                ParsedLine::Unknown("/dance".to_string()),
                ParsedLine::Unknown("/NICK".to_string()),
                ParsedLine::Unknown("hello".to_string()),
            ]
        );
    }
}
