//! ファイル保存の実装
//!
//! - `local`: ローカルディスクの 1 ディレクトリに保存する実装

pub mod local;

pub use local::LocalFileStore;
