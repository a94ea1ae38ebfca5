//! エラー型定義

use thiserror::Error;

/// 共通エラー型
///
/// 解析・分類は通常失敗しない。Strictモードの解析だけが返す。
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
