//! Damage Review
//!
//! 車両損傷点検のレビュー用エンジン:
//! - 表示座標で描いた損傷矩形を原寸画像に焼き込んで出力する
//! - 点検コメントを解析・分類して集計する（`damage_review_common`）

pub mod annotation;
pub mod batch;
pub mod cli;
pub mod compositor;
pub mod config;
pub mod error;
pub mod external;
pub mod geometry;
pub mod scanner;
pub mod session;

pub use damage_review_common as common;
