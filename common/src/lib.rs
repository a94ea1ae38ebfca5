//! Damage Review Common Library
//!
//! 点検コメントの解析・損傷分類・集計（画像処理を含まない純粋ロジック）

pub mod types;
pub mod error;
pub mod parser;
pub mod roles;
pub mod classifier;
pub mod summary;

pub use types::{
    CommentFields, CommentVocabulary, FlagKind, Inspection, LogoOrType, ParsedComment, Photo,
};
pub use error::{Error, Result};
pub use parser::{has_known_label, parse_comment, parse_comment_with_mode, ParseMode};
pub use roles::{LayoutPolicy, PhotoRole, PhotoRoleMap};
pub use classifier::{classify, classify_at, Amenities, Classification, DamageKind};
pub use summary::{classify_photos, summarize, ClassifiedPhoto, NavigationIndex, SummaryCounts, SummaryReport};
