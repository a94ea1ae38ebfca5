//! 損傷分類
//!
//! ParsedCommentを排他的な損傷種別（dent / scratch / general / none）と
//! ロゴ/タイプ区分に変換する。ロゴ判定は外装パネル写真のみ、
//! アメニティ判定は車内写真のみに適用する。

use crate::roles::{LayoutPolicy, PhotoRole};
use crate::types::{CommentVocabulary, ParsedComment};
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static::lazy_static! {
    // "tissue: no" / "tissue no"（"tissue" 単体の言及は対象外）
    static ref TISSUE_MISSING_RE: Regex =
        Regex::new(r"(?i)\btissue(?:\s*:\s*|\s+)no\b").unwrap();
    static ref BOTTLE_MISSING_RE: Regex =
        Regex::new(r"(?i)\bbottle(?:\s*:\s*|\s+)no\b").unwrap();
}

/// 損傷を示さない判定値
const NO_DAMAGE_VALUES: &[&str] = &["no damage", "na", ""];

/// 損傷種別（1枚につき1つ）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageKind {
    Dent,
    Scratch,
    General,
    #[default]
    None,
}

impl std::fmt::Display for DamageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DamageKind::Dent => write!(f, "dent"),
            DamageKind::Scratch => write!(f, "scratch"),
            DamageKind::General => write!(f, "general"),
            DamageKind::None => write!(f, "none"),
        }
    }
}

/// 車内アメニティの指摘
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amenities {
    pub floor_dirt: bool,
    pub tissue_missing: bool,
    pub bottle_missing: bool,
}

/// 写真1枚の分類結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub has_damage: bool,
    pub kind: DamageKind,
    /// 外装パネル以外は None（集計対象外）
    pub has_logo: Option<bool>,
    pub has_no_logo: Option<bool>,
    pub amenities: Amenities,
}

impl Classification {
    pub fn has_dent(&self) -> bool {
        self.kind == DamageKind::Dent
    }

    pub fn has_scratch(&self) -> bool {
        self.kind == DamageKind::Scratch
    }

    pub fn has_general_damage(&self) -> bool {
        self.kind == DamageKind::General
    }
}

/// 損傷判定テキストから種別を決定
///
/// "dent" と "scratch" が両方含まれる場合は dent を優先する。
pub fn damage_kind(damage_detection: &str) -> DamageKind {
    let text = damage_detection.trim().to_lowercase();
    if NO_DAMAGE_VALUES.contains(&text.as_str()) {
        return DamageKind::None;
    }

    if text.contains("dent") {
        DamageKind::Dent
    } else if text.contains("scratch") {
        DamageKind::Scratch
    } else {
        DamageKind::General
    }
}

/// 生コメントからアメニティの指摘を抽出
pub fn detect_amenities(comment: &str) -> Amenities {
    Amenities {
        floor_dirt: comment.to_lowercase().contains("floor dirt"),
        tissue_missing: TISSUE_MISSING_RE.is_match(comment),
        bottle_missing: BOTTLE_MISSING_RE.is_match(comment),
    }
}

/// ロゴ/タイプ区分 `(has_logo, has_no_logo)`
fn logo_verdict(parsed: &ParsedComment, vocabulary: CommentVocabulary) -> (bool, bool) {
    match vocabulary {
        CommentVocabulary::Standard => match parsed.logo() {
            Some(logo) => {
                let logo = logo.trim().to_lowercase();
                (logo == "yes", logo == "no")
            }
            None => (false, false),
        },
        CommentVocabulary::Alternate => match parsed.damage_type() {
            Some(kind) => {
                let kind = kind.trim().to_lowercase();
                (kind == "major", kind == "minor")
            }
            None => (false, false),
        },
    }
}

/// 写真1枚を分類
///
/// # Arguments
/// * `parsed` - コメント解析結果
/// * `comment` - 生の一次コメント（アメニティ判定用）
/// * `role` - 写真の役割
/// * `vocabulary` - クライアントの語彙
pub fn classify(
    parsed: &ParsedComment,
    comment: Option<&str>,
    role: PhotoRole,
    vocabulary: CommentVocabulary,
) -> Classification {
    let kind = damage_kind(&parsed.damage_detection);

    let (has_logo, has_no_logo) = if role.panel {
        let (logo, no_logo) = logo_verdict(parsed, vocabulary);
        (Some(logo), Some(no_logo))
    } else {
        (None, None)
    };

    let amenities = match comment {
        Some(text) if role.interior => detect_amenities(text),
        _ => Amenities::default(),
    };

    Classification {
        has_damage: kind != DamageKind::None,
        kind,
        has_logo,
        has_no_logo,
        amenities,
    }
}

/// 位置指定で分類（既定レイアウト: 先頭10枚・末尾4枚）
pub fn classify_at(
    parsed: &ParsedComment,
    comment: Option<&str>,
    position_index: usize,
    total_photos: usize,
    vocabulary: CommentVocabulary,
) -> Classification {
    let role = LayoutPolicy::default().role_of(position_index, total_photos);
    classify(parsed, comment, role, vocabulary)
}
