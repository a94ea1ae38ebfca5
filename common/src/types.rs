//! 点検データの型定義
//!
//! - Photo / CommentFields: 点検レコードが保持する写真とフリーテキスト
//! - Inspection: 1件の点検（写真の順序付きリスト）
//! - ParsedComment: コメントから抽出した構造化フィールド（毎回再計算）

use serde::{Deserialize, Serialize};

/// 写真に付随するフリーテキスト
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommentFields {
    /// 一次コメント（損傷判定・ロゴ等）
    pub primary: Option<String>,
    /// 追加コメント（再点検で見つかった新規損傷）
    pub incremental: Option<String>,
}

impl CommentFields {
    pub fn primary_text(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    /// 空白以外の追加コメントがあるか
    pub fn has_incremental(&self) -> bool {
        self.incremental
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }
}

/// 点検写真
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,

    /// 画像の参照（パス・URLなど、ImageSourceが解決する）
    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub comment: CommentFields,
}

/// 1件の点検
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    #[serde(default)]
    pub inspection_id: String,

    /// クライアント名（語彙・レイアウトの解決に使用）
    #[serde(default)]
    pub client: String,

    #[serde(default)]
    pub photos: Vec<Photo>,
}

/// コメント語彙
///
/// - Standard: `Damage Detection: ... Logo: Yes/No`
/// - Alternate: `Dent/Damage: ... Type: Major/Minor/None`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentVocabulary {
    #[default]
    Standard,
    Alternate,
}

impl std::fmt::Display for CommentVocabulary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommentVocabulary::Standard => write!(f, "standard"),
            CommentVocabulary::Alternate => write!(f, "alternate"),
        }
    }
}

impl std::str::FromStr for CommentVocabulary {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(CommentVocabulary::Standard),
            "alternate" | "fleet-b" => Ok(CommentVocabulary::Alternate),
            other => Err(format!("unknown vocabulary: {}", other)),
        }
    }
}

/// ロゴ/タイプ欄の種類
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    #[default]
    Logo,
    Type,
}

/// ロゴ有無（Standard）または損傷タイプ（Alternate）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoOrType {
    pub kind: FlagKind,
    pub value: String,
}

impl Default for LogoOrType {
    fn default() -> Self {
        Self {
            kind: FlagKind::Logo,
            value: "No".to_string(),
        }
    }
}

/// コメント解析結果
///
/// テキストが正であり、この値はキャッシュせず読み出しのたびに再計算する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedComment {
    pub damage_detection: String,
    pub logo_or_type: LogoOrType,
}

impl Default for ParsedComment {
    fn default() -> Self {
        Self {
            damage_detection: "NA".to_string(),
            logo_or_type: LogoOrType::default(),
        }
    }
}

impl ParsedComment {
    /// `Logo:` 欄の値（Type欄の場合はNone）
    pub fn logo(&self) -> Option<&str> {
        match self.logo_or_type.kind {
            FlagKind::Logo => Some(&self.logo_or_type.value),
            FlagKind::Type => None,
        }
    }

    /// `Type:` 欄の値（Logo欄の場合はNone）
    pub fn damage_type(&self) -> Option<&str> {
        match self.logo_or_type.kind {
            FlagKind::Type => Some(&self.logo_or_type.value),
            FlagKind::Logo => None,
        }
    }
}
