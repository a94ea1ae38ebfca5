//! 点検コメントパーサー
//!
//! 半構造化されたフリーテキスト（例: `Damage Detection: Dent Logo: No`）から
//! 損傷判定とロゴ/タイプ欄を抽出する。
//!
//! 2つの語彙を設定なしで自動判別する:
//! - Standard: `Damage Detection: <text> Logo: <yes|no>`
//! - Alternate: `Dent/Damage: <text> ... Type: <Major|Minor|None>`

use crate::error::{Error, Result};
use crate::types::{CommentVocabulary, FlagKind, LogoOrType, ParsedComment};
use regex::Regex;

lazy_static::lazy_static! {
    // 損傷判定ラベル（どちらの語彙も）
    static ref DAMAGE_LABEL_RE: Regex =
        Regex::new(r"(?i)(?:damage\s+detection|dent\s*/\s*damage)\s*:").unwrap();
    // 損傷判定の終端となる次のラベル
    static ref NEXT_LABEL_RE: Regex = Regex::new(r"(?i)\b(?:type|logo)\s*:").unwrap();
    // Alternate語彙のラベル
    static ref ALTERNATE_LABEL_RE: Regex =
        Regex::new(r"(?i)dent\s*/\s*damage\s*:|\btype\s*:").unwrap();
    static ref LOGO_RE: Regex = Regex::new(r"(?i)logo:\s*(yes|no)").unwrap();
    static ref TYPE_RE: Regex = Regex::new(r"(?i)type:\s*(major|minor|none)").unwrap();
}

/// 解析モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// 一致しないフィールドは既定値のまま
    #[default]
    Lenient,
    /// 空でないコメントに既知のラベルが1つもなければエラー
    Strict,
}

impl CommentVocabulary {
    /// コメント1件の語彙を判別
    ///
    /// `Dent/Damage:` または `Type:` ラベルがあればAlternate、それ以外はStandard。
    pub fn detect(text: &str) -> CommentVocabulary {
        if ALTERNATE_LABEL_RE.is_match(text) {
            CommentVocabulary::Alternate
        } else {
            CommentVocabulary::Standard
        }
    }
}

/// コメントを解析（Lenient）
///
/// 未入力・空文字は既定値 `{damageDetection: "NA", logo: "No"}` を返す。
/// エラーにはならない。
///
/// # Examples
/// ```
/// use damage_review_common::parse_comment;
///
/// let parsed = parse_comment(Some("Damage Detection: Dent Logo: No"));
/// assert_eq!(parsed.damage_detection, "Dent");
/// assert_eq!(parsed.logo(), Some("No"));
/// ```
pub fn parse_comment(comment: Option<&str>) -> ParsedComment {
    let text = match comment {
        Some(t) if !t.trim().is_empty() => t,
        _ => return ParsedComment::default(),
    };

    let mut parsed = ParsedComment::default();

    if let Some(value) = extract_damage_detection(text) {
        parsed.damage_detection = value;
    }

    let flag = match CommentVocabulary::detect(text) {
        CommentVocabulary::Standard => LOGO_RE
            .captures(text)
            .map(|cap| (FlagKind::Logo, cap[1].to_string())),
        CommentVocabulary::Alternate => TYPE_RE
            .captures(text)
            .map(|cap| (FlagKind::Type, cap[1].to_string())),
    };
    if let Some((kind, value)) = flag {
        parsed.logo_or_type = LogoOrType { kind, value };
    }

    parsed
}

/// モード指定でコメントを解析
///
/// Strictモードでも未入力は正常扱い（まだコメントがない状態）。
pub fn parse_comment_with_mode(comment: Option<&str>, mode: ParseMode) -> Result<ParsedComment> {
    if mode == ParseMode::Strict {
        if let Some(text) = comment.filter(|t| !t.trim().is_empty()) {
            if !has_known_label(text) {
                return Err(Error::Parse(format!(
                    "既知のラベルがありません: {}",
                    truncate(text, 60)
                )));
            }
        }
    }
    Ok(parse_comment(comment))
}

/// 既知のラベル（損傷判定・Logo・Type）が1つでも含まれるか
pub fn has_known_label(text: &str) -> bool {
    DAMAGE_LABEL_RE.is_match(text) || LOGO_RE.is_match(text) || TYPE_RE.is_match(text)
}

/// ラベルから次のラベル（`Type:` / `Logo:`）または末尾までを抽出
///
/// 境界は文字種ではなく次のラベルのキーワードで決める
/// （"Dent" や "Scratch" が途中で切れないように）。
fn extract_damage_detection(text: &str) -> Option<String> {
    let label = DAMAGE_LABEL_RE.find(text)?;
    let rest = &text[label.end()..];
    let end = NEXT_LABEL_RE
        .find(rest)
        .map(|m| m.start())
        .unwrap_or(rest.len());
    let value = rest[..end].trim();

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let head: String = text.chars().take(limit).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // Standard語彙
    // =============================================

    #[test]
    fn test_parse_standard_dent() {
        let parsed = parse_comment(Some("Damage Detection: Dent Logo: No"));
        assert_eq!(parsed.damage_detection, "Dent");
        assert_eq!(parsed.logo_or_type.kind, FlagKind::Logo);
        assert_eq!(parsed.logo_or_type.value, "No");
    }

    #[test]
    fn test_parse_standard_scratch() {
        let parsed = parse_comment(Some("Damage Detection: Scratch Logo: Yes"));
        assert_eq!(parsed.damage_detection, "Scratch");
        assert_eq!(parsed.logo(), Some("Yes"));
    }

    #[test]
    fn test_parse_case_insensitive_labels() {
        let parsed = parse_comment(Some("damage detection:   deep dent near handle   LOGO: yes"));
        assert_eq!(parsed.damage_detection, "deep dent near handle");
        assert_eq!(parsed.logo(), Some("yes"));
    }

    #[test]
    fn test_parse_damage_until_end_of_string() {
        let parsed = parse_comment(Some("Damage Detection: Scratch on Tailgate"));
        // "Tailgate" の T で切れない
        assert_eq!(parsed.damage_detection, "Scratch on Tailgate");
        assert_eq!(parsed.logo(), Some("No"));
    }

    #[test]
    fn test_parse_logo_without_damage_label() {
        let parsed = parse_comment(Some("Logo: yes"));
        assert_eq!(parsed.damage_detection, "NA");
        assert_eq!(parsed.logo(), Some("yes"));
    }

    // =============================================
    // Alternate語彙
    // =============================================

    #[test]
    fn test_parse_alternate_no_damage() {
        let parsed = parse_comment(Some("Dent/Damage: No damage Type: Major"));
        assert_eq!(parsed.damage_detection, "No damage");
        assert_eq!(parsed.logo_or_type.kind, FlagKind::Type);
        assert_eq!(parsed.damage_type(), Some("Major"));
    }

    #[test]
    fn test_parse_alternate_with_extra_text() {
        let parsed = parse_comment(Some("Dent/Damage: Dent on door, checked twice Type: minor"));
        assert_eq!(parsed.damage_detection, "Dent on door, checked twice");
        assert_eq!(parsed.damage_type(), Some("minor"));
    }

    #[test]
    fn test_parse_alternate_unknown_type_keeps_default() {
        let parsed = parse_comment(Some("Dent/Damage: Scratch Type: Severe"));
        assert_eq!(parsed.damage_detection, "Scratch");
        assert_eq!(parsed.logo_or_type, LogoOrType::default());
    }

    // =============================================
    // 既定値・冪等性
    // =============================================

    #[test]
    fn test_parse_none() {
        assert_eq!(parse_comment(None), ParsedComment::default());
    }

    #[test]
    fn test_parse_empty_and_blank() {
        assert_eq!(parse_comment(Some("")), ParsedComment::default());
        assert_eq!(parse_comment(Some("   \n")), ParsedComment::default());
    }

    #[test]
    fn test_parse_empty_capture_keeps_default() {
        let parsed = parse_comment(Some("Damage Detection: Logo: Yes"));
        assert_eq!(parsed.damage_detection, "NA");
        assert_eq!(parsed.logo(), Some("Yes"));
    }

    #[test]
    fn test_parse_idempotent() {
        let text = "Damage Detection: Dent and Scratch Logo: No";
        assert_eq!(parse_comment(Some(text)), parse_comment(Some(text)));
    }

    #[test]
    fn test_detect_vocabulary() {
        assert_eq!(
            CommentVocabulary::detect("Damage Detection: Dent Logo: No"),
            CommentVocabulary::Standard
        );
        assert_eq!(
            CommentVocabulary::detect("Dent/Damage: Dent"),
            CommentVocabulary::Alternate
        );
        assert_eq!(CommentVocabulary::detect("Type: Minor"), CommentVocabulary::Alternate);
        assert_eq!(CommentVocabulary::detect(""), CommentVocabulary::Standard);
    }

    // =============================================
    // Strictモード
    // =============================================

    #[test]
    fn test_strict_rejects_unlabeled_text() {
        let result = parse_comment_with_mode(Some("looks fine to me"), ParseMode::Strict);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_strict_accepts_absent_comment() {
        let result = parse_comment_with_mode(None, ParseMode::Strict).unwrap();
        assert_eq!(result, ParsedComment::default());
    }

    #[test]
    fn test_lenient_accepts_unlabeled_text() {
        let result = parse_comment_with_mode(Some("looks fine to me"), ParseMode::Lenient).unwrap();
        assert_eq!(result, ParsedComment::default());
    }

    #[test]
    fn test_has_known_label() {
        assert!(has_known_label("Dent/Damage: none"));
        assert!(has_known_label("logo: NO"));
        assert!(!has_known_label("tissue present"));
    }
}
