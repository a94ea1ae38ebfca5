//! 点検集計
//!
//! 写真リスト全体を解析・分類し、件数と「クリックで移動」用の
//! カテゴリ別写真IDリストにまとめる。差分更新は持たず、毎回全件から再計算する。

use crate::classifier::{classify, Classification};
use crate::parser::{has_known_label, parse_comment};
use crate::roles::{LayoutPolicy, PhotoRoleMap};
use crate::types::{CommentVocabulary, ParsedComment, Photo};
use serde::{Deserialize, Serialize};

/// 分類済みの写真
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedPhoto {
    pub photo_id: String,
    pub index: usize,
    pub parsed: ParsedComment,
    pub classification: Classification,
    pub has_incremental: bool,
}

/// 集計件数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCounts {
    pub dent_count: usize,
    pub scratch_count: usize,
    pub general_damage_count: usize,
    /// 既存損傷（dent + scratch + general）
    pub pre_existing_damage_count: usize,
    /// 追加コメントのある写真（再点検で見つかった新規損傷）
    pub increment_count: usize,
    pub parts_without_logo_count: usize,
    pub parts_with_logo_count: usize,
    pub floor_dirt_count: usize,
    pub tissue_missing_count: usize,
    pub bottle_missing_count: usize,
}

/// カテゴリ別の写真IDリスト（元の写真順）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationIndex {
    pub dent: Vec<String>,
    pub scratch: Vec<String>,
    pub general_damage: Vec<String>,
    pub increment: Vec<String>,
    pub without_logo: Vec<String>,
    pub with_logo: Vec<String>,
    pub floor_dirt: Vec<String>,
    pub tissue_missing: Vec<String>,
    pub bottle_missing: Vec<String>,
}

impl NavigationIndex {
    /// 件数はリスト長から導出する
    pub fn counts(&self) -> SummaryCounts {
        SummaryCounts {
            dent_count: self.dent.len(),
            scratch_count: self.scratch.len(),
            general_damage_count: self.general_damage.len(),
            pre_existing_damage_count: self.dent.len()
                + self.scratch.len()
                + self.general_damage.len(),
            increment_count: self.increment.len(),
            parts_without_logo_count: self.without_logo.len(),
            parts_with_logo_count: self.with_logo.len(),
            floor_dirt_count: self.floor_dirt.len(),
            tissue_missing_count: self.tissue_missing.len(),
            bottle_missing_count: self.bottle_missing.len(),
        }
    }
}

/// 集計結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub counts: SummaryCounts,
    pub navigation: NavigationIndex,
}

/// 写真リストを順に解析・分類
pub fn classify_photos(
    photos: &[Photo],
    vocabulary: CommentVocabulary,
    policy: &LayoutPolicy,
) -> Vec<ClassifiedPhoto> {
    let roles = PhotoRoleMap::build(photos.len(), policy);

    photos
        .iter()
        .enumerate()
        .map(|(index, photo)| {
            let text = photo.comment.primary_text();
            if let Some(t) = text.filter(|t| !t.trim().is_empty()) {
                if !has_known_label(t) {
                    tracing::warn!(photo = %photo.id, "コメントに既知のラベルがありません（既定値で分類）");
                }
            }

            let parsed = parse_comment(text);
            let classification = classify(&parsed, text, roles.role(index), vocabulary);

            ClassifiedPhoto {
                photo_id: photo.id.clone(),
                index,
                parsed,
                classification,
                has_incremental: photo.comment.has_incremental(),
            }
        })
        .collect()
}

/// 写真リストを集計
///
/// 入力が同じなら何度呼んでも同じ件数・同じ順序のリストになる。
pub fn summarize(
    photos: &[Photo],
    vocabulary: CommentVocabulary,
    policy: &LayoutPolicy,
) -> SummaryReport {
    let classified = classify_photos(photos, vocabulary, policy);
    let mut nav = NavigationIndex::default();

    for record in &classified {
        let id = || record.photo_id.clone();
        let c = &record.classification;

        if c.has_dent() {
            nav.dent.push(id());
        } else if c.has_scratch() {
            nav.scratch.push(id());
        } else if c.has_general_damage() {
            nav.general_damage.push(id());
        }

        if record.has_incremental {
            nav.increment.push(id());
        }

        if c.has_no_logo == Some(true) {
            nav.without_logo.push(id());
        }
        if c.has_logo == Some(true) {
            nav.with_logo.push(id());
        }

        if c.amenities.floor_dirt {
            nav.floor_dirt.push(id());
        }
        if c.amenities.tissue_missing {
            nav.tissue_missing.push(id());
        }
        if c.amenities.bottle_missing {
            nav.bottle_missing.push(id());
        }
    }

    let counts = nav.counts();
    tracing::debug!(
        photos = photos.len(),
        damages = counts.pre_existing_damage_count,
        increments = counts.increment_count,
        "集計完了"
    );

    SummaryReport {
        counts,
        navigation: nav,
    }
}
