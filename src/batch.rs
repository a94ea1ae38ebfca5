//! 一括出力
//!
//! 写真ごとの合成は互いに独立なので並列に処理する。

use crate::compositor::{Compositor, ExportFormat};
use crate::external::{decode_image, ArtifactRef, ArtifactSink, ImageSource};
use crate::geometry::{CoordinateFrame, DisplayRect, Rectangle};
use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// 出力計画の1件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub photo_id: String,
    pub image: String,
    /// 矩形を描いたときの表示サイズ
    pub display: DisplayRect,
    #[serde(default)]
    pub rects: Vec<Rectangle>,
}

/// 1件の結果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub photo_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.artifact.is_some()
    }
}

fn export_entry(
    entry: &BatchEntry,
    source: &(dyn ImageSource + Sync),
    sink: &(dyn ArtifactSink + Sync),
    compositor: &Compositor,
    format: ExportFormat,
) -> Result<ArtifactRef> {
    let image = decode_image(&source.fetch(&entry.image)?)?;
    let frame = CoordinateFrame::measure(entry.display, image.width(), image.height());
    compositor.export(&image, &frame, &entry.rects, format, sink)
}

/// 計画の全件を合成・出力（入力順に結果を返す）
///
/// 1件の失敗で全体は止めない。
pub fn run_batch(
    entries: &[BatchEntry],
    source: &(dyn ImageSource + Sync),
    sink: &(dyn ArtifactSink + Sync),
    compositor: &Compositor,
    format: ExportFormat,
    show_progress: bool,
) -> Vec<BatchOutcome> {
    let progress = if show_progress {
        let pb = ProgressBar::new(entries.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let outcomes: Vec<BatchOutcome> = entries
        .par_iter()
        .map(|entry| {
            let result = export_entry(entry, source, sink, compositor, format);
            progress.inc(1);
            match result {
                Ok(artifact) => BatchOutcome {
                    photo_id: entry.photo_id.clone(),
                    artifact: Some(artifact),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(photo = %entry.photo_id, error = %e, "出力に失敗");
                    BatchOutcome {
                        photo_id: entry.photo_id.clone(),
                        artifact: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect();

    progress.finish_and_clear();
    outcomes
}
