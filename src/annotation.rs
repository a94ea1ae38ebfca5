//! 損傷矩形アノテーション
//!
//! 写真ごとに表示座標の矩形リストと描画ON/OFFフラグを保持する。
//! 矩形はドラッグ確定でのみ追加され、明示的なクリアでのみ消える。
//! 編集セッション内のみの状態で、永続化はしない。

use crate::geometry::{Point, Rectangle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 誤クリック除けの最小サイズ（表示ピクセル）
pub const MIN_DRAG_SIZE: f64 = 5.0;

/// 写真1枚分の矩形リスト（追加順＝描画順、重複除去しない）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationSet(Vec<Rectangle>);

impl AnnotationSet {
    pub fn new(rects: Vec<Rectangle>) -> Self {
        Self(rects)
    }

    pub fn as_slice(&self) -> &[Rectangle] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rectangle> {
        self.0.iter()
    }
}

fn is_undersized(rect: &Rectangle, min_size: f64) -> bool {
    rect.width < min_size || rect.height < min_size
}

/// 最小サイズ未満の矩形を除く
///
/// CLIや出力計画など、ドラッグを経ずに渡された矩形にも同じしきい値を適用する。
pub fn drop_undersized(rects: &[Rectangle], min_size: f64) -> Vec<Rectangle> {
    rects
        .iter()
        .filter(|rect| {
            let small = is_undersized(rect, min_size);
            if small {
                tracing::warn!(x = rect.x, y = rect.y, w = rect.width, h = rect.height, min_size, "小さすぎる矩形を除外");
            }
            !small
        })
        .copied()
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    start: Point,
    current: Point,
}

#[derive(Debug, Clone, Default)]
struct PhotoAnnotations {
    set: AnnotationSet,
    drawing_enabled: bool,
    drag: Option<Drag>,
    /// 確定・クリアのたびに増える（プレビュー再描画の合図）
    revision: u64,
}

/// 全写真のアノテーション状態
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    photos: HashMap<String, PhotoAnnotations>,
    min_size: f64,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::with_min_size(MIN_DRAG_SIZE)
    }

    pub fn with_min_size(min_size: f64) -> Self {
        Self {
            photos: HashMap::new(),
            min_size,
        }
    }

    fn entry(&mut self, photo_id: &str) -> &mut PhotoAnnotations {
        self.photos.entry(photo_id.to_string()).or_default()
    }

    /// ドラッグ開始（描画ONの写真のみ）
    pub fn start_drag(&mut self, photo_id: &str, point: Point) -> bool {
        let state = self.entry(photo_id);
        if !state.drawing_enabled {
            return false;
        }
        state.drag = Some(Drag { start: point, current: point });
        true
    }

    /// ドラッグ中の仮矩形を更新（確定済みリストは変えない）
    pub fn update_drag(&mut self, photo_id: &str, point: Point) -> Option<Rectangle> {
        let drag = self.photos.get_mut(photo_id)?.drag.as_mut()?;
        drag.current = point;
        Some(Rectangle::from_corners(drag.start, drag.current))
    }

    /// ドラッグ確定
    ///
    /// 幅・高さのどちらかが最小サイズ未満なら破棄する（Noneを返す）。
    pub fn commit_drag(&mut self, photo_id: &str, point: Point) -> Option<Rectangle> {
        let min_size = self.min_size;
        let state = self.photos.get_mut(photo_id)?;
        let drag = state.drag.take()?;

        let rect = Rectangle::from_corners(drag.start, point);
        if is_undersized(&rect, min_size) {
            tracing::debug!(photo = photo_id, w = rect.width, h = rect.height, "小さすぎる矩形を破棄");
            return None;
        }

        state.set.0.push(rect);
        state.revision += 1;
        Some(rect)
    }

    /// ドラッグ中止（ポインタが画像外に出た等）
    pub fn cancel_drag(&mut self, photo_id: &str) {
        if let Some(state) = self.photos.get_mut(photo_id) {
            state.drag = None;
        }
    }

    /// 指定写真の矩形をすべて消す（他の写真には影響しない）
    pub fn clear(&mut self, photo_id: &str) {
        let state = self.entry(photo_id);
        state.set = AnnotationSet::default();
        state.drag = None;
        state.revision += 1;
    }

    /// 描画ON/OFFを切り替え、新しい状態を返す
    ///
    /// OFFにしたときは進行中のドラッグも破棄する。
    pub fn toggle_drawing(&mut self, photo_id: &str) -> bool {
        let state = self.entry(photo_id);
        state.drawing_enabled = !state.drawing_enabled;
        if !state.drawing_enabled {
            state.drag = None;
        }
        state.drawing_enabled
    }

    pub fn is_drawing_enabled(&self, photo_id: &str) -> bool {
        self.photos
            .get(photo_id)
            .map(|s| s.drawing_enabled)
            .unwrap_or(false)
    }

    pub fn is_dragging(&self, photo_id: &str) -> bool {
        self.photos
            .get(photo_id)
            .map(|s| s.drag.is_some())
            .unwrap_or(false)
    }

    /// いずれかの写真でドラッグ中か
    pub fn any_dragging(&self) -> bool {
        self.photos.values().any(|s| s.drag.is_some())
    }

    /// ドラッグ中の仮矩形（ライブプレビュー用）
    pub fn provisional(&self, photo_id: &str) -> Option<Rectangle> {
        let drag = self.photos.get(photo_id)?.drag?;
        Some(Rectangle::from_corners(drag.start, drag.current))
    }

    pub fn annotations(&self, photo_id: &str) -> &[Rectangle] {
        self.photos
            .get(photo_id)
            .map(|s| s.set.as_slice())
            .unwrap_or(&[])
    }

    /// 合成に渡すための現時点のコピー
    pub fn snapshot(&self, photo_id: &str) -> AnnotationSet {
        self.photos
            .get(photo_id)
            .map(|s| s.set.clone())
            .unwrap_or_default()
    }

    pub fn revision(&self, photo_id: &str) -> u64 {
        self.photos.get(photo_id).map(|s| s.revision).unwrap_or(0)
    }
}
