//! レビューセッション
//!
//! 写真ごとのデコード済み画像・現在の座標系・アノテーションを束ね、
//! ライブプレビューと出力を提供する。
//! 出力時は呼び出し時点のアノテーションをコピーして合成器に渡す。

use crate::annotation::AnnotationStore;
use crate::compositor::{Compositor, ExportFormat};
use crate::config::Config;
use crate::error::{ReviewError, Result};
use crate::external::{decode_image, ArtifactRef, ArtifactSink, ImageSource};
use crate::geometry::{CoordinateFrame, DisplayRect, Point, Rectangle};
use damage_review_common::Photo;
use image::{DynamicImage, RgbImage};
use std::collections::HashMap;

struct LoadedPhoto {
    image: DynamicImage,
    frame: CoordinateFrame,
}

/// プレビューのキャッシュキー
#[derive(Debug, Clone, Copy, PartialEq)]
struct PreviewKey {
    revision: u64,
    frame: CoordinateFrame,
}

pub struct ReviewSession {
    annotations: AnnotationStore,
    photos: HashMap<String, LoadedPhoto>,
    previews: HashMap<String, (PreviewKey, RgbImage)>,
    compositor: Compositor,
}

impl Default for ReviewSession {
    fn default() -> Self {
        Self::new(Compositor::default(), AnnotationStore::new())
    }
}

impl ReviewSession {
    pub fn new(compositor: Compositor, annotations: AnnotationStore) -> Self {
        Self {
            annotations,
            photos: HashMap::new(),
            previews: HashMap::new(),
            compositor,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Compositor::new(config.stroke_width),
            AnnotationStore::with_min_size(config.min_drag_size),
        )
    }

    /// 画像を取得・デコードして登録（表示サイズは未計測）
    pub fn load_photo(&mut self, photo: &Photo, source: &dyn ImageSource) -> Result<CoordinateFrame> {
        let bytes = source.fetch(&photo.image)?;
        let image = decode_image(&bytes)?;
        Ok(self.insert_image(&photo.id, image))
    }

    /// デコード済み画像を登録
    pub fn insert_image(&mut self, photo_id: &str, image: DynamicImage) -> CoordinateFrame {
        let frame = CoordinateFrame::unmeasured(image.width(), image.height());
        tracing::debug!(photo = photo_id, width = image.width(), height = image.height(), "画像を登録");
        self.photos
            .insert(photo_id.to_string(), LoadedPhoto { image, frame });
        self.previews.remove(photo_id);
        frame
    }

    /// レイアウト変化（リサイズ・再読込）後の再計測
    pub fn remeasure(&mut self, photo_id: &str, display: DisplayRect) -> Result<CoordinateFrame> {
        let photo = self.loaded_mut(photo_id)?;
        photo.frame = CoordinateFrame::measure(
            display,
            photo.frame.natural_width,
            photo.frame.natural_height,
        );
        Ok(photo.frame)
    }

    pub fn frame(&self, photo_id: &str) -> Option<CoordinateFrame> {
        self.photos.get(photo_id).map(|p| p.frame)
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    pub fn toggle_drawing(&mut self, photo_id: &str) -> bool {
        self.annotations.toggle_drawing(photo_id)
    }

    pub fn start_drag(&mut self, photo_id: &str, point: Point) -> bool {
        self.annotations.start_drag(photo_id, point)
    }

    pub fn update_drag(&mut self, photo_id: &str, point: Point) -> Option<Rectangle> {
        self.annotations.update_drag(photo_id, point)
    }

    pub fn commit_drag(&mut self, photo_id: &str, point: Point) -> Option<Rectangle> {
        self.annotations.commit_drag(photo_id, point)
    }

    pub fn cancel_drag(&mut self, photo_id: &str) {
        self.annotations.cancel_drag(photo_id)
    }

    pub fn clear(&mut self, photo_id: &str) {
        self.annotations.clear(photo_id)
    }

    /// ライブプレビュー（原寸）
    ///
    /// 確定・クリア・再計測があったときだけ再描画する。
    pub fn preview(&mut self, photo_id: &str) -> Result<&RgbImage> {
        let photo = self.loaded(photo_id)?;
        let key = PreviewKey {
            revision: self.annotations.revision(photo_id),
            frame: photo.frame,
        };

        let stale = self
            .previews
            .get(photo_id)
            .map(|(cached, _)| *cached != key)
            .unwrap_or(true);

        if stale {
            let surface = self.compositor.render(
                &photo.image,
                &photo.frame,
                self.annotations.annotations(photo_id),
            )?;
            self.previews.insert(photo_id.to_string(), (key, surface));
        }

        self.previews
            .get(photo_id)
            .map(|(_, surface)| surface)
            .ok_or_else(|| ReviewError::ImageNotLoaded(photo_id.to_string()))
    }

    /// 合成画像を出力
    ///
    /// ドラッグ中は `DragInProgress`。確定済みの最新アノテーションを使う。
    pub fn export(
        &self,
        photo_id: &str,
        format: ExportFormat,
        sink: &dyn ArtifactSink,
    ) -> Result<ArtifactRef> {
        if self.annotations.is_dragging(photo_id) {
            return Err(ReviewError::DragInProgress(photo_id.to_string()));
        }

        let photo = self.loaded(photo_id)?;
        let snapshot = self.annotations.snapshot(photo_id);
        let artifact = self.compositor.export(
            &photo.image,
            &photo.frame,
            snapshot.as_slice(),
            format,
            sink,
        )?;

        tracing::info!(photo = photo_id, rects = snapshot.len(), artifact = %artifact, "合成画像を出力");
        Ok(artifact)
    }

    fn loaded(&self, photo_id: &str) -> Result<&LoadedPhoto> {
        self.photos
            .get(photo_id)
            .ok_or_else(|| ReviewError::ImageNotLoaded(photo_id.to_string()))
    }

    fn loaded_mut(&mut self, photo_id: &str) -> Result<&mut LoadedPhoto> {
        self.photos
            .get_mut(photo_id)
            .ok_or_else(|| ReviewError::ImageNotLoaded(photo_id.to_string()))
    }
}
