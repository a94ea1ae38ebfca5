//! 画像合成モジュール
//!
//! 元画像と損傷矩形を原寸解像度で合成する。表示サイズには依存しない。
//!
//! ## 処理フロー
//! 1. 白で塗りつぶし（透過PNGがJPEG化で黒くならないように）
//! 2. 元画像を原寸で配置
//! 3. 各矩形を X/Y 独立の倍率で原寸座標へ変換し、緑の枠線を描く
//!    （線幅は `max(scaleX, scaleY)` 倍）

use crate::error::{ReviewError, Result};
use crate::external::{ArtifactRef, ArtifactSink};
use crate::geometry::{CoordinateFrame, Rectangle};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgba, RgbaImage, RgbImage};

/// 枠線の色（明るい緑）
pub const ANNOTATION_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// 枠線の論理幅（表示ピクセル）
pub const DEFAULT_STROKE_WIDTH: f64 = 3.0;

/// 非可逆形式の最低品質
pub const MIN_EXPORT_QUALITY: u8 = 95;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// 出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Jpeg { quality: u8 },
    Png,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::Jpeg {
            quality: MIN_EXPORT_QUALITY,
        }
    }
}

impl ExportFormat {
    /// 品質は 95..=100 に丸める
    pub fn jpeg(quality: u8) -> Self {
        let clamped = quality.clamp(MIN_EXPORT_QUALITY, 100);
        if clamped != quality {
            tracing::warn!(requested = quality, used = clamped, "JPEG品質を補正");
        }
        ExportFormat::Jpeg { quality: clamped }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg { .. } => "image/jpeg",
            ExportFormat::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg { .. } => "jpg",
            ExportFormat::Png => "png",
        }
    }
}

/// 原寸合成器
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    stroke_width: f64,
    color: Rgba<u8>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(DEFAULT_STROKE_WIDTH)
    }
}

impl Compositor {
    pub fn new(stroke_width: f64) -> Self {
        Self {
            stroke_width,
            color: ANNOTATION_COLOR,
        }
    }

    /// 原寸での線幅（最低1px）
    pub fn natural_stroke_width(&self, frame: &CoordinateFrame) -> f64 {
        (self.stroke_width * frame.stroke_scale()).round().max(1.0)
    }

    /// 原寸解像度で合成
    ///
    /// 同じ入力なら常に同じピクセルを返す。
    ///
    /// # Errors
    /// * `UnmeasuredGeometry` - 表示サイズ未計測
    /// * `ImageNotLoaded` - 原寸サイズが0（未デコード）
    pub fn render(
        &self,
        source: &DynamicImage,
        frame: &CoordinateFrame,
        annotations: &[Rectangle],
    ) -> Result<RgbImage> {
        frame.ensure_measured()?;

        let (width, height) = (frame.natural_width, frame.natural_height);
        if width == 0 || height == 0 || source.width() == 0 || source.height() == 0 {
            return Err(ReviewError::ImageNotLoaded(format!(
                "natural size {}x{}",
                width, height
            )));
        }

        let pixels = source.to_rgba8();
        let mut canvas = if pixels.dimensions() == (width, height) {
            flatten_on_background(&pixels)
        } else {
            flatten_on_background(&imageops::resize(&pixels, width, height, FilterType::Triangle))
        };

        let stroke = self.natural_stroke_width(frame);
        for rect in annotations {
            stroke_rect(&mut canvas, &frame.to_natural(rect), stroke, self.color);
        }

        Ok(DynamicImage::ImageRgba8(canvas).to_rgb8())
    }

    /// 合成→エンコード→保存先へ
    ///
    /// エンコードまで成功した場合のみ保存先に渡す。
    pub fn export(
        &self,
        source: &DynamicImage,
        frame: &CoordinateFrame,
        annotations: &[Rectangle],
        format: ExportFormat,
        sink: &dyn ArtifactSink,
    ) -> Result<ArtifactRef> {
        let surface = self.render(source, frame, annotations)?;
        let blob = encode(&surface, format)?;
        tracing::debug!(
            width = surface.width(),
            height = surface.height(),
            rects = annotations.len(),
            bytes = blob.len(),
            "合成画像をエンコード"
        );
        sink.store(&blob, format.content_type())
    }
}

/// 合成結果をエンコード
pub fn encode(surface: &RgbImage, format: ExportFormat) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let (w, h) = surface.dimensions();

    let result = match format {
        ExportFormat::Jpeg { quality } => JpegEncoder::new_with_quality(&mut buf, quality)
            .write_image(surface.as_raw(), w, h, ExtendedColorType::Rgb8),
        ExportFormat::Png => {
            PngEncoder::new(&mut buf).write_image(surface.as_raw(), w, h, ExtendedColorType::Rgb8)
        }
    };
    result.map_err(|e| ReviewError::ImageEncode(e.to_string()))?;

    Ok(buf)
}

/// 白背景の上に重ねて不透明にする
fn flatten_on_background(pixels: &RgbaImage) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(pixels.width(), pixels.height(), BACKGROUND);
    for (x, y, p) in pixels.enumerate_pixels() {
        let alpha = u16::from(p[3]);
        let mix = |c: u8, bg: u8| {
            ((u16::from(c) * alpha + u16::from(bg) * (255 - alpha) + 127) / 255) as u8
        };
        canvas.put_pixel(
            x,
            y,
            Rgba([
                mix(p[0], BACKGROUND[0]),
                mix(p[1], BACKGROUND[1]),
                mix(p[2], BACKGROUND[2]),
                255,
            ]),
        );
    }
    canvas
}

/// 矩形の枠線を描く（線は輪郭線の中心に沿う）
fn stroke_rect(img: &mut RgbaImage, rect: &Rectangle, stroke: f64, color: Rgba<u8>) {
    let half = stroke / 2.0;
    let px = |v: f64| v.round() as i64;

    let (ol, ot, or, ob) = (
        px(rect.x - half),
        px(rect.y - half),
        px(rect.right() + half),
        px(rect.bottom() + half),
    );
    let (il, it, ir, ib) = (
        px(rect.x + half),
        px(rect.y + half),
        px(rect.right() - half),
        px(rect.bottom() - half),
    );

    if ir <= il || ib <= it {
        fill_rect(img, ol, ot, or, ob, color);
        return;
    }

    fill_rect(img, ol, ot, or, it, color);
    fill_rect(img, ol, ib, or, ob, color);
    fill_rect(img, ol, it, il, ib, color);
    fill_rect(img, ir, it, or, ib, color);
}

/// `[x0, x1) x [y0, y1)` を塗る（画像外はクリップ）
fn fill_rect(img: &mut RgbaImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgba<u8>) {
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    let (x0, x1) = (x0.clamp(0, w), x1.clamp(0, w));
    let (y0, y1) = (y0.clamp(0, h), y1.clamp(0, h));

    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DisplayRect;
    use image::Rgb;

    const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
    const GREY: Rgb<u8> = Rgb([128, 128, 128]);

    fn grey_source(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, GREY))
    }

    fn frame(dw: f64, dh: f64, nw: u32, nh: u32) -> CoordinateFrame {
        CoordinateFrame::measure(DisplayRect::new(dw, dh), nw, nh)
    }

    #[test]
    fn test_render_at_natural_resolution() {
        let out = Compositor::default()
            .render(&grey_source(800, 400), &frame(200.0, 100.0, 800, 400), &[])
            .unwrap();
        assert_eq!(out.dimensions(), (800, 400));
        assert_eq!(*out.get_pixel(0, 0), GREY);
    }

    #[test]
    fn test_rectangle_scaled_to_natural_space() {
        // 表示 (10,10,50,30) × 4倍 → 原寸 (40,40,200,120)、線幅 3×4=12
        let rect = Rectangle::new(10.0, 10.0, 50.0, 30.0);
        let out = Compositor::default()
            .render(&grey_source(800, 400), &frame(200.0, 100.0, 800, 400), &[rect])
            .unwrap();

        // 左辺: x = 34..46
        assert_eq!(*out.get_pixel(34, 100), GREEN);
        assert_eq!(*out.get_pixel(45, 100), GREEN);
        assert_eq!(*out.get_pixel(33, 100), GREY);
        assert_eq!(*out.get_pixel(46, 100), GREY);
        // 右辺: x = 234..246
        assert_eq!(*out.get_pixel(240, 100), GREEN);
        // 上辺・下辺
        assert_eq!(*out.get_pixel(140, 40), GREEN);
        assert_eq!(*out.get_pixel(140, 160), GREEN);
        // 内側は元画像のまま
        assert_eq!(*out.get_pixel(140, 100), GREY);
    }

    #[test]
    fn test_independent_axis_scaling() {
        let f = frame(400.0, 300.0, 800, 900); // sx=2, sy=3
        let natural = f.to_natural(&Rectangle::new(100.0, 100.0, 50.0, 50.0));
        assert_eq!(natural, Rectangle::new(200.0, 300.0, 100.0, 150.0));
        assert_eq!(Compositor::default().natural_stroke_width(&f), 9.0);
    }

    #[test]
    fn test_transparent_source_becomes_white() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0])));
        let out = Compositor::default()
            .render(&source, &frame(4.0, 4.0, 4, 4), &[])
            .unwrap();
        assert_eq!(*out.get_pixel(2, 2), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_source_resized_to_natural_frame() {
        let out = Compositor::default()
            .render(&grey_source(100, 50), &frame(100.0, 50.0, 200, 100), &[])
            .unwrap();
        assert_eq!(out.dimensions(), (200, 100));
    }

    #[test]
    fn test_render_is_deterministic() {
        let rects = [
            Rectangle::new(5.0, 5.0, 20.0, 20.0),
            Rectangle::new(50.0, 10.0, 30.0, 60.0),
        ];
        let c = Compositor::default();
        let f = frame(100.0, 100.0, 300, 300);
        let a = c.render(&grey_source(300, 300), &f, &rects).unwrap();
        let b = c.render(&grey_source(300, 300), &f, &rects).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_rect_outside_image_is_clipped() {
        let out = Compositor::default()
            .render(
                &grey_source(50, 50),
                &frame(50.0, 50.0, 50, 50),
                &[Rectangle::new(40.0, 40.0, 100.0, 100.0)],
            )
            .unwrap();
        assert_eq!(*out.get_pixel(40, 45), GREEN);
    }

    #[test]
    fn test_render_unmeasured_fails() {
        let result = Compositor::default().render(
            &grey_source(10, 10),
            &CoordinateFrame::unmeasured(10, 10),
            &[],
        );
        let err = result.unwrap_err();
        assert!(matches!(err, ReviewError::UnmeasuredGeometry { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_render_without_natural_size_fails() {
        let result = Compositor::default().render(&grey_source(10, 10), &frame(10.0, 10.0, 0, 0), &[]);
        assert!(matches!(result, Err(ReviewError::ImageNotLoaded(_))));
    }

    #[test]
    fn test_encode_formats() {
        let surface = RgbImage::from_pixel(16, 16, GREY);

        let jpeg = encode(&surface, ExportFormat::jpeg(95)).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let png = encode(&surface, ExportFormat::Png).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_jpeg_quality_floor() {
        assert_eq!(ExportFormat::jpeg(80), ExportFormat::Jpeg { quality: 95 });
        assert_eq!(ExportFormat::jpeg(98), ExportFormat::Jpeg { quality: 98 });
        assert_eq!(ExportFormat::jpeg(120), ExportFormat::Jpeg { quality: 100 });
        assert_eq!(ExportFormat::default().content_type(), "image/jpeg");
    }
}
