//! 座標変換モジュール
//!
//! 表示座標（CSS等で拡縮された画面上のピクセル）と
//! 原寸座標（画像本来のピクセル）の変換。X/Yの倍率は独立に扱う。

use crate::error::{ReviewError, Result};
use serde::{Deserialize, Serialize};

/// 点（表示座標）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 矩形
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// 対角2点から正規化した矩形（幅・高さは非負）
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// 画面上で計測した画像要素のサイズ
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayRect {
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// 幅・高さとも正なら計測済み
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

impl std::str::FromStr for DisplayRect {
    type Err = String;

    /// `800x600` 形式
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(|| format!("WxH形式で指定してください: {}", s))?;
        let width = w.trim().parse::<f64>().map_err(|e| format!("幅が不正: {}", e))?;
        let height = h.trim().parse::<f64>().map_err(|e| format!("高さが不正: {}", e))?;
        Ok(Self { width, height })
    }
}

/// 表示サイズと原寸から各軸の倍率を計算
///
/// 表示サイズが0（未計測・非表示）の軸は 1.0 にフォールバックする。
/// 呼び出し側は計測済みになるまで合成を待つこと。
pub fn scale_factors(display: DisplayRect, natural_width: u32, natural_height: u32) -> (f64, f64) {
    let scale = |natural: u32, shown: f64| {
        if shown > 0.0 {
            f64::from(natural) / shown
        } else {
            1.0
        }
    };
    (
        scale(natural_width, display.width),
        scale(natural_height, display.height),
    )
}

/// 1枚の写真の座標系
///
/// レイアウトが変わるたびに `measure` で作り直す値オブジェクト。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateFrame {
    pub display_width: f64,
    pub display_height: f64,
    pub natural_width: u32,
    pub natural_height: u32,
}

impl CoordinateFrame {
    pub fn measure(display: DisplayRect, natural_width: u32, natural_height: u32) -> Self {
        Self {
            display_width: display.width,
            display_height: display.height,
            natural_width,
            natural_height,
        }
    }

    /// 表示前（未計測）の座標系
    pub fn unmeasured(natural_width: u32, natural_height: u32) -> Self {
        Self::measure(DisplayRect::default(), natural_width, natural_height)
    }

    pub fn display(&self) -> DisplayRect {
        DisplayRect::new(self.display_width, self.display_height)
    }

    pub fn is_measured(&self) -> bool {
        self.display().is_measured()
    }

    /// 未計測なら合成不可
    pub fn ensure_measured(&self) -> Result<()> {
        if self.is_measured() {
            Ok(())
        } else {
            Err(ReviewError::UnmeasuredGeometry {
                width: self.display_width,
                height: self.display_height,
            })
        }
    }

    pub fn scale_x(&self) -> f64 {
        scale_factors(self.display(), self.natural_width, self.natural_height).0
    }

    pub fn scale_y(&self) -> f64 {
        scale_factors(self.display(), self.natural_width, self.natural_height).1
    }

    /// 線幅の倍率（大きい方の軸）
    pub fn stroke_scale(&self) -> f64 {
        self.scale_x().max(self.scale_y())
    }

    /// 表示座標の矩形を原寸座標へ
    pub fn to_natural(&self, rect: &Rectangle) -> Rectangle {
        let (sx, sy) = (self.scale_x(), self.scale_y());
        Rectangle {
            x: rect.x * sx,
            y: rect.y * sy,
            width: rect.width * sx,
            height: rect.height * sy,
        }
    }

    /// 原寸座標の点を表示座標へ
    pub fn to_display(&self, point: Point) -> Point {
        Point {
            x: point.x / self.scale_x(),
            y: point.y / self.scale_y(),
        }
    }
}
