use crate::error::{ReviewError, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// 画像バイト列の取得元
///
/// 取得できない場合は `ReviewError::ImageUnavailable` を返す。
pub trait ImageSource {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>>;
}

/// ディレクトリ配下の画像ファイル
#[derive(Debug, Clone)]
pub struct FsImageSource {
    root: PathBuf,
}

impl FsImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ImageSource for FsImageSource {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        let path = self.resolve(reference);
        if !path.is_file() {
            return Err(ReviewError::ImageUnavailable(path.display().to_string()));
        }
        Ok(std::fs::read(&path)?)
    }
}

/// バイト列をデコード（原寸のピクセル面）
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| ReviewError::ImageDecode(e.to_string()))
}
