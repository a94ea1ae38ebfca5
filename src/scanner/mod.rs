//! 写真フォルダの読み込み
//!
//! 点検JSONがない場合に、フォルダ直下の画像をファイル名順に並べて
//! Photoリストを組み立てる。コメントは `comments.json`（ファイル名→コメント欄）から読む。

use crate::error::{ReviewError, Result};
use damage_review_common::{CommentFields, Photo};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const COMMENTS_FILE_NAME: &str = "comments.json";

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.exists() {
        return Err(ReviewError::FolderNotFound(folder.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy();
            if IMAGE_EXTENSIONS.iter().any(|e| ext_str.eq_ignore_ascii_case(e)) {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();

                images.push(ImageInfo {
                    path: path.to_path_buf(),
                    file_name,
                });
            }
        }
    }

    // ファイル名でソート（撮影順）
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// フォルダからPhotoリストを作成
///
/// 写真IDはファイル名。`comments.json` がなければコメントは空。
pub fn load_folder_photos(folder: &Path) -> Result<Vec<Photo>> {
    let images = scan_folder(folder)?;

    let comments_path = folder.join(COMMENTS_FILE_NAME);
    let mut comments: HashMap<String, CommentFields> = if comments_path.exists() {
        let content = std::fs::read_to_string(&comments_path)?;
        serde_json::from_str(&content)?
    } else {
        HashMap::new()
    };

    let photos = images
        .into_iter()
        .map(|info| Photo {
            comment: comments.remove(&info.file_name).unwrap_or_default(),
            image: info.path.to_string_lossy().to_string(),
            id: info.file_name,
        })
        .collect();

    for orphan in comments.keys() {
        tracing::warn!(file = %orphan, "コメントに対応する画像がありません");
    }

    Ok(photos)
}
