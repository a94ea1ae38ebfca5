//! 外部コラボレーター
//!
//! コアが依存する抽象契約と、そのファイルシステム実装:
//! - ImageSource: 画像参照からバイト列を取得
//! - ArtifactSink: 合成済み画像を受け取り参照を返す
//! - CommentStore: 写真のコメント欄の読み書き

mod comment_store;
mod image_source;
mod sink;

pub use comment_store::{CommentStore, JsonInspectionStore};
pub use image_source::{decode_image, FsImageSource, ImageSource};
pub use sink::{ArtifactRef, ArtifactSink, DataUrlSink, DirArtifactSink};

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// 同じディレクトリの一時ファイルに書いてからリネームする
///
/// 一時ファイル名は呼び出しごとに一意（並行書き込みで衝突しない）。
/// 失敗時は途中のファイルを残さない。
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let seq = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp = dir.join(format!(".{}.{}-{}.tmp", file_name, std::process::id(), seq));

    if let Err(e) = std::fs::write(&tmp, bytes).and_then(|_| std::fs::rename(&tmp, path)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}
