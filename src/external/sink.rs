use super::write_atomic;
use crate::error::Result;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// 保存済み成果物の参照（URLまたはトークン）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(pub String);

impl std::fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// エンコード済み画像の受け取り先
pub trait ArtifactSink {
    fn store(&self, blob: &[u8], content_type: &str) -> Result<ArtifactRef>;
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        _ => "bin",
    }
}

/// 内容のSHA-256をファイル名にしてディレクトリへ保存
///
/// 同じ内容なら同じ参照になる。
#[derive(Debug, Clone)]
pub struct DirArtifactSink {
    dir: PathBuf,
}

impl DirArtifactSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, artifact: &ArtifactRef) -> PathBuf {
        self.dir.join(&artifact.0)
    }
}

impl ArtifactSink for DirArtifactSink {
    fn store(&self, blob: &[u8], content_type: &str) -> Result<ArtifactRef> {
        std::fs::create_dir_all(&self.dir)?;

        let hash = hex::encode(Sha256::digest(blob));
        let file_name = format!("{}.{}", hash, extension_for(content_type));
        let path = self.dir.join(&file_name);

        // 同じ内容なら同じ名前なので書き直さない
        if path.exists() {
            tracing::debug!(path = %path.display(), "保存済みの成果物を再利用");
            return Ok(ArtifactRef(file_name));
        }

        write_atomic(&path, blob)?;

        tracing::info!(path = %path.display(), bytes = blob.len(), "成果物を保存");
        Ok(ArtifactRef(file_name))
    }
}

/// `data:` URLとして返す（表示用）
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlSink;

impl ArtifactSink for DataUrlSink {
    fn store(&self, blob: &[u8], content_type: &str) -> Result<ArtifactRef> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(blob);
        Ok(ArtifactRef(format!("data:{};base64,{}", content_type, encoded)))
    }
}
