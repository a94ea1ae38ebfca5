use super::write_atomic;
use crate::error::{ReviewError, Result};
use damage_review_common::{CommentFields, Inspection};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// 写真コメントの保存先
///
/// コアはテキストのみを正とし、解析結果は保存しない。
pub trait CommentStore {
    fn comments(&self, photo_id: &str) -> Result<CommentFields>;
    fn update(&mut self, photo_id: &str, fields: CommentFields) -> Result<()>;
}

/// 点検JSONファイルをバックエンドとするストア
#[derive(Debug, Clone)]
pub struct JsonInspectionStore {
    path: PathBuf,
    inspection: Inspection,
}

impl JsonInspectionStore {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReviewError::FileNotFound(path.display().to_string()));
        }
        let reader = BufReader::new(File::open(path)?);
        let inspection: Inspection = serde_json::from_reader(reader)?;
        Ok(Self {
            path: path.to_path_buf(),
            inspection,
        })
    }

    pub fn inspection(&self) -> &Inspection {
        &self.inspection
    }

    pub fn into_inspection(self) -> Inspection {
        self.inspection
    }

    /// 一時ファイル経由で保存（書き込み失敗で元ファイルを壊さない）
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_vec_pretty(&self.inspection)?;
        write_atomic(&self.path, &content)?;
        Ok(())
    }
}

impl CommentStore for JsonInspectionStore {
    fn comments(&self, photo_id: &str) -> Result<CommentFields> {
        self.inspection
            .photos
            .iter()
            .find(|p| p.id == photo_id)
            .map(|p| p.comment.clone())
            .ok_or_else(|| ReviewError::UnknownPhoto(photo_id.to_string()))
    }

    fn update(&mut self, photo_id: &str, fields: CommentFields) -> Result<()> {
        let photo = self
            .inspection
            .photos
            .iter_mut()
            .find(|p| p.id == photo_id)
            .ok_or_else(|| ReviewError::UnknownPhoto(photo_id.to_string()))?;
        photo.comment = fields;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const INSPECTION: &str = r#"{
        "inspectionId": "INS-7",
        "client": "fleet-b",
        "photos": [
            {"id": "front", "image": "front.jpg", "comment": {"primary": "Dent/Damage: Dent Type: Major"}},
            {"id": "rear", "image": "rear.jpg"}
        ]
    }"#;

    #[test]
    fn test_load_and_read_comments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inspection.json");
        std::fs::write(&path, INSPECTION).unwrap();

        let store = JsonInspectionStore::load(&path).unwrap();
        assert_eq!(store.inspection().photos.len(), 2);
        assert_eq!(
            store.comments("front").unwrap().primary.as_deref(),
            Some("Dent/Damage: Dent Type: Major")
        );
        assert!(matches!(store.comments("side"), Err(ReviewError::UnknownPhoto(_))));
    }

    #[test]
    fn test_update_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inspection.json");
        std::fs::write(&path, INSPECTION).unwrap();

        let mut store = JsonInspectionStore::load(&path).unwrap();
        let fields = CommentFields {
            primary: Some("Dent/Damage: Scratch Type: Minor".to_string()),
            incremental: Some("New scratch".to_string()),
        };
        store.update("rear", fields.clone()).unwrap();

        let reloaded = JsonInspectionStore::load(&path).unwrap();
        assert_eq!(reloaded.comments("rear").unwrap(), fields);
    }

    #[test]
    fn test_failed_save_leaves_no_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inspection.json");
        std::fs::write(&path, INSPECTION).unwrap();
        let store = JsonInspectionStore::load(&path).unwrap();

        // 保存先がディレクトリになっていればリネームに失敗する
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        assert!(matches!(store.save(), Err(ReviewError::Io(_))));
        assert!(path.is_dir());

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let result = JsonInspectionStore::load(Path::new("/nonexistent/inspection.json"));
        assert!(matches!(result, Err(ReviewError::FileNotFound(_))));
    }
}
