use crate::compositor::{ExportFormat, DEFAULT_STROKE_WIDTH, MIN_EXPORT_QUALITY};
use crate::annotation::MIN_DRAG_SIZE;
use crate::error::{ReviewError, Result};
use damage_review_common::{CommentVocabulary, LayoutPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CONFIG_ENV: &str = "DAMAGE_REVIEW_CONFIG";

/// クライアント別設定（語彙と撮影レイアウト）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    pub name: String,

    #[serde(default)]
    pub vocabulary: CommentVocabulary,

    #[serde(default)]
    pub layout: LayoutPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub export_quality: u8,
    pub stroke_width: f64,
    pub min_drag_size: f64,
    pub default_vocabulary: CommentVocabulary,
    pub clients: Vec<ClientProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            export_quality: MIN_EXPORT_QUALITY,
            stroke_width: DEFAULT_STROKE_WIDTH,
            min_drag_size: MIN_DRAG_SIZE,
            default_vocabulary: CommentVocabulary::Standard,
            clients: Vec::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        // 環境変数を優先
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| ReviewError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("damage-review").join("config.json"))
    }

    /// クライアント名から設定を解決（大文字小文字は無視）
    ///
    /// 未登録のクライアントは既定の語彙・レイアウトになる。
    pub fn profile_for(&self, client: &str) -> ClientProfile {
        self.clients
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(client.trim()))
            .cloned()
            .unwrap_or_else(|| ClientProfile {
                name: client.to_string(),
                vocabulary: self.default_vocabulary,
                layout: LayoutPolicy::default(),
            })
    }

    pub fn export_format(&self, png: bool) -> ExportFormat {
        if png {
            ExportFormat::Png
        } else {
            ExportFormat::jpeg(self.export_quality)
        }
    }
}
