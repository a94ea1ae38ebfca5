use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("表示サイズが未計測です（{width}x{height}）。計測後に再実行してください")]
    UnmeasuredGeometry { width: f64, height: f64 },

    #[error("画像がまだ読み込まれていません: {0}")]
    ImageNotLoaded(String),

    #[error("画像を取得できません: {0}")]
    ImageUnavailable(String),

    #[error("画像デコードエラー: {0}")]
    ImageDecode(String),

    #[error("画像エンコードエラー: {0}")]
    ImageEncode(String),

    #[error("矩形の描画中です（写真: {0}）。ドラッグ確定後に出力してください")]
    DragInProgress(String),

    #[error("写真が見つかりません: {0}")]
    UnknownPhoto(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("コメント処理エラー: {0}")]
    Comment(#[from] damage_review_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl ReviewError {
    /// 前提条件（計測・デコード・ドラッグ確定）が満たされれば再試行できるエラー
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ReviewError::UnmeasuredGeometry { .. }
                | ReviewError::ImageNotLoaded(_)
                | ReviewError::DragInProgress(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReviewError>;
