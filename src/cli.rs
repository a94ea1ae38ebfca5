use clap::{Parser, Subcommand, ValueEnum};
use crate::geometry::{DisplayRect, Rectangle};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "damage-review")]
#[command(about = "車両損傷点検レビュー: コメント集計と損傷矩形の合成出力", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 点検のコメントを分類・集計
    Summary {
        /// 点検JSONファイル、または写真フォルダ
        #[arg(required = true)]
        input: PathBuf,

        /// クライアント名（語彙・レイアウトの解決に使用。省略時は点検JSONの値）
        #[arg(short, long)]
        client: Option<String>,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// コメント1件を解析して表示
    Parse {
        /// コメント本文
        comment: String,

        /// 既知のラベルがなければエラーにする
        #[arg(long)]
        strict: bool,
    },

    /// 写真1枚に損傷矩形を焼き込んで出力
    Annotate {
        /// 元画像
        #[arg(required = true)]
        image: PathBuf,

        /// 矩形を描いたときの表示サイズ (例: 800x600)
        #[arg(short, long)]
        display: DisplayRect,

        /// 表示座標の矩形 x,y,w,h（複数指定可）
        #[arg(short, long = "rect", value_parser = parse_rect)]
        rects: Vec<Rectangle>,

        /// 出力形式
        #[arg(short, long, default_value = "jpeg")]
        format: OutputFormat,

        /// 出力ディレクトリ
        #[arg(short, long, default_value = "annotated")]
        out_dir: PathBuf,
    },

    /// 出力計画JSONに従って一括出力
    Batch {
        /// 出力計画JSON（BatchEntryの配列）
        #[arg(required = true)]
        plan: PathBuf,

        /// 画像参照の基準ディレクトリ
        #[arg(short, long, default_value = ".")]
        images: PathBuf,

        /// 出力ディレクトリ
        #[arg(short, long, default_value = "annotated")]
        out_dir: PathBuf,

        /// 出力形式
        #[arg(short, long, default_value = "jpeg")]
        format: OutputFormat,
    },

    /// 設定を表示
    Config {
        /// 現在の設定を表示
        #[arg(long)]
        show: bool,

        /// 既定値で設定ファイルを作成
        #[arg(long)]
        init: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn is_png(&self) -> bool {
        matches!(self, OutputFormat::Png)
    }
}

/// `x,y,w,h` 形式の矩形
pub fn parse_rect(s: &str) -> Result<Rectangle, String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("数値が不正: {} ({})", s, e))?;

    match values.as_slice() {
        [x, y, w, h] if *w >= 0.0 && *h >= 0.0 => Ok(Rectangle::new(*x, *y, *w, *h)),
        [_, _, _, _] => Err(format!("幅・高さは0以上: {}", s)),
        _ => Err(format!("x,y,w,h の4値で指定してください: {}", s)),
    }
}
