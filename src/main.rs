use anyhow::{Context, Result};
use clap::Parser;
use damage_review::cli::{Cli, Commands};
use damage_review::common::{
    parse_comment_with_mode, summarize, CommentVocabulary, LayoutPolicy, ParseMode,
    Photo, SummaryReport,
};
use damage_review::annotation::drop_undersized;
use damage_review::compositor::Compositor;
use damage_review::config::Config;
use damage_review::external::{
    decode_image, DirArtifactSink, FsImageSource, ImageSource, JsonInspectionStore,
};
use damage_review::geometry::CoordinateFrame;
use damage_review::{batch, scanner};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 点検JSONまたは写真フォルダからPhotoリストとクライアント名を読む
fn load_photos(input: &Path) -> Result<(Vec<Photo>, String)> {
    if input.is_dir() {
        let photos = scanner::load_folder_photos(input)?;
        return Ok((photos, String::new()));
    }

    let inspection = JsonInspectionStore::load(input)
        .with_context(|| format!("点検ファイルを読めません: {}", input.display()))?
        .into_inspection();
    Ok((inspection.photos, inspection.client))
}

fn print_report(report: &SummaryReport, vocabulary: CommentVocabulary, policy: &LayoutPolicy) {
    let c = &report.counts;
    let nav = &report.navigation;

    println!("語彙: {} / パネル {}枚・車内 {}枚", vocabulary, policy.panel_count, policy.interior_count);
    println!();
    println!("既存損傷: {}", c.pre_existing_damage_count);
    println!("  凹み (dent):      {:>3}  {}", c.dent_count, nav.dent.join(", "));
    println!("  傷 (scratch):     {:>3}  {}", c.scratch_count, nav.scratch.join(", "));
    println!("  その他損傷:       {:>3}  {}", c.general_damage_count, nav.general_damage.join(", "));
    println!("新規損傷 (追加):    {:>3}  {}", c.increment_count, nav.increment.join(", "));
    println!("ロゴなし部位:       {:>3}  {}", c.parts_without_logo_count, nav.without_logo.join(", "));
    println!("ロゴあり部位:       {:>3}  {}", c.parts_with_logo_count, nav.with_logo.join(", "));
    println!("床の汚れ:           {:>3}  {}", c.floor_dirt_count, nav.floor_dirt.join(", "));
    println!("ティッシュなし:     {:>3}  {}", c.tissue_missing_count, nav.tissue_missing.join(", "));
    println!("ボトルなし:         {:>3}  {}", c.bottle_missing_count, nav.bottle_missing.join(", "));
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Summary { input, client, json } => {
            let (photos, inspection_client) = load_photos(&input)?;
            let client = client.unwrap_or(inspection_client);
            let profile = config.profile_for(&client);

            let report = summarize(&photos, profile.vocabulary, &profile.layout);

            if json {
                let output = serde_json::json!({
                    "generatedAt": chrono::Local::now().to_rfc3339(),
                    "client": profile.name,
                    "vocabulary": profile.vocabulary,
                    "photos": photos.len(),
                    "counts": report.counts,
                    "navigation": report.navigation,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("🚗 damage-review - 点検集計 ({}枚)\n", photos.len());
                print_report(&report, profile.vocabulary, &profile.layout);
            }
        }

        Commands::Parse { comment, strict } => {
            let mode = if strict { ParseMode::Strict } else { ParseMode::Lenient };
            let parsed = parse_comment_with_mode(Some(&comment), mode)?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }

        Commands::Annotate { image, display, rects, format, out_dir } => {
            println!("🖍  damage-review - 損傷矩形の合成\n");

            let reference = image.to_string_lossy();
            let source = FsImageSource::new(".");
            let decoded = decode_image(&source.fetch(&reference)?)?;
            let frame = CoordinateFrame::measure(display, decoded.width(), decoded.height());
            println!(
                "- 原寸 {}x{} / 表示 {}x{} (倍率 x{:.3}, y{:.3})",
                frame.natural_width,
                frame.natural_height,
                frame.display_width,
                frame.display_height,
                frame.scale_x(),
                frame.scale_y()
            );

            let rects = drop_undersized(&rects, config.min_drag_size);
            let sink = DirArtifactSink::new(&out_dir);
            let artifact = Compositor::new(config.stroke_width).export(
                &decoded,
                &frame,
                &rects,
                config.export_format(format.is_png()),
                &sink,
            )?;
            println!("✔ 出力: {}", sink.path_for(&artifact).display());
        }

        Commands::Batch { plan, images, out_dir, format } => {
            println!("📦 damage-review - 一括出力\n");

            let content = std::fs::read_to_string(&plan)
                .with_context(|| format!("出力計画を読めません: {}", plan.display()))?;
            let mut entries: Vec<batch::BatchEntry> = serde_json::from_str(&content)?;
            for entry in &mut entries {
                entry.rects = drop_undersized(&entry.rects, config.min_drag_size);
            }

            let source = FsImageSource::new(&images);
            let sink = DirArtifactSink::new(&out_dir);
            let outcomes = batch::run_batch(
                &entries,
                &source,
                &sink,
                &Compositor::new(config.stroke_width),
                config.export_format(format.is_png()),
                true,
            );

            let ok = outcomes.iter().filter(|o| o.is_ok()).count();
            for outcome in outcomes.iter().filter(|o| !o.is_ok()) {
                println!(
                    "✖ {}: {}",
                    outcome.photo_id,
                    outcome.error.as_deref().unwrap_or("unknown error")
                );
            }
            println!("✔ {}/{}件を出力: {}", ok, outcomes.len(), out_dir.display());

            std::fs::create_dir_all(&out_dir)?;
            let report_path = out_dir.join("batch-result.json");
            std::fs::write(&report_path, serde_json::to_string_pretty(&outcomes)?)?;
        }

        Commands::Config { show, init } => {
            if init {
                config.save()?;
                println!("✔ 設定ファイルを作成しました: {}", Config::config_path()?.display());
            }

            if show || !init {
                println!("設定:");
                println!("  パス: {}", Config::config_path()?.display());
                println!("  JPEG品質: {}", config.export_quality);
                println!("  枠線の幅: {}px", config.stroke_width);
                println!("  最小ドラッグ: {}px", config.min_drag_size);
                println!("  既定の語彙: {}", config.default_vocabulary);
                for client in &config.clients {
                    println!(
                        "  クライアント {}: {} (パネル{}枚・車内{}枚)",
                        client.name, client.vocabulary, client.layout.panel_count, client.layout.interior_count
                    );
                }
            }
        }
    }

    Ok(())
}
