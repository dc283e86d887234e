//! labelgen — generate per-asset QR label artifacts from an inventory.
//!
//! Reads an ordered JSON array of rows plus a config file, then writes
//! one label PNG and one detail page per asset, an index page, a
//! slug → identifier map, and a multi-page print sheet PDF.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use label_core::{
    BatchOutcome, FontContext, GenConfig, Row, paginate, run_batch, to_png_bytes, write_sheet_pdf,
};
use serde_json::Value;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

mod pages;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate QR label artifacts from an asset inventory")]
struct Args {
    /// Inventory rows: a JSON array of objects, in table order
    rows: PathBuf,

    /// Generation config JSON; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "asset_qr_pages")]
    out: PathBuf,

    /// Override the configured base URL (should end with '/')
    #[arg(long)]
    base_url: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let mut config = load_config(args.config.as_deref())?;
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if !config.base_url.ends_with('/') {
        warn!(base_url = %config.base_url, "base URL does not end with '/'; links will be malformed");
    }

    let rows = load_rows(&args.rows)?;
    let fonts = FontContext::resolve(config.label.font_file.as_deref(), &config.label.font_family);
    if !fonts.has_fonts() {
        warn!("no usable font found; labels will carry codes without captions");
    }

    let outcome = run_batch(&rows, &config, &fonts)?;
    let summary = write_artifacts(&args.out, &config, &rows, &outcome)?;

    info!(
        labels = summary.labels,
        sheet_pages = summary.sheet_pages,
        skipped = summary.skipped.len(),
        out = %args.out.display(),
        "run complete"
    );
    if !summary.skipped.is_empty() {
        warn!(
            "{} row(s) skipped: {}",
            summary.skipped.len(),
            summary.skipped.join(", ")
        );
    }
    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GenConfig> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p)
                .with_context(|| format!("reading config {}", p.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", p.display()))
        }
        None => Ok(GenConfig::default()),
    }
}

fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading rows {}", path.display()))?;
    let rows: Vec<Row> =
        serde_json::from_str(&text).with_context(|| format!("parsing rows {}", path.display()))?;
    Ok(rows)
}

struct RunSummary {
    labels: usize,
    sheet_pages: usize,
    skipped: Vec<String>,
}

fn write_artifacts(
    out: &Path,
    config: &GenConfig,
    rows: &[Row],
    outcome: &BatchOutcome,
) -> Result<RunSummary> {
    let labels_dir = out.join("labels");
    let pages_dir = out.join("pages");
    fs::create_dir_all(&labels_dir)?;
    fs::create_dir_all(&pages_dir)?;

    let mut slug_map = serde_json::Map::new();
    let mut index_entries = Vec::new();
    for artifact in &outcome.artifacts {
        let png = to_png_bytes(&artifact.pixmap)
            .with_context(|| format!("encoding label for {}", artifact.identifier))?;
        fs::write(labels_dir.join(format!("{}.png", artifact.slug)), png)?;

        let fields = pages::ordered_fields(&rows[artifact.row_index], &config.page_field_order);
        let file_name = format!("{}.html", artifact.slug);
        fs::write(
            pages_dir.join(&file_name),
            pages::detail_page(&artifact.identifier, &fields),
        )?;

        slug_map.insert(
            artifact.slug.clone(),
            Value::String(artifact.identifier.clone()),
        );
        index_entries.push((artifact.identifier.clone(), file_name));
    }
    fs::write(pages_dir.join("index.html"), pages::index_page(&index_entries))?;
    fs::write(
        out.join("slug_map.json"),
        serde_json::to_vec_pretty(&Value::Object(slug_map))?,
    )?;

    let dims: Vec<(u32, u32)> = outcome
        .artifacts
        .iter()
        .map(|a| (a.pixmap.width(), a.pixmap.height()))
        .collect();
    let sheet_pages = paginate(&dims, &config.sheet);
    let images: Vec<_> = outcome.artifacts.iter().map(|a| &a.pixmap).collect();
    let pdf = write_sheet_pdf(&sheet_pages, &images, &config.sheet);
    fs::write(out.join("qr_labels_sheet.pdf"), pdf)?;

    Ok(RunSummary {
        labels: outcome.artifacts.len(),
        sheet_pages: sheet_pages.len(),
        skipped: outcome.skipped.iter().map(|s| s.identifier.clone()).collect(),
    })
}
