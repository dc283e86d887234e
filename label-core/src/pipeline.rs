//! The batch fold: rows in, label artifacts and a skip list out.
//!
//! Slug claiming is order-dependent, so identifiers and slugs are fixed
//! in a sequential first pass; encoding and composition are pure per-row
//! functions of the results and run in a second pass. A row whose URL
//! exceeds QR capacity is skipped and reported, never truncated, and
//! never aborts the batch.

use tiny_skia::Pixmap;
use tracing::{debug, warn};

use crate::error::Error;
use crate::fonts::FontContext;
use crate::identity::{SlugBook, normalize_slug, resolve_identifier};
use crate::models::{GenConfig, Row, scalar_text};
use crate::{label, qr};

/// Everything produced for one surviving row.
#[derive(Debug)]
pub struct LabelArtifact {
    pub row_index: usize,
    pub identifier: String,
    pub slug: String,
    pub display_name: Option<String>,
    pub url: String,
    pub pixmap: Pixmap,
}

#[derive(Debug)]
pub struct SkippedRow {
    pub row_index: usize,
    pub identifier: String,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub artifacts: Vec<LabelArtifact>,
    pub skipped: Vec<SkippedRow>,
}

pub fn run_batch(
    rows: &[Row],
    cfg: &GenConfig,
    fonts: &FontContext,
) -> Result<BatchOutcome, Error> {
    cfg.validate()?;

    let mut book = SlugBook::new();
    let mut planned = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let identifier = resolve_identifier(row, &cfg.id_priority, i);
        let slug = book.claim(&normalize_slug(&identifier));
        planned.push((i, identifier, slug));
    }

    let mut outcome = BatchOutcome::default();
    for (i, identifier, slug) in planned {
        let url = format!("{}{}.html", cfg.base_url, slug);
        let display_name = cfg
            .display_field
            .as_ref()
            .and_then(|field| rows[i].get(field))
            .and_then(scalar_text);
        let composed = qr::encode(&url, cfg.label.ec).and_then(|code| {
            label::compose(&code, &identifier, display_name.as_deref(), &cfg.label, fonts)
        });
        match composed {
            Ok(pixmap) => {
                debug!(identifier = %identifier, slug = %slug, "label composed");
                outcome.artifacts.push(LabelArtifact {
                    row_index: i,
                    identifier,
                    slug,
                    display_name,
                    url,
                    pixmap,
                });
            }
            Err(error) => {
                warn!(identifier = %identifier, error = %error, "row skipped");
                outcome.skipped.push(SkippedRow {
                    row_index: i,
                    identifier,
                    error,
                });
            }
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LabelConfig;
    use crate::sheet;

    fn rows(json: &str) -> Vec<Row> {
        serde_json::from_str(json).unwrap()
    }

    fn test_config() -> GenConfig {
        GenConfig {
            base_url: "https://example.com/pages/".to_string(),
            id_priority: vec!["AssetID".to_string(), "Code".to_string()],
            display_field: Some("Name".to_string()),
            label: LabelConfig {
                // small modules keep test rasters cheap
                module_px: 2,
                ..LabelConfig::default()
            },
            ..GenConfig::default()
        }
    }

    fn test_fonts(cfg: &GenConfig) -> FontContext {
        FontContext::resolve(None, &cfg.label.font_family)
    }

    #[test]
    fn batch_produces_unique_slugs_and_urls() {
        let cfg = test_config();
        let fonts = test_fonts(&cfg);
        let batch = rows(
            r#"[
                {"AssetID": "LAB-1", "Name": "Microscope"},
                {"AssetID": "LAB 1"},
                {"AssetID": "LAB_1"},
                {"Code": "X9"}
            ]"#,
        );
        let outcome = run_batch(&batch, &cfg, &fonts).unwrap();
        assert_eq!(outcome.artifacts.len(), 4);
        assert!(outcome.skipped.is_empty());
        let slugs: Vec<&str> = outcome.artifacts.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, ["LAB-1", "LAB-1-2", "LAB_1", "X9"]);
        assert_eq!(
            outcome.artifacts[0].url,
            "https://example.com/pages/LAB-1.html"
        );
        assert_eq!(
            outcome.artifacts[0].display_name.as_deref(),
            Some("Microscope")
        );
        assert_eq!(outcome.artifacts[1].display_name, None);
    }

    #[test]
    fn blank_rows_fall_back_to_positional_identifiers() {
        let cfg = test_config();
        let fonts = test_fonts(&cfg);
        let batch = rows(r#"[{"Other": "x"}, {"AssetID": "A"}, {"AssetID": ""}]"#);
        let outcome = run_batch(&batch, &cfg, &fonts).unwrap();
        let ids: Vec<&str> = outcome
            .artifacts
            .iter()
            .map(|a| a.identifier.as_str())
            .collect();
        assert_eq!(ids, ["ROW-1", "A", "ROW-3"]);
    }

    #[test]
    fn oversized_row_is_skipped_without_aborting_the_batch() {
        let cfg = test_config();
        let fonts = test_fonts(&cfg);
        let huge = "x".repeat(3000);
        let json = format!(
            r#"[{{"AssetID": "ok-1"}}, {{"AssetID": "{huge}"}}, {{"AssetID": "ok-2"}}]"#
        );
        let outcome = run_batch(&rows(&json), &cfg, &fonts).unwrap();
        assert_eq!(outcome.artifacts.len(), 2);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].row_index, 1);
        assert!(matches!(
            outcome.skipped[0].error,
            Error::EncodingTooLarge { .. }
        ));
        let slugs: Vec<&str> = outcome.artifacts.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, ["ok-1", "ok-2"]);
    }

    #[test]
    fn invalid_geometry_aborts_before_any_row() {
        let mut cfg = test_config();
        cfg.sheet.rows = 0;
        let fonts = test_fonts(&cfg);
        let result = run_batch(&rows(r#"[{"AssetID": "A"}]"#), &cfg, &fonts);
        assert!(matches!(result, Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn empty_batch_is_not_an_error() {
        let cfg = test_config();
        let fonts = test_fonts(&cfg);
        let outcome = run_batch(&[], &cfg, &fonts).unwrap();
        assert!(outcome.artifacts.is_empty());
        assert!(outcome.skipped.is_empty());
        let pages = sheet::paginate(&[], &cfg.sheet);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].placements.is_empty());
    }

    #[test]
    fn reruns_are_idempotent() {
        let cfg = test_config();
        let fonts = test_fonts(&cfg);
        let batch = rows(
            r#"[
                {"AssetID": "LAB-1"},
                {"AssetID": "LAB 1"},
                {"AssetID": "เครื่องวัด pH"}
            ]"#,
        );
        let first = run_batch(&batch, &cfg, &fonts).unwrap();
        let second = run_batch(&batch, &cfg, &fonts).unwrap();
        let slugs = |o: &BatchOutcome| {
            o.artifacts
                .iter()
                .map(|a| a.slug.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(slugs(&first), slugs(&second));

        let dims = |o: &BatchOutcome| {
            o.artifacts
                .iter()
                .map(|a| (a.pixmap.width(), a.pixmap.height()))
                .collect::<Vec<_>>()
        };
        assert_eq!(dims(&first), dims(&second));
        let pages_a = sheet::paginate(&dims(&first), &cfg.sheet);
        let pages_b = sheet::paginate(&dims(&second), &cfg.sheet);
        assert_eq!(pages_a.len(), pages_b.len());
    }
}
