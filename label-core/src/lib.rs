//! Core pipeline for turning a tabular asset inventory into printable QR
//! label artifacts: stable per-row identifiers, batch-unique slugs, QR
//! encoding of the deep-link URL, fixed-layout label composition, and
//! multi-page grid pagination for a print sheet.

pub mod error;
pub mod fonts;
pub mod identity;
pub mod label;
pub mod models;
pub mod pipeline;
pub mod qr;
pub mod sheet;

pub use error::Error;
pub use fonts::{FontContext, TextExtents};
pub use identity::{SlugBook, normalize_slug, resolve_identifier};
pub use label::{compose, svg_escape, to_png_bytes};
pub use models::{EcStrength, GenConfig, LabelConfig, Row, SheetConfig, scalar_text};
pub use pipeline::{BatchOutcome, LabelArtifact, SkippedRow, run_batch};
pub use qr::{CodeMatrix, encode};
pub use sheet::{Placement, SheetPage, paginate, write_sheet_pdf};
