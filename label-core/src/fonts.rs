//! Two-tier font resolution and text measurement.
//!
//! Resolution never fails: a configured font file is loaded first, system
//! discovery fills in the rest, and the preferred family (or the first
//! face found) is mapped onto the generic `sans-serif` family used by the
//! label SVG. With no usable face at all, composition still succeeds —
//! captions are omitted and measurement reports zero extents.

use std::path::Path;
use std::sync::Arc;

use tracing::warn;
use usvg::fontdb;

/// Ink extents of a rendered string. `ascent` is the distance from the
/// baseline up to the top of the ink box, so a line whose top edge should
/// sit at `y` gets its baseline at `y + ascent`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextExtents {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

#[derive(Clone)]
pub struct FontContext {
    database: Arc<fontdb::Database>,
    family: String,
}

impl FontContext {
    pub fn resolve(font_file: Option<&Path>, preferred_family: &str) -> Self {
        let mut db = fontdb::Database::new();
        if let Some(path) = font_file {
            if let Err(err) = db.load_font_file(path) {
                warn!(path = %path.display(), %err, "configured font file could not be loaded");
            }
        }
        db.load_system_fonts();

        let family = db
            .faces()
            .flat_map(|face| face.families.iter())
            .find(|(name, _)| name.eq_ignore_ascii_case(preferred_family))
            .map(|(name, _)| name.clone())
            .or_else(|| {
                let mut it = db.faces();
                it.next()
                    .and_then(|face| face.families.first().map(|(name, _)| name.clone()))
            })
            .unwrap_or_else(|| preferred_family.to_string());
        db.set_sans_serif_family(family.clone());

        Self {
            database: Arc::new(db),
            family,
        }
    }

    pub fn database(&self) -> Arc<fontdb::Database> {
        self.database.clone()
    }

    /// The family actually mapped onto `sans-serif`.
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn has_fonts(&self) -> bool {
        self.database.faces().next().is_some()
    }

    /// Measures the ink bounding box of `text` at `size_px` by parsing a
    /// one-element SVG with the shared database; usvg lays the text out
    /// with real glyph metrics and the converted outline's bounds are the
    /// rendered bounds.
    pub fn measure(&self, text: &str, size_px: f64, bold: bool) -> TextExtents {
        if text.is_empty() || !self.has_fonts() {
            return TextExtents::default();
        }
        let weight = if bold { " font-weight=\"bold\"" } else { "" };
        let svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1\" height=\"1\">\
             <text x=\"0\" y=\"0\" font-family=\"sans-serif\" font-size=\"{size_px}\"{weight}>{}</text>\
             </svg>",
            crate::label::svg_escape(text)
        );
        let mut opt = usvg::Options::default();
        opt.fontdb = self.database.clone();
        let Ok(tree) = usvg::Tree::from_str(&svg, &opt) else {
            return TextExtents::default();
        };
        let root = tree.root();
        if root.children().is_empty() {
            return TextExtents::default();
        }
        let bounds = root.abs_bounding_box();
        TextExtents {
            width: bounds.width() as f64,
            height: bounds.height() as f64,
            ascent: -(bounds.y() as f64),
        }
    }
}
