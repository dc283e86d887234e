//! Stable identifiers and batch-unique slugs.
//!
//! The resolver picks the first populated candidate field; normalization
//! squeezes an identifier into a filesystem/URL-safe token while keeping
//! non-Latin letters intact (inventory identifiers are frequently Thai);
//! the `SlugBook` resolves collisions in row order.

use std::collections::HashSet;

use crate::models::{Row, scalar_text};

/// Returns the value of the first priority field that is present and
/// non-blank after trimming, or `ROW-<n>` (1-based) when none qualify.
pub fn resolve_identifier(row: &Row, priority: &[String], index: usize) -> String {
    for key in priority {
        if let Some(value) = row.get(key)
            && let Some(text) = scalar_text(value)
        {
            return text;
        }
    }
    format!("ROW-{}", index + 1)
}

/// Normalizes an identifier into a slug: every maximal run of characters
/// outside the word-character/hyphen alphabet becomes a single hyphen,
/// repeated hyphens collapse, leading/trailing hyphens are stripped, and
/// an empty result falls back to `"item"`. Unicode alphanumerics are
/// word characters and pass through unchanged.
pub fn normalize_slug(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for c in raw.trim().chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            // literal hyphens and junk runs collapse into one separator
            pending_dash = true;
        }
    }
    if out.is_empty() {
        "item".to_string()
    } else {
        out
    }
}

/// Per-run slug accumulator. Claims are sequential and order-dependent:
/// the first row to normalize to a given slug keeps it, later rows get
/// `-2`, `-3`, … suffixes in first-seen order.
#[derive(Debug, Default)]
pub struct SlugBook {
    issued: HashSet<String>,
}

impl SlugBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, normalized: &str) -> String {
        if self.issued.insert(normalized.to_string()) {
            return normalized.to_string();
        }
        let mut n = 2u32;
        loop {
            let candidate = format!("{normalized}-{n}");
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}
