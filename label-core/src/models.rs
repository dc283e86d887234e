use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// One inventory row: an ordered mapping from field name to scalar value.
/// Field order is the caller's and is preserved through deserialization
/// (serde_json's `preserve_order` feature).
pub type Row = serde_json::Map<String, Value>;

/// Text form of a row scalar, or `None` when the cell counts as blank:
/// null, an empty/whitespace-only string, or a non-scalar value.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// Integral values print without a decimal point even when the source
// stored them as floats (spreadsheet ingestion tends to produce 2021.0).
fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}

/// QR error-correction strength, as accepted in configuration files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EcStrength {
    L,
    #[default]
    M,
    Q,
    H,
}

/// Constants for one label image. Defaults mirror the original sticker
/// layout: 10 px modules, 4-module quiet zone, EC level M, a 64 px
/// caption band with 20/18 px bold/regular lines.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub module_px: u32,
    pub quiet_zone: u32,
    pub ec: EcStrength,
    pub caption_band_px: u32,
    pub caption_pad_px: u32,
    pub caption_gap_px: u32,
    pub primary_font_px: f64,
    pub secondary_font_px: f64,
    pub font_family: String,
    pub font_file: Option<PathBuf>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            module_px: 10,
            quiet_zone: 4,
            ec: EcStrength::M,
            caption_band_px: 64,
            caption_pad_px: 6,
            caption_gap_px: 2,
            primary_font_px: 20.0,
            secondary_font_px: 18.0,
            font_family: "DejaVu Sans".to_string(),
            font_file: None,
        }
    }
}

impl LabelConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.module_px == 0 {
            return Err(Error::InvalidGeometry(
                "module size must be at least 1 px".to_string(),
            ));
        }
        if self.caption_band_px == 0 {
            return Err(Error::InvalidGeometry(
                "caption band height must be positive".to_string(),
            ));
        }
        if self.primary_font_px <= 0.0 || self.secondary_font_px <= 0.0 {
            return Err(Error::InvalidGeometry(
                "caption font sizes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Page geometry for the printable sheet. Defaults are the original A4
/// 3×8 sticker layout: 10/10/12/12 mm margins and a 42×52 mm footprint
/// per label.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub page_w_mm: f64,
    pub page_h_mm: f64,
    pub margin_left_mm: f64,
    pub margin_right_mm: f64,
    pub margin_top_mm: f64,
    pub margin_bottom_mm: f64,
    pub columns: u32,
    pub rows: u32,
    pub target_w_mm: f64,
    pub target_h_mm: f64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            page_w_mm: 210.0,
            page_h_mm: 297.0,
            margin_left_mm: 10.0,
            margin_right_mm: 10.0,
            margin_top_mm: 12.0,
            margin_bottom_mm: 12.0,
            columns: 3,
            rows: 8,
            target_w_mm: 42.0,
            target_h_mm: 52.0,
        }
    }
}

impl SheetConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.columns == 0 || self.rows == 0 {
            return Err(Error::InvalidGeometry(
                "grid needs at least one column and one row".to_string(),
            ));
        }
        if self.page_w_mm <= 0.0 || self.page_h_mm <= 0.0 {
            return Err(Error::InvalidGeometry(
                "page dimensions must be positive".to_string(),
            ));
        }
        if self.margin_left_mm < 0.0
            || self.margin_right_mm < 0.0
            || self.margin_top_mm < 0.0
            || self.margin_bottom_mm < 0.0
        {
            return Err(Error::InvalidGeometry(
                "margins must be non-negative".to_string(),
            ));
        }
        let (usable_w, usable_h) = self.usable_mm();
        if usable_w <= 0.0 || usable_h <= 0.0 {
            return Err(Error::InvalidGeometry(
                "margins leave no usable page area".to_string(),
            ));
        }
        if self.target_w_mm <= 0.0 || self.target_h_mm <= 0.0 {
            return Err(Error::InvalidGeometry(
                "cell target footprint must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn usable_mm(&self) -> (f64, f64) {
        (
            self.page_w_mm - self.margin_left_mm - self.margin_right_mm,
            self.page_h_mm - self.margin_top_mm - self.margin_bottom_mm,
        )
    }

    pub fn cell_mm(&self) -> (f64, f64) {
        let (usable_w, usable_h) = self.usable_mm();
        (usable_w / self.columns as f64, usable_h / self.rows as f64)
    }

    /// Cells per page.
    pub fn capacity(&self) -> usize {
        (self.columns * self.rows) as usize
    }
}

/// Everything one generation run needs, validated once before the first
/// row is processed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    /// Must end with '/'; the pipeline only concatenates.
    pub base_url: String,
    /// Candidate identifier fields, highest priority first.
    pub id_priority: Vec<String>,
    /// Field whose value becomes the label's second caption line.
    pub display_field: Option<String>,
    /// Fields listed first on detail pages; the rest follow in row order.
    pub page_field_order: Vec<String>,
    pub label: LabelConfig,
    pub sheet: SheetConfig,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            base_url: "https://example.com/smart-asset/pages/".to_string(),
            id_priority: [
                "รหัสเครื่องมือห้องปฏิบัติการ",
                "AssetID",
                "รหัส",
                "รหัสครุภัณฑ์",
                "Code",
                "ID",
                "Asset Id",
                "Asset_ID",
            ]
            .map(str::to_string)
            .to_vec(),
            display_field: Some("ชื่อ".to_string()),
            page_field_order: [
                "ลำดับ",
                "ชื่อ",
                "รหัสเครื่องมือห้องปฏิบัติการ",
                "AssetID",
                "ปี",
                "ยี่ห้อ",
                "โมเดล",
                "หมายเลขเครื่อง",
                "ต้นทุนต่อหน่วย",
                "สถานะ",
                "สถานที่ใช้งาน (ปัจจุบัน)",
                "ผู้รับผิดชอบ (ปัจจุบัน)",
            ]
            .map(str::to_string)
            .to_vec(),
            label: LabelConfig::default(),
            sheet: SheetConfig::default(),
        }
    }
}

impl GenConfig {
    pub fn validate(&self) -> Result<(), Error> {
        self.label.validate()?;
        self.sheet.validate()
    }
}
