//! QR encoding, delegated to the `qrcode` crate. Version selection is
//! automatic: the crate picks the smallest matrix that fits the payload
//! at the requested error-correction level.

use qrcode::{Color, EcLevel, QrCode};

use crate::error::Error;
use crate::models::{EcStrength, LabelConfig};

impl From<EcStrength> for EcLevel {
    fn from(ec: EcStrength) -> Self {
        match ec {
            EcStrength::L => EcLevel::L,
            EcStrength::M => EcLevel::M,
            EcStrength::Q => EcLevel::Q,
            EcStrength::H => EcLevel::H,
        }
    }
}

/// Square module matrix of one encoded payload, without the quiet zone.
#[derive(Clone, Debug)]
pub struct CodeMatrix {
    modules: Vec<bool>,
    width: usize,
}

impl CodeMatrix {
    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.width + x]
    }

    /// Rendered side length in pixels: quiet zone on both sides, every
    /// module scaled to `module_px`.
    pub fn pixel_size(&self, cfg: &LabelConfig) -> u32 {
        (self.width as u32 + 2 * cfg.quiet_zone) * cfg.module_px
    }
}

/// Encodes `payload` at the given error-correction strength. With
/// automatic version selection and byte-mode data the only reachable
/// failure is exceeding the largest matrix's capacity.
pub fn encode(payload: &str, ec: EcStrength) -> Result<CodeMatrix, Error> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), ec.into())
        .map_err(|_| Error::EncodingTooLarge {
            len: payload.len(),
        })?;
    let width = code.width();
    let modules = code.to_colors().iter().map(|c| *c == Color::Dark).collect();
    Ok(CodeMatrix { modules, width })
}
