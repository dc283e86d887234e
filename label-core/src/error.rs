use thiserror::Error;

/// Failures the pipeline can produce. Missing identifiers and slug
/// collisions are resolved structurally and never reach this type;
/// `EncodingTooLarge` and `Svg` are per-row and collected by the batch
/// fold, `InvalidGeometry` aborts a run before any row is processed.
#[derive(Debug, Error)]
pub enum Error {
    #[error("payload of {len} bytes exceeds the maximum QR capacity at this error-correction level")]
    EncodingTooLarge { len: usize },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("SVG rasterization failed: {0}")]
    Svg(String),

    #[error("pixmap allocation failed")]
    Pixmap,

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}
