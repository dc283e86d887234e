//! Label composition: QR modules plus a fixed-height caption band,
//! assembled as an SVG document and rasterized with resvg.

use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use tiny_skia::Pixmap;

use crate::error::Error;
use crate::fonts::FontContext;
use crate::models::LabelConfig;
use crate::qr::CodeMatrix;

/// Composes one label: the code bitmap at the top, captions centered in
/// the band below it. The band height is constant whether or not a
/// secondary caption exists, so every label in a batch has the same
/// dimensions for a given code version.
pub fn compose(
    code: &CodeMatrix,
    primary: &str,
    secondary: Option<&str>,
    cfg: &LabelConfig,
    fonts: &FontContext,
) -> Result<Pixmap, Error> {
    let code_px = code.pixel_size(cfg);
    let width = code_px;
    let height = code_px + cfg.caption_band_px;
    let svg = label_svg(code, primary, secondary, cfg, fonts, width, height);
    rasterize(&svg, width, height, fonts)
}

fn label_svg(
    code: &CodeMatrix,
    primary: &str,
    secondary: Option<&str>,
    cfg: &LabelConfig,
    fonts: &FontContext,
    width: u32,
    height: u32,
) -> String {
    let mut s = String::new();
    s.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    s.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\n"
    ));
    s.push_str("<rect x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");

    let m = cfg.module_px;
    let mut d = String::new();
    for y in 0..code.width() {
        for x in 0..code.width() {
            if code.is_dark(x, y) {
                let px = (cfg.quiet_zone + x as u32) * m;
                let py = (cfg.quiet_zone + y as u32) * m;
                d.push_str(&format!("M{px} {py}h{m}v{m}h-{m}z"));
            }
        }
    }
    s.push_str(&format!("<path d=\"{d}\" fill=\"#000000\"/>\n"));

    let band_top = code.pixel_size(cfg) as f64;
    let mut line_top = band_top + cfg.caption_pad_px as f64;
    let primary_ext = fonts.measure(primary, cfg.primary_font_px, true);
    if primary_ext.width > 0.0 {
        push_text(
            &mut s,
            primary,
            cfg.primary_font_px,
            true,
            (width as f64 - primary_ext.width) / 2.0,
            line_top + primary_ext.ascent,
        );
    }
    line_top += primary_ext.height + cfg.caption_gap_px as f64;
    if let Some(secondary) = secondary {
        let ext = fonts.measure(secondary, cfg.secondary_font_px, false);
        if ext.width > 0.0 {
            push_text(
                &mut s,
                secondary,
                cfg.secondary_font_px,
                false,
                (width as f64 - ext.width) / 2.0,
                line_top + ext.ascent,
            );
        }
    }

    s.push_str("</svg>\n");
    s
}

fn push_text(out: &mut String, text: &str, size: f64, bold: bool, x: f64, y: f64) {
    let weight = if bold { " font-weight=\"bold\"" } else { "" };
    out.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{y:.2}\" font-family=\"sans-serif\" font-size=\"{size}\" fill=\"#000000\"{weight}>{}</text>\n",
        svg_escape(text)
    ));
}

fn rasterize(svg: &str, width: u32, height: u32, fonts: &FontContext) -> Result<Pixmap, Error> {
    let mut opt = usvg::Options::default();
    opt.fontdb = fonts.database();
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| Error::Svg(format!("{e:?}")))?;
    let mut pixmap = Pixmap::new(width, height).ok_or(Error::Pixmap)?;
    let mut pm = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pm);
    Ok(pixmap)
}

/// RGBA pixmap -> PNG bytes, encoded with fixed filter and compression
/// settings so identical pixmaps produce identical files.
pub fn to_png_bytes(pixmap: &Pixmap) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    {
        let mut enc = Encoder::new(&mut buf, pixmap.width(), pixmap.height());
        enc.set_color(ColorType::Rgba);
        enc.set_depth(BitDepth::Eight);
        enc.set_filter(FilterType::NoFilter);
        enc.set_compression(Compression::Default);
        let mut writer = enc.write_header()?;
        writer.write_image_data(pixmap.data())?;
    }
    Ok(buf)
}

pub fn svg_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
