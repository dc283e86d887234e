//! Grid pagination and the printable PDF sheet.
//!
//! `paginate` is a pure placement pass in millimeters; `write_sheet_pdf`
//! turns the placements into a multi-page PDF, embedding each label
//! pixmap as an uncompressed DeviceRGB image XObject.

use pdf_writer::{Content, Name, Pdf, Rect, Ref};
use tiny_skia::Pixmap;

use crate::models::SheetConfig;

pub const MM_TO_PT: f64 = 72.0 / 25.4;

/// One image placed on a page. Coordinates are in millimeters from the
/// page's bottom-left corner; `index` refers into the image sequence
/// given to `paginate`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub index: usize,
    pub x_mm: f64,
    pub y_mm: f64,
    pub w_mm: f64,
    pub h_mm: f64,
}

#[derive(Clone, Debug, Default)]
pub struct SheetPage {
    pub placements: Vec<Placement>,
}

/// Packs images (given as pixel dimensions) into grid cells, row-major,
/// left-to-right, top-to-bottom, opening a new page exactly when all
/// C×R cells are used. Each image is scaled to the target width, or to
/// the target height if that would overflow it, preserving aspect ratio,
/// then centered within its cell. Row 0 sits at the visual top of the
/// page, hence the `rows - 1 - row` flip into the bottom-left origin.
/// An empty sequence yields one valid empty page.
pub fn paginate(dims: &[(u32, u32)], cfg: &SheetConfig) -> Vec<SheetPage> {
    let per_page = cfg.capacity();
    let (cell_w, cell_h) = cfg.cell_mm();
    let mut pages: Vec<SheetPage> = Vec::new();
    let mut current = SheetPage::default();
    for (i, &(img_w, img_h)) in dims.iter().enumerate() {
        if i > 0 && i % per_page == 0 {
            pages.push(std::mem::take(&mut current));
        }
        let within = i % per_page;
        let row = within / cfg.columns as usize;
        let col = within % cfg.columns as usize;
        let x0 = cfg.margin_left_mm + col as f64 * cell_w;
        let y0 = cfg.margin_bottom_mm + (cfg.rows as usize - 1 - row) as f64 * cell_h;
        let (w, h) = fit_target(img_w, img_h, cfg.target_w_mm, cfg.target_h_mm);
        current.placements.push(Placement {
            index: i,
            x_mm: x0 + (cell_w - w) / 2.0,
            y_mm: y0 + (cell_h - h) / 2.0,
            w_mm: w,
            h_mm: h,
        });
    }
    pages.push(current);
    pages
}

fn fit_target(img_w: u32, img_h: u32, target_w: f64, target_h: f64) -> (f64, f64) {
    let aspect = img_w as f64 / img_h as f64;
    let mut w = target_w;
    let mut h = target_w / aspect;
    if h > target_h {
        h = target_h;
        w = target_h * aspect;
    }
    (w, h)
}

/// Writes the paginated sheet as a PDF document. `images[p.index]` is the
/// pixmap behind placement `p`; image samples are written raw (no
/// compression filter), which keeps the output byte-deterministic.
pub fn write_sheet_pdf(pages: &[SheetPage], images: &[&Pixmap], cfg: &SheetConfig) -> Vec<u8> {
    let mut pdf = Pdf::new();
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let page_tree_id = alloc.bump();

    struct PageRefs {
        page: Ref,
        content: Ref,
        images: Vec<(usize, Ref)>,
    }
    let refs: Vec<PageRefs> = pages
        .iter()
        .map(|page| PageRefs {
            page: alloc.bump(),
            content: alloc.bump(),
            images: page
                .placements
                .iter()
                .map(|p| (p.index, alloc.bump()))
                .collect(),
        })
        .collect();

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(refs.iter().map(|r| r.page))
        .count(pages.len() as i32);

    let page_w_pt = (cfg.page_w_mm * MM_TO_PT) as f32;
    let page_h_pt = (cfg.page_h_mm * MM_TO_PT) as f32;

    for (page, page_refs) in pages.iter().zip(&refs) {
        let names: Vec<String> = (0..page.placements.len())
            .map(|slot| format!("Im{slot}"))
            .collect();
        {
            let mut pw = pdf.page(page_refs.page);
            pw.media_box(Rect::new(0.0, 0.0, page_w_pt, page_h_pt));
            pw.parent(page_tree_id);
            pw.contents(page_refs.content);
            let mut resources = pw.resources();
            let mut xobjects = resources.x_objects();
            for (slot, (_, image_id)) in page_refs.images.iter().enumerate() {
                xobjects.pair(Name(names[slot].as_bytes()), *image_id);
            }
        }

        let mut content = Content::new();
        for (slot, p) in page.placements.iter().enumerate() {
            content.save_state();
            content.transform([
                (p.w_mm * MM_TO_PT) as f32,
                0.0,
                0.0,
                (p.h_mm * MM_TO_PT) as f32,
                (p.x_mm * MM_TO_PT) as f32,
                (p.y_mm * MM_TO_PT) as f32,
            ]);
            content.x_object(Name(names[slot].as_bytes()));
            content.restore_state();
        }
        pdf.stream(page_refs.content, &content.finish());

        for (index, image_id) in &page_refs.images {
            let pixmap = images[*index];
            let samples = rgb_samples(pixmap);
            let mut image = pdf.image_xobject(*image_id, &samples);
            image.width(pixmap.width() as i32);
            image.height(pixmap.height() as i32);
            image.color_space().device_rgb();
            image.bits_per_component(8);
        }
    }

    pdf.finish()
}

// Labels are opaque, so dropping the alpha channel loses nothing.
fn rgb_samples(pixmap: &Pixmap) -> Vec<u8> {
    let mut out = Vec::with_capacity((pixmap.width() * pixmap.height() * 3) as usize);
    for px in pixmap.data().chunks_exact(4) {
        out.extend_from_slice(&px[..3]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn fifty_labels_fill_three_pages_row_major() {
        let cfg = SheetConfig::default();
        let dims = vec![(370u32, 434u32); 50];
        let pages = paginate(&dims, &cfg);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].placements.len(), 24);
        assert_eq!(pages[1].placements.len(), 24);
        assert_eq!(pages[2].placements.len(), 2);

        let (cell_w, cell_h) = cfg.cell_mm();
        for page in &pages {
            let first = page.placements[0];
            // cell (row 0, col 0): left column, visual top of the page
            assert!((first.x_mm - (cfg.margin_left_mm + (cell_w - first.w_mm) / 2.0)).abs() < 1e-9);
            let y0 = cfg.margin_bottom_mm + (cfg.rows as f64 - 1.0) * cell_h;
            assert!((first.y_mm - (y0 + (cell_h - first.h_mm) / 2.0)).abs() < 1e-9);
        }
        // second placement is one column to the right, same row
        let second = pages[0].placements[1];
        assert!((second.x_mm - pages[0].placements[0].x_mm - cell_w).abs() < 1e-9);
        assert!((second.y_mm - pages[0].placements[0].y_mm).abs() < 1e-9);
    }

    #[test]
    fn scaling_preserves_aspect_and_respects_the_footprint() {
        let (w, h) = fit_target(300, 400, 42.0, 52.0);
        assert!((w / h - 300.0 / 400.0).abs() < 1e-9);
        assert!(w <= 42.0 + 1e-9);
        assert!(h <= 52.0 + 1e-9);
        assert!((h - 52.0).abs() < 1e-9 || (w - 42.0).abs() < 1e-9);

        // wide image is width-bound instead
        let (w, h) = fit_target(400, 300, 42.0, 52.0);
        assert!((w - 42.0).abs() < 1e-9);
        assert!((w / h - 400.0 / 300.0).abs() < 1e-9);
    }

    #[test]
    fn empty_batch_yields_one_valid_empty_page() {
        let pages = paginate(&[], &SheetConfig::default());
        assert_eq!(pages.len(), 1);
        assert!(pages[0].placements.is_empty());
    }

    #[test]
    fn exact_multiple_does_not_open_a_trailing_page() {
        let dims = vec![(100u32, 100u32); 24];
        let pages = paginate(&dims, &SheetConfig::default());
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].placements.len(), 24);
    }

    #[test]
    fn pdf_has_one_page_object_per_sheet_page() {
        let cfg = SheetConfig::default();
        let pixmaps: Vec<Pixmap> = (0..3).map(|_| Pixmap::new(8, 10).unwrap()).collect();
        let images: Vec<&Pixmap> = pixmaps.iter().collect();
        let mut small = cfg.clone();
        small.columns = 1;
        small.rows = 2;
        let dims: Vec<(u32, u32)> = pixmaps.iter().map(|p| (p.width(), p.height())).collect();
        let pages = paginate(&dims, &small);
        assert_eq!(pages.len(), 2);

        let bytes = write_sheet_pdf(&pages, &images, &small);
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(count(&bytes, b"%%EOF") >= 1);
        let page_objects = count(&bytes, b"/Type/Page") - count(&bytes, b"/Type/Pages");
        assert_eq!(page_objects, 2);
    }

    #[test]
    fn empty_sheet_still_writes_a_wellformed_pdf() {
        let cfg = SheetConfig::default();
        let pages = paginate(&[], &cfg);
        let bytes = write_sheet_pdf(&pages, &[], &cfg);
        assert!(bytes.starts_with(b"%PDF-"));
        let page_objects = count(&bytes, b"/Type/Page") - count(&bytes, b"/Type/Pages");
        assert_eq!(page_objects, 1);
    }
}
