//! Streaming output helpers (made by FontLab https://www.fontlab.com/)

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;

use crate::config::FontConfig;
use crate::geometry::Point;
use crate::pipeline::{Glyph, NOTDEF};

/// Gap between preview cells, as a fraction of the em.
const PREVIEW_MARGIN: f64 = 0.1;

/// Write glyphs as prettified JSON array.
pub fn write_json_pretty(glyphs: &[Glyph], mut w: impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(glyphs)?;
    w.write_all(json.as_bytes())?;
    Ok(())
}

/// Write glyphs as newline-delimited JSON (NDJSON).
pub fn write_ndjson(glyphs: &[Glyph], mut w: impl Write) -> Result<()> {
    for glyph in glyphs {
        let line = serde_json::to_string(glyph)?;
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
    }
    Ok(())
}

/// Write a square-ish SVG sheet of filled outlines, one cell per glyph in slice order.
///
/// `.notdef` is left out. Cells are as wide as the widest advance and as tall
/// as ascender to descender.
pub fn write_svg_preview(glyphs: &[Glyph], config: &FontConfig, mut w: impl Write) -> Result<()> {
    let shown: Vec<&Glyph> = glyphs.iter().filter(|g| g.name != NOTDEF).collect();

    let margin = PREVIEW_MARGIN * config.units_per_em;
    let advance = shown
        .iter()
        .map(|g| g.metrics.advance_width)
        .fold(0.0, f64::max);
    let cell_width = advance.max(config.empty_advance * config.units_per_em) + margin;
    let cell_height = config.ascender - config.descender + margin;

    let cols = (shown.len() as f64).sqrt().ceil().max(1.0) as usize;
    let rows = shown.len().div_ceil(cols).max(1);
    let width = cols as f64 * cell_width;
    let height = rows as f64 * cell_height;

    writeln!(
        w,
        r#"<svg viewBox="0 0 {width:.3} {height:.3}" xmlns="http://www.w3.org/2000/svg">"#
    )?;
    writeln!(
        w,
        r#"<rect width="{width:.3}" height="{height:.3}" fill="white" />"#
    )?;
    for (i, glyph) in shown.iter().enumerate() {
        let tx = (i % cols) as f64 * cell_width + margin / 2.0;
        // Font space is y-up; the baseline sits `ascender` below the cell top.
        let ty = (i / cols) as f64 * cell_height + margin / 2.0 + config.ascender;
        writeln!(
            w,
            r#"  <path d="{}" transform="translate({tx:.3}, {ty:.3}) scale(1, -1)" fill="black"><title>{}</title></path>"#,
            path_data(glyph),
            glyph.name
        )?;
    }
    writeln!(w, "</svg>")?;
    Ok(())
}

/// SVG path data for every contour of the glyph.
pub fn path_data(glyph: &Glyph) -> String {
    let mut d = String::new();
    for contour in glyph.outline.contours() {
        for (i, Point { x, y }) in contour.iter().enumerate() {
            let op = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{op}{x:.2} {y:.2}");
        }
        if !contour.is_empty() {
            d.push('Z');
        }
    }
    d
}
