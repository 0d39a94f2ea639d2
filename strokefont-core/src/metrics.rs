//! Placement of unified outlines in font-unit space (made by FontLab https://www.fontlab.com/)

use serde::{Deserialize, Serialize};

use crate::config::{FontConfig, WidthPolicy};
use crate::geometry::{BoundingBox, Outline, Point};

/// Horizontal and vertical metrics of one placed glyph, in font units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GlyphMetrics {
    pub bbox: BoundingBox,
    /// Ink width.
    pub width: f64,
    pub advance_width: f64,
    pub left_side_bearing: f64,
    pub right_side_bearing: f64,
}

/// Advance shared by every glyph under the monospace policy.
pub fn monospace_advance(max_width: f64, side_bearing_percent: f64) -> f64 {
    max_width * (1.0 + 2.0 * side_bearing_percent)
}

/// `(advance, bearing)` for one glyph under the proportional policy.
pub fn proportional_advance(width: f64, side_bearing_percent: f64, minimum: f64) -> (f64, f64) {
    let bearing = (width * side_bearing_percent).max(minimum);
    (width + 2.0 * bearing, bearing)
}

/// Second-pass layout for one build: maps normalized outlines into font units.
#[derive(Debug, Clone)]
pub struct MetricsFitter<'a> {
    config: &'a FontConfig,
    monospace_advance: Option<f64>,
}

impl<'a> MetricsFitter<'a> {
    /// `ink_widths` are the first-pass widths in font units of every glyph in the build.
    pub fn new<I>(config: &'a FontConfig, ink_widths: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let monospace_advance = match config.width_policy {
            WidthPolicy::Proportional => None,
            WidthPolicy::Monospace => {
                let max_width = ink_widths.into_iter().fold(0.0, f64::max);
                if max_width > 0.0 {
                    Some(monospace_advance(max_width, config.side_bearing_percent))
                } else {
                    Some(config.empty_advance * config.units_per_em)
                }
            }
        };
        Self {
            config,
            monospace_advance,
        }
    }

    pub fn monospace_advance(&self) -> Option<f64> {
        self.monospace_advance
    }

    /// Ink width in font units of a normalized bounding box.
    pub fn ink_width(config: &FontConfig, bbox: &BoundingBox) -> f64 {
        bbox.width() * config.units_per_em
    }

    /// Advance for a glyph without ink.
    pub fn empty_advance(&self) -> f64 {
        self.monospace_advance
            .unwrap_or(self.config.empty_advance * self.config.units_per_em)
    }

    /// Scale, shift and measure a normalized y-up outline.
    pub fn fit(&self, ch: char, outline: &Outline, bbox: &BoundingBox) -> (Outline, GlyphMetrics) {
        let cfg = self.config;
        if outline.is_empty() {
            let advance = self.empty_advance();
            return (
                Outline::default(),
                GlyphMetrics {
                    advance_width: advance,
                    right_side_bearing: advance,
                    ..GlyphMetrics::default()
                },
            );
        }

        let width = Self::ink_width(cfg, bbox);
        let (advance, lsb) = match self.monospace_advance {
            Some(advance) => (advance, (advance - width) / 2.0),
            None => proportional_advance(width, cfg.side_bearing_percent, cfg.side_bearing_minimum),
        };

        let x_scale = cfg.units_per_em;
        let y_scale = cfg.y_scale();
        let dx = lsb - bbox.min_x * x_scale;
        let dy = match (cfg.baseline_normalization, cfg.baseline_fraction) {
            (false, _) => 0.0,
            (true, Some(fraction)) => -fraction * y_scale,
            (true, None) if cfg.is_descender(ch) => cfg.descender - bbox.min_y * y_scale,
            (true, None) => -bbox.min_y * y_scale,
        };

        let placed = outline.map_points(|p| Point::new(p.x * x_scale + dx, p.y * y_scale + dy));
        let placed_bbox = placed.bbox();
        let metrics = GlyphMetrics {
            bbox: placed_bbox,
            width,
            advance_width: advance,
            left_side_bearing: lsb,
            right_side_bearing: advance - lsb - width,
        };
        (placed, metrics)
    }
}
