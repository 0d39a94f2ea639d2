//! Font-level configuration shared by one build run (made by FontLab https://www.fontlab.com/)

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How advance widths are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthPolicy {
    /// Every glyph shares the widest glyph's advance and is centred in it.
    Monospace,
    /// Each glyph gets its own width plus side bearings.
    #[default]
    Proportional,
}

/// Which font metric one normalized unit of height maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalScale {
    #[default]
    Ascender,
    /// Square em: height scales by `units_per_em`.
    Em,
}

/// Y-axis direction of the incoming path data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YAxis {
    /// SVG convention: y grows downwards inside the unit box.
    #[default]
    Down,
    Up,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    pub units_per_em: f64,
    pub ascender: f64,
    /// Zero or negative, in font units.
    pub descender: f64,
    pub vertical_scale: VerticalScale,
    /// Stroke width in normalized design units.
    pub stroke_width: f64,
    /// Straight segments per semicircular cap.
    pub cap_segments: usize,
    /// Line segments per flattened curve command.
    pub curve_steps: usize,
    /// Side bearing as a fraction of glyph width.
    pub side_bearing_percent: f64,
    /// Lower bound for each proportional side bearing, in font units.
    pub side_bearing_minimum: f64,
    /// Advance for ink-less glyphs under the proportional policy, in ems.
    pub empty_advance: f64,
    pub width_policy: WidthPolicy,
    pub baseline_normalization: bool,
    /// Fixed baseline as a fraction of the y-up design box. When set, every
    /// glyph keeps its designed height above it instead of resting its ink on
    /// y = 0, so `-` and `'` stay raised and descenders hang as drawn.
    pub baseline_fraction: Option<f64>,
    pub descenders: BTreeSet<char>,
    pub source_y_axis: YAxis,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            units_per_em: 1000.0,
            ascender: 800.0,
            descender: -200.0,
            vertical_scale: VerticalScale::Ascender,
            stroke_width: 0.1,
            cap_segments: 8,
            curve_steps: 10,
            side_bearing_percent: 0.1,
            side_bearing_minimum: 50.0,
            empty_advance: 0.5,
            width_policy: WidthPolicy::Proportional,
            baseline_normalization: true,
            baseline_fraction: None,
            descenders: "gjpqy,".chars().collect(),
            source_y_axis: YAxis::Down,
        }
    }
}

impl FontConfig {
    pub fn with_width_policy(mut self, policy: WidthPolicy) -> Self {
        self.width_policy = policy;
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    pub fn with_side_bearings(mut self, percent: f64, minimum: f64) -> Self {
        self.side_bearing_percent = percent;
        self.side_bearing_minimum = minimum;
        self
    }

    pub fn with_baseline_normalization(mut self, yes: bool) -> Self {
        self.baseline_normalization = yes;
        self
    }

    pub fn with_baseline_fraction(mut self, fraction: f64) -> Self {
        self.baseline_fraction = Some(fraction);
        self
    }

    pub fn with_source_y_axis(mut self, axis: YAxis) -> Self {
        self.source_y_axis = axis;
        self
    }

    /// Reject structurally impossible settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("units_per_em", self.units_per_em)?;
        positive("ascender", self.ascender)?;
        positive("stroke_width", self.stroke_width)?;
        non_negative("side_bearing_percent", self.side_bearing_percent)?;
        non_negative("side_bearing_minimum", self.side_bearing_minimum)?;
        non_negative("empty_advance", self.empty_advance)?;

        if !self.descender.is_finite() {
            return Err(ConfigError::NotPositive {
                field: "descender",
                value: self.descender,
            });
        }
        if self.descender > 0.0 {
            return Err(ConfigError::DescenderAboveBaseline(self.descender));
        }
        if let Some(fraction) = self.baseline_fraction {
            if !fraction.is_finite() {
                return Err(ConfigError::NotFinite {
                    field: "baseline_fraction",
                    value: fraction,
                });
            }
        }

        at_least("cap_segments", self.cap_segments, 2)?;
        at_least("curve_steps", self.curve_steps, 1)?;
        Ok(())
    }

    /// Font units per normalized unit of height.
    pub fn y_scale(&self) -> f64 {
        match self.vertical_scale {
            VerticalScale::Ascender => self.ascender,
            VerticalScale::Em => self.units_per_em,
        }
    }

    pub fn is_descender(&self, ch: char) -> bool {
        self.descenders.contains(&ch)
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn at_least(field: &'static str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::TooSmall { field, min, value })
    }
}
