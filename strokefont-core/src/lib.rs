//! strokefont-core: turns pen strokes into font outlines
//!
//! A stroke font describes each character as the path of a pen, not as
//! the shape of its ink. This library gives every stroke a body and hands
//! back closed outlines, measured and placed the way a font assembler
//! expects them.
//!
//! ## The Pipeline
//!
//! **Parse**: path data (`M`, `L`, `Z`, flattened `Q`/`C`, relative forms)
//! becomes polylines in a unit design box. Damaged data is skipped and
//! reported, never fatal.
//!
//! **Expand**: every segment turns into a capsule, a rectangle with round
//! caps whose diameter is the stroke width.
//!
//! **Unify**: the capsules of one glyph are merged into faces with holes.
//! If the boolean engine gives up, the raw capsules are kept instead.
//!
//! **Fit**: outlines are scaled to font units, rested on the baseline (or
//! hung from the descender) and given side bearings, either proportional
//! or a shared monospace advance.
//!
//! ## A Sample Build
//!
//! ```rust,no_run
//! use strokefont_core::config::{FontConfig, WidthPolicy};
//! use strokefont_core::pipeline::{build_font, BuildOptions};
//! use strokefont_core::source::GlyphSource;
//!
//! let source = GlyphSource::new()
//!     .with_glyph('L', "M0.2 0.1L0.2 0.9L0.7 0.9")
//!     .with_glyph('o', "M0.3 0.5L0.5 0.3L0.7 0.5L0.5 0.7Z");
//!
//! let config = FontConfig::default().with_width_policy(WidthPolicy::Monospace);
//! let build = build_font(&source, &config, &BuildOptions::default())?;
//!
//! for glyph in &build.glyphs {
//!     println!("{} advance {}", glyph.name, glyph.metrics.advance_width);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## The Cast
//!
//! - [`source::GlyphSource`]: character to path data, in code-point order
//! - [`config::FontConfig`]: every knob of the build, serde-friendly
//! - [`pipeline::Glyph`]: one finished glyph with outline and metrics
//! - [`pipeline::FontBuild`]: the glyph list plus anything worth a warning
//!
//! ---
//!
//! Crafted with care at FontLab https://www.fontlab.com/

pub mod config;
pub mod error;
pub mod geometry;
pub mod metrics;
pub mod output;
pub mod path;
pub mod pipeline;
pub mod source;
pub mod stroke;
pub mod union;
