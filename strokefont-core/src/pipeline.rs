//! Two-pass font build: outline every glyph, then lay them out (made by FontLab https://www.fontlab.com/)

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::config::{FontConfig, YAxis};
use crate::error::{BuildError, GlyphWarning};
use crate::geometry::{BoundingBox, Outline, Polyline};
use crate::metrics::{GlyphMetrics, MetricsFitter};
use crate::path::PathParser;
use crate::source::{GlyphSource, SourcePath};
use crate::stroke::StrokeExpander;
use crate::union::unify;

/// Name of the placeholder glyph emitted ahead of every build.
pub const NOTDEF: &str = ".notdef";

#[derive(Debug, Default, Clone)]
pub struct BuildOptions {
    pub jobs: Option<usize>,
}

/// One finished glyph, outline and metrics in font units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    pub name: String,
    pub character: char,
    pub codepoint: u32,
    pub outline: Outline,
    pub metrics: GlyphMetrics,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FontBuild {
    /// `.notdef` first, then ascending code point.
    pub glyphs: Vec<Glyph>,
    /// Shared advance under the monospace policy.
    pub monospace_advance: Option<f64>,
    pub warnings: Vec<GlyphWarning>,
}

impl FontBuild {
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.iter().find(|g| g.character == ch)
    }
}

/// Glyph name: the character itself for ASCII letters and digits, `uniXXXX` otherwise.
pub fn glyph_name(ch: char) -> String {
    match ch {
        '\0' => NOTDEF.to_string(),
        c if c.is_ascii_alphanumeric() => c.to_string(),
        c if (c as u32) <= 0xFFFF => format!("uni{:04X}", c as u32),
        c => format!("u{:05X}", c as u32),
    }
}

/// Build every glyph in `source`.
///
/// Configuration is checked before any glyph work starts. Per-glyph
/// problems never abort the build; they come back in [`FontBuild::warnings`]
/// and are logged as they happen.
pub fn build_font(
    source: &GlyphSource,
    config: &FontConfig,
    opts: &BuildOptions,
) -> Result<FontBuild, BuildError> {
    config.validate()?;

    let run_build = || build_validated(source, config);

    if let Some(jobs) = opts.jobs {
        let pool = ThreadPoolBuilder::new().num_threads(jobs).build()?;
        Ok(pool.install(run_build))
    } else {
        Ok(run_build())
    }
}

/// First-pass result for one character, in normalized y-up space.
struct Prepared {
    ch: char,
    outline: Outline,
    bbox: BoundingBox,
    warnings: Vec<GlyphWarning>,
}

fn build_validated(source: &GlyphSource, config: &FontConfig) -> FontBuild {
    let parser = PathParser::new(config.curve_steps);
    let expander = StrokeExpander::new(config.stroke_width, config.cap_segments);

    // Code point 0 is reserved for the placeholder.
    let entries: Vec<(char, &SourcePath)> = source.iter().filter(|(ch, _)| *ch != '\0').collect();

    let prepared: Vec<Prepared> = entries
        .par_iter()
        .map(|(ch, path)| prepare(*ch, path, config, &parser, &expander))
        .collect();

    let fitter = MetricsFitter::new(
        config,
        prepared
            .iter()
            .filter(|p| !p.outline.is_empty())
            .map(|p| MetricsFitter::ink_width(config, &p.bbox)),
    );

    let mut glyphs = Vec::with_capacity(prepared.len() + 1);
    glyphs.push(place(&fitter, '\0', &Outline::default(), &BoundingBox::default()));
    glyphs.par_extend(
        prepared
            .par_iter()
            .map(|p| place(&fitter, p.ch, &p.outline, &p.bbox)),
    );

    let warnings: Vec<GlyphWarning> = prepared.into_iter().flat_map(|p| p.warnings).collect();

    log::debug!(
        "built {} glyphs ({} warnings, monospace advance {:?})",
        glyphs.len(),
        warnings.len(),
        fitter.monospace_advance()
    );

    FontBuild {
        glyphs,
        monospace_advance: fitter.monospace_advance(),
        warnings,
    }
}

fn prepare(
    ch: char,
    path: &SourcePath,
    config: &FontConfig,
    parser: &PathParser,
    expander: &StrokeExpander,
) -> Prepared {
    let mut warnings = Vec::new();

    let polylines: Vec<Polyline> = match path {
        SourcePath::Data(data) => {
            let parsed = parser.parse(data);
            warnings.extend(
                parsed
                    .issues
                    .into_iter()
                    .map(|issue| GlyphWarning::MalformedPath { ch, issue }),
            );
            parsed.polylines
        }
        SourcePath::Polylines(lines) => lines.clone(),
    };

    let polylines: Vec<Polyline> = match config.source_y_axis {
        YAxis::Down => polylines.iter().map(Polyline::flip_y).collect(),
        YAxis::Up => polylines,
    };

    let capsules = expander.expand_all(&polylines);
    let unified = unify(&capsules);
    if let Some(source) = unified.fallback {
        warnings.push(GlyphWarning::UnionFailure {
            ch,
            capsules: capsules.len(),
            source,
        });
    }

    for warning in &warnings {
        log::warn!("{warning}");
    }

    Prepared {
        ch,
        outline: unified.outline,
        bbox: unified.bbox,
        warnings,
    }
}

fn place(fitter: &MetricsFitter<'_>, ch: char, outline: &Outline, bbox: &BoundingBox) -> Glyph {
    let (outline, metrics) = fitter.fit(ch, outline, bbox);
    Glyph {
        name: glyph_name(ch),
        character: ch,
        codepoint: ch as u32,
        outline,
        metrics,
    }
}
