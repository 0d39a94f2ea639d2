//! Error and warning types (made by FontLab https://www.fontlab.com/)

use thiserror::Error;

/// Build-aborting configuration problems, reported before any glyph is processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be a non-negative finite number, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("descender must not sit above the baseline, got {0}")]
    DescenderAboveBaseline(f64),
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: usize,
        value: usize,
    },
}

/// A fragment of path data the parser stepped over.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathIssue {
    #[error("skipped non-numeric text {fragment:?} at byte {offset}")]
    Unparseable { offset: usize, fragment: String },
    #[error("'{command}' at byte {offset} has a dangling coordinate")]
    DanglingCoordinate { offset: usize, command: char },
    #[error("'{command}' at byte {offset} has too few coordinates")]
    MissingCoordinates { offset: usize, command: char },
}

/// Why a boolean union could not be completed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnionError {
    #[error("capsule contour is degenerate or not convex")]
    InvalidInput,
    #[error("capsule contour has a non-finite coordinate")]
    NonFinite,
    #[error("merged outline does not close near ({x}, {y})")]
    OpenContour { x: f64, y: f64 },
    #[error("hole contour is not enclosed by any outer contour")]
    OrphanHole,
}

/// Recoverable per-glyph problems. None of these stop the build.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GlyphWarning {
    #[error("malformed path for {ch:?}: {issue}")]
    MalformedPath { ch: char, issue: PathIssue },
    #[error("union failed for {ch:?}, using {capsules} unmerged capsules: {source}")]
    UnionFailure {
        ch: char,
        capsules: usize,
        source: UnionError,
    },
}

impl GlyphWarning {
    pub fn character(&self) -> char {
        match self {
            GlyphWarning::MalformedPath { ch, .. } | GlyphWarning::UnionFailure { ch, .. } => *ch,
        }
    }
}

/// Failures that stop a build before any glyph is emitted.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
