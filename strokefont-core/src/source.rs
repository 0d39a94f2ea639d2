//! Glyph source tables and the providers that supply them (made by FontLab https://www.fontlab.com/)

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::geometry::Polyline;

/// Stroke data for one character: raw path data or already-parsed polylines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourcePath {
    Data(String),
    Polylines(Vec<Polyline>),
}

impl From<&str> for SourcePath {
    fn from(data: &str) -> Self {
        SourcePath::Data(data.to_string())
    }
}

impl From<String> for SourcePath {
    fn from(data: String) -> Self {
        SourcePath::Data(data)
    }
}

impl From<Vec<Polyline>> for SourcePath {
    fn from(lines: Vec<Polyline>) -> Self {
        SourcePath::Polylines(lines)
    }
}

/// Character → stroke data, ordered by code point.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlyphSource {
    entries: BTreeMap<char, SourcePath>,
}

impl GlyphSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_glyph(mut self, ch: char, path: impl Into<SourcePath>) -> Self {
        self.insert(ch, path);
        self
    }

    pub fn insert(&mut self, ch: char, path: impl Into<SourcePath>) -> Option<SourcePath> {
        self.entries.insert(ch, path.into())
    }

    pub fn get(&self, ch: char) -> Option<&SourcePath> {
        self.entries.get(&ch)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &SourcePath)> {
        self.entries.iter().map(|(ch, path)| (*ch, path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("parsing glyph source JSON")
    }
}

impl<P: Into<SourcePath>> FromIterator<(char, P)> for GlyphSource {
    fn from_iter<I: IntoIterator<Item = (char, P)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(ch, p)| (ch, p.into())).collect(),
        }
    }
}

/// Something that can hand the pipeline a glyph table.
pub trait GlyphProvider {
    fn glyph_source(&self) -> Result<&GlyphSource>;
}

/// A table that already lives in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    source: GlyphSource,
}

impl StaticProvider {
    pub fn new(source: GlyphSource) -> Self {
        Self { source }
    }
}

impl GlyphProvider for StaticProvider {
    fn glyph_source(&self) -> Result<&GlyphSource> {
        Ok(&self.source)
    }
}

/// A JSON table on disk, read on first use and cached for the lifetime of the handle.
#[derive(Debug)]
pub struct JsonFileProvider {
    path: PathBuf,
    cache: OnceLock<GlyphSource>,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }
}

impl GlyphProvider for JsonFileProvider {
    fn glyph_source(&self) -> Result<&GlyphSource> {
        if let Some(source) = self.cache.get() {
            return Ok(source);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading glyph source {}", self.path.display()))?;
        let source = GlyphSource::from_json_str(&raw)
            .with_context(|| format!("in {}", self.path.display()))?;
        Ok(self.cache.get_or_init(|| source))
    }
}
