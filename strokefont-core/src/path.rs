//! Path-description parsing (made by FontLab https://www.fontlab.com/)
//!
//! Accepts the compact SVG subset produced by stroke-font extractors:
//! `M`/`L`/`Z` plus their relative forms, with `Q`/`C` curves flattened into
//! straight runs. Anything the parser cannot read is stepped over and
//! reported as a [`PathIssue`], so a damaged glyph still yields whatever
//! strokes were readable.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::PathIssue;
use crate::geometry::{Point, Polyline};

/// Line segments per flattened curve when no explicit count is given.
pub const DEFAULT_CURVE_STEPS: usize = 10;

/// Runs of ASCII letters; only some of them are commands, see [`is_command_run`].
fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[A-Za-z]+").expect("word pattern compiles"))
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[+-]?(?:\d*\.\d+|\d+\.?\d*)(?:[eE][+-]?\d+)?").expect("number pattern compiles")
    })
}

/// Result of parsing one path description.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedPath {
    pub polylines: Vec<Polyline>,
    pub issues: Vec<PathIssue>,
}

#[derive(Debug, Clone, Copy)]
pub struct PathParser {
    curve_steps: usize,
}

impl Default for PathParser {
    fn default() -> Self {
        Self::new(DEFAULT_CURVE_STEPS)
    }
}

impl PathParser {
    pub fn new(curve_steps: usize) -> Self {
        Self {
            curve_steps: curve_steps.max(1),
        }
    }

    pub fn parse(&self, data: &str) -> ParsedPath {
        let mut pen = Pen::default();
        let mut issues = Vec::new();

        // Rejected words stay inside an argument span and are reported there.
        let commands: Vec<(usize, char)> = word_pattern()
            .find_iter(data)
            .filter(|m| is_command_run(m.as_str()))
            .flat_map(|m| m.as_str().char_indices().map(move |(i, c)| (m.start() + i, c)))
            .collect();

        let leading_end = commands.first().map_or(data.len(), |&(offset, _)| offset);
        report_garbage(data, 0, 0, leading_end, &mut issues);

        for (idx, &(offset, command)) in commands.iter().enumerate() {
            let args_start = offset + command.len_utf8();
            let args_end = commands.get(idx + 1).map_or(data.len(), |&(next, _)| next);
            let numbers = scan_numbers(data, args_start, args_end, &mut issues);
            self.apply(&mut pen, command, offset, &numbers, &mut issues);
        }

        pen.flush();
        ParsedPath {
            polylines: pen.finished,
            issues,
        }
    }

    fn apply(
        &self,
        pen: &mut Pen,
        command: char,
        offset: usize,
        numbers: &[f64],
        issues: &mut Vec<PathIssue>,
    ) {
        let relative = command.is_ascii_lowercase();
        let arity = match command.to_ascii_uppercase() {
            'Z' => 0,
            'M' | 'L' => 2,
            'Q' => 4,
            _ => 6,
        };

        if arity == 0 {
            if !numbers.is_empty() {
                issues.push(PathIssue::DanglingCoordinate { offset, command });
            }
            pen.close();
            return;
        }

        if numbers.len() < arity {
            issues.push(PathIssue::MissingCoordinates { offset, command });
            return;
        }
        if numbers.len() % arity != 0 {
            issues.push(PathIssue::DanglingCoordinate { offset, command });
        }

        for (group_idx, group) in numbers.chunks_exact(arity).enumerate() {
            let origin = if relative { pen.position } else { None };
            let at = |i: usize| {
                let p = Point::new(group[i], group[i + 1]);
                match origin {
                    Some(o) => Point::new(p.x + o.x, p.y + o.y),
                    None => p,
                }
            };

            match command.to_ascii_uppercase() {
                'M' if group_idx == 0 => pen.move_to(at(0)),
                'M' | 'L' => pen.line_to(at(0)),
                'Q' => {
                    let (ctrl, end) = (at(0), at(2));
                    let start = pen.position.unwrap_or(ctrl);
                    for step in 1..=self.curve_steps {
                        let t = step as f64 / self.curve_steps as f64;
                        pen.line_to(quadratic(start, ctrl, end, t));
                    }
                }
                _ => {
                    let (c1, c2, end) = (at(0), at(2), at(4));
                    let start = pen.position.unwrap_or(c1);
                    for step in 1..=self.curve_steps {
                        let t = step as f64 / self.curve_steps as f64;
                        pen.line_to(cubic(start, c1, c2, end, t));
                    }
                }
            }
        }
    }
}

/// Parse with the default curve flattening.
pub fn parse_path_data(data: &str) -> ParsedPath {
    PathParser::default().parse(data)
}

#[derive(Debug, Default)]
struct Pen {
    finished: Vec<Polyline>,
    current: Option<Polyline>,
    position: Option<Point>,
    start: Option<Point>,
}

impl Pen {
    fn flush(&mut self) {
        if let Some(line) = self.current.take() {
            if !line.is_empty() {
                self.finished.push(line);
            }
        }
    }

    fn move_to(&mut self, p: Point) {
        self.flush();
        self.current = Some(Polyline::open(vec![p]));
        self.start = Some(p);
        self.position = Some(p);
    }

    /// Appends to the open stroke, or starts one from the pen position.
    fn line_to(&mut self, p: Point) {
        match self.current.as_mut() {
            Some(line) => line.points.push(p),
            None => {
                let mut points = Vec::with_capacity(2);
                points.extend(self.position);
                points.push(p);
                self.start = points.first().copied();
                self.current = Some(Polyline::open(points));
            }
        }
        self.position = Some(p);
    }

    fn close(&mut self) {
        if let Some(line) = self.current.as_mut() {
            line.closed = true;
        }
        self.flush();
        self.position = self.start;
    }
}

/// A letter run is read as commands only when every letter is a command and
/// all but the last are closes (`ZM`). Anything else (`abc`, `Lc`) is garbage.
fn is_command_run(word: &str) -> bool {
    let Some((last, leading)) = word.as_bytes().split_last() else {
        return false;
    };
    leading.iter().all(|b| matches!(b, b'Z' | b'z'))
        && matches!(last, b'M' | b'L' | b'Z' | b'Q' | b'C' | b'm' | b'l' | b'z' | b'q' | b'c')
}

fn scan_numbers(data: &str, start: usize, end: usize, issues: &mut Vec<PathIssue>) -> Vec<f64> {
    let slice = &data[start..end];
    let mut numbers = Vec::new();
    let mut cursor = 0;

    for m in number_pattern().find_iter(slice) {
        report_garbage(slice, start, cursor, m.start(), issues);
        // The pattern only matches valid float syntax; overflow still yields infinity.
        match m.as_str().parse::<f64>() {
            Ok(value) if value.is_finite() => numbers.push(value),
            _ => issues.push(PathIssue::Unparseable {
                offset: start + m.start(),
                fragment: m.as_str().to_string(),
            }),
        }
        cursor = m.end();
    }
    report_garbage(slice, start, cursor, slice.len(), issues);

    numbers
}

/// Record any non-separator text in `text[from..to]`; `base` is `text`'s offset in the path.
fn report_garbage(text: &str, base: usize, from: usize, to: usize, issues: &mut Vec<PathIssue>) {
    let is_separator = |c: char| c.is_whitespace() || c == ',';
    let gap = &text[from..to];
    let trimmed = gap.trim_matches(is_separator);
    if trimmed.is_empty() {
        return;
    }
    let lead = gap.len() - gap.trim_start_matches(is_separator).len();
    issues.push(PathIssue::Unparseable {
        offset: base + from + lead,
        fragment: trimmed.to_string(),
    });
}

fn quadratic(p0: Point, p1: Point, p2: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    Point::new(
        mt * mt * p0.x + 2.0 * mt * t * p1.x + t * t * p2.x,
        mt * mt * p0.y + 2.0 * mt * t * p1.y + t * t * p2.y,
    )
}

fn cubic(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let (a, b, c, d) = (mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t);
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}
