//! strokefont CLI (made by FontLab https://www.fontlab.com/)

use std::fs::{self, File};
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use log::LevelFilter;

use strokefont_core::config::{FontConfig, VerticalScale, WidthPolicy, YAxis};
use strokefont_core::output::{write_json_pretty, write_ndjson, write_svg_preview};
use strokefont_core::pipeline::{build_font, BuildOptions, FontBuild, Glyph};
use strokefont_core::source::{GlyphProvider, JsonFileProvider};

/// CLI entrypoint for strokefont.
#[derive(Debug, Parser)]
#[command(
    name = "strokefont",
    about = "Stroke-to-outline glyph builder (made by FontLab https://www.fontlab.com/)"
)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build outlines and metrics for every glyph in a source table
    Build(BuildArgs),
    /// Render the built outlines into an SVG sheet
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
struct BuildArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Emit a single JSON array
    #[arg(long = "json", action = ArgAction::SetTrue, conflicts_with = "ndjson")]
    json: bool,

    /// Emit newline-delimited JSON
    #[arg(long = "ndjson", action = ArgAction::SetTrue)]
    ndjson: bool,

    /// Format output as padded columns
    #[arg(long = "columns", action = ArgAction::SetTrue)]
    columns: bool,

    /// Control colorized output (auto|always|never)
    #[arg(long = "color", default_value_t = ColorChoice::Auto, value_enum)]
    color: ColorChoice,
}

#[derive(Debug, Args)]
struct PreviewArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Where to write the SVG sheet
    #[arg(short = 'o', long = "output", value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

/// Source table, configuration and worker settings shared by every command.
#[derive(Debug, Args)]
struct InputArgs {
    /// JSON object mapping characters to path data
    #[arg(value_hint = ValueHint::FilePath)]
    source: PathBuf,

    /// Load a JSON font configuration before applying flags
    #[arg(long = "config", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Font units per em
    #[arg(long = "units-per-em")]
    units_per_em: Option<f64>,

    /// Ascender height in font units
    #[arg(long = "ascender")]
    ascender: Option<f64>,

    /// Descender depth in font units (zero or negative)
    #[arg(long = "descender", allow_negative_numbers = true)]
    descender: Option<f64>,

    /// Vertical scale reference (ascender|em)
    #[arg(long = "vertical-scale", value_enum)]
    vertical_scale: Option<VerticalScaleArg>,

    /// Stroke width in normalized design units
    #[arg(short = 'w', long = "stroke-width")]
    stroke_width: Option<f64>,

    /// Straight segments per round cap
    #[arg(long = "cap-segments")]
    cap_segments: Option<usize>,

    /// Line segments per flattened curve
    #[arg(long = "curve-steps")]
    curve_steps: Option<usize>,

    /// Side bearing as a fraction of glyph width
    #[arg(long = "side-bearing-percent")]
    side_bearing_percent: Option<f64>,

    /// Minimum proportional side bearing in font units
    #[arg(long = "side-bearing-minimum")]
    side_bearing_minimum: Option<f64>,

    /// Advance of ink-less glyphs in ems
    #[arg(long = "empty-advance")]
    empty_advance: Option<f64>,

    /// Width policy (proportional|monospace)
    #[arg(long = "width-policy", value_enum)]
    width_policy: Option<WidthPolicyArg>,

    /// Keep design y = 0 as the baseline instead of resting ink on it
    #[arg(long = "no-baseline-normalization", action = ArgAction::SetTrue)]
    no_baseline_normalization: bool,

    /// Fixed baseline height as a fraction of the design box
    #[arg(long = "baseline-fraction", allow_negative_numbers = true)]
    baseline_fraction: Option<f64>,

    /// Characters that hang from the descender line
    #[arg(long = "descenders")]
    descenders: Option<String>,

    /// Treat source coordinates as y-up instead of SVG y-down
    #[arg(long = "y-up", action = ArgAction::SetTrue)]
    y_up: bool,

    /// Number of worker threads (defaults to all cores)
    #[arg(short = 'j', long = "jobs", value_parser = clap::value_parser!(usize))]
    jobs: Option<usize>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum WidthPolicyArg {
    Proportional,
    Monospace,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum VerticalScaleArg {
    Ascender,
    Em,
}

/// Parse CLI args and execute the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Build(args) => run_build(args),
        Command::Preview(args) => run_preview(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG still wins when set.
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn run_build(args: BuildArgs) -> Result<()> {
    let (_, build) = build_from(&args.input)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let use_color = match args.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => handle.is_terminal(),
    };

    if args.ndjson {
        write_ndjson(&build.glyphs, &mut handle)?;
    } else if args.json {
        write_json_pretty(&build.glyphs, &mut handle)?;
    } else if args.columns {
        write_columns(&build.glyphs, &mut handle, use_color)?;
    } else {
        write_plain(&build.glyphs, &mut handle)?;
    }

    Ok(())
}

fn run_preview(args: PreviewArgs) -> Result<()> {
    let (config, build) = build_from(&args.input)?;

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut w = BufWriter::new(file);
    write_svg_preview(&build.glyphs, &config, &mut w)?;
    w.flush()
        .with_context(|| format!("writing {}", args.output.display()))?;

    log::info!(
        "wrote {} glyphs to {}",
        build.glyphs.len().saturating_sub(1),
        args.output.display()
    );
    Ok(())
}

fn build_from(input: &InputArgs) -> Result<(FontConfig, FontBuild)> {
    let config = resolve_config(input)?;
    let provider = JsonFileProvider::new(&input.source);
    let source = provider.glyph_source()?;
    let opts = BuildOptions { jobs: input.jobs };

    let build = build_font(source, &config, &opts)?;
    if !build.warnings.is_empty() {
        log::info!("{} glyph warnings", build.warnings.len());
    }
    Ok((config, build))
}

fn resolve_config(input: &InputArgs) -> Result<FontConfig> {
    let mut config = match &input.config {
        Some(path) => load_config(path)?,
        None => FontConfig::default(),
    };

    if let Some(v) = input.units_per_em {
        config.units_per_em = v;
    }
    if let Some(v) = input.ascender {
        config.ascender = v;
    }
    if let Some(v) = input.descender {
        config.descender = v;
    }
    if let Some(v) = input.vertical_scale {
        config.vertical_scale = match v {
            VerticalScaleArg::Ascender => VerticalScale::Ascender,
            VerticalScaleArg::Em => VerticalScale::Em,
        };
    }
    if let Some(v) = input.stroke_width {
        config.stroke_width = v;
    }
    if let Some(v) = input.cap_segments {
        config.cap_segments = v;
    }
    if let Some(v) = input.curve_steps {
        config.curve_steps = v;
    }
    if let Some(v) = input.side_bearing_percent {
        config.side_bearing_percent = v;
    }
    if let Some(v) = input.side_bearing_minimum {
        config.side_bearing_minimum = v;
    }
    if let Some(v) = input.empty_advance {
        config.empty_advance = v;
    }
    if let Some(v) = input.width_policy {
        config.width_policy = match v {
            WidthPolicyArg::Proportional => WidthPolicy::Proportional,
            WidthPolicyArg::Monospace => WidthPolicy::Monospace,
        };
    }
    if input.no_baseline_normalization {
        config.baseline_normalization = false;
    }
    if let Some(v) = input.baseline_fraction {
        config.baseline_fraction = Some(v);
    }
    if let Some(chars) = &input.descenders {
        config.descenders = chars.chars().collect();
    }
    if input.y_up {
        config.source_y_axis = YAxis::Up;
    }

    Ok(config)
}

fn load_config(path: &Path) -> Result<FontConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

fn write_plain(glyphs: &[Glyph], mut w: impl Write) -> Result<()> {
    for glyph in glyphs {
        writeln!(
            w,
            "{}\tU+{:04X}\t{:.0}",
            glyph.name, glyph.codepoint, glyph.metrics.advance_width
        )?;
    }
    Ok(())
}

fn write_columns(glyphs: &[Glyph], mut w: impl Write, color: bool) -> Result<()> {
    let rows: Vec<(String, String, String)> = glyphs
        .iter()
        .map(|g| {
            let name = g.name.clone();
            let code = format!("U+{:04X}", g.codepoint);
            let holes: usize = g.outline.faces.iter().map(|f| f.holes.len()).sum();
            let metrics = format!(
                "adv:{:<6.0} lsb:{:<5.0} rsb:{:<5.0} faces:{:<2} holes:{}",
                g.metrics.advance_width,
                g.metrics.left_side_bearing,
                g.metrics.right_side_bearing,
                g.outline.faces.len(),
                holes,
            );
            (name, code, metrics)
        })
        .collect();

    let name_width = rows
        .iter()
        .map(|r| r.0.len())
        .max()
        .unwrap_or(0)
        .clamp(0, 40);
    let code_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0);

    for (name, code, metrics) in rows {
        let padded_name = format!("{:<name_width$}", name);
        let padded_code = format!("{:<code_width$}", code);
        let rendered_name = apply_color(&padded_name, color, AnsiColor::Cyan);
        let rendered_code = apply_color(&padded_code, color, AnsiColor::Yellow);
        let rendered_metrics = apply_color(&metrics, color, AnsiColor::Green);

        writeln!(w, "{rendered_name}  {rendered_code}  {rendered_metrics}")?;
    }

    Ok(())
}

#[derive(Copy, Clone)]
enum AnsiColor {
    Cyan,
    Yellow,
    Green,
}

fn apply_color(text: &str, color: bool, code: AnsiColor) -> String {
    if !color {
        return text.to_string();
    }

    let code_str = match code {
        AnsiColor::Cyan => "36",
        AnsiColor::Yellow => "33",
        AnsiColor::Green => "32",
    };

    format!("\u{1b}[{}m{}\u{1b}[0m", code_str, text)
}

#[cfg(test)]
mod tests;
