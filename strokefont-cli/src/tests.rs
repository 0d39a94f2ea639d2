use super::*;
use clap::CommandFactory;
use std::io::Cursor;
use strokefont_core::geometry::{Face, Outline, Point};
use strokefont_core::metrics::GlyphMetrics;
use tempfile::tempdir;

fn glyph(name: &str, ch: char, advance: f64) -> Glyph {
    Glyph {
        name: name.to_string(),
        character: ch,
        codepoint: ch as u32,
        outline: Outline {
            faces: vec![Face::from_ring(vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
            ])],
        },
        metrics: GlyphMetrics {
            advance_width: advance,
            ..GlyphMetrics::default()
        },
    }
}

fn build_args(argv: &[&str]) -> BuildArgs {
    let cli = Cli::try_parse_from(argv).expect("parse cli");
    match cli.command {
        Command::Build(args) => args,
        other => panic!("expected build, got {other:?}"),
    }
}

#[test]
fn parses_build_flags_into_config() {
    let args = build_args(&[
        "strokefont",
        "build",
        "glyphs.json",
        "--stroke-width",
        "0.08",
        "--width-policy",
        "monospace",
        "--descender",
        "-250",
        "--vertical-scale",
        "em",
        "--descenders",
        "gy",
        "--no-baseline-normalization",
        "--baseline-fraction",
        "0.2",
        "--y-up",
        "--json",
    ]);
    assert!(args.json);
    assert!(!args.ndjson);

    let config = resolve_config(&args.input).expect("config");
    assert_eq!(config.stroke_width, 0.08);
    assert_eq!(config.width_policy, WidthPolicy::Monospace);
    assert_eq!(config.descender, -250.0);
    assert_eq!(config.vertical_scale, VerticalScale::Em);
    assert!(config.is_descender('y'));
    assert!(!config.is_descender('p'));
    assert!(!config.baseline_normalization);
    assert_eq!(config.baseline_fraction, Some(0.2));
    assert_eq!(config.source_y_axis, YAxis::Up);
    assert_eq!(config.units_per_em, 1000.0);
}

#[test]
fn json_and_ndjson_conflict() {
    let parse = Cli::try_parse_from(["strokefont", "build", "--json", "--ndjson", "glyphs.json"]);
    assert!(parse.is_err());
}

#[test]
fn preview_requires_output() {
    assert!(Cli::try_parse_from(["strokefont", "preview", "glyphs.json"]).is_err());

    let cli = Cli::try_parse_from(["strokefont", "-vv", "preview", "glyphs.json", "-o", "a.svg"])
        .expect("parse cli");
    assert_eq!(cli.verbose, 2);
    match cli.command {
        Command::Preview(args) => assert_eq!(args.output, PathBuf::from("a.svg")),
        other => panic!("expected preview, got {other:?}"),
    }
}

#[test]
fn flags_override_config_file() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("font.json");
    fs::write(&path, r#"{"units_per_em": 2048, "stroke_width": 0.2}"#).expect("write");

    let args = build_args(&[
        "strokefont",
        "build",
        "glyphs.json",
        "--config",
        path.to_str().expect("utf8 path"),
        "-w",
        "0.05",
    ]);
    let config = resolve_config(&args.input).expect("config");
    assert_eq!(config.units_per_em, 2048.0);
    assert_eq!(config.stroke_width, 0.05);
}

#[test]
fn unknown_config_keys_are_rejected() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("font.json");
    fs::write(&path, r#"{"stroke": 0.2}"#).expect("write");

    let err = load_config(&path).expect_err("unknown key");
    assert!(err.to_string().contains("parsing config"));
}

#[test]
fn writes_plain_one_line_per_glyph() {
    let glyphs = vec![glyph("A", 'A', 600.0), glyph("uni0020", ' ', 500.0)];

    let mut buf = Cursor::new(Vec::new());
    write_plain(&glyphs, &mut buf).expect("write");

    let output = String::from_utf8(buf.into_inner()).expect("utf8");
    assert_eq!(output, "A\tU+0041\t600\nuni0020\tU+0020\t500\n");
}

#[test]
fn columns_align_codes() {
    let glyphs = vec![glyph("A", 'A', 600.0), glyph("uni00E9", 'é', 500.0)];

    let mut buf = Cursor::new(Vec::new());
    write_columns(&glyphs, &mut buf, false).expect("write");

    let output = String::from_utf8(buf.into_inner()).expect("utf8");
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    let a_pos = lines[0].find("U+0041").expect("A code");
    let e_pos = lines[1].find("U+00E9").expect("é code");
    assert_eq!(a_pos, e_pos);
    assert!(lines[0].contains("faces:1"));
}

#[test]
fn color_choice_is_applied() {
    let glyphs = vec![glyph("A", 'A', 600.0)];

    let mut buf = Cursor::new(Vec::new());
    write_columns(&glyphs, &mut buf, true).expect("write");

    let output = String::from_utf8(buf.into_inner()).expect("utf8");
    assert!(output.contains("\u{1b}["));
}

#[test]
fn help_output_lists_config_flags() {
    let mut root = Cli::command();
    let build = root
        .find_subcommand_mut("build")
        .expect("build command present");
    let help = build.render_long_help().to_string();
    assert!(help.contains("--stroke-width"));
    assert!(help.contains("--width-policy"));
    assert!(help.contains("--config"));
    assert!(help.contains("--jobs"));
}
