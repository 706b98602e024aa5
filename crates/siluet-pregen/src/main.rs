//! siluet-pregen: offline collision outline pregeneration.
//!
//! Traces a sprite image into a collision outline, reports geometry
//! stats, and writes the binary outline file that games load at
//! startup instead of re-tracing. Useful for:
//!
//! - Baking `.slto` outline files into asset pipelines
//! - Tuning the alpha threshold and accuracy level per sprite
//! - Inspecting the traced geometry as an SVG or PNG overlay
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin siluet-pregen -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use image::{Rgba, RgbaImage};
use siluet_collide::{Accuracy, Outline, TraceConfig, TraceMode, trace_outline};
use siluet_export::svg::{SvgOptions, to_svg};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Pregenerate collision outlines from sprite images.
///
/// Traces the alpha channel of the given image, prints geometry stats,
/// and optionally writes the binary outline plus SVG/PNG debug views.
#[derive(Parser)]
#[command(name = "siluet-pregen", version)]
struct Cli {
    /// Path to the sprite image (PNG, JPEG, BMP).
    image_path: PathBuf,

    /// Alpha threshold in [0, 1]; pixels at or above it are solid.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_TRANS_LIMIT)]
    trans_limit: f32,

    /// Simplification accuracy for the traced boundary.
    #[arg(long, value_enum, default_value_t = AccuracyArg::Medium)]
    accuracy: AccuracyArg,

    /// Use column-run tracing instead of free boundary following.
    #[arg(long)]
    columns: bool,

    /// Also trace hole boundaries (enclosed transparent regions).
    #[arg(long)]
    include_holes: bool,

    /// Points per collision sub-circle.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_CHUNK_SIZE, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(2..))]
    chunk_size: usize,

    /// Free-mode scan start as "X,Y" pixel coordinates.
    #[arg(long, value_name = "X,Y")]
    start: Option<String>,

    /// Write the binary outline to this file.
    #[arg(long, value_name = "FILE.slto")]
    out: Option<PathBuf>,

    /// Write an SVG debug view to this file.
    #[arg(long, value_name = "FILE.svg")]
    svg: Option<PathBuf>,

    /// Include sub-circle and enclosing-disc overlays in the SVG.
    #[arg(long)]
    overlays: bool,

    /// Write a PNG preview (outline strokes over the sprite).
    #[arg(long, value_name = "FILE.png")]
    preview: Option<PathBuf>,

    /// Number of trace runs for timing averages.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Print stats as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

/// Simplification accuracy selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum AccuracyArg {
    /// Keep every traced point.
    Raw,
    /// 0.5 px tolerance.
    High,
    /// 1.0 px tolerance.
    Medium,
    /// 2.0 px tolerance.
    Low,
    /// 4.0 px tolerance.
    Poor,
}

impl From<AccuracyArg> for Accuracy {
    fn from(arg: AccuracyArg) -> Self {
        match arg {
            AccuracyArg::Raw => Self::Raw,
            AccuracyArg::High => Self::High,
            AccuracyArg::Medium => Self::Medium,
            AccuracyArg::Low => Self::Low,
            AccuracyArg::Poor => Self::Poor,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let image = image::open(&cli.image_path)
        .map_err(|e| format!("cannot open {}: {e}", cli.image_path.display()))?
        .to_rgba8();
    let config = build_config(cli)?;

    let started = Instant::now();
    let outline = trace_outline(&image, &config);
    let mut total = started.elapsed();
    for _ in 1..cli.runs {
        let run_start = Instant::now();
        let _ = trace_outline(&image, &config);
        total += run_start.elapsed();
    }
    #[allow(clippy::cast_possible_truncation)]
    let average = total / cli.runs as u32;

    report(cli, &image, &outline, average);

    if let Some(path) = &cli.out {
        let file = File::create(path).map_err(|e| format!("cannot create {}: {e}", path.display()))?;
        let mut writer = BufWriter::new(file);
        outline
            .save(&mut writer)
            .map_err(|e| format!("cannot write outline: {e}"))?;
    }

    if let Some(path) = &cli.svg {
        let options = SvgOptions {
            sub_circles: cli.overlays,
            enclosing_disc: cli.overlays,
        };
        fs::write(path, to_svg(&outline, &options))
            .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
    }

    if let Some(path) = &cli.preview {
        let preview = render_preview(&image, &outline);
        preview
            .save(path)
            .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<TraceConfig, String> {
    if !(0.0..=1.0).contains(&cli.trans_limit) {
        return Err(format!(
            "trans-limit must be within [0, 1], got {}",
            cli.trans_limit,
        ));
    }
    let start = cli.start.as_deref().map(parse_start).transpose()?;
    Ok(TraceConfig {
        trans_limit: cli.trans_limit,
        accuracy: cli.accuracy.into(),
        mode: if cli.columns {
            TraceMode::Columns
        } else {
            TraceMode::Free
        },
        start,
        include_holes: cli.include_holes,
        chunk_size: cli.chunk_size,
    })
}

/// Parse `--start "X,Y"` pixel coordinates.
fn parse_start(value: &str) -> Result<(u32, u32), String> {
    let (x_str, y_str) = value
        .split_once(',')
        .ok_or_else(|| format!("start must be 'X,Y', got: '{value}'"))?;
    let x = x_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid start X '{x_str}': {e}"))?;
    let y = y_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid start Y '{y_str}': {e}"))?;
    Ok((x, y))
}

fn report(cli: &Cli, image: &RgbaImage, outline: &Outline, average: Duration) {
    let contours = outline.contours().len();
    let holes = outline.contours().iter().filter(|c| c.is_hole()).count();
    let points: usize = outline.contours().iter().map(siluet_collide::Contour::len).sum();
    let sub_circles: usize = outline
        .contours()
        .iter()
        .map(|c| c.sub_circles().len())
        .sum();

    if cli.json {
        let stats = serde_json::json!({
            "image": cli.image_path.display().to_string(),
            "width": image.width(),
            "height": image.height(),
            "contours": contours,
            "holes": holes,
            "points": points,
            "sub_circles": sub_circles,
            "trace_ms": average.as_secs_f64() * 1000.0,
            "runs": cli.runs,
        });
        println!("{stats}");
    } else {
        println!(
            "{}: {}x{} px",
            cli.image_path.display(),
            image.width(),
            image.height(),
        );
        println!("contours:    {contours} ({holes} holes)");
        println!("points:      {points}");
        println!("sub-circles: {sub_circles}");
        println!(
            "trace time:  {:.3} ms (avg over {} run{})",
            average.as_secs_f64() * 1000.0,
            cli.runs,
            if cli.runs == 1 { "" } else { "s" },
        );
    }
}

/// Stroke the traced outline over the sprite for a quick visual check.
fn render_preview(image: &RgbaImage, outline: &Outline) -> RgbaImage {
    let (width, height) = image.dimensions();
    let layer = render_outline_layer(outline, width, height);

    let mut preview = image.clone();
    for (target, source) in preview.pixels_mut().zip(layer.pixels()) {
        let alpha = u16::from(source[3]);
        if alpha == 0 {
            continue;
        }
        let blend = |under: u8, over: u8| -> u8 {
            #[allow(clippy::cast_possible_truncation)]
            let value =
                (u16::from(over) * alpha + u16::from(under) * (255 - alpha)) / 255;
            value as u8
        };
        *target = Rgba([
            blend(target[0], source[0]),
            blend(target[1], source[1]),
            blend(target[2], source[2]),
            target[3].max(source[3]),
        ]);
    }
    preview
}

/// Render the outline's world-space contours as anti-aliased strokes on
/// a transparent layer.
fn render_outline_layer(outline: &Outline, width: u32, height: u32) -> RgbaImage {
    let transform = siluet_collide::Transform {
        translation: outline.translation(),
        rotation: outline.rotation(),
        scale: outline.scale(),
    };

    let mut pb = PathBuilder::new();
    for contour in outline.contours() {
        let mut points = contour.points().iter().map(|&p| transform.apply(p));
        let Some(first) = points.next() else {
            continue;
        };
        pb.move_to(first.x, first.y);
        for p in points {
            pb.line_to(p.x, p.y);
        }
        pb.close();
    }

    let blank = || RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let Some(path) = pb.finish() else {
        return blank();
    };
    let Some(mut pixmap) = Pixmap::new(width, height) else {
        return blank();
    };

    let stroke = Stroke {
        width: 1.0,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    let mut paint = Paint::default();
    paint.set_color_rgba8(232, 72, 85, 255);
    paint.anti_alias = true;
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);

    // Convert premultiplied pixmap data back to straight RGBA.
    let data = pixmap.data();
    let mut layer = blank();
    for (i, pixel) in layer.pixels_mut().enumerate() {
        let off = i * 4;
        let alpha = data[off + 3];
        if alpha == 0 {
            continue;
        }
        #[allow(clippy::cast_possible_truncation)]
        let unmultiply = |channel: u8| (u16::from(channel) * 255 / u16::from(alpha)) as u8;
        *pixel = Rgba([
            unmultiply(data[off]),
            unmultiply(data[off + 1]),
            unmultiply(data[off + 2]),
            alpha,
        ]);
    }
    layer
}
