use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use wildwood::{
    ColorDef, FfmpegSink, FfmpegSinkOpts, FrameSink, LogicalSize, PngSequenceSink, ResizeSpec,
    Timeline,
};

#[derive(Parser, Debug)]
#[command(name = "wildwood", version, about = "Animated generative forest renderer")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame of a fresh forest as a PNG.
    Still(StillArgs),
    /// Mount the forest on a virtual display and record what it presents.
    Run(RunArgs),
    /// Print a freshly generated scene as JSON.
    Scene(SceneArgs),
}

#[derive(Args, Debug)]
struct StillArgs {
    #[arg(long, default_value_t = 1280.0)]
    width: f64,
    #[arg(long, default_value_t = 720.0)]
    height: f64,
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,
    /// Time since mount, in milliseconds.
    #[arg(long = "time-ms", default_value_t = 0.0)]
    time_ms: f64,
    /// Background the frame is flattened over.
    #[arg(long, default_value = "#000000", value_parser = ColorDef::parse)]
    background: ColorDef,
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Timeline JSON; replaces all viewport flags below.
    #[arg(
        long,
        conflicts_with_all = [
            "width",
            "height",
            "dpr",
            "refresh_hz",
            "duration_ms",
            "resize",
            "unmount_at_ms",
            "background",
        ]
    )]
    timeline: Option<PathBuf>,

    #[arg(long, default_value_t = 1280.0)]
    width: f64,
    #[arg(long, default_value_t = 720.0)]
    height: f64,
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,
    #[arg(long = "refresh-hz", default_value_t = 60)]
    refresh_hz: u32,
    #[arg(long = "duration-ms", default_value_t = 3000.0)]
    duration_ms: f64,
    /// Viewport change, as `AT_MS:WIDTHxHEIGHT`. Repeatable.
    #[arg(long, value_parser = parse_resize)]
    resize: Vec<ResizeSpec>,
    #[arg(long = "unmount-at-ms")]
    unmount_at_ms: Option<f64>,
    #[arg(long, default_value = "#000000", value_parser = ColorDef::parse)]
    background: ColorDef,

    /// Output MP4 path (requires `ffmpeg` on PATH).
    #[arg(long, required_unless_present = "frames_dir", conflicts_with = "frames_dir")]
    out: Option<PathBuf>,
    /// Write a PNG per presented frame into this directory instead.
    #[arg(long = "frames-dir")]
    frames_dir: Option<PathBuf>,
    /// Refuse to replace an existing MP4 at `--out`.
    #[arg(long = "no-overwrite", requires = "out")]
    no_overwrite: bool,
}

#[derive(Args, Debug)]
struct SceneArgs {
    #[arg(long, default_value_t = 1280.0)]
    width: f64,
    #[arg(long, default_value_t = 720.0)]
    height: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Still(args) => cmd_still(args),
        Command::Run(args) => cmd_run(args),
        Command::Scene(args) => cmd_scene(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_resize(s: &str) -> Result<ResizeSpec, String> {
    let (at, size) = s
        .split_once(':')
        .ok_or_else(|| format!("expected AT_MS:WIDTHxHEIGHT, got '{s}'"))?;
    let (w, h) = size
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT after ':', got '{size}'"))?;
    let num = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{v}': {e}"))
    };
    Ok(ResizeSpec {
        at_ms: num(at)?,
        width: num(w)?,
        height: num(h)?,
    })
}

fn cmd_still(args: StillArgs) -> anyhow::Result<()> {
    let frame = wildwood::render_still(
        LogicalSize::new(args.width, args.height),
        args.dpr,
        args.time_ms,
    )?;
    anyhow::ensure!(!frame.is_empty(), "viewport {}x{} is empty", args.width, args.height);

    let pixels = frame.flatten_over(args.background.to_rgba8_straight())?;

    wildwood::encode::ffmpeg::ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &pixels,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let timeline = match &args.timeline {
        Some(path) => Timeline::from_json_path(path)
            .with_context(|| format!("load timeline '{}'", path.display()))?,
        None => {
            let mut t = Timeline::new(LogicalSize::new(args.width, args.height), args.duration_ms);
            t.device_pixel_ratio = args.dpr;
            t.refresh_hz = args.refresh_hz;
            t.resizes = args.resize.clone();
            t.unmount_at_ms = args.unmount_at_ms;
            t.background = args.background;
            t.validate()?;
            t
        }
    };

    let bg_rgba = timeline.background_rgba();
    let sink: Box<dyn FrameSink> = match (&args.out, &args.frames_dir) {
        (Some(out), _) => Box::new(FfmpegSink::new(FfmpegSinkOpts {
            out_path: out.clone(),
            overwrite: !args.no_overwrite,
            bg_rgba,
        })),
        (None, Some(dir)) => Box::new(PngSequenceSink::new(dir.clone(), bg_rgba)),
        (None, None) => anyhow::bail!("one of --out or --frames-dir is required"),
    };

    let report = timeline.run(sink).context("headless run failed")?;
    eprintln!(
        "presented {} frames ({} regenerations) over {} refreshes",
        report.host.presented, report.canvas.regenerations, report.host.ticks
    );
    match (&args.out, &args.frames_dir) {
        (Some(out), _) => eprintln!("wrote {}", out.display()),
        (None, Some(dir)) => eprintln!("wrote frames to {}", dir.display()),
        (None, None) => {}
    }
    Ok(())
}

fn cmd_scene(args: SceneArgs) -> anyhow::Result<()> {
    let scene =
        wildwood::generate_scene(LogicalSize::new(args.width, args.height), &mut rand::rng());
    let json = serde_json::to_string_pretty(&scene).context("serialize scene")?;
    println!("{json}");
    Ok(())
}
