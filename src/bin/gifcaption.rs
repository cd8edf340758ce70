use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use gifcaption::{
    AbGlyphParser, DEFAULT_FONT_CACHE_CAPACITY, DEFAULT_FLATTEN_WORKERS, FlattenOpts, FontCache,
    FontRegistry, LoggingConfig, Options, Placement, Rgba8,
};

#[derive(Parser, Debug)]
#[command(name = "gifcaption", version, about = "Caption, retime and flatten animated GIFs")]
struct Cli {
    /// Default log filter when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crop, rescale, retime and caption a GIF.
    Caption(CaptionArgs),
    /// Flatten every frame of a GIF into numbered PNG files.
    Convert(ConvertArgs),
    /// Print the names of discoverable fonts.
    ListFonts(FontArgs),
}

#[derive(Args, Debug)]
struct FontArgs {
    /// Extra directory to search for .ttf/.otf files (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct CaptionArgs {
    /// Input GIF.
    input: PathBuf,

    /// Output GIF.
    output: PathBuf,

    /// JSON options file; flags below override its fields.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Caption text.
    #[arg(long)]
    text: Option<String>,

    /// Font name (file name without extension).
    #[arg(long)]
    font: Option<String>,

    /// Speed multiplier; negative values reverse playback.
    #[arg(long, allow_negative_numbers = true)]
    speed: Option<f64>,

    /// Caption position: above, top, middle, bottom, below or 0..=4.
    #[arg(long)]
    position: Option<Placement>,

    #[arg(long)]
    crop_top: Option<f64>,
    #[arg(long)]
    crop_bottom: Option<f64>,
    #[arg(long)]
    crop_left: Option<f64>,
    #[arg(long)]
    crop_right: Option<f64>,

    /// Fraction of frames trimmed from the start.
    #[arg(long)]
    start: Option<f64>,

    /// Fraction of frames trimmed from the end.
    #[arg(long)]
    end: Option<f64>,

    #[arg(long)]
    scale_width: Option<f64>,
    #[arg(long)]
    scale_height: Option<f64>,

    /// Multiplier on the width-derived font size.
    #[arg(long)]
    font_size: Option<f64>,

    /// Text color as #RRGGBB or #RRGGBBAA.
    #[arg(long)]
    text_color: Option<Rgba8>,

    /// Caption box color for above/below placements.
    #[arg(long)]
    background_color: Option<Rgba8>,

    /// Number of parsed fonts kept in memory.
    #[arg(long, default_value_t = DEFAULT_FONT_CACHE_CAPACITY)]
    font_cache: usize,

    #[command(flatten)]
    fonts: FontArgs,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input GIF.
    input: PathBuf,

    /// Output directory for 000.png, 001.png, ...
    out_dir: PathBuf,

    /// Regions each large frame is split into.
    #[arg(long, default_value_t = DEFAULT_FLATTEN_WORKERS)]
    workers: usize,

    /// Size of a dedicated thread pool (default: rayon's global pool).
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    gifcaption::init_logging(&LoggingConfig {
        level: cli.log_level.clone(),
        json: cli.log_json,
    });

    match cli.cmd {
        Command::Caption(args) => cmd_caption(args),
        Command::Convert(args) => cmd_convert(args),
        Command::ListFonts(args) => cmd_list_fonts(args),
    }
}

fn read_gif(path: &Path) -> anyhow::Result<gifcaption::Animation> {
    let bytes = std::fs::read(path).with_context(|| format!("read gif '{}'", path.display()))?;
    gifcaption::decode_gif(&bytes).with_context(|| format!("decode gif '{}'", path.display()))
}

fn read_options(path: &Path) -> anyhow::Result<Options> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read options '{}'", path.display()))?;
    Ok(Options::from_json(&json)?)
}

fn resolve_options(args: &CaptionArgs) -> anyhow::Result<Options> {
    let mut opts = match &args.options {
        Some(path) => read_options(path)?,
        None => Options::default(),
    };

    if let Some(v) = &args.text {
        opts.caption = v.clone();
    }
    if let Some(v) = &args.font {
        opts.font = v.clone();
    }
    if let Some(v) = args.position {
        opts.placement = v;
    }
    if let Some(v) = args.text_color {
        opts.text_color = Some(v);
    }
    if let Some(v) = args.background_color {
        opts.background_color = Some(v);
    }
    let numeric = [
        (args.speed, &mut opts.speed),
        (args.crop_top, &mut opts.crop_top),
        (args.crop_bottom, &mut opts.crop_bottom),
        (args.crop_left, &mut opts.crop_left),
        (args.crop_right, &mut opts.crop_right),
        (args.start, &mut opts.start),
        (args.end, &mut opts.end),
        (args.scale_width, &mut opts.scale_width),
        (args.scale_height, &mut opts.scale_height),
        (args.font_size, &mut opts.font_size),
    ];
    for (flag, field) in numeric {
        if let Some(v) = flag {
            *field = v;
        }
    }
    Ok(opts)
}

fn cmd_caption(args: CaptionArgs) -> anyhow::Result<()> {
    let opts = resolve_options(&args)?;
    let input = read_gif(&args.input)?;
    let fonts = FontCache::with_default_paths(AbGlyphParser, &args.fonts.font_dirs, args.font_cache)?;

    let output = gifcaption::transform(&input, &opts, &fonts)?;
    let bytes = gifcaption::encode_gif(&output)?;

    if let Some(parent) = args.output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.output, bytes)
        .with_context(|| format!("write gif '{}'", args.output.display()))?;

    eprintln!(
        "wrote {} ({} frames, {}x{})",
        args.output.display(),
        output.len(),
        output.canvas().width,
        output.canvas().height
    );
    Ok(())
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let input = read_gif(&args.input)?;
    let rasters = gifcaption::flatten_with(
        &input,
        &FlattenOpts {
            workers: args.workers,
            threads: args.threads,
            ..FlattenOpts::default()
        },
    )?;
    let written = gifcaption::write_png_sequence(&rasters, &args.out_dir)?;
    eprintln!("wrote {} frames to {}", written.len(), args.out_dir.display());
    Ok(())
}

fn cmd_list_fonts(args: FontArgs) -> anyhow::Result<()> {
    let mut paths = gifcaption::default_search_paths();
    paths.extend(args.font_dirs);
    for name in FontRegistry::discover(&paths).names() {
        println!("{name}");
    }
    Ok(())
}
