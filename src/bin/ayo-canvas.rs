use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ayo-canvas", version)]
struct Cli {
    /// Log cache and font activity to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a config to PNG.
    Render(RenderArgs),
    /// Parse and validate a config without rendering.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input config JSON. Relative font and image paths resolve against its directory.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Maximum number of cached images.
    #[arg(long, default_value_t = 256)]
    cache_capacity: usize,

    /// Image loading threads (defaults to the number of CPUs).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input config JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn read_config_json(path: &Path) -> anyhow::Result<ayo_canvas::RenderConfig> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let r = BufReader::new(f);
    let config: ayo_canvas::RenderConfig =
        serde_json::from_reader(r).with_context(|| "parse config JSON")?;
    Ok(config)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = read_config_json(&args.in_path)?;
    config.validate()?;

    let assets_root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let mut opts = ayo_canvas::RendererOpts::default()
        .with_cache(ayo_canvas::CachePolicy::default().with_capacity(args.cache_capacity))
        .with_assets_root(assets_root);
    if let Some(n) = args.threads {
        opts = opts.with_load_threads(n);
    }
    let renderer = ayo_canvas::Renderer::with_opts(opts)?;

    let png = renderer.generate(&config)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({}x{})",
        args.out.display(),
        config.width,
        config.height
    );
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let config = read_config_json(&args.in_path)?;
    config.validate()?;

    let elements = config.resolved_elements();
    eprintln!(
        "ok: {}x{}, {} element(s), {} font(s)",
        config.width,
        config.height,
        elements.len(),
        config.required_fonts.len()
    );
    Ok(())
}
