//! `stripcut` CLI - Cut long-strip comics into page-sized segments

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use stripcut::fetch::{HttpSource, PanelSource};
use stripcut::segment::{Background, GutterSegmenter, PanelFragment, assemble};
use stripcut::{ChapterOptions, ChapterRun, Config, Manifest};

#[derive(Parser)]
#[command(name = "stripcut")]
#[command(about = "Cut long-strip comics into page-sized segments")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Configuration file (default: <config dir>/stripcut/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug detail
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Gutters and regions must be taller than this many rows
    #[arg(long, global = true)]
    min_run_height: Option<u32>,

    /// Preferred maximum segment height in rows
    #[arg(long, global = true)]
    max_segment_height: Option<u32>,

    /// JPEG quality of written segments (1-100)
    #[arg(long, global = true)]
    jpeg_quality: Option<u8>,

    /// Strip background
    #[arg(long, global = true, value_enum)]
    background: Option<BackgroundArg>,

    /// Panels fetched at once
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Write panels unchanged instead of segmenting
    #[arg(long, global = true)]
    no_auto_crop: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackgroundArg {
    White,
    Black,
}

impl From<BackgroundArg> for Background {
    fn from(arg: BackgroundArg) -> Self {
        match arg {
            BackgroundArg::White => Background::White,
            BackgroundArg::Black => Background::Black,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Segment local panel images (or a staging directory)
    Split {
        /// Panel images top to bottom, or one directory of numbered images
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Print where local panel images would be cut
    Plan {
        /// Panel images top to bottom, or one directory of numbered images
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Fetch and segment every chapter of a manifest
    Run {
        /// Manifest TOML file
        manifest: PathBuf,

        /// Output root; chapters go to <out>/<series>/<number> - <title>/
        #[arg(short, long)]
        out: PathBuf,

        /// Keep staged panels after the run
        #[arg(long)]
        keep_staging: bool,

        /// Stop at the first failed chapter
        #[arg(long)]
        fail_fast: bool,
    },
}

impl GlobalArgs {
    /// Apply command line overrides on top of the configuration file.
    fn apply(&self, config: &mut Config) {
        if let Some(rows) = self.min_run_height {
            config.segment.min_run_height = rows;
        }
        if let Some(rows) = self.max_segment_height {
            config.segment.max_segment_height = rows;
        }
        if let Some(quality) = self.jpeg_quality {
            config.output.jpeg_quality = quality;
        }
        if let Some(background) = self.background {
            config.segment.background = background.into();
        }
        if let Some(limit) = self.concurrency {
            config.fetch.concurrency_limit = limit;
        }
        if self.no_auto_crop {
            config.output.auto_crop = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let mut config =
        Config::load(cli.global.config.as_deref()).context("failed to load configuration")?;
    cli.global.apply(&mut config);
    let chapter_options = chapter_options(&config)?;

    match cli.command {
        Commands::Split { inputs, out } => cmd_split(&inputs, &out, &chapter_options),
        Commands::Plan { inputs } => cmd_plan(&inputs, &chapter_options),
        Commands::Run {
            manifest,
            out,
            keep_staging,
            fail_fast,
        } => cmd_run(&config, chapter_options, &manifest, &out, keep_staging, fail_fast).await,
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("stripcut=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stripcut=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn chapter_options(config: &Config) -> Result<ChapterOptions> {
    Ok(ChapterOptions::default()
        .with_segment(config.segment_options()?)
        .with_background(config.background())
        .with_write(config.write_options()?)
        .with_auto_crop(config.output.auto_crop))
}

fn read_inputs(inputs: &[PathBuf]) -> Result<Vec<PanelFragment>> {
    let fragments = match inputs {
        [dir] if dir.is_dir() => stripcut::load_staged_fragments(dir)
            .with_context(|| format!("failed to load panels from {}", dir.display()))?,
        _ => stripcut::load_fragments(inputs).context("failed to load panels")?,
    };
    if fragments.is_empty() {
        bail!("no panel images found");
    }
    Ok(fragments)
}

fn cmd_split(inputs: &[PathBuf], out: &Path, options: &ChapterOptions) -> Result<()> {
    let fragments = read_inputs(inputs)?;
    let images = stripcut::write_chapter(&fragments, out, options)
        .with_context(|| format!("failed to write segments to {}", out.display()))?;
    println!(
        "{} panels -> {} images in {}",
        fragments.len(),
        images.len(),
        out.display()
    );
    Ok(())
}

fn cmd_plan(inputs: &[PathBuf], options: &ChapterOptions) -> Result<()> {
    let fragments = read_inputs(inputs)?;
    let canvas = assemble(&fragments, options.background).context("failed to assemble panels")?;
    let spans = GutterSegmenter::new(options.segment.clone())
        .plan(&canvas, options.background)
        .context("failed to plan cuts")?;

    println!("canvas {}x{}", canvas.width(), canvas.height());
    println!(
        "{:>5} {:>8} {:>8} {:>7} {:>10} {:>5}",
        "index", "start", "end", "height", "background", "depth"
    );
    for span in &spans {
        println!(
            "{:>5} {:>8} {:>8} {:>7} {:>10} {:>5}",
            span.index,
            span.start_y,
            span.end_y,
            span.height(),
            span.background.as_str(),
            span.depth
        );
    }
    Ok(())
}

async fn cmd_run(
    config: &Config,
    options: ChapterOptions,
    manifest_path: &Path,
    out: &Path,
    keep_staging: bool,
    fail_fast: bool,
) -> Result<()> {
    let manifest = Manifest::load(manifest_path)
        .with_context(|| format!("failed to read manifest {}", manifest_path.display()))?;
    let source: Arc<dyn PanelSource> =
        Arc::new(HttpSource::new(&config.http_options()).context("failed to build HTTP client")?);
    let fetch = config.fetch_options()?;

    let mut run = ChapterRun::new(out, &manifest.title, options, fetch)
        .with_keep_staging(keep_staging)
        .with_fail_fast(fail_fast);
    let summary = run
        .run_manifest(source, &manifest)
        .await
        .with_context(|| format!("run of '{}' aborted", manifest.title))?;

    for set in &summary.written {
        println!("{:04} {} ({} images)", set.number, set.title, set.images.len());
    }
    for skipped in &summary.skipped {
        println!("{:04} {} skipped: {}", skipped.number, skipped.title, skipped.error);
    }
    println!(
        "{} chapters written, {} skipped -> {}",
        summary.written.len(),
        summary.skipped.len(),
        run.series_dir().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "stripcut",
            "split",
            "a.png",
            "b.png",
            "--out",
            "out",
            "--min-run-height",
            "12",
            "--background",
            "black",
            "--no-auto-crop",
        ])
        .unwrap();
        let mut config = Config::default();
        cli.global.apply(&mut config);
        assert_eq!(config.segment.min_run_height, 12);
        assert_eq!(config.segment.background, Background::Black);
        assert!(!config.output.auto_crop);
        assert!(matches!(cli.command, Commands::Split { ref inputs, .. } if inputs.len() == 2));
    }

    #[test]
    fn test_cli_run_flags() {
        let cli = Cli::try_parse_from([
            "stripcut",
            "--concurrency",
            "3",
            "run",
            "series.toml",
            "-o",
            "out",
            "--keep-staging",
            "--fail-fast",
        ])
        .unwrap();
        assert_eq!(cli.global.concurrency, Some(3));
        assert!(Cli::try_parse_from(["stripcut", "--background", "grey", "plan", "a.png"]).is_err());
        match cli.command {
            Commands::Run {
                keep_staging,
                fail_fast,
                ..
            } => assert!(keep_staging && fail_fast),
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_chapter_options_from_config() {
        let mut config = Config::default();
        config.segment.background = Background::Black;
        let options = chapter_options(&config).unwrap();
        assert_eq!(options.background, Background::Black);
        assert!(options.auto_crop);
    }
}
