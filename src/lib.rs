//! Circlegen: synthetic circle-detection datasets.
//!
//! Circlegen places non-overlapping circles on a canvas, renders them as
//! rings, annotates each with its bounding box and packs the results into
//! length-prefixed, CRC32C-checksummed record containers of `tf.Example`
//! compatible payloads, split into training and validation subsets.
//!
//! # Modules
//!
//! - [`geometry`]: rejection sampling of circles
//! - [`annotate`]: boxes and example feature maps
//! - [`feature`]: the feature map and its binary encoding
//! - [`record`]: container framing
//! - [`split`]: train/validation partitioning and manifests
//! - [`pipeline`]: the end-to-end session driver
//! - [`inspect`]: container summaries
//! - [`ir`]: shared geometry types and on-disk annotation formats

pub mod annotate;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod inspect;
pub mod ir;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod split;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use tracing::Level;

pub use error::CirclegenError;

use geometry::GeneratorConfig;
use pipeline::SessionConfig;
use render::PngCodec;
use split::{DatasetManifest, SplitPolicy};

/// The circlegen CLI application.
#[derive(Parser)]
#[command(name = "circlegen")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Generate a session of ring images, annotations, manifests and containers.
    Generate(GenerateArgs),
    /// Split a directory of images into training and validation manifests.
    Split(SplitArgs),
    /// Summarize the records in a container.
    Inspect(InspectArgs),
}

/// Arguments for the generate subcommand.
#[derive(clap::Args)]
struct GenerateArgs {
    /// Parent directory for the session.
    #[arg(short, long, default_value = "output")]
    out: PathBuf,

    /// Session directory name (defaults to a fresh UUID).
    #[arg(long)]
    session: Option<String>,

    /// Number of images to generate.
    #[arg(short = 'n', long, default_value_t = 20)]
    count: usize,

    #[arg(long, default_value_t = 128)]
    width: u32,

    #[arg(long, default_value_t = 128)]
    height: u32,

    /// Fewest circles requested per image.
    #[arg(long, default_value_t = 0)]
    min_circles: usize,

    /// Most circles requested per image.
    #[arg(long, default_value_t = 10)]
    max_circles: usize,

    #[arg(long, default_value_t = 5)]
    min_radius: u32,

    /// Largest radius (defaults to a quarter of the shorter side).
    #[arg(long)]
    max_radius: Option<u32>,

    /// Clearance between circle rims, in pixels.
    #[arg(long, default_value_t = 1.0)]
    margin: f32,

    /// Consecutive rejected placements before an image is left short.
    #[arg(long, default_value_t = 1000)]
    max_attempts: usize,

    /// Fraction of images assigned to validation.
    #[arg(long, default_value_t = 0.2)]
    val_ratio: f64,

    /// Split policy ('shuffled' or 'sorted').
    #[arg(long, default_value = "shuffled")]
    policy: SplitPolicy,

    /// Random seed for reproducible sessions.
    #[arg(long, env = "CIRCLEGEN_SEED")]
    seed: Option<u64>,

    #[arg(long, default_value = ir::CIRCLE_CLASS_NAME)]
    class_name: String,

    #[arg(long, default_value_t = ir::CIRCLE_CLASS_ID)]
    class_id: i64,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the split subcommand.
#[derive(clap::Args)]
struct SplitArgs {
    /// Directory holding the images (not searched recursively).
    images_dir: PathBuf,

    /// Directory receiving trainval.txt, training.txt and validation.txt.
    #[arg(short, long)]
    out: PathBuf,

    #[arg(long, default_value_t = 0.2)]
    ratio: f64,

    /// Split policy ('shuffled' or 'sorted').
    #[arg(long, default_value = "shuffled")]
    policy: SplitPolicy,

    #[arg(long, env = "CIRCLEGEN_SEED")]
    seed: Option<u64>,

    /// Image file extension to list.
    #[arg(long, default_value = "png")]
    extension: String,
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// Container file to inspect.
    input: PathBuf,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,

    /// Width of histogram bars.
    #[arg(long, default_value_t = 20)]
    bar_width: usize,
}

/// Run the circlegen CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), CirclegenError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Generate(args)) => run_generate(args),
        Some(Commands::Split(args)) => run_split(args),
        Some(Commands::Inspect(args)) => run_inspect(args),
        None => {
            println!("circlegen {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Synthetic circle-detection datasets.");
            println!();
            println!("Run 'circlegen --help' for usage information.");
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn check_output_format(output: &str) -> Result<(), CirclegenError> {
    match output {
        "text" | "json" => Ok(()),
        other => Err(CirclegenError::UnsupportedFormat(format!(
            "'{other}' (supported: text, json)"
        ))),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CirclegenError> {
    check_output_format(&args.output)?;

    let defaults = SessionConfig::default();
    let config = SessionConfig {
        output_dir: args.out,
        session_id: args.session.unwrap_or(defaults.session_id),
        image_count: args.count,
        image_width: args.width,
        image_height: args.height,
        min_circles: args.min_circles,
        max_circles: args.max_circles,
        generator: GeneratorConfig {
            min_radius: args.min_radius,
            max_radius: args.max_radius,
            margin: args.margin,
            max_attempts: args.max_attempts,
        },
        val_ratio: args.val_ratio,
        split_policy: args.policy,
        class_name: args.class_name,
        class_id: args.class_id,
    };

    let report = if let Some(seed) = args.seed {
        let mut rng = StdRng::seed_from_u64(seed);
        pipeline::build_session(&config, &PngCodec, &mut rng, None)?
    } else {
        let mut rng = rand::rng();
        pipeline::build_session(&config, &PngCodec, &mut rng, None)?
    };

    if args.output == "json" {
        println!("{}", to_json(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

fn run_split(args: SplitArgs) -> Result<(), CirclegenError> {
    let ids = split::list_images(&args.images_dir, &args.extension)?;

    let split = if let Some(seed) = args.seed {
        let mut rng = StdRng::seed_from_u64(seed);
        split::split(&ids, args.ratio, args.policy, &mut rng)?
    } else {
        let mut rng = rand::rng();
        split::split(&ids, args.ratio, args.policy, &mut rng)?
    };

    let manifest = DatasetManifest::new(ids, split);
    manifest.write(&args.out)?;

    println!(
        "✓ Split {} images: {} training, {} validation -> {}",
        manifest.all.len(),
        manifest.split.train.len(),
        manifest.split.val.len(),
        args.out.display()
    );
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<(), CirclegenError> {
    check_output_format(&args.output)?;

    let opts = inspect::InspectOptions {
        bar_width: args.bar_width,
    };
    let report = inspect::inspect_container(&args.input, &opts)?;

    if args.output == "json" {
        println!("{}", to_json(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CirclegenError> {
    serde_json::to_string_pretty(value).map_err(|source| CirclegenError::ReportSerialize { source })
}
