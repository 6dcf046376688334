use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;

use particle_count_rust_lib::{
    analyze_image, load_image, run_batch, run_single, Config,
};
use particle_count_rust_lib::preview::show_preview;

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "Particle counting for grayscale microscopy images")]
struct Args {
    /// Path to input file or directory
    #[clap(short, long)]
    input: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file (defaults are used when it does not exist)
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Use the linear gain/bias transform instead of CLAHE (overwrites config)
    #[clap(long)]
    linear: bool,

    /// Minimum accepted particle area (overwrites config)
    #[clap(long)]
    min_area: Option<f64>,

    /// Maximum accepted particle area (overwrites config)
    #[clap(long)]
    max_area: Option<f64>,

    /// Enable debug mode (save masks and print more info)
    #[clap(short, long)]
    debug: bool,

    /// Show the annotated result in a window (single input file only)
    #[clap(long)]
    preview: bool,

    /// Write the effective configuration to this path and exit
    #[clap(long)]
    write_default_config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    // Load configuration
    let mut config = Config::from_file_or_default(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config))?;

    // Override config with command-line arguments
    if let Some(input) = args.input.clone() {
        config.input_path = input;
    }

    if let Some(output) = args.output.clone() {
        config.output_dir = output;
    }

    if args.linear {
        config.use_clahe = false;
    }

    if let Some(min_area) = args.min_area {
        config.min_area = min_area;
    }

    if let Some(max_area) = args.max_area {
        config.max_area = max_area;
    }

    if let Some(path) = args.write_default_config {
        config
            .save_to_file(&path)
            .with_context(|| format!("writing configuration to {}", path.display()))?;
        log::info!("Configuration written to {}", path.display());
        return Ok(());
    }

    // Fail fast on bad parameters before any file is read
    config.validate().context("invalid configuration")?;

    let start_time = Instant::now();
    let input_path = PathBuf::from(&config.input_path);
    let output_dir = PathBuf::from(&config.output_dir);

    if args.preview {
        if !input_path.is_file() {
            bail!("Preview mode requires a single input file, not a directory");
        }
        let input_image = load_image(&input_path)?;
        let analysis = analyze_image(&input_image.image, &config)?;
        log::info!("Detected {} particles.", analysis.particles.len());
        show_preview(&input_image.filename, &analysis.annotated)?;
        return Ok(());
    }

    if input_path.is_file() {
        run_single(&input_path, &output_dir, &config, args.debug)
            .with_context(|| format!("processing {}", input_path.display()))?;
    } else if input_path.is_dir() {
        run_batch(&input_path, &output_dir, &config, args.debug)
            .with_context(|| format!("processing directory {}", input_path.display()))?;
    } else {
        bail!("Invalid input path: {}", input_path.display());
    }

    // Report elapsed time
    let elapsed = start_time.elapsed();
    log::info!("Processing completed in {:.2} seconds", elapsed.as_secs_f64());

    Ok(())
}
