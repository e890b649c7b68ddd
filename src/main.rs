use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;

use section_align_rust_lib::{
    get_csv_files_in_dir, load_contour_csv, process_batch, process_section_file, Config, Contour,
};

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "SectionAlign - Contour correspondence landmarks for section-to-atlas alignment")]
struct Args {
    /// Section outline CSV or directory of outlines
    #[clap(short, long)]
    input: Option<String>,

    /// Reference (atlas) outline CSV
    #[clap(short, long)]
    reference: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Refinement levels (overwrites config)
    #[clap(short, long)]
    levels: Option<u32>,

    /// Angular search tolerance in radians (overwrites config)
    #[clap(long)]
    phi_tol: Option<f64>,

    /// Skip greedy optimization of the section landmarks
    #[clap(long)]
    no_optimize: bool,

    /// Also write pairs as JSON
    #[clap(long)]
    json: bool,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if Path::new(path).exists() {
        Config::from_file(path).with_context(|| format!("loading configuration {}", path))
    } else {
        log::info!("No configuration at {}, using defaults", path);
        Ok(Config::default())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let mut config = load_config(&args.config)?;

    // Override config with command-line arguments
    if let Some(input) = args.input {
        config.input_path = input;
    }
    if let Some(reference) = args.reference {
        config.reference_path = reference;
    }
    if let Some(output) = args.output {
        config.output_base_dir = output;
    }
    if let Some(levels) = args.levels {
        config.levels = levels;
    }
    if let Some(phi_tol) = args.phi_tol {
        config.phi_tol = phi_tol;
    }
    if args.no_optimize {
        config.optimize = false;
    }

    config.validate()?;
    config.validate_paths()?;

    let start_time = Instant::now();

    let reference_input = load_contour_csv(&config.reference_path)
        .with_context(|| format!("reading reference outline {}", config.reference_path))?;
    let reference = Contour::new(reference_input.points)
        .with_context(|| format!("building reference contour {}", config.reference_path))?;
    log::info!(
        "Reference {}: {} points, centroid ({:.1}, {:.1}), theta {:.3}",
        config.reference_path,
        reference.len(),
        reference.centroid().0,
        reference.centroid().1,
        reference.theta()
    );

    let input_path = PathBuf::from(&config.input_path);

    if input_path.is_file() {
        log::info!("Processing single file: {}", input_path.display());
        process_section_file(&input_path, &reference, &config, args.json)
            .with_context(|| format!("aligning {}", input_path.display()))?;
    } else if input_path.is_dir() {
        let files = get_csv_files_in_dir(&input_path)?;
        log::info!("Found {} outline files in {}", files.len(), input_path.display());

        let summary = process_batch(&files, &reference, &config, args.json)?;
        log::info!("Aligned {} sections, {} failed", summary.processed, summary.failed.len());
        if let Some(path) = summary.summary_path {
            log::info!("Summary written to {}", path.display());
        }
    } else {
        bail!("input path {} is neither a file nor a directory", input_path.display());
    }

    log::info!("Processing completed in {:.2} seconds", start_time.elapsed().as_secs_f64());

    Ok(())
}
