//! geo-export - model export tool
//!
//! Converts editor projects (.bbmodel) into entity geometry (.json)

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use geo_export::convert::{self, default_output_path};
use geo_export::manifest::{self, GeoManifest, DEFAULT_MANIFEST};
use geo_export::{CompileOptions, LooseElements};

#[derive(Parser)]
#[command(name = "geo-export")]
#[command(about = "Entity geometry export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single project file
    Convert {
        /// Input .bbmodel file
        input: PathBuf,

        /// Output .json file (default: next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write everything on a single line
        #[arg(long)]
        compact: bool,

        /// Leave out visible_bounds_* from the description
        #[arg(long)]
        no_bounds: bool,

        /// Fail instead of grouping loose elements into bb_main
        #[arg(long)]
        reject_loose: bool,
    },

    /// Convert every project found through a manifest
    Build {
        /// Path to geo-export.toml manifest
        #[arg(default_value = DEFAULT_MANIFEST)]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compile every project found through a manifest without writing
    Check {
        /// Path to geo-export.toml manifest
        #[arg(default_value = DEFAULT_MANIFEST)]
        manifest: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            compact,
            no_bounds,
            reject_loose,
        } => {
            let output = output.unwrap_or_else(|| default_output_path(&input));
            let options = CompileOptions {
                compact,
                visible_bounds: !no_bounds,
                loose_elements: if reject_loose {
                    LooseElements::Reject
                } else {
                    LooseElements::Group
                },
            };
            tracing::info!("Converting {:?} -> {:?}", input, output);
            convert::convert_bbmodel(&input, &output, &options)?;
            tracing::info!("Done!");
        }

        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building models from {:?}", manifest);
            }
            let (config, jobs) = load_jobs(&manifest, output.as_deref())?;
            if verbose {
                for job in &jobs {
                    tracing::info!("  {} -> {}", job.input.display(), job.output.display());
                }
            }
            let report = manifest::build_all(&jobs, &config.output.options);
            report.log();
            if !report.is_success() {
                bail!("{} of {} models failed to convert", report.failed(), jobs.len());
            }
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking models from {:?}", manifest);
            let (config, jobs) = load_jobs(&manifest, None)?;
            let report = manifest::check_all(&jobs, &config.output.options);
            report.log();
            if !report.is_success() {
                bail!("{} of {} models are invalid", report.failed(), jobs.len());
            }
            tracing::info!("All models are valid!");
        }
    }

    Ok(())
}

fn load_jobs(path: &Path, output: Option<&Path>) -> Result<(GeoManifest, Vec<manifest::Job>)> {
    let config = GeoManifest::load(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let jobs = config.jobs(base_dir, output)?;
    if jobs.is_empty() {
        tracing::warn!("No models found under {:?}", base_dir.join(&config.source.root));
    }
    Ok((config, jobs))
}
