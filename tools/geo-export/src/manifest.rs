//! geo-export.toml manifest parsing and batch conversion
//!
//! A manifest names a source directory to scan and the output settings.
//! Every discovered project converts independently and in parallel; one
//! broken file never stops the rest.

use anyhow::{bail, Context, Result};
use hashbrown::HashMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::convert::{convert_bbmodel, convert_bbmodel_to_memory, OUTPUT_EXTENSION};
use crate::error::{ConvertError, ErrorKind};
use crate::geometry::CompileOptions;

/// Default manifest file name
pub const DEFAULT_MANIFEST: &str = "geo-export.toml";

/// geo-export.toml manifest structure
#[derive(Debug, Default, Deserialize)]
pub struct GeoManifest {
    #[serde(default)]
    pub source: SourceSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// Where to look for projects
#[derive(Debug, Deserialize)]
pub struct SourceSection {
    /// Directory scanned recursively, relative to the manifest
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// File extensions to convert (without the dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            extensions: default_extensions(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_extensions() -> Vec<String> {
    vec!["bbmodel".to_string()]
}

/// Where and how to write geometry
#[derive(Debug, Default, Deserialize)]
pub struct OutputSection {
    /// Output directory, relative to the manifest. Default: next to each input.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(flatten)]
    pub options: CompileOptions,
}

impl GeoManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse geo-export.toml")
    }

    /// Resolve the conversion jobs for a manifest located in `base_dir`
    ///
    /// `output_override` replaces the manifest's output directory.
    pub fn jobs(&self, base_dir: &Path, output_override: Option<&Path>) -> Result<Vec<Job>> {
        let root = base_dir.join(&self.source.root);
        let out_dir = match output_override {
            Some(dir) => Some(dir.to_path_buf()),
            None => self.output.directory.as_ref().map(|d| base_dir.join(d)),
        };

        let inputs = discover(&root, &self.source.extensions)?;
        let jobs: Vec<Job> = inputs
            .into_iter()
            .map(|input| {
                let output = output_path(&input, &root, out_dir.as_deref());
                Job { input, output }
            })
            .collect();

        check_output_collisions(&jobs)?;
        Ok(jobs)
    }
}

/// One input file and its destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Find every file under `root` whose extension is in `extensions`
///
/// Matching is case-insensitive; the result is sorted by path.
pub fn discover(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("Source directory not found: {}", root.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Output path for `input`: next to it, or mirrored under `out_dir`
pub fn output_path(input: &Path, root: &Path, out_dir: Option<&Path>) -> PathBuf {
    match out_dir {
        Some(dir) => {
            let relative = input.strip_prefix(root).unwrap_or(input);
            dir.join(relative).with_extension(OUTPUT_EXTENSION)
        }
        None => input.with_extension(OUTPUT_EXTENSION),
    }
}

fn check_output_collisions(jobs: &[Job]) -> Result<()> {
    let mut seen: HashMap<&Path, &Path> = HashMap::with_capacity(jobs.len());
    for job in jobs {
        if let Some(other) = seen.insert(job.output.as_path(), job.input.as_path()) {
            bail!(
                "{} and {} would both be written to {}",
                other.display(),
                job.input.display(),
                job.output.display()
            );
        }
    }
    Ok(())
}

/// Per-file outcome of a batch
#[derive(Debug)]
pub struct JobResult {
    pub job: Job,
    pub result: Result<ConvertStats>,
}

/// Summary of one successful conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertStats {
    pub bones: usize,
    pub cubes: usize,
    pub locators: usize,
}

/// Outcome of a whole batch
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<JobResult>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Job, &anyhow::Error)> {
        self.results
            .iter()
            .filter_map(|r| r.result.as_ref().err().map(|e| (&r.job, e)))
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Log every failure and a one-line summary
    pub fn log(&self) {
        for (job, err) in self.failures() {
            match error_kind(err) {
                Some(kind) => {
                    tracing::warn!("Failed {} ({} error): {:#}", job.input.display(), kind, err)
                }
                None => tracing::warn!("Failed {}: {:#}", job.input.display(), err),
            }
        }
        tracing::info!(
            "{} converted, {} failed ({} total)",
            self.succeeded(),
            self.failed(),
            self.results.len()
        );
    }
}

/// Category of a conversion failure, `None` for IO and other errors
pub fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ConvertError>())
        .map(ConvertError::kind)
}

/// Convert every job in parallel, writing outputs
pub fn build_all(jobs: &[Job], options: &CompileOptions) -> BatchReport {
    run(jobs, options, true)
}

/// Compile every job in parallel without writing anything
pub fn check_all(jobs: &[Job], options: &CompileOptions) -> BatchReport {
    run(jobs, options, false)
}

fn run(jobs: &[Job], options: &CompileOptions, write: bool) -> BatchReport {
    use rayon::prelude::*;

    let results = jobs
        .par_iter()
        .map(|job| {
            let converted = if write {
                convert_bbmodel(&job.input, &job.output, options)
            } else {
                convert_bbmodel_to_memory(&job.input, options)
            };
            let result = converted.map(|c| ConvertStats {
                bones: c.geometry.bone_count,
                cubes: c.geometry.cube_count,
                locators: c.geometry.locator_count,
            });
            JobResult {
                job: job.clone(),
                result,
            }
        })
        .collect();

    BatchReport { results }
}
