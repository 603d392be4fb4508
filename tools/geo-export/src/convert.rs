//! Model converter (.bbmodel -> entity geometry .json)

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::geometry::{compile, CompileOptions, CompiledGeometry};
use crate::project::Project;

/// Extension of converted files
pub const OUTPUT_EXTENSION: &str = "json";

/// Result of in-memory model conversion
#[derive(Debug, Clone)]
pub struct ConvertedModel {
    /// Compiled document and statistics
    pub geometry: CompiledGeometry,
    /// Rendered JSON text
    pub text: String,
}

/// Default output location: the input path with a `.json` extension
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension(OUTPUT_EXTENSION)
}

/// Convert a project file to in-memory geometry text
pub fn convert_bbmodel_to_memory(input: &Path, options: &CompileOptions) -> Result<ConvertedModel> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read project: {:?}", input))?;
    convert_str(&content, options).with_context(|| format!("Failed to convert {:?}", input))
}

/// Convert project text to geometry text
pub fn convert_str(content: &str, options: &CompileOptions) -> Result<ConvertedModel> {
    let project = Project::parse(content)?;
    let geometry = compile(&project, options)?;
    let text = geometry.to_json(options.write_options());
    Ok(ConvertedModel { geometry, text })
}

/// Convert a project file and write the geometry next to it (or to `output`)
pub fn convert_bbmodel(
    input: &Path,
    output: &Path,
    options: &CompileOptions,
) -> Result<ConvertedModel> {
    let converted = convert_bbmodel_to_memory(input, options)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    fs::write(output, &converted.text)
        .with_context(|| format!("Failed to write output: {:?}", output))?;

    tracing::info!(
        "Converted model: {} bones, {} cubes, {} locators -> {:?}",
        converted.geometry.bone_count,
        converted.geometry.cube_count,
        converted.geometry.locator_count,
        output
    );

    Ok(converted)
}
