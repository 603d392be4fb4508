//! geo-export library
//!
//! Compiles editor cuboid projects into entity geometry JSON. Exposed as a
//! library so other tools can convert in memory.

pub mod bounds;
pub mod convert;
pub mod error;
pub mod geometry;
pub mod json;
pub mod manifest;
pub mod project;
pub mod scene;
pub mod uv;

pub use convert::{convert_bbmodel, convert_bbmodel_to_memory, convert_str, ConvertedModel};
pub use error::{ConvertError, ErrorKind};
pub use geometry::{compile, CompileOptions, CompiledGeometry};
pub use manifest::{build_all, check_all, error_kind, BatchReport, GeoManifest, Job};
pub use project::Project;
pub use scene::LooseElements;
