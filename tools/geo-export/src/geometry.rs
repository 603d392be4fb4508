//! Geometry compiler (editor project -> entity geometry)
//!
//! Emits one bone per group and one cube per exported cuboid element,
//! converting from the editor's coordinate system to the engine's:
//! - positions mirror the X axis (`-x`)
//! - cube origins mirror the whole interval: `-(from.x + size.x)`
//! - bone and cube rotations negate X and Y, keep Z
//! - locator rotations are written as `[-rx, -rx, rx]`, matching what the
//!   engine has always been fed

use serde::Deserialize;

use crate::bounds::{self, VisibleBounds};
use crate::error::ConvertError;
use crate::json::{self, Map, Value, WriteOptions};
use crate::project::{active_rotation, Element, ElementKind, Project};
use crate::scene::{GroupNode, LooseElements, NodeRef, Scene};
use crate::uv::{self, UvMode};

/// Format version for plain geometry
pub const FORMAT_VERSION: &str = "1.12.0";

/// Format version required once any bone carries a binding expression
pub const FORMAT_VERSION_BINDING: &str = "1.16.0";

/// Top-level key holding the geometry list
pub const GEOMETRY_KEY: &str = "minecraft:geometry";

/// Compiler settings
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Render the output on a single line
    pub compact: bool,
    /// Emit `visible_bounds_*` in the description
    pub visible_bounds: bool,
    pub loose_elements: LooseElements,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            compact: false,
            visible_bounds: true,
            loose_elements: LooseElements::Group,
        }
    }
}

impl CompileOptions {
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            small: self.compact,
        }
    }
}

/// Result of compiling one project
#[derive(Debug, Clone)]
pub struct CompiledGeometry {
    /// Output document, ready for serialization
    pub document: Value,
    pub bone_count: usize,
    pub cube_count: usize,
    pub locator_count: usize,
    /// Present when bounds were written
    pub bounds: Option<VisibleBounds>,
}

impl CompiledGeometry {
    pub fn to_json(&self, options: WriteOptions) -> String {
        json::to_string(&self.document, options)
    }
}

/// Compile a parsed project into an output document
pub fn compile(project: &Project, options: &CompileOptions) -> Result<CompiledGeometry, ConvertError> {
    let scene = Scene::resolve(project, options.loose_elements)?;
    let mode = UvMode::from_box_uv(project.box_uv());

    let mut counts = Counts::default();
    let mut bones = Vec::with_capacity(scene.order.len());
    for node in scene.iter() {
        bones.push(compile_bone(&scene, node, mode, &mut counts)?);
    }

    let mut description = Map::new();
    description.insert("identifier", format!("geometry.{}", project.geometry_name()));
    description.insert("texture_width", project.resolution.texture_width());
    description.insert("texture_height", project.resolution.texture_height());

    let bounds = if !bones.is_empty() && options.visible_bounds {
        let bounds = bounds::calculate(&project.elements, project.visible_box);
        description.insert("visible_bounds_width", bounds.width);
        description.insert("visible_bounds_height", bounds.height);
        description.insert("visible_bounds_offset", [0.0, bounds.offset, 0.0]);
        Some(bounds)
    } else {
        None
    };

    let bone_count = bones.len();
    let mut geometry = Map::new();
    geometry.insert("description", Value::Object(description));
    if !bones.is_empty() {
        geometry.insert("bones", Value::Array(bones));
    }

    let uses_binding = scene.iter().any(|node| node.group.bedrock_binding.is_some());
    let mut document = Map::new();
    document.insert(
        "format_version",
        if uses_binding {
            FORMAT_VERSION_BINDING
        } else {
            FORMAT_VERSION
        },
    );
    document.insert(GEOMETRY_KEY, Value::Array(vec![Value::Object(geometry)]));

    Ok(CompiledGeometry {
        document: Value::Object(document),
        bone_count,
        cube_count: counts.cubes,
        locator_count: counts.locators,
        bounds,
    })
}

#[derive(Debug, Default)]
struct Counts {
    cubes: usize,
    locators: usize,
}

fn compile_bone(
    scene: &Scene,
    node: &GroupNode,
    mode: UvMode,
    counts: &mut Counts,
) -> Result<Value, ConvertError> {
    let group = &node.group;
    let mut bone = Map::new();
    bone.insert("name", group.name.as_str());
    if let Some(parent) = scene.parent_name(node) {
        bone.insert("parent", parent);
    }
    bone.insert("pivot", mirror_x(group.origin.unwrap_or([0.0; 3])));
    if let Some(rotation) = active_rotation(group.rotation) {
        bone.insert("rotation", engine_rotation(rotation));
    }
    if let Some(binding) = &group.bedrock_binding {
        bone.insert("binding", binding.as_str());
    }
    if group.reset {
        bone.insert("reset", true);
    }
    let bone_mirror = group.mirror_uv && mode == UvMode::Box;
    if bone_mirror {
        bone.insert("mirror", true);
    }
    if let Some(material) = &group.material {
        bone.insert("material", material.as_str());
    }

    let mut cubes = Vec::new();
    let mut locators = Map::new();
    for child in &node.children {
        let NodeRef::Element(index) = *child else {
            continue;
        };
        let element = &scene.elements[index];
        if !element.exported() {
            continue;
        }
        match element.kind {
            ElementKind::Cube => cubes.push(compile_cube(element, bone_mirror, mode)?),
            ElementKind::Locator => {
                locators.insert(element.name.as_str(), compile_locator(element)?);
            }
            ElementKind::Unsupported => {
                tracing::warn!(
                    "Skipping element '{}' in bone '{}': unsupported element type",
                    element.name,
                    group.name
                );
            }
        }
    }

    counts.cubes += cubes.len();
    counts.locators += locators.len();
    if !cubes.is_empty() {
        bone.insert("cubes", Value::Array(cubes));
    }
    if !locators.is_empty() {
        bone.insert("locators", Value::Object(locators));
    }
    Ok(Value::Object(bone))
}

fn compile_cube(element: &Element, bone_mirror: bool, mode: UvMode) -> Result<Value, ConvertError> {
    let from = corner(element, element.from, "from")?;
    let to = corner(element, element.to, "to")?;

    let size = cube_size(from, to);
    let mut cube = Map::new();
    cube.insert("origin", mirror_interval(from, size));
    cube.insert("size", size);
    if element.inflate != 0.0 {
        cube.insert("inflate", element.inflate);
    }
    if let Some(rotation) = element.active_rotation() {
        cube.insert("pivot", mirror_x(element.origin.unwrap_or(from)));
        cube.insert("rotation", engine_rotation(rotation));
    }

    Ok(match mode {
        UvMode::Box => {
            uv::write_box_uv(element, bone_mirror, &mut cube);
            Value::CompactObject(cube)
        }
        UvMode::PerFace => {
            cube.insert("uv", uv::face_uv_map(element)?);
            Value::Object(cube)
        }
    })
}

fn compile_locator(element: &Element) -> Result<Value, ConvertError> {
    let offset = mirror_x(corner(element, element.from, "from")?);
    Ok(match element.active_rotation() {
        Some(rotation) => {
            let mut locator = Map::new();
            locator.insert("offset", offset);
            locator.insert("rotation", locator_rotation(rotation));
            Value::Object(locator)
        }
        None => Value::from(offset),
    })
}

fn corner(
    element: &Element,
    value: Option<[f64; 3]>,
    field: &'static str,
) -> Result<[f64; 3], ConvertError> {
    value.ok_or_else(|| ConvertError::MissingCorner {
        element: element.name.clone(),
        field,
    })
}

/// `to - from` per axis; negative sizes pass through unchanged
pub fn cube_size(from: [f64; 3], to: [f64; 3]) -> [f64; 3] {
    [to[0] - from[0], to[1] - from[1], to[2] - from[2]]
}

/// Mirror a point across the X axis
pub fn mirror_x(v: [f64; 3]) -> [f64; 3] {
    [-v[0], v[1], v[2]]
}

/// Mirror the X interval `[from.x, from.x + size.x]`, returning its new minimum corner
pub fn mirror_interval(from: [f64; 3], size: [f64; 3]) -> [f64; 3] {
    [-(from[0] + size[0]), from[1], from[2]]
}

/// Bone and cube rotation in engine handedness
pub fn engine_rotation(r: [f64; 3]) -> [f64; 3] {
    [-r[0], -r[1], r[2]]
}

/// Locator rotation as the engine format has always carried it
pub fn locator_rotation(r: [f64; 3]) -> [f64; 3] {
    [-r[0], -r[0], r[0]]
}
