//! Editor project document (.bbmodel)
//!
//! Only the parts of the editor format the geometry compiler reads are
//! modelled; unknown keys are ignored.

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

use crate::error::ConvertError;

/// Texture size used when the project does not declare one
pub const DEFAULT_TEXTURE_SIZE: u32 = 16;

/// Root of an editor project
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default, alias = "model_identifier")]
    pub geometry_name: Option<String>,
    pub resolution: Resolution,
    /// Previously stored visible bounds: `[width, height, y_offset]`
    #[serde(default)]
    pub visible_box: Option<[f64; 3]>,
    #[serde(default)]
    pub outliner: Vec<OutlinerNode>,
    pub elements: Vec<Element>,
}

impl Project {
    /// Parse a project from its JSON text
    pub fn parse(content: &str) -> Result<Self, ConvertError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Name used in the geometry identifier
    pub fn geometry_name(&self) -> &str {
        match self.geometry_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "unknown",
        }
    }

    pub fn box_uv(&self) -> bool {
        self.meta.box_uv
    }
}

/// Project-wide settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    /// Box UV (one offset per cube) instead of per-face rectangles
    #[serde(default)]
    pub box_uv: bool,
}

/// Texture resolution in pixels
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Resolution {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl Resolution {
    /// Width, falling back to 16 when unset
    pub fn texture_width(&self) -> u32 {
        if self.width == 0 {
            DEFAULT_TEXTURE_SIZE
        } else {
            self.width
        }
    }

    /// Height, falling back to 16 when unset
    pub fn texture_height(&self) -> u32 {
        if self.height == 0 {
            DEFAULT_TEXTURE_SIZE
        } else {
            self.height
        }
    }
}

/// Entry in the outliner: either a reference by identifier or an inline group
#[derive(Debug, Clone)]
pub enum OutlinerNode {
    Ref(String),
    Group(Group),
}

impl<'de> Deserialize<'de> for OutlinerNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(OutlinerNodeVisitor)
    }
}

/// Branches on the JSON shape so group field errors surface as-is
struct OutlinerNodeVisitor;

impl<'de> Visitor<'de> for OutlinerNodeVisitor {
    type Value = OutlinerNode;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a child identifier or an inline group")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(OutlinerNode::Ref(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(OutlinerNode::Ref(v))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        Group::deserialize(de::value::MapAccessDeserializer::new(map)).map(OutlinerNode::Group)
    }
}

/// Named pivot with children
#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub name: String,
    pub uuid: String,
    #[serde(default)]
    pub origin: Option<[f64; 3]>,
    #[serde(default)]
    pub rotation: Option<[f64; 3]>,
    #[serde(default)]
    pub bedrock_binding: Option<String>,
    #[serde(default)]
    pub reset: bool,
    #[serde(default)]
    pub mirror_uv: bool,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub children: Vec<OutlinerNode>,
}

impl Group {
    /// Group created on the fly to hold elements that no group claims
    pub fn synthetic(name: &str, children: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            uuid: name.to_string(),
            origin: Some([0.0; 3]),
            rotation: None,
            bedrock_binding: None,
            reset: false,
            mirror_uv: false,
            material: None,
            children: children.into_iter().map(OutlinerNode::Ref).collect(),
        }
    }
}

/// Element type tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    #[default]
    Cube,
    Locator,
    /// Meshes, null objects and other types this exporter does not handle
    #[serde(other)]
    Unsupported,
}

/// Cuboid or locator
#[derive(Debug, Clone, Deserialize)]
pub struct Element {
    #[serde(default)]
    pub name: String,
    pub uuid: String,
    #[serde(default, rename = "type")]
    pub kind: ElementKind,
    #[serde(default, alias = "position")]
    pub from: Option<[f64; 3]>,
    #[serde(default)]
    pub to: Option<[f64; 3]>,
    /// Rotation pivot
    #[serde(default)]
    pub origin: Option<[f64; 3]>,
    #[serde(default)]
    pub rotation: Option<[f64; 3]>,
    #[serde(default)]
    pub inflate: f64,
    #[serde(default)]
    pub export: Option<bool>,
    #[serde(default)]
    pub mirror_uv: bool,
    #[serde(default)]
    pub uv_offset: Option<[f64; 2]>,
    #[serde(default)]
    pub faces: Faces,
}

impl Element {
    pub fn exported(&self) -> bool {
        self.export.unwrap_or(true)
    }

    pub fn is_locator(&self) -> bool {
        self.kind == ElementKind::Locator
    }

    /// Rotation if any component is nonzero
    pub fn active_rotation(&self) -> Option<[f64; 3]> {
        active_rotation(self.rotation)
    }
}

/// `Some(rotation)` unless absent or exactly zero on every axis
pub fn active_rotation(rotation: Option<[f64; 3]>) -> Option<[f64; 3]> {
    rotation.filter(|r| r.iter().any(|&v| v != 0.0))
}

/// One of the six cuboid faces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceDir {
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl FaceDir {
    pub const ALL: [FaceDir; 6] = [
        FaceDir::North,
        FaceDir::East,
        FaceDir::South,
        FaceDir::West,
        FaceDir::Up,
        FaceDir::Down,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FaceDir::North => "north",
            FaceDir::East => "east",
            FaceDir::South => "south",
            FaceDir::West => "west",
            FaceDir::Up => "up",
            FaceDir::Down => "down",
        }
    }

    /// Faces sampled with flipped winding by the engine
    pub fn is_vertical(self) -> bool {
        matches!(self, FaceDir::Up | FaceDir::Down)
    }
}

/// Per-face UV assignments
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Faces {
    #[serde(default)]
    pub north: Option<Face>,
    #[serde(default)]
    pub east: Option<Face>,
    #[serde(default)]
    pub south: Option<Face>,
    #[serde(default)]
    pub west: Option<Face>,
    #[serde(default)]
    pub up: Option<Face>,
    #[serde(default)]
    pub down: Option<Face>,
}

impl Faces {
    pub fn get(&self, dir: FaceDir) -> Option<&Face> {
        match dir {
            FaceDir::North => self.north.as_ref(),
            FaceDir::East => self.east.as_ref(),
            FaceDir::South => self.south.as_ref(),
            FaceDir::West => self.west.as_ref(),
            FaceDir::Up => self.up.as_ref(),
            FaceDir::Down => self.down.as_ref(),
        }
    }
}

/// A single face: `[u0, v0, u1, v1]` rectangle plus texture reference
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Face {
    #[serde(default)]
    pub uv: Option<[f64; 4]>,
    #[serde(default, deserialize_with = "deserialize_texture")]
    pub texture: FaceTexture,
    #[serde(default)]
    pub material_name: Option<String>,
}

/// State of a face's texture reference
///
/// An explicit `null` hides the face; a missing key does not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FaceTexture {
    #[default]
    Unset,
    Null,
    Assigned,
}

impl FaceTexture {
    pub fn is_visible(self) -> bool {
        self != FaceTexture::Null
    }
}

fn deserialize_texture<'de, D>(deserializer: D) -> Result<FaceTexture, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(if value.is_null() {
        FaceTexture::Null
    } else {
        FaceTexture::Assigned
    })
}
