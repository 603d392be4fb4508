//! UV mapper
//!
//! Two mutually exclusive strategies, picked once per project:
//! - box UV: one texture offset per cube, the engine unwraps the box
//! - per-face UV: an independent rectangle for each visible face

use crate::error::ConvertError;
use crate::json::{Map, Value};
use crate::project::{Element, FaceDir};

/// UV strategy of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvMode {
    Box,
    PerFace,
}

impl UvMode {
    pub fn from_box_uv(box_uv: bool) -> Self {
        if box_uv {
            UvMode::Box
        } else {
            UvMode::PerFace
        }
    }
}

/// Face rectangle as the engine expects it: origin plus signed size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceRect {
    pub uv: [f64; 2],
    pub uv_size: [f64; 2],
}

impl FaceRect {
    /// Convert an editor `[u0, v0, u1, v1]` rectangle
    ///
    /// `up` and `down` are sampled with flipped winding, so their origin
    /// moves to the opposite corner and the size is negated.
    pub fn new(rect: [f64; 4], dir: FaceDir) -> Self {
        let [u0, v0, u1, v1] = rect;
        let mut uv = [u0, v0];
        let mut uv_size = [u1 - u0, v1 - v0];
        if dir.is_vertical() {
            uv[0] += uv_size[0];
            uv[1] += uv_size[1];
            uv_size[0] = -uv_size[0];
            uv_size[1] = -uv_size[1];
        }
        Self { uv, uv_size }
    }

    fn into_value(self, material: Option<&str>) -> Value {
        let mut map = Map::new();
        map.insert("uv", self.uv);
        map.insert("uv_size", self.uv_size);
        if let Some(material) = material {
            map.insert("material_instance", material);
        }
        Value::CompactObject(map)
    }
}

/// Box UV: copy the offset and emit `mirror` when it differs from the bone's
pub fn write_box_uv(element: &Element, bone_mirror: bool, cube: &mut Map) {
    if let Some(offset) = element.uv_offset {
        cube.insert("uv", offset);
    }
    if element.mirror_uv != bone_mirror {
        cube.insert("mirror", element.mirror_uv);
    }
}

/// Per-face UV: one compact `{uv, uv_size}` record per visible face
///
/// Faces whose texture is explicitly `null` are left out of the map.
pub fn face_uv_map(element: &Element) -> Result<Value, ConvertError> {
    let mut faces = Map::new();
    for dir in FaceDir::ALL {
        let Some(face) = element.faces.get(dir) else {
            continue;
        };
        if !face.texture.is_visible() {
            continue;
        }
        let rect = face.uv.ok_or_else(|| ConvertError::MissingFaceUv {
            element: element.name.clone(),
            face: dir.key(),
        })?;
        let value = FaceRect::new(rect, dir).into_value(face.material_name.as_deref());
        faces.insert(dir.key(), value);
    }
    Ok(Value::Object(faces))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(json: &str) -> Element {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_side_face_rect() {
        let rect = FaceRect::new([1.0, 2.0, 3.0, 4.0], FaceDir::North);
        assert_eq!(rect.uv, [1.0, 2.0]);
        assert_eq!(rect.uv_size, [2.0, 2.0]);
    }

    #[test]
    fn test_vertical_faces_inverted() {
        for dir in [FaceDir::Up, FaceDir::Down] {
            let rect = FaceRect::new([1.0, 2.0, 3.0, 4.0], dir);
            assert_eq!(rect.uv, [3.0, 4.0]);
            assert_eq!(rect.uv_size, [-2.0, -2.0]);
        }
    }

    #[test]
    fn test_face_map_skips_null_textures() {
        let element = element(
            r#"{
                "uuid": "e", "name": "box",
                "faces": {
                    "north": {"uv": [0, 0, 4, 4], "texture": 0},
                    "south": {"uv": [4, 0, 8, 4], "texture": null},
                    "up": {"uv": [0, 4, 4, 8], "texture": 0, "material_name": "glow"}
                }
            }"#,
        );
        let faces = face_uv_map(&element).unwrap();
        let Value::Object(map) = &faces else {
            panic!("expected expanded object");
        };
        assert_eq!(map.keys().collect::<Vec<_>>(), ["north", "up"]);

        let up = map.get("up").unwrap();
        assert!(matches!(up, Value::CompactObject(_)));
        assert_eq!(up.get("uv"), Some(&Value::from([4.0, 8.0])));
        assert_eq!(up.get("uv_size"), Some(&Value::from([-4.0, -4.0])));
        assert_eq!(up.get("material_instance"), Some(&Value::from("glow")));
    }

    #[test]
    fn test_face_without_rect_is_shape_error() {
        let element = element(r#"{"uuid": "e", "name": "box", "faces": {"east": {"texture": 1}}}"#);
        let err = face_uv_map(&element).unwrap_err();
        assert!(matches!(err, ConvertError::MissingFaceUv { face: "east", .. }));
    }

    #[test]
    fn test_box_uv_mirror_differs_from_bone() {
        let plain = element(r#"{"uuid": "e", "uv_offset": [16, 0]}"#);
        let mirrored = element(r#"{"uuid": "m", "uv_offset": [16, 0], "mirror_uv": true}"#);

        let mut cube = Map::new();
        write_box_uv(&plain, false, &mut cube);
        assert_eq!(cube.get("uv"), Some(&Value::from([16.0, 0.0])));
        assert!(!cube.contains_key("mirror"));

        let mut cube = Map::new();
        write_box_uv(&mirrored, false, &mut cube);
        assert_eq!(cube.get("mirror"), Some(&Value::Bool(true)));

        let mut cube = Map::new();
        write_box_uv(&mirrored, true, &mut cube);
        assert!(!cube.contains_key("mirror"));

        let mut cube = Map::new();
        write_box_uv(&plain, true, &mut cube);
        assert_eq!(cube.get("mirror"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_mode_selection() {
        assert_eq!(UvMode::from_box_uv(true), UvMode::Box);
        assert_eq!(UvMode::from_box_uv(false), UvMode::PerFace);
    }
}
