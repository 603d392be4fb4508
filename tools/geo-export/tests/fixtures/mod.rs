//! Project fixtures for integration tests

use serde_json::{json, Value};
use std::path::Path;

/// Per-face UV project: nested groups, a rotated cube, a locator and a
/// loose element
pub fn per_face_project() -> Value {
    json!({
        "meta": {"format_version": "4.5", "box_uv": false},
        "geometry_name": "golem",
        "resolution": {"width": 64, "height": 64},
        "elements": [
            {
                "name": "torso", "uuid": "e-torso", "type": "cube",
                "from": [-4, 12, -2], "to": [4, 24, 2],
                "faces": {
                    "north": {"uv": [4, 4, 12, 16], "texture": 0},
                    "east": {"uv": [0, 4, 4, 16], "texture": 0},
                    "south": {"uv": [16, 4, 24, 16], "texture": 0},
                    "west": {"uv": [12, 4, 16, 16], "texture": 0},
                    "up": {"uv": [4, 0, 12, 4], "texture": 0},
                    "down": {"uv": [12, 0, 20, 4], "texture": null}
                }
            },
            {
                "name": "nose", "uuid": "e-nose", "type": "cube",
                "from": [-1, 26, -6], "to": [1, 30, -4],
                "origin": [0, 28, -5], "rotation": [15, 0, 0], "inflate": 0.25,
                "faces": {
                    "north": {"uv": [24, 0, 26, 4], "texture": 0}
                }
            },
            {
                "name": "hand", "uuid": "e-hand", "type": "locator",
                "from": [6, 12, 0], "rotation": [10, 20, 30]
            },
            {
                "name": "stray", "uuid": "e-stray", "type": "cube",
                "from": [0, 0, 0], "to": [2, 1, 1],
                "faces": {
                    "north": {"uv": [0, 0, 2, 1], "texture": 0}
                }
            }
        ],
        "outliner": [
            {
                "name": "body", "uuid": "g-body", "origin": [0, 24, 0],
                "children": [
                    "e-torso",
                    {
                        "name": "head", "uuid": "g-head", "origin": [0, 24, 0],
                        "rotation": [0, 0, 5],
                        "children": ["e-nose"]
                    },
                    {
                        "name": "arm", "uuid": "g-arm", "origin": [5, 22, 0],
                        "children": ["e-hand"]
                    }
                ]
            },
            "e-stray"
        ]
    })
}

/// Box UV project with a mirrored limb
pub fn box_uv_project() -> Value {
    json!({
        "meta": {"box_uv": true},
        "geometry_name": "pig",
        "resolution": {"width": 64, "height": 32},
        "elements": [
            {
                "name": "leg", "uuid": "e-leg", "from": [1, 0, 5], "to": [5, 6, 9],
                "uv_offset": [0, 16]
            },
            {
                "name": "leg_mirrored", "uuid": "e-leg2", "from": [-5, 0, 5], "to": [-1, 6, 9],
                "uv_offset": [0, 16], "mirror_uv": true
            }
        ],
        "outliner": [
            {"name": "legs", "uuid": "g-legs", "origin": [0, 6, 7], "children": ["e-leg", "e-leg2"]}
        ]
    })
}

/// Project whose outliner points at an element that does not exist
pub fn dangling_reference_project() -> Value {
    json!({
        "resolution": {"width": 16, "height": 16},
        "elements": [],
        "outliner": [
            {"name": "root", "uuid": "g-root", "children": ["does-not-exist"]}
        ]
    })
}

pub fn write(path: &Path, project: &Value) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(project)?)
}
