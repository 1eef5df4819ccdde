//! Story analysis to scene description.
//!
//! [`compose`] is a pure function: same analysis, same descriptor. It never
//! allocates GPU resources.
//!
//! Placement, by zero-based index `i` in input order:
//! - character `i`: sphere at `(2i - 2, 0, 0)`, the first one protagonist-colored,
//!   every other one secondary-colored
//! - object `i`: cube at `(i - 1, 0.5, 1)` in the accent color
//! - one ground plane rotated by `PI/2` around x, vegetation-colored when the
//!   setting mentions `"forest"`, earth-colored otherwise
//! - an ambient light (`0.4` when the mood mentions `"dark"`, `0.8` otherwise)
//!   and a fixed directional light
//!
//! Both keyword checks are plain case-sensitive substring matches.

use std::f32::consts::FRAC_PI_2;

use cgmath::{Rad, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    analysis::StoryAnalysis,
    data_structures::descriptor::{
        Color, Geometry, LightKind, LightSpec, NodeKind, NodeSpec, SceneGraphDescriptor, Transform,
    },
};

pub const CHARACTER_RADIUS: f32 = 0.5;
pub const OBJECT_SIZE: f32 = 0.5;
pub const GROUND_SIZE: f32 = 20.0;
pub const DARK_AMBIENT: f32 = 0.4;
pub const BRIGHT_AMBIENT: f32 = 0.8;
pub const DIRECTIONAL_INTENSITY: f32 = 1.0;
pub const DIRECTIONAL_POSITION: [f32; 3] = [10.0, 10.0, 5.0];

/// Colors used by the composer. Written as `0xRRGGBB` in config files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub protagonist: Color,
    pub secondary: Color,
    pub accent: Color,
    pub vegetation: Color,
    pub earth: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            protagonist: Color::from_hex(0x4a90e2),
            secondary: Color::from_hex(0xe74c3c),
            accent: Color::from_hex(0xf1c40f),
            vegetation: Color::from_hex(0x228b22),
            earth: Color::from_hex(0x8b7355),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneComposer {
    palette: Palette,
}

impl SceneComposer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn compose(&self, analysis: &StoryAnalysis) -> SceneGraphDescriptor {
        let lights = vec![
            LightSpec {
                kind: LightKind::Ambient,
                intensity: ambient_intensity(&analysis.mood),
                position: None,
            },
            LightSpec {
                kind: LightKind::Directional,
                intensity: DIRECTIONAL_INTENSITY,
                position: Some(Vector3::from(DIRECTIONAL_POSITION)),
            },
        ];

        let characters = analysis
            .characters
            .iter()
            .enumerate()
            .map(|(i, name)| self.character(i, name));
        let objects = analysis
            .objects
            .iter()
            .enumerate()
            .map(|(i, name)| self.object(i, name));
        let nodes = characters
            .chain(objects)
            .chain(std::iter::once(self.ground(&analysis.setting)))
            .collect();

        SceneGraphDescriptor { lights, nodes }
    }

    fn character(&self, i: usize, name: &str) -> NodeSpec {
        let color = if i == 0 {
            self.palette.protagonist
        } else {
            self.palette.secondary
        };
        NodeSpec {
            kind: NodeKind::Character,
            label: name.to_string(),
            geometry: Geometry::Sphere {
                radius: CHARACTER_RADIUS,
                width_segments: 32,
                height_segments: 16,
            },
            color,
            transform: Transform::at(i as f32 * 2.0 - 2.0, 0.0, 0.0),
        }
    }

    fn object(&self, i: usize, name: &str) -> NodeSpec {
        NodeSpec {
            kind: NodeKind::Object,
            label: name.to_string(),
            geometry: Geometry::Cube { size: OBJECT_SIZE },
            color: self.palette.accent,
            transform: Transform::at(i as f32 - 1.0, 0.5, 1.0),
        }
    }

    fn ground(&self, setting: &str) -> NodeSpec {
        let color = if setting.contains("forest") {
            self.palette.vegetation
        } else {
            self.palette.earth
        };
        NodeSpec {
            kind: NodeKind::Ground,
            label: "ground".to_string(),
            geometry: Geometry::Plane {
                width: GROUND_SIZE,
                height: GROUND_SIZE,
            },
            color,
            transform: Transform::default().rotated(Rad(FRAC_PI_2), Rad(0.0), Rad(0.0)),
        }
    }
}

fn ambient_intensity(mood: &str) -> f32 {
    if mood.contains("dark") {
        DARK_AMBIENT
    } else {
        BRIGHT_AMBIENT
    }
}

/// Compose with the default palette.
pub fn compose(analysis: &StoryAnalysis) -> SceneGraphDescriptor {
    SceneComposer::default().compose(analysis)
}
