//! Resource-free scene description.
//!
//! A [`SceneGraphDescriptor`] is plain data: it says what a scene should contain
//! (lights, primitive nodes, colors, transforms) without owning any GPU resource.
//! It can be cloned, compared and thrown away freely. The realizer in
//! [`crate::data_structures::scene_graph`] turns it into live resources.

use cgmath::{Euler, Rad, Vector3, Zero};
use serde::{Deserialize, Serialize};

use crate::data_structures::instance::Instance;

/// Linear RGB color with components in `0.0..=1.0`.
///
/// Deserializes from (and serializes to) a `0xRRGGBB` integer so palettes can
/// be written as hex literals in TOML.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    pub fn to_hex(self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Ambient,
    Directional,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightSpec {
    pub kind: LightKind,
    pub intensity: f32,
    /// Only meaningful for directional lights; they shine from here towards the origin.
    pub position: Option<Vector3<f32>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Character,
    Object,
    Ground,
}

/// Primitive shape together with its dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Cube {
        size: f32,
    },
    Plane {
        width: f32,
        height: f32,
    },
}

/// Local placement of a node. Rotation is an XYZ euler triple in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Euler<Rad<f32>>,
}

impl Transform {
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Default::default()
        }
    }

    pub fn rotated(mut self, x: Rad<f32>, y: Rad<f32>, z: Rad<f32>) -> Self {
        self.rotation = Euler::new(x, y, z);
        self
    }

    pub fn to_instance(&self) -> Instance {
        Instance {
            position: self.position,
            rotation: self.rotation.into(),
            ..Default::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Euler::new(Rad(0.0), Rad(0.0), Rad(0.0)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeSpec {
    pub kind: NodeKind,
    /// Name taken from the analysis (or `"ground"`), used for GPU debug labels.
    pub label: String,
    pub geometry: Geometry,
    pub color: Color,
    pub transform: Transform,
}

/// What a scene should contain, in draw order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneGraphDescriptor {
    pub lights: Vec<LightSpec>,
    pub nodes: Vec<NodeSpec>,
}

impl SceneGraphDescriptor {
    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &NodeSpec> {
        self.nodes.iter().filter(move |node| node.kind == kind)
    }

    pub fn ground(&self) -> Option<&NodeSpec> {
        self.nodes_of(NodeKind::Ground).next()
    }

    pub fn light(&self, kind: LightKind) -> Option<&LightSpec> {
        self.lights.iter().find(|light| light.kind == kind)
    }
}
