use cgmath::{InnerSpace, Vector3};

use crate::data_structures::descriptor::{LightKind, LightSpec};

/// Scene lighting as the shader sees it: one ambient term plus one directional light.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    direction: [f32; 3],
    ambient: f32,
    color: [f32; 3],
    directional: f32,
}

impl LightUniform {
    /**
     * Fold a list of light specs into the uniform.
     *
     * Ambient intensities add up. The first directional light wins; it shines
     * from its position towards the origin. Without one, only ambient light is
     * applied.
     */
    pub fn from_lights(lights: &[LightSpec]) -> Self {
        let ambient = lights
            .iter()
            .filter(|light| light.kind == LightKind::Ambient)
            .map(|light| light.intensity)
            .sum();
        let (direction, directional) = lights
            .iter()
            .find(|light| light.kind == LightKind::Directional)
            .map(|light| {
                let position = light.position.unwrap_or(Vector3::unit_y());
                let direction = if position.magnitude2() > 0.0 {
                    position.normalize()
                } else {
                    Vector3::unit_y()
                };
                (direction, light.intensity)
            })
            .unwrap_or((Vector3::unit_y(), 0.0));

        Self {
            direction: direction.into(),
            ambient,
            color: [1.0, 1.0, 1.0],
            directional,
        }
    }

    pub fn ambient(&self) -> f32 {
        self.ambient
    }

    pub fn directional(&self) -> f32 {
        self.directional
    }
}

impl Default for LightUniform {
    fn default() -> Self {
        Self::from_lights(&[])
    }
}
