//! The rendering surface seam.
//!
//! Scene realization, disposal and drawing never talk to wgpu directly; they go
//! through [`RenderSurface`]. The production implementation is
//! [`crate::context::WgpuSurface`], tests use a recording fake.
//!
//! A surface owns nothing of a scene on its own. Every geometry and material it
//! hands out is moved into the arena of the
//! [`crate::data_structures::scene_graph::RealizedSceneGraph`] that requested it
//! and has to be handed back through `release_*` exactly once.

use cgmath::{Matrix4, Point3};

use crate::data_structures::{
    descriptor::{Color, LightSpec},
    instance::Instance,
    model::MeshData,
};

pub trait RenderSurface {
    /// Geometry buffers of one node (mesh plus its transform).
    type Geometry;
    /// One flat-colored material program binding.
    type Material;
    type Error: std::error::Error + 'static;

    /// Pixel size of the surface, `None` when the host surface is gone.
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Drop whatever the surface currently shows. Called before a new graph is attached.
    fn clear(&mut self);

    fn create_geometry(&mut self, label: &str, mesh: &MeshData, transform: &Instance)
    -> Self::Geometry;

    fn create_material(&mut self, label: &str, color: Color) -> Self::Material;

    fn release_geometry(&mut self, geometry: Self::Geometry);

    fn release_material(&mut self, material: Self::Material);

    /// Render one frame. Called once per display tick by the render loop.
    fn draw(&mut self, frame: &Frame<'_, Self>) -> Result<(), Self::Error>;
}

/// A node ready to be drawn: its geometry and the materials for each of its groups.
pub struct DrawItem<'a, S: RenderSurface + ?Sized> {
    pub geometry: &'a S::Geometry,
    pub materials: Vec<&'a S::Material>,
}

/// Everything the surface needs for one frame.
pub struct Frame<'a, S: RenderSurface + ?Sized> {
    pub view_proj: Matrix4<f32>,
    pub eye: Point3<f32>,
    pub lights: &'a [LightSpec],
    pub items: Vec<DrawItem<'a, S>>,
}
