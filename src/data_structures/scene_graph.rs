//! Live scene graphs.
//!
//! [`realize`] turns a [`SceneGraphDescriptor`] into a [`RealizedSceneGraph`]:
//! a flat container of nodes whose GPU resources are all recorded in one
//! [`ResourceArena`]. Nodes only hold handles into that arena, so the graph can
//! be torn down with a single linear pass (see [`crate::resources::lifecycle`])
//! instead of walking the node tree.
//!
//! A realized graph is never mutated after construction. A new generation
//! produces a new graph, the old one is disposed.

use std::fmt::Debug;

use crate::{
    data_structures::{
        descriptor::{LightSpec, NodeKind, NodeSpec, SceneGraphDescriptor},
        instance::Instance,
    },
    resources::primitives::mesh_for,
    surface::{DrawItem, RenderSurface},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeometryHandle(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaterialHandle(usize);

/// Every resource a graph allocated, in allocation order.
pub struct ResourceArena<S: RenderSurface> {
    geometries: Vec<S::Geometry>,
    materials: Vec<S::Material>,
}

impl<S: RenderSurface> ResourceArena<S> {
    pub fn new() -> Self {
        Self {
            geometries: Vec::new(),
            materials: Vec::new(),
        }
    }

    pub fn insert_geometry(&mut self, geometry: S::Geometry) -> GeometryHandle {
        self.geometries.push(geometry);
        GeometryHandle(self.geometries.len() - 1)
    }

    pub fn insert_material(&mut self, material: S::Material) -> MaterialHandle {
        self.materials.push(material);
        MaterialHandle(self.materials.len() - 1)
    }

    pub fn geometry(&self, handle: GeometryHandle) -> Option<&S::Geometry> {
        self.geometries.get(handle.0)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&S::Material> {
        self.materials.get(handle.0)
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Hand out ownership of everything in the arena. Only disposal calls this.
    pub(crate) fn into_parts(self) -> (Vec<S::Geometry>, Vec<S::Material>) {
        (self.geometries, self.materials)
    }
}

impl<S: RenderSurface> Default for ResourceArena<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// One renderable entity. Owns (through the arena) exactly one geometry and
/// one material per material group of its mesh.
#[derive(Clone, Debug)]
pub struct RealizedNode {
    pub kind: NodeKind,
    pub label: String,
    pub transform: Instance,
    geometry: GeometryHandle,
    materials: Vec<MaterialHandle>,
}

impl RealizedNode {
    pub fn new(
        kind: NodeKind,
        label: impl Into<String>,
        transform: Instance,
        geometry: GeometryHandle,
        materials: Vec<MaterialHandle>,
    ) -> Self {
        Self {
            kind,
            label: label.into(),
            transform,
            geometry,
            materials,
        }
    }

    pub fn geometry(&self) -> GeometryHandle {
        self.geometry
    }

    pub fn materials(&self) -> &[MaterialHandle] {
        &self.materials
    }
}

pub struct RealizedSceneGraph<S: RenderSurface> {
    nodes: Vec<RealizedNode>,
    lights: Vec<LightSpec>,
    arena: ResourceArena<S>,
}

impl<S: RenderSurface> RealizedSceneGraph<S> {
    /// Assemble a graph from resources that were allocated elsewhere, e.g. a
    /// loaded model whose nodes use several materials.
    ///
    /// Every handle in `nodes` has to point into `arena`.
    pub fn from_parts(
        nodes: Vec<RealizedNode>,
        lights: Vec<LightSpec>,
        arena: ResourceArena<S>,
    ) -> Self {
        Self {
            nodes,
            lights,
            arena,
        }
    }

    pub fn nodes(&self) -> &[RealizedNode] {
        &self.nodes
    }

    pub fn lights(&self) -> &[LightSpec] {
        &self.lights
    }

    pub fn arena(&self) -> &ResourceArena<S> {
        &self.arena
    }

    /// Resolve every node into borrowed resources for one frame.
    pub fn draw_items(&self) -> Vec<DrawItem<'_, S>> {
        self.nodes
            .iter()
            .filter_map(|node| {
                let geometry = self.arena.geometry(node.geometry)?;
                let materials = node
                    .materials
                    .iter()
                    .filter_map(|&handle| self.arena.material(handle))
                    .collect();
                Some(DrawItem {
                    geometry,
                    materials,
                })
            })
            .collect()
    }

    pub(crate) fn into_arena(self) -> ResourceArena<S> {
        self.arena
    }
}

impl<S: RenderSurface> Debug for RealizedSceneGraph<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealizedSceneGraph")
            .field("nodes", &self.nodes)
            .field("lights", &self.lights)
            .field("geometries", &self.arena.geometry_count())
            .field("materials", &self.arena.material_count())
            .finish()
    }
}

/// Allocate the resources for `descriptor` on `surface`.
///
/// The surface is cleared first, so whatever it showed before is gone by the
/// time the first node of the new graph is attached. The previous graph must
/// already be disposed when this is called.
pub fn realize<S: RenderSurface>(
    descriptor: &SceneGraphDescriptor,
    surface: &mut S,
) -> RealizedSceneGraph<S> {
    surface.clear();

    let mut arena = ResourceArena::new();
    let nodes = descriptor
        .nodes
        .iter()
        .map(|spec| realize_node(spec, surface, &mut arena))
        .collect::<Vec<_>>();

    log::debug!(
        "realized {} nodes ({} geometries, {} materials) and {} lights",
        nodes.len(),
        arena.geometry_count(),
        arena.material_count(),
        descriptor.lights.len()
    );

    RealizedSceneGraph::from_parts(nodes, descriptor.lights.clone(), arena)
}

fn realize_node<S: RenderSurface>(
    spec: &NodeSpec,
    surface: &mut S,
    arena: &mut ResourceArena<S>,
) -> RealizedNode {
    let mesh = mesh_for(&spec.geometry);
    let transform = spec.transform.to_instance();

    let geometry = arena.insert_geometry(surface.create_geometry(&spec.label, &mesh, &transform));
    let materials = (0..mesh.material_slots())
        .map(|_| arena.insert_material(surface.create_material(&spec.label, spec.color)))
        .collect();

    RealizedNode::new(spec.kind, spec.label.as_str(), transform, geometry, materials)
}
