//! Teardown of realized scene graphs.

use crate::{data_structures::scene_graph::RealizedSceneGraph, surface::RenderSurface};

/// What a call to [`dispose`] handed back to the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Released {
    pub geometries: usize,
    pub materials: usize,
}

/**
 * Release every geometry and material owned by `graph`.
 *
 * The graph is consumed, so each graph can be disposed at most once and its
 * resources cannot be touched afterwards. Single- and multi-material nodes are
 * handled the same way since all materials sit in the graph's arena.
 *
 * Must run to completion before the replacement graph is realized on the same
 * surface.
 */
pub fn dispose<S: RenderSurface>(graph: RealizedSceneGraph<S>, surface: &mut S) -> Released {
    let (geometries, materials) = graph.into_arena().into_parts();
    let released = Released {
        geometries: geometries.len(),
        materials: materials.len(),
    };

    geometries
        .into_iter()
        .for_each(|geometry| surface.release_geometry(geometry));
    materials
        .into_iter()
        .for_each(|material| surface.release_material(material));

    log::debug!(
        "released {} geometries and {} materials",
        released.geometries,
        released.materials
    );
    released
}
