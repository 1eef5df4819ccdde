/**
 * This module contains the creation and disposal side of render resources:
 * procedural meshes for the primitive geometries and the linear teardown of a
 * realized graph.
 */
pub mod lifecycle;
pub mod primitives;
