//! Scene data: what a scene should contain and what it holds once realized.
//!
//! - `descriptor` is the plain, GPU-free description produced by composition
//! - `model` holds CPU-side mesh data and vertex layouts
//! - `instance` holds per-node transformation data
//! - `scene_graph` holds realized graphs and the arena owning their resources
//! - `texture` holds the depth attachment of the wgpu surface

pub mod descriptor;
pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
