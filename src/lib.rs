//! story-ngin
//!
//! Turns a structured story analysis into a small 3D preview built from
//! primitive shapes, and manages the lifetime of everything that preview
//! allocates on the GPU. Every new generation replaces the previous scene:
//! the running render loop is cancelled, its resources are released and only
//! then is the new scene realized on the shared surface.
//!
//! High-level modules
//! - `analysis`: story analysis input and the generation envelope
//! - `compose`: pure mapping from an analysis to a scene description
//! - `data_structures`: scene descriptors, meshes, instances and realized graphs
//! - `resources`: primitive mesh builders and resource disposal
//! - `surface`: the rendering surface seam
//! - `camera`: perspective camera and damped orbit controller
//! - `render`: the explicitly scheduled, cancellable render loop
//! - `stage`: rebuild orchestration (cancel, dispose, realize, restart)
//! - `context` / `pipelines`: the wgpu backed surface
//! - `flow`: the winit preview application
//! - `config`: preview configuration loaded from TOML

pub mod analysis;
pub mod camera;
pub mod compose;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod stage;
pub mod surface;

// Re-exports commonly used types for convenience in downstream code.
pub use analysis::{Generation, GenerationResult, Industry, StoryAnalysis};
pub use compose::{SceneComposer, compose};
pub use config::PreviewConfig;
pub use data_structures::{descriptor::SceneGraphDescriptor, scene_graph::realize};
pub use render::{LoopHandle, RenderLoop, Tick};
pub use resources::lifecycle::dispose;
pub use stage::{Rebuild, Stage};
pub use surface::RenderSurface;
