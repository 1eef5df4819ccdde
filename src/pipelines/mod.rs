//! Render pipeline and uniform definitions for the wgpu backend.

pub mod basic;
pub mod light;
