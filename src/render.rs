//! Explicitly scheduled render loop.
//!
//! A [`RenderLoop`] owns the graph and camera rig it draws. It does not
//! reschedule itself: the host calls [`RenderLoop::step`] once per display
//! refresh and only asks for another refresh while the step reports
//! [`Tick::Rendered`]. Stopping is an explicit signal through the shared
//! [`LoopHandle`], checked at the top of every step.
//!
//! Disposal goes through [`RenderLoop::stop`], which cancels the loop and hands
//! the graph back. A graph can therefore never be disposed while a loop still
//! holds it.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    camera::CameraRig,
    data_structures::scene_graph::RealizedSceneGraph,
    surface::{Frame, RenderSurface},
};

/// Cancellation side of a running [`RenderLoop`].
#[derive(Clone, Debug, Default)]
pub struct LoopHandle {
    cancelled: Arc<AtomicBool>,
}

impl LoopHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Outcome of one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// A frame was drawn; schedule the next step for the next refresh.
    Rendered,
    /// The loop was cancelled; nothing was drawn and nothing must be rescheduled.
    Cancelled,
}

pub struct RenderLoop<S: RenderSurface> {
    graph: RealizedSceneGraph<S>,
    rig: CameraRig,
    handle: LoopHandle,
    frames: u64,
}

impl<S: RenderSurface> RenderLoop<S> {
    pub fn start(graph: RealizedSceneGraph<S>, rig: CameraRig) -> (Self, LoopHandle) {
        let handle = LoopHandle::default();
        let render_loop = Self {
            graph,
            rig,
            handle: handle.clone(),
            frames: 0,
        };
        (render_loop, handle)
    }

    /// Advance the controller and draw one frame, unless cancelled.
    pub fn step(&mut self, surface: &mut S) -> Result<Tick, S::Error> {
        if self.handle.is_cancelled() {
            return Ok(Tick::Cancelled);
        }

        self.rig.controller.update(&mut self.rig.camera);
        let frame = Frame {
            view_proj: self.rig.view_proj(),
            eye: self.rig.eye(),
            lights: self.graph.lights(),
            items: self.graph.draw_items(),
        };
        surface.draw(&frame)?;
        self.frames += 1;

        Ok(Tick::Rendered)
    }

    pub fn graph(&self) -> &RealizedSceneGraph<S> {
        &self.graph
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    /// Pointer input goes to the controller of the scene currently on screen.
    pub fn rig_mut(&mut self) -> &mut CameraRig {
        &mut self.rig
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }

    /// Cancel the loop and give up the graph and rig it was drawing.
    pub fn stop(self) -> (RealizedSceneGraph<S>, CameraRig) {
        self.handle.cancel();
        log::debug!("render loop stopped after {} frames", self.frames);
        (self.graph, self.rig)
    }
}
