//! Rebuild orchestration.
//!
//! [`Stage`] is the caller-owned value that knows which scene is currently on
//! the surface. There is no global "current scene": whoever owns the stage owns
//! the rebuild-and-cancel sequencing.
//!
//! A rebuild runs, in program order:
//! 1. cancel the running loop and take its graph back,
//! 2. dispose that graph,
//! 3. compose the new descriptor and realize it (which clears the surface first),
//! 4. start a new loop with a freshly attached camera rig.

use crate::{
    analysis::{Generation, StoryAnalysis},
    camera::{CameraRig, RigSettings},
    compose::SceneComposer,
    data_structures::scene_graph::{RealizedSceneGraph, realize},
    render::{LoopHandle, RenderLoop, Tick},
    resources::lifecycle::{Released, dispose},
    surface::RenderSurface,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rebuild {
    /// The new scene is live. `released` is what the previous scene gave back.
    Realized { nodes: usize, released: Released },
    /// No usable surface; nothing was touched.
    Aborted,
    /// The generation failed upstream; the current scene stays.
    Skipped,
}

struct LiveScene<S: RenderSurface> {
    scene_id: String,
    render_loop: RenderLoop<S>,
    handle: LoopHandle,
}

pub struct Stage<S: RenderSurface> {
    composer: SceneComposer,
    rig_settings: RigSettings,
    live: Option<LiveScene<S>>,
}

impl<S: RenderSurface> Stage<S> {
    pub fn new(composer: SceneComposer, rig_settings: RigSettings) -> Self {
        Self {
            composer,
            rig_settings,
            live: None,
        }
    }

    /// Show the scene of a finished generation, unless the generation failed.
    pub fn apply(&mut self, generation: &Generation, surface: Option<&mut S>) -> Rebuild {
        if !generation.result.success {
            log::warn!(
                "generation {} failed, keeping the current scene",
                generation.scene_id()
            );
            return Rebuild::Skipped;
        }
        self.rebuild(generation.scene_id(), &generation.analysis, surface)
    }

    /// Replace the scene on `surface` with one composed from `analysis`.
    ///
    /// A missing surface (or one without a size) aborts before anything is
    /// cancelled, disposed or allocated.
    pub fn rebuild(
        &mut self,
        scene_id: &str,
        analysis: &StoryAnalysis,
        surface: Option<&mut S>,
    ) -> Rebuild {
        let Some(surface) = surface else {
            log::debug!("no surface for scene {}, rebuild skipped", scene_id);
            return Rebuild::Aborted;
        };
        // The rig only reads the surface size, so attaching it up front keeps
        // the abort path free of side effects.
        let Some(rig) = CameraRig::attach(&*surface, &self.rig_settings) else {
            log::debug!("surface has no size for scene {}, rebuild skipped", scene_id);
            return Rebuild::Aborted;
        };

        let released = self.teardown(surface);

        let descriptor = self.composer.compose(analysis);
        let graph = realize(&descriptor, surface);
        let nodes = graph.nodes().len();
        let (render_loop, handle) = RenderLoop::start(graph, rig);
        self.live = Some(LiveScene {
            scene_id: scene_id.to_string(),
            render_loop,
            handle,
        });

        log::info!(
            "scene {} live with {} nodes, previous scene released {} geometries and {} materials",
            scene_id,
            nodes,
            released.geometries,
            released.materials
        );
        Rebuild::Realized { nodes, released }
    }

    /// Step the live loop. Without a live scene this reports [`Tick::Cancelled`].
    pub fn tick(&mut self, surface: &mut S) -> Result<Tick, S::Error> {
        match self.live.as_mut() {
            Some(live) => live.render_loop.step(surface),
            None => Ok(Tick::Cancelled),
        }
    }

    /// Cancel the live loop and dispose its graph. A no-op without a live scene.
    pub fn teardown(&mut self, surface: &mut S) -> Released {
        match self.live.take() {
            Some(live) => {
                let (graph, _rig) = live.render_loop.stop();
                log::debug!("tearing down scene {}", live.scene_id);
                dispose(graph, surface)
            }
            None => Released::default(),
        }
    }

    pub fn scene_id(&self) -> Option<&str> {
        self.live.as_ref().map(|live| live.scene_id.as_str())
    }

    pub fn scene(&self) -> Option<&RealizedSceneGraph<S>> {
        self.live.as_ref().map(|live| live.render_loop.graph())
    }

    pub fn rig(&self) -> Option<&CameraRig> {
        self.live.as_ref().map(|live| live.render_loop.rig())
    }

    pub fn rig_mut(&mut self) -> Option<&mut CameraRig> {
        self.live.as_mut().map(|live| live.render_loop.rig_mut())
    }

    /// Handle of the live loop, for hosts that schedule ticks elsewhere.
    pub fn handle(&self) -> Option<LoopHandle> {
        self.live.as_ref().map(|live| live.handle.clone())
    }

    pub fn frames(&self) -> u64 {
        self.live
            .as_ref()
            .map_or(0, |live| live.render_loop.frames())
    }
}
