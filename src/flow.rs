//! Preview application and event loop.
//!
//! The preview opens one window, attaches a [`WgpuSurface`] to it and shows
//! the scene of the most recent generation. Generations are submitted as
//! futures; once one resolves, its result is delivered to the event loop as a
//! [`StageEvent::Generated`] and the [`Stage`] rebuilds the scene.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window and the surface, then submits the first generation
//! 2. `user_event` rebuilds the stage whenever a generation arrives
//! 3. `RedrawRequested` steps the live render loop; the next redraw is only
//!    requested while the loop keeps rendering
//! 4. pointer input drives the orbit controller of the scene on screen
//! 5. `Enter` submits the next generation, the same way a UI resubmission would

use std::{fmt::Debug, sync::Arc};

use futures::{FutureExt, future::LocalBoxFuture};
use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{Key, NamedKey},
    window::Window,
};

use crate::{
    analysis::Generation,
    compose::SceneComposer,
    config::PreviewConfig,
    context::{SurfaceError, WgpuSurface},
    render::Tick,
    stage::{Rebuild, Stage},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// A generation request in flight.
pub type Submission = LocalBoxFuture<'static, Generation>;

/// Cycles through a fixed list of generations, one per submission.
#[derive(Clone, Debug, Default)]
pub struct GenerationScript {
    generations: Vec<Generation>,
    next: usize,
}

impl GenerationScript {
    pub fn new(generations: Vec<Generation>) -> Self {
        Self {
            generations,
            next: 0,
        }
    }

    /// The next generation as a pending request, `None` for an empty script.
    pub fn submit(&mut self) -> Option<Submission> {
        if self.generations.is_empty() {
            return None;
        }
        let generation = self.generations[self.next % self.generations.len()].clone();
        self.next += 1;
        Some(futures::future::ready(generation).boxed_local())
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }
}

pub(crate) enum StageEvent {
    Initialized(Option<WgpuSurface>),
    Generated(Generation),
}

impl Debug for StageEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(surface) => f
                .debug_tuple("Initialized")
                .field(&surface.is_some())
                .finish(),
            Self::Generated(generation) => f
                .debug_tuple("Generated")
                .field(&generation.scene_id())
                .finish(),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<StageEvent>,
    config: PreviewConfig,
    window: Option<Arc<Window>>,
    surface: Option<WgpuSurface>,
    stage: Stage<WgpuSurface>,
    script: GenerationScript,
    last_report: Instant,
    frames_at_report: u64,
}

/// How often the frame rate of the live scene is logged.
const REPORT_INTERVAL: Duration = Duration::from_secs(5);

impl App {
    fn new(
        event_loop: &EventLoop<StageEvent>,
        config: PreviewConfig,
        generations: Vec<Generation>,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        let stage = Stage::new(
            SceneComposer::new(config.palette.clone()),
            config.rig.clone(),
        );
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config,
            window: None,
            surface: None,
            stage,
            script: GenerationScript::new(generations),
            last_report: Instant::now(),
            frames_at_report: 0,
        })
    }

    /// Submit the next scripted generation and deliver it once resolved.
    fn submit(&mut self) {
        let Some(submission) = self.script.submit() else {
            log::warn!("nothing to generate, the preview stays empty");
            return;
        };
        let proxy = self.proxy.clone();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let generation = self.async_runtime.block_on(submission);
            if let Err(err) = proxy.send_event(StageEvent::Generated(generation)) {
                log::error!("event loop closed before the generation arrived: {}", err);
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                let generation = submission.await;
                if let Err(err) = proxy.send_event(StageEvent::Generated(generation)) {
                    log::error!("event loop closed before the generation arrived: {}", err);
                }
            });
        }
    }

    fn on_generated(&mut self, generation: Generation) {
        match self.stage.apply(&generation, self.surface.as_mut()) {
            Rebuild::Realized { .. } => {
                self.last_report = Instant::now();
                self.frames_at_report = 0;
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            Rebuild::Aborted => log::warn!(
                "no rendering surface, scene {} was not shown",
                generation.scene_id()
            ),
            Rebuild::Skipped => (),
        }
    }

    fn redraw(&mut self) {
        let (Some(window), Some(surface)) = (&self.window, self.surface.as_mut()) else {
            return;
        };
        match self.stage.tick(surface) {
            Ok(Tick::Rendered) => {
                window.request_redraw();
                let elapsed = self.last_report.elapsed();
                if elapsed >= REPORT_INTERVAL {
                    let frames = self.stage.frames();
                    log::debug!(
                        "{:.1} fps",
                        (frames - self.frames_at_report) as f32 / elapsed.as_secs_f32()
                    );
                    self.last_report = Instant::now();
                    self.frames_at_report = frames;
                }
            }
            Ok(Tick::Cancelled) => (),
            // Reconfigure the surface if it's lost or outdated
            Err(SurfaceError::Acquire(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                let size = window.inner_size();
                surface.resize(size.width, size.height);
                window.request_redraw();
            }
            Err(SurfaceError::Acquire(wgpu::SurfaceError::Timeout)) => {
                log::debug!("frame acquisition timed out");
                window.request_redraw();
            }
            Err(e) => log::error!("Unable to render {}", e),
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(surface) = self.surface.as_mut() {
            let released = self.stage.teardown(surface);
            log::info!(
                "released {} geometries and {} materials on exit",
                released.geometries,
                released.materials
            );
        }
        event_loop.exit();
    }
}

impl ApplicationHandler<StageEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(&self.config.title);

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            match find_canvas() {
                Some(canvas) => window_attributes = window_attributes.with_canvas(Some(canvas)),
                None => {
                    log::error!("no canvas with id `{}` on the page", CANVAS_ID);
                    self.submit();
                    return;
                }
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create the preview window: {}", e);
                self.submit();
                return;
            }
        };
        self.window = Some(window.clone());

        let clear_colour = self.config.clear_colour();
        let init_future = async move {
            match WgpuSurface::new(window, clear_colour).await {
                Ok(surface) => Some(surface),
                Err(e) => {
                    log::error!("could not set up rendering: {:#}", e);
                    None
                }
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let surface = self.async_runtime.block_on(init_future);
            self.user_event(event_loop, StageEvent::Initialized(surface));
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let surface = init_future.await;
                if proxy.send_event(StageEvent::Initialized(surface)).is_err() {
                    log::error!("event loop closed before the surface was ready");
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: StageEvent) {
        match event {
            StageEvent::Initialized(surface) => {
                self.surface = surface;
                if let (Some(window), Some(surface)) = (&self.window, self.surface.as_mut()) {
                    let size = window.inner_size();
                    surface.resize(size.width, size.height);
                }
                self.submit();
            }
            StageEvent::Generated(generation) => self.on_generated(generation),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Enter),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.submit(),
            event => {
                if let Some(rig) = self.stage.rig_mut() {
                    rig.controller.handle_window_events(&event);
                }
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
const CANVAS_ID: &str = "canvas";

#[cfg(target_arch = "wasm32")]
fn find_canvas() -> Option<web_sys::HtmlCanvasElement> {
    use wasm_bindgen::JsCast;

    web_sys::window()?
        .document()?
        .get_element_by_id(CANVAS_ID)?
        .dyn_into()
        .ok()
}

/// Open the preview window and show `generations` one after another.
///
/// The first generation is shown as soon as the surface is ready; `Enter`
/// moves on to the next one, wrapping around at the end.
pub fn run(config: PreviewConfig, generations: Vec<Generation>) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        // a second init only fails because a logger is already installed
        let _ = console_log::init_with_level(log::Level::Info);
    }

    let event_loop: EventLoop<StageEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config, generations)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}

/// Browser entry point: `generations` is a JSON array of [`Generation`]s.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn run_web(generations: &str) -> Result<(), JsValue> {
    let generations: Vec<Generation> =
        serde_json::from_str(generations).map_err(|e| JsValue::from_str(&e.to_string()))?;
    run(PreviewConfig::default(), generations).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
