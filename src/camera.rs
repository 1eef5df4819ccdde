//! Camera rig: perspective camera plus a damped orbit controller.
//!
//! The rig is attached once per realized scene. Its aspect ratio is taken from
//! the surface at attach time and deliberately not updated on resize.

use std::f32::consts::PI;

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Rad, Vector3};
use serde::{Deserialize, Serialize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::surface::RenderSurface;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Keeps the orbit away from the poles where the view matrix degenerates.
const POLAR_EPSILON: f32 = 1e-4;

/// Tunables of the rig. The defaults are the preview's fixed camera.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigSettings {
    pub fov_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Fraction of the pending orbit motion applied (and removed) per tick.
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for RigSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            znear: 0.1,
            zfar: 1000.0,
            position: [0.0, 2.0, 5.0],
            target: [0.0, 0.0, 0.0],
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.5,
            max_distance: 500.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P, target: P) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, Vector3::unit_y())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fovy(&self) -> Rad<f32> {
        self.fovy
    }

    pub fn planes(&self) -> (f32, f32) {
        (self.znear, self.zfar)
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// The camera data as the shaders see it.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, view_proj: Matrix4<f32>, eye: Point3<f32>) {
        self.view_position = eye.to_homogeneous().into();
        self.view_proj = view_proj.into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * Orbit-style controller with damped deceleration.
 *
 * Pointer input only accumulates a pending spherical delta. Every [`update`](Self::update)
 * applies `damping_factor` of that delta to the camera and keeps the rest, so
 * the orbit keeps gliding for a while after the drag is released.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitController {
    damping_factor: f32,
    rotate_speed: f32,
    zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
    viewport_height: f32,
    dragging: bool,
    cursor: Option<(f64, f64)>,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
}

impl OrbitController {
    pub fn new(settings: &RigSettings, viewport_height: u32) -> Self {
        Self {
            damping_factor: settings.damping_factor.clamp(f32::EPSILON, 1.0),
            rotate_speed: settings.rotate_speed,
            zoom_speed: settings.zoom_speed,
            min_distance: settings.min_distance,
            max_distance: settings.max_distance,
            viewport_height: viewport_height.max(1) as f32,
            dragging: false,
            cursor: None,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Remaining orbit motion that has not been applied yet, as `(theta, phi)`.
    pub fn pending_rotation(&self) -> (f32, f32) {
        (self.delta_theta, self.delta_phi)
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
        if !dragging {
            self.cursor = None;
        }
    }

    /// Pointer moved by `(dx, dy)` pixels while dragging.
    pub fn handle_drag(&mut self, dx: f64, dy: f64) {
        if !self.dragging {
            return;
        }
        let per_pixel = 2.0 * PI * self.rotate_speed / self.viewport_height;
        self.delta_theta -= dx as f32 * per_pixel;
        self.delta_phi -= dy as f32 * per_pixel;
    }

    /// Scroll by `lines`; positive values move the camera towards the target.
    pub fn handle_scroll(&mut self, lines: f32) {
        let zoom = 0.95_f32.powf(self.zoom_speed);
        if lines > 0.0 {
            self.scale *= zoom;
        } else if lines < 0.0 {
            self.scale /= zoom;
        }
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.set_dragging(*state == ElementState::Pressed),
            WindowEvent::CursorMoved { position, .. } => {
                let current = (position.x, position.y);
                if let Some((x, y)) = self.cursor {
                    self.handle_drag(current.0 - x, current.1 - y);
                }
                self.cursor = Some(current);
            }
            WindowEvent::CursorLeft { .. } => self.set_dragging(false),
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, lines) => self.handle_scroll(*lines),
                MouseScrollDelta::PixelDelta(position) => self.handle_scroll(position.y as f32),
            },
            _ => (),
        }
    }

    /// Advance the damping by one tick and move `camera` accordingly.
    pub fn update(&mut self, camera: &mut Camera) {
        let offset = camera.position - camera.target;
        let radius = offset.magnitude();
        if radius <= f32::EPSILON {
            return;
        }
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta += self.delta_theta * self.damping_factor;
        phi += self.delta_phi * self.damping_factor;
        let phi = phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.position = camera.target + offset;

        self.delta_theta *= 1.0 - self.damping_factor;
        self.delta_phi *= 1.0 - self.damping_factor;
        self.scale = 1.0;
    }
}

/// Camera, projection and controller of one realized scene.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraRig {
    pub camera: Camera,
    pub projection: Projection,
    pub controller: OrbitController,
}

impl CameraRig {
    /// Build a rig for `surface`, or `None` when the surface has no usable size.
    pub fn attach<S: RenderSurface + ?Sized>(surface: &S, settings: &RigSettings) -> Option<Self> {
        let (width, height) = surface
            .dimensions()
            .filter(|&(width, height)| width > 0 && height > 0)?;

        let camera = Camera::new(settings.position, settings.target);
        let projection = Projection::new(
            width,
            height,
            Deg(settings.fov_degrees),
            settings.znear,
            settings.zfar,
        );
        let controller = OrbitController::new(settings, height);

        Some(Self {
            camera,
            projection,
            controller,
        })
    }

    pub fn view_proj(&self) -> Matrix4<f32> {
        self.projection.calc_matrix() * self.camera.calc_matrix()
    }

    pub fn eye(&self) -> Point3<f32> {
        self.camera.position
    }
}
