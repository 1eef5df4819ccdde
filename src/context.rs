use std::{iter, ops::Range, sync::Arc};

use anyhow::Context as _;
use thiserror::Error;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::CameraUniform,
    data_structures::{
        descriptor::Color, instance::Instance, model::MeshData, texture::DepthTexture,
    },
    pipelines::{basic, light::LightUniform},
    surface::{Frame, RenderSurface},
};

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("could not acquire the next frame: {0}")]
    Acquire(#[from] wgpu::SurfaceError),
}

/// Vertex, index and instance buffers of one node.
#[derive(Debug)]
pub struct GpuGeometry {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    num_elements: u32,
    groups: Vec<Range<u32>>,
}

impl GpuGeometry {
    pub fn num_elements(&self) -> u32 {
        self.num_elements
    }
}

/// Uniform buffer and bind group of one flat-colored material.
#[derive(Debug)]
pub struct GpuMaterial {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// The window-backed wgpu surface every scene is drawn onto.
///
/// Camera and light uniforms are shared by all scenes and rewritten every
/// frame. Everything scene specific lives in [`GpuGeometry`] and
/// [`GpuMaterial`] values owned by the realized graph.
#[derive(Debug)]
pub struct WgpuSurface {
    pub(crate) window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    depth_texture: DepthTexture,
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    light_buffer: wgpu::Buffer,
    light_bind_group: wgpu::BindGroup,
    material_layout: wgpu::BindGroupLayout,
    pub clear_colour: wgpu::Color,
    is_configured: bool,
}

impl WgpuSurface {
    pub async fn new(window: Arc<Window>, clear_colour: wgpu::Color) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("could not create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no adapter can present to the window")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("could not open the device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader writes linear colors and relies on an sRGB target.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface reports no texture formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::new()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_layout = basic::uniform_layout(&device, "camera_bind_group_layout");
        let camera_bind_group =
            basic::uniform_bind_group(&device, &camera_layout, &camera_buffer, "camera_bind_group");

        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[LightUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_layout = basic::uniform_layout(&device, "light_bind_group_layout");
        let light_bind_group =
            basic::uniform_bind_group(&device, &light_layout, &light_buffer, "light_bind_group");

        let material_layout = basic::uniform_layout(&device, "material_bind_group_layout");

        let pipeline = basic::mk_scene_pipeline(
            &device,
            &config,
            &camera_layout,
            &light_layout,
            &material_layout,
        );

        let depth_texture =
            DepthTexture::new(&device, [config.width, config.height], "depth_texture");

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_texture,
            pipeline,
            camera_buffer,
            camera_bind_group,
            light_buffer,
            light_bind_group,
            material_layout,
            clear_colour,
            is_configured: false,
        })
    }

    /// Reconfigure for a new window size. Zero sizes (minimized) are ignored.
    ///
    /// Scenes already on screen keep the aspect ratio they were attached with.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture =
                DepthTexture::new(&self.device, [width, height], "depth_texture");
            self.is_configured = true;
        }
    }

    pub fn is_configured(&self) -> bool {
        self.is_configured
    }

    fn begin_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        })
    }
}

impl RenderSurface for WgpuSurface {
    type Geometry = GpuGeometry;
    type Material = GpuMaterial;
    type Error = SurfaceError;

    fn dimensions(&self) -> Option<(u32, u32)> {
        (self.is_configured && self.config.width > 0 && self.config.height > 0)
            .then_some((self.config.width, self.config.height))
    }

    fn clear(&mut self) {
        if !self.is_configured {
            return;
        }
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(e) => {
                log::warn!("surface not cleared: {}", e);
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Clear Encoder"),
            });
        drop(self.begin_pass(&mut encoder, &view));
        self.queue.submit(iter::once(encoder.finish()));
        output.present();
    }

    fn create_geometry(
        &mut self,
        label: &str,
        mesh: &MeshData,
        transform: &Instance,
    ) -> Self::Geometry {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Vertex Buffer", label)),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Index Buffer", label)),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let instance_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Instance Buffer", label)),
                contents: bytemuck::cast_slice(&[transform.to_raw()]),
                usage: wgpu::BufferUsages::VERTEX,
            });

        GpuGeometry {
            vertex_buffer,
            index_buffer,
            instance_buffer,
            num_elements: mesh.num_elements(),
            groups: mesh.groups.clone(),
        }
    }

    fn create_material(&mut self, label: &str, color: Color) -> Self::Material {
        let buffer = basic::mk_material_buffer(
            &self.device,
            &format!("{} Material Buffer", label),
            color,
        );
        let bind_group = basic::uniform_bind_group(
            &self.device,
            &self.material_layout,
            &buffer,
            &format!("{} Material", label),
        );
        GpuMaterial { buffer, bind_group }
    }

    fn release_geometry(&mut self, geometry: Self::Geometry) {
        geometry.vertex_buffer.destroy();
        geometry.index_buffer.destroy();
        geometry.instance_buffer.destroy();
    }

    fn release_material(&mut self, material: Self::Material) {
        material.buffer.destroy();
    }

    fn draw(&mut self, frame: &Frame<'_, Self>) -> Result<(), Self::Error> {
        // Rendering requires the surface to be configured
        if !self.is_configured {
            return Ok(());
        }

        let mut camera = CameraUniform::new();
        camera.update_view_proj(frame.view_proj, frame.eye);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera]));
        let light = LightUniform::from_lights(frame.lights);
        self.queue
            .write_buffer(&self.light_buffer, 0, bytemuck::cast_slice(&[light]));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = self.begin_pass(&mut encoder, &view);
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_bind_group(1, &self.light_bind_group, &[]);

            for item in &frame.items {
                let geometry = item.geometry;
                render_pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, geometry.instance_buffer.slice(..));
                render_pass
                    .set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                for (group, material) in geometry.groups.iter().zip(&item.materials) {
                    render_pass.set_bind_group(2, &material.bind_group, &[]);
                    render_pass.draw_indexed(group.clone(), 0, 0..1);
                }
            }
        }
        self.queue.submit(iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
