use std::sync::Arc;

use anyhow::Context as _;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::{CameraResources, CameraUniform, OrbitCamera, OrbitController, Projection},
    config::ViewerConfig,
    data_structures::{
        material::{TextureLibrary, material_layout},
        texture::Texture,
    },
    pipelines::{basic::Pipelines, light::LightResources},
    resources::texture::diffuse_normal_layout,
};

const MSAA_SAMPLES: u32 = 4;

/// Output size for a window size: physical pixels natively, CSS pixels on the
/// web where the canvas mirrors its container without pixel-ratio scaling.
pub(crate) fn output_size(window: &Window, size: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    #[cfg(target_arch = "wasm32")]
    let size: winit::dpi::LogicalSize<u32> = size.to_logical(window.scale_factor());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = window;
    (size.width, size.height)
}

/// Size bookkeeping of a resize: the surface configuration takes `(width, height)`,
/// the projection the aspect `width / height` and the controller the new
/// viewport height. A minimised window reports a zero side; that is skipped.
pub fn resize_output(
    config: &mut wgpu::SurfaceConfiguration,
    projection: &mut Projection,
    controller: &mut OrbitController,
    width: u32,
    height: u32,
) -> bool {
    if width == 0 || height == 0 {
        return false;
    }
    config.width = width;
    config.height = height;
    projection.resize(width, height);
    controller.set_viewport_height(height);
    true
}

/// The GPU side of the viewer: device, surface, render targets, pipelines and
/// the uniforms shared by every draw call.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: Texture,
    /// Multisampled colour target, `None` when antialiasing is off or unsupported.
    pub(crate) msaa_texture: Option<Texture>,
    pub(crate) sample_count: u32,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub light: LightResources,
    pub textures: TextureLibrary,
    pub pipelines: Pipelines,
    pub material_layout: wgpu::BindGroupLayout,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>, viewer_config: &ViewerConfig) -> anyhow::Result<Self> {
        let (width, height) = output_size(&window, window.inner_size());

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
            .context("cannot create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable graphics adapter")?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

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
            .context("cannot open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Colours are computed in linear space, so prefer an sRGB surface
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface supports no texture format")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
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

        let sample_count = if viewer_config.renderer.antialias
            && adapter
                .get_texture_format_features(surface_format)
                .flags
                .sample_count_supported(MSAA_SAMPLES)
        {
            MSAA_SAMPLES
        } else {
            if viewer_config.renderer.antialias {
                log::warn!("{surface_format:?} does not support {MSAA_SAMPLES}x MSAA, rendering without antialiasing");
            }
            1
        };

        let camera_config = &viewer_config.camera;
        let camera = OrbitCamera::new(camera_config.position, camera_config.target);
        let projection = Projection::new(
            config.width,
            config.height,
            cgmath::Deg(camera_config.fovy_degrees),
            camera_config.znear,
            camera_config.zfar,
        );
        let controller = OrbitController::new(camera_config, config.height);

        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&camera, &projection);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("camera_bind_group_layout"),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let camera = CameraResources {
            camera,
            controller,
            uniform: camera_uniform,
            buffer: camera_buffer,
            bind_group: camera_bind_group,
            bind_group_layout: camera_bind_group_layout,
        };

        let light = LightResources::new(&viewer_config.lights, &device);
        let material_layout = material_layout(&device);

        let pipelines = Pipelines::new(
            &device,
            &config,
            sample_count,
            &camera.bind_group_layout,
            &light.bind_group_layout,
            &material_layout,
        );

        let texture_layout = diffuse_normal_layout(&device);
        let textures = TextureLibrary::load(
            &viewer_config.assets.texture_sets,
            &device,
            &queue,
            &texture_layout,
        )
        .await?;

        let depth_texture = Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            sample_count,
            "depth_texture",
        );
        let msaa_texture = (sample_count > 1)
            .then(|| Texture::create_msaa_target(&device, &config, sample_count, "msaa_texture"));

        Ok(Self {
            window,
            depth_texture,
            msaa_texture,
            sample_count,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            light,
            textures,
            pipelines,
            material_layout,
            clear_colour: viewer_config.clear_colour,
        })
    }

    /// Reconfigures the surface and recreates the size-dependent render targets.
    ///
    /// Returns `false` and leaves everything untouched for a zero-sized output.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if !resize_output(
            &mut self.config,
            &mut self.projection,
            &mut self.camera.controller,
            width,
            height,
        ) {
            return false;
        }
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = Texture::create_depth_texture(
            &self.device,
            [width, height],
            self.sample_count,
            "depth_texture",
        );
        if self.sample_count > 1 {
            self.msaa_texture = Some(Texture::create_msaa_target(
                &self.device,
                &self.config,
                self.sample_count,
                "msaa_texture",
            ));
        }
        true
    }

    /// Writes the current camera state into its uniform buffer.
    pub fn update_camera(&mut self) {
        let camera = &mut self.camera;
        camera.controller.update(&mut camera.camera);
        camera
            .uniform
            .update_view_proj(&camera.camera, &self.projection);
        self.queue.write_buffer(
            &camera.buffer,
            0,
            bytemuck::cast_slice(&[camera.uniform]),
        );
    }
}
