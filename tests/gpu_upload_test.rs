#![cfg(feature = "integration-tests")]

use model_viewer::{
    config::ViewerConfig,
    data_structures::{
        instance::Instance,
        material::{Side, TextureSet, material_layout},
        scene_graph::{SceneNode, traverse},
        texture::Texture,
    },
    pipelines::{basic::Pipelines, light::LightResources},
    viewer::Viewer,
};

use crate::common::test_utils::{RecordingHud, block_on, triangle_glb};

mod common;

fn headless_device() -> (wgpu::Device, wgpu::Queue) {
    block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .expect("no adapter available for the GPU tests");
        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .expect("failed to open the device")
    })
}

fn camera_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
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
        label: Some("test_camera_layout"),
    })
}

#[test]
fn model_uploads_lazily_and_renders_all_meshes() {
    let (device, queue) = headless_device();
    let layout = material_layout(&device);

    let mut hud = RecordingHud::new();
    let mut viewer = Viewer::new(&ViewerConfig::default());
    let model = block_on(model_viewer::resources::parse_model(&triangle_glb(), "triangle.glb"))
        .expect("valid glb");
    viewer.attach_model(model, &mut hud, instant::Instant::now());

    let model = viewer.model().expect("model attached");
    assert!(model.get_render().is_empty(), "nothing is drawn before upload");

    let model = viewer.model_mut().expect("model attached");
    model.write_to_buffers(&queue, &device, &layout);

    let mut uploaded = 0;
    traverse(viewer.model().expect("model attached"), &mut |n: &dyn SceneNode| {
        for mesh in n.meshes() {
            assert!(mesh.gpu().is_some());
            assert_eq!(mesh.gpu().map(|g| g.num_elements), Some(3));
            uploaded += 1;
        }
    });
    assert_eq!(uploaded, 3);

    let draws = viewer.model().expect("model attached").get_render();
    assert_eq!(draws.len(), 3);
    assert!(draws.iter().all(|d| d.textures == TextureSet::Primary));
    assert!(draws.iter().all(|d| d.side == Side::Double));
}

#[test]
fn material_swap_after_upload_updates_the_draw_list() {
    let (device, queue) = headless_device();
    let layout = material_layout(&device);

    let mut hud = RecordingHud::new();
    let mut viewer = Viewer::new(&ViewerConfig::default());
    let model = block_on(model_viewer::resources::parse_model(&triangle_glb(), "triangle.glb"))
        .expect("valid glb");
    viewer.attach_model(model, &mut hud, instant::Instant::now());
    if let Some(model) = viewer.model_mut() {
        model.write_to_buffers(&queue, &device, &layout);
    }

    assert_eq!(viewer.apply_texture_set(TextureSet::Alternate), 3);
    if let Some(model) = viewer.model_mut() {
        model.set_local_transform(Instance::new());
        model.update_world_transforms(&Instance::new());
        model.write_to_buffers(&queue, &device, &layout);
    }
    queue.submit(std::iter::empty());

    let draws = viewer.model().expect("model attached").get_render();
    assert_eq!(draws.len(), 3);
    assert!(draws.iter().all(|d| d.textures == TextureSet::Alternate));
}

#[test]
fn model_pipelines_compile() {
    let (device, _queue) = headless_device();
    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        width: 64,
        height: 64,
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode: wgpu::CompositeAlphaMode::Auto,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    let light = LightResources::new(&ViewerConfig::default().lights, &device);
    let materials = material_layout(&device);
    let camera = camera_layout(&device);

    for sample_count in [1, 4] {
        let pipelines = Pipelines::new(
            &device,
            &config,
            sample_count,
            &camera,
            &light.bind_group_layout,
            &materials,
        );
        let _ = pipelines.for_side(Side::Front);
        let _ = pipelines.for_side(Side::Double);
    }
}

#[test]
fn render_targets_match_the_output_size() {
    let (device, _queue) = headless_device();
    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        width: 333,
        height: 777,
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode: wgpu::CompositeAlphaMode::Auto,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };

    let depth = Texture::create_depth_texture(&device, [config.width, config.height], 4, "depth");
    let msaa = Texture::create_msaa_target(&device, &config, 4, "msaa");

    for target in [&depth, &msaa] {
        assert_eq!((target.texture.width(), target.texture.height()), (333, 777));
        assert_eq!(target.texture.sample_count(), 4);
    }
    assert_eq!(msaa.texture.format(), config.format);
}
