use cgmath::InnerSpace;
use wgpu::util::DeviceExt;

use crate::config::{Light, hex_to_linear};

/// Directional lights beyond this count are ignored by the shader.
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightsUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(lights: &[Light], device: &wgpu::Device) -> Self {
        let uniform = LightsUniform::from_lights(lights);
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLightRaw {
    /// Unit vector pointing from the surface towards the light.
    pub direction: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
}

/// The whole light rig as one uniform block.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub directional: [DirectionalLightRaw; MAX_DIRECTIONAL_LIGHTS],
    /// Sum of all ambient lights, premultiplied by intensity.
    pub ambient: [f32; 3],
    pub directional_count: u32,
    pub sky: [f32; 3],
    _padding: u32,
    pub ground: [f32; 3],
    _padding2: u32,
}

impl LightsUniform {
    pub fn from_lights(lights: &[Light]) -> Self {
        let mut uniform = Self::default();
        for light in lights {
            match light {
                Light::Directional {
                    colour,
                    intensity,
                    position,
                } => {
                    let idx = uniform.directional_count as usize;
                    if idx >= MAX_DIRECTIONAL_LIGHTS {
                        log::warn!(
                            "Only {MAX_DIRECTIONAL_LIGHTS} directional lights are supported, ignoring {light:?}"
                        );
                        continue;
                    }
                    let direction = cgmath::Vector3::from(*position);
                    let direction = if direction.magnitude2() > 0.0 {
                        direction.normalize()
                    } else {
                        cgmath::Vector3::unit_y()
                    };
                    uniform.directional[idx] = DirectionalLightRaw {
                        direction: direction.into(),
                        intensity: *intensity,
                        color: hex_to_linear(*colour),
                        _padding: 0,
                    };
                    uniform.directional_count += 1;
                }
                Light::Ambient { colour, intensity } => {
                    let [r, g, b] = hex_to_linear(*colour);
                    uniform.ambient[0] += r * intensity;
                    uniform.ambient[1] += g * intensity;
                    uniform.ambient[2] += b * intensity;
                }
                Light::Hemisphere {
                    sky,
                    ground,
                    intensity,
                } => {
                    let sky = hex_to_linear(*sky);
                    let ground = hex_to_linear(*ground);
                    for c in 0..3 {
                        uniform.sky[c] += sky[c] * intensity;
                        uniform.ground[c] += ground[c] * intensity;
                    }
                }
            }
        }
        uniform
    }
}

pub fn mk_buffer(device: &wgpu::Device, lights_uniform: LightsUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[lights_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
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
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}
