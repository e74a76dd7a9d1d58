//! Materials and the shared texture sets they reference.
//!
//! A [`Material`] is a plain value: shading parameters plus the name of a
//! [`TextureSet`]. The GPU textures behind each set are loaded once into a
//! [`TextureLibrary`] and shared read-only by every mesh that selects them, so
//! swapping a material never touches texture memory.

use anyhow::Context as _;

use crate::{
    config::{MaterialParams, TexturePaths},
    data_structures::texture::{Texture, create_default_sampler},
    resources::texture::load_texture,
};

/// One of the two predefined (colour, normal) texture pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSet {
    Primary,
    Alternate,
}

impl TextureSet {
    pub const ALL: [TextureSet; 2] = [TextureSet::Primary, TextureSet::Alternate];

    pub fn index(self) -> usize {
        match self {
            TextureSet::Primary => 0,
            TextureSet::Alternate => 1,
        }
    }
}

/// Which faces of a mesh get shaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Front,
    Double,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub metalness: f32,
    pub roughness: f32,
    pub side: Side,
    pub textures: TextureSet,
}

impl Material {
    /// The material the viewer puts on every mesh: double-sided, fixed parameters.
    pub fn standard(params: &MaterialParams, textures: TextureSet) -> Self {
        Self {
            metalness: params.metalness,
            roughness: params.roughness,
            side: Side::Double,
            textures,
        }
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        MaterialUniform {
            metalness: self.metalness,
            roughness: self.roughness,
            _padding: [0.0; 2],
        }
    }
}

impl Default for Material {
    /// glTF's default material: fully metallic, fully rough, single-sided.
    fn default() -> Self {
        Self {
            metalness: 1.0,
            roughness: 1.0,
            side: Side::Front,
            textures: TextureSet::Primary,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    metalness: f32,
    roughness: f32,
    // Uniforms are 16 byte aligned
    _padding: [f32; 2],
}

pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("material_bind_group_layout"),
    })
}

/// A colour map and a normal map bound together for the fragment shader.
#[derive(Debug)]
pub struct MaterialTextures {
    pub name: String,
    pub diffuse_texture: Texture,
    pub normal_texture: Texture,
    pub bind_group: wgpu::BindGroup,
}

impl MaterialTextures {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        diffuse_texture: Texture,
        normal_texture: Texture,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let diffuse_sampler = diffuse_texture
            .sampler
            .clone()
            .unwrap_or_else(|| create_default_sampler(device));
        let normal_sampler = normal_texture
            .sampler
            .clone()
            .unwrap_or_else(|| create_default_sampler(device));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&diffuse_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&normal_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&normal_sampler),
                },
            ],
            label: Some(name),
        });

        Self {
            name: name.to_string(),
            diffuse_texture,
            normal_texture,
            bind_group,
        }
    }
}

/// Both texture sets, loaded once at startup.
#[derive(Debug)]
pub struct TextureLibrary {
    sets: [MaterialTextures; 2],
}

impl TextureLibrary {
    pub async fn load(
        paths: &[TexturePaths; 2],
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
    ) -> anyhow::Result<Self> {
        let [primary, alternate] = paths;
        let primary = load_set(primary, device, queue, layout).await?;
        let alternate = load_set(alternate, device, queue, layout).await?;
        Ok(Self {
            sets: [primary, alternate],
        })
    }

    pub fn get(&self, set: TextureSet) -> &MaterialTextures {
        &self.sets[set.index()]
    }
}

async fn load_set(
    paths: &TexturePaths,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<MaterialTextures> {
    let diffuse = load_texture(&paths.colour, false, device, queue, None)
        .await
        .with_context(|| format!("failed to load colour map {}", paths.colour))?;
    let normal = load_texture(&paths.normal, true, device, queue, None)
        .await
        .with_context(|| format!("failed to load normal map {}", paths.normal))?;
    log::info!("Loaded texture set {} / {}", paths.colour, paths.normal);
    Ok(MaterialTextures::new(
        device,
        &paths.colour,
        diffuse,
        normal,
        layout,
    ))
}
