//! Scene graph and hierarchical scene organization.
//!
//! A loaded model is a tree of [`SceneNode`]s: [`ContainerNode`]s only group
//! and transform their children, [`MeshNode`]s additionally carry geometry and
//! a replaceable [`Material`]. Bulk edits go through [`apply_where`], which
//! visits every node in the tree and mutates the ones matching a predicate.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::{Instance, InstanceRaw},
        material::Material,
        model::Mesh,
    },
    render::Instanced,
};

pub trait SceneNode: Send {
    fn name(&self) -> &str;

    fn get_local_transform(&self) -> &Instance;

    fn set_local_transform(&mut self, instance: Instance);

    fn get_world_transform(&self) -> &Instance;

    /// Recomputes this node's world transform from `parent` and recurses into the children.
    fn update_world_transforms(&mut self, parent: &Instance);

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    fn is_mesh(&self) -> bool {
        false
    }

    fn material(&self) -> Option<&Material> {
        None
    }

    fn meshes(&self) -> &[Mesh] {
        &[]
    }

    /// Replaces the node's material. Nodes without geometry ignore this.
    fn set_material(&mut self, _material: Material) {}

    /// Creates or refreshes the GPU side of this node and all its children.
    fn write_to_buffers(
        &mut self,
        queue: &wgpu::Queue,
        device: &wgpu::Device,
        material_layout: &wgpu::BindGroupLayout,
    );

    fn get_render(&self) -> Vec<Instanced<'_>>;
}

/// Visits `node` and all its descendants depth-first, parents before children.
pub fn traverse(node: &dyn SceneNode, visit: &mut dyn FnMut(&dyn SceneNode)) {
    visit(node);
    for child in node.get_children() {
        traverse(child.as_ref(), visit);
    }
}

pub fn traverse_mut(node: &mut dyn SceneNode, visit: &mut dyn FnMut(&mut dyn SceneNode)) {
    visit(&mut *node);
    for child in node.get_children_mut().iter_mut() {
        traverse_mut(child.as_mut(), visit);
    }
}

/// Applies `transform` to every node in the tree for which `predicate` holds.
///
/// Returns the number of nodes that were transformed.
pub fn apply_where<P, F>(node: &mut dyn SceneNode, predicate: P, mut transform: F) -> usize
where
    P: Fn(&dyn SceneNode) -> bool,
    F: FnMut(&mut dyn SceneNode),
{
    let mut applied = 0;
    traverse_mut(node, &mut |n: &mut dyn SceneNode| {
        if predicate(&*n) {
            transform(n);
            applied += 1;
        }
    });
    applied
}

pub fn count_meshes(node: &dyn SceneNode) -> usize {
    let mut meshes = 0;
    traverse(node, &mut |n: &dyn SceneNode| {
        if n.is_mesh() {
            meshes += 1;
        }
    });
    meshes
}

pub struct ContainerNode {
    pub name: String,
    pub children: Vec<Box<dyn SceneNode>>,
    local: Instance,
    world: Instance,
}

impl ContainerNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            local: Instance::default(),
            world: Instance::default(),
        }
    }
}

impl SceneNode for ContainerNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_local_transform(&self) -> &Instance {
        &self.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn get_world_transform(&self) -> &Instance {
        &self.world
    }

    fn update_world_transforms(&mut self, parent: &Instance) {
        self.world = parent * &self.local;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&self.world);
        }
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn write_to_buffers(
        &mut self,
        queue: &wgpu::Queue,
        device: &wgpu::Device,
        material_layout: &wgpu::BindGroupLayout,
    ) {
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device, material_layout));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .collect()
    }
}

/// GPU objects owned by a mesh node once it has been uploaded.
#[derive(Debug)]
struct MeshNodeGpu {
    instance_buffer: wgpu::Buffer,
    material_buffer: wgpu::Buffer,
    material_bind_group: wgpu::BindGroup,
}

pub struct MeshNode {
    name: String,
    meshes: Vec<Mesh>,
    material: Material,
    children: Vec<Box<dyn SceneNode>>,
    local: Instance,
    world: Instance,
    gpu: Option<MeshNodeGpu>,
    transform_dirty: bool,
    material_dirty: bool,
}

impl MeshNode {
    pub fn new(name: impl Into<String>, meshes: Vec<Mesh>, material: Material) -> Self {
        Self {
            name: name.into(),
            meshes,
            material,
            children: Vec::new(),
            local: Instance::default(),
            world: Instance::default(),
            gpu: None,
            transform_dirty: true,
            material_dirty: true,
        }
    }

    fn upload(&mut self, device: &wgpu::Device, material_layout: &wgpu::BindGroupLayout) {
        self.meshes.iter_mut().for_each(|mesh| mesh.upload(device));

        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Instance Buffer", self.name)),
            contents: bytemuck::cast_slice(&[self.world.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Material Buffer", self.name)),
            contents: bytemuck::cast_slice(&[self.material.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: material_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buffer.as_entire_binding(),
            }],
            label: Some("material_bind_group"),
        });

        self.gpu = Some(MeshNodeGpu {
            instance_buffer,
            material_buffer,
            material_bind_group,
        });
        self.transform_dirty = false;
        self.material_dirty = false;
    }
}

impl SceneNode for MeshNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_local_transform(&self) -> &Instance {
        &self.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn get_world_transform(&self) -> &Instance {
        &self.world
    }

    fn update_world_transforms(&mut self, parent: &Instance) {
        self.world = parent * &self.local;
        self.transform_dirty = true;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&self.world);
        }
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn is_mesh(&self) -> bool {
        true
    }

    fn material(&self) -> Option<&Material> {
        Some(&self.material)
    }

    fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    fn set_material(&mut self, material: Material) {
        self.material = material;
        self.material_dirty = true;
    }

    fn write_to_buffers(
        &mut self,
        queue: &wgpu::Queue,
        device: &wgpu::Device,
        material_layout: &wgpu::BindGroupLayout,
    ) {
        match &self.gpu {
            None => self.upload(device, material_layout),
            Some(gpu) => {
                if self.transform_dirty {
                    let raw: [InstanceRaw; 1] = [self.world.to_raw()];
                    queue.write_buffer(&gpu.instance_buffer, 0, bytemuck::cast_slice(&raw));
                    self.transform_dirty = false;
                }
                if self.material_dirty {
                    queue.write_buffer(
                        &gpu.material_buffer,
                        0,
                        bytemuck::cast_slice(&[self.material.to_uniform()]),
                    );
                    self.material_dirty = false;
                }
            }
        }
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device, material_layout));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        let own = self.gpu.as_ref().map(|gpu| Instanced {
            instance: &gpu.instance_buffer,
            meshes: &self.meshes,
            material: &gpu.material_bind_group,
            textures: self.material.textures,
            side: self.material.side,
        });
        own.into_iter()
            .chain(self.children.iter().flat_map(|child| child.get_render()))
            .collect()
    }
}
