use std::io::{BufReader, Cursor};

use anyhow::Context as _;

use crate::{
    data_structures::{
        instance::Instance,
        material::{Material, Side},
        model::{Mesh, ModelVertex},
        scene_graph::{ContainerNode, MeshNode, SceneNode},
    },
    resources::{
        download::{LoadEvent, fetch_with_progress},
        mesh::compute_tangents,
        texture::load_binary,
    },
};

/**
 * This module contains all logic for loading meshes and textures from external files.
 */
pub mod download;
pub mod mesh;
pub mod texture;

/// Fetches and parses the model, reporting every step through `report`.
///
/// `report` receives the progress events of the download and then exactly one
/// `Loaded` or `Failed` event.
pub async fn load_model(file_name: &str, mut report: impl FnMut(LoadEvent) + Send) {
    let result = async {
        let bytes = fetch_with_progress(file_name, &mut report).await?;
        parse_model(&bytes, file_name).await
    }
    .await;
    match result {
        Ok(model) => report(LoadEvent::Loaded(model)),
        Err(e) => report(LoadEvent::Failed(e)),
    }
}

/// Parses a glTF/GLB document into a scene graph.
///
/// The nodes of the default scene (or the first scene) become children of one
/// container root. Materials of the file are reduced to their PBR factors and
/// double-sidedness; the viewer supplies its own textures.
pub async fn parse_model(bytes: &[u8], file_name: &str) -> anyhow::Result<Box<dyn SceneNode>> {
    let gltf = gltf::Gltf::from_reader(BufReader::new(Cursor::new(bytes)))
        .with_context(|| format!("{file_name} is not a valid glTF asset"))?;

    // Load buffers
    let mut buffer_data: Vec<Vec<u8>> = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .with_context(|| format!("{file_name} references a missing BIN chunk"))?;
                buffer_data.push(blob.into());
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(uri)
                    .await
                    .with_context(|| format!("failed to load buffer {uri}"))?;
                buffer_data.push(bin);
            }
        }
    }

    let mut root = ContainerNode::new(file_name);
    if let Some(scene) = gltf.default_scene().or_else(|| gltf.scenes().next()) {
        for node in scene.nodes() {
            root.add_child(to_scene_node(node, &buffer_data)?);
        }
    } else {
        log::warn!("{file_name} contains no scene");
    }

    Ok(Box::new(root))
}

fn to_scene_node(node: gltf::scene::Node, buf: &[Vec<u8>]) -> anyhow::Result<Box<dyn SceneNode>> {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()));

    let mut scene_node: Box<dyn SceneNode> = match node.mesh() {
        Some(mesh) => {
            let mut meshes = Vec::new();
            let mut material = None;
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    log::warn!(
                        "Skipping primitive {} of mesh {:?}: only triangle lists are supported",
                        primitive.index(),
                        mesh.name()
                    );
                    continue;
                }
                meshes.push(read_primitive(&primitive, buf, mesh.name().unwrap_or(&name))?);
                // One material per node; the viewer overwrites it anyway.
                material.get_or_insert_with(|| gltf_material(&primitive.material()));
            }
            Box::new(MeshNode::new(
                name,
                meshes,
                material.unwrap_or_default(),
            ))
        }
        None => Box::new(ContainerNode::new(name)),
    };
    scene_node.set_local_transform(Instance::from(node.transform()));
    for child in node.children() {
        scene_node.add_child(to_scene_node(child, buf)?);
    }

    Ok(scene_node)
}

fn read_primitive(
    primitive: &gltf::Primitive,
    buf: &[Vec<u8>],
    mesh_name: &str,
) -> anyhow::Result<Mesh> {
    let reader = primitive.reader(|buffer| buf.get(buffer.index()).map(Vec::as_slice));

    let mut vertices: Vec<ModelVertex> = reader
        .read_positions()
        .with_context(|| format!("mesh {mesh_name} has a primitive without positions"))?
        .map(|position| ModelVertex {
            position,
            ..Default::default()
        })
        .collect();

    if let Some(normals) = reader.read_normals() {
        vertices
            .iter_mut()
            .zip(normals)
            .for_each(|(vertex, normal)| vertex.normal = normal);
    }
    if let Some(tex_coords) = reader.read_tex_coords(0) {
        vertices
            .iter_mut()
            .zip(tex_coords.into_f32())
            .for_each(|(vertex, tex_coord)| vertex.tex_coords = tex_coord);
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    match reader.read_tangents() {
        Some(tangents) => {
            vertices
                .iter_mut()
                .zip(tangents)
                .for_each(|(vertex, tangent)| {
                    // GLTF represents tangents as vec4 where the 4th elem is the bitangent sign
                    let tangent: cgmath::Vector4<f32> = tangent.into();
                    let normal: cgmath::Vector3<f32> = vertex.normal.into();
                    vertex.tangent = tangent.truncate().into();
                    vertex.bitangent = (normal.cross(tangent.truncate()) * tangent.w).into();
                });
        }
        None => compute_tangents(&mut vertices, &indices),
    }

    Ok(Mesh::new(mesh_name, vertices, indices))
}

fn gltf_material(material: &gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    Material {
        metalness: pbr.metallic_factor(),
        roughness: pbr.roughness_factor(),
        side: if material.double_sided() {
            Side::Double
        } else {
            Side::Front
        },
        ..Default::default()
    }
}
