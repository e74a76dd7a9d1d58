#![allow(dead_code)]

use model_viewer::{
    data_structures::scene_graph::{SceneNode, traverse},
    hud::{Hud, PanelState},
};

/// Everything a [`Hud`] was asked to show, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum HudCall {
    Progress(u32, String),
    Status(String),
    HideProgress,
    Panel { open: bool, icon: String },
}

/// A HUD that records calls instead of drawing them.
#[derive(Debug, Default)]
pub struct RecordingHud {
    pub calls: Vec<HudCall>,
}

impl RecordingHud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HudCall::Progress(percent, _) => Some(*percent),
                _ => None,
            })
            .collect()
    }

    /// The label as the user would currently read it.
    pub fn last_text(&self) -> Option<&str> {
        self.calls.iter().rev().find_map(|call| match call {
            HudCall::Progress(_, label) | HudCall::Status(label) => Some(label.as_str()),
            _ => None,
        })
    }

    pub fn hidden(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| **call == HudCall::HideProgress)
            .count()
    }
}

impl Hud for RecordingHud {
    fn set_progress(&mut self, percent: u32, label: &str) {
        self.calls.push(HudCall::Progress(percent, label.to_string()));
    }

    fn set_status(&mut self, text: &str) {
        self.calls.push(HudCall::Status(text.to_string()));
    }

    fn hide_progress(&mut self) {
        self.calls.push(HudCall::HideProgress);
    }

    fn set_panel(&mut self, panel: &PanelState) {
        self.calls.push(HudCall::Panel {
            open: panel.is_open(),
            icon: panel.icon().to_string(),
        });
    }
}

/// Names of all nodes, depth-first.
pub fn node_names(root: &dyn SceneNode) -> Vec<String> {
    let mut names = Vec::new();
    traverse(root, &mut |n: &dyn SceneNode| names.push(n.name().to_string()));
    names
}

/// Materials of all mesh nodes, depth-first.
pub fn mesh_materials(root: &dyn SceneNode) -> Vec<model_viewer::data_structures::material::Material> {
    let mut materials = Vec::new();
    traverse(root, &mut |n: &dyn SceneNode| {
        if let Some(material) = n.material() {
            materials.push(material.clone());
        }
    });
    materials
}

/// A GLB with one textured triangle used by three nodes:
///
/// ```text
/// root
/// ├── left (mesh, translated -1 on x)
/// │   └── nested (mesh, scaled by 2)
/// └── right (mesh, translated +1 on x, double-sided material)
/// ```
///
/// The primitive has positions, normals, UVs and indices but no tangents.
pub fn triangle_glb() -> Vec<u8> {
    let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    let normals: [[f32; 3]; 3] = [[0.0, 0.0, 1.0]; 3];
    let uvs: [[f32; 2]; 3] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
    let indices: [u16; 3] = [0, 1, 2];

    let mut bin: Vec<u8> = Vec::new();
    positions.iter().flatten().for_each(|f| bin.extend(f.to_le_bytes()));
    normals.iter().flatten().for_each(|f| bin.extend(f.to_le_bytes()));
    uvs.iter().flatten().for_each(|f| bin.extend(f.to_le_bytes()));
    indices.iter().for_each(|i| bin.extend(i.to_le_bytes()));
    let indices_len = bin.len() - 96;
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let json = format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [
    {{ "name": "root", "children": [1, 2] }},
    {{ "name": "left", "mesh": 0, "translation": [-1.0, 0.0, 0.0], "children": [3] }},
    {{ "name": "right", "mesh": 1, "translation": [1.0, 0.0, 0.0] }},
    {{ "name": "nested", "mesh": 0, "scale": [2.0, 2.0, 2.0] }}
  ],
  "materials": [
    {{ "name": "single", "pbrMetallicRoughness": {{ "metallicFactor": 0.0, "roughnessFactor": 0.8 }} }},
    {{ "name": "double", "doubleSided": true }}
  ],
  "meshes": [
    {{ "name": "triangle", "primitives": [{{ "attributes": {{ "POSITION": 0, "NORMAL": 1, "TEXCOORD_0": 2 }}, "indices": 3, "material": 0 }}] }},
    {{ "name": "triangle_double", "primitives": [{{ "attributes": {{ "POSITION": 0, "NORMAL": 1, "TEXCOORD_0": 2 }}, "indices": 3, "material": 1 }}] }}
  ],
  "buffers": [{{ "byteLength": {bin_len} }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 72, "byteLength": 24 }},
    {{ "buffer": 0, "byteOffset": 96, "byteLength": {indices_len} }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3" }},
    {{ "bufferView": 2, "componentType": 5126, "count": 3, "type": "VEC2" }},
    {{ "bufferView": 3, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ]
}}"#,
        bin_len = bin.len(),
    );

    glb(json.as_bytes(), &bin)
}

/// A GLB whose only scene has no nodes.
pub fn empty_scene_glb() -> Vec<u8> {
    let json = r#"{ "asset": { "version": "2.0" }, "scene": 0, "scenes": [{ "nodes": [] }] }"#;
    glb(json.as_bytes(), &[])
}

/// Wraps a JSON document and an optional BIN chunk into the binary container.
pub fn glb(json: &[u8], bin: &[u8]) -> Vec<u8> {
    let mut json = json.to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let mut bin = bin.to_vec();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let bin_chunk_len = if bin.is_empty() { 0 } else { 8 + bin.len() };
    let total = 12 + 8 + json.len() + bin_chunk_len;

    let mut out = Vec::with_capacity(total);
    out.extend(b"glTF");
    out.extend(2u32.to_le_bytes());
    out.extend((total as u32).to_le_bytes());

    out.extend((json.len() as u32).to_le_bytes());
    out.extend(b"JSON");
    out.extend(&json);

    if !bin.is_empty() {
        out.extend((bin.len() as u32).to_le_bytes());
        out.extend(b"BIN\0");
        out.extend(&bin);
    }
    out
}

/// Blocks on a future with a fresh tokio runtime.
pub fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Runtime::new()
        .expect("failed to create a tokio runtime")
        .block_on(fut)
}
