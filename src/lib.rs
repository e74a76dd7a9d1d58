//! model-viewer
//!
//! A single-page glTF model viewer for the browser (WASM + WebGL2) and the
//! desktop. It streams one model while showing a progress bar, lets the user
//! orbit the camera around it and swaps between two texture sets.
//!
//! High-level modules
//! - `camera`: orbit camera, projection and the controller driving them
//! - `config`: every constant the viewer starts from
//! - `context`: GPU and window context that owns device/queue/pipelines
//! - `data_structures`: scene graph, meshes, instances, materials, textures
//! - `flow`: the winit event loop
//! - `hud`: progress bar, status text and settings panel (DOM or native)
//! - `pipelines`: the model render pipeline and the light rig uniform
//! - `resources`: model download with progress, glTF parsing, texture loading
//! - `render`: draws the scene graph into the surface
//! - `viewer`: load status, material swaps and UI state, without a GPU
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod hud;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod viewer;

pub use config::ViewerConfig;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Entry point of the WASM module.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    flow::run(ViewerConfig::default()).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
