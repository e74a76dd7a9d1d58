//! Viewer data structures: meshes, materials, textures, scene graphs, and instances.
//!
//! - `model` contains mesh geometry and its GPU buffers
//! - `material` contains materials, texture sets and the shared texture library
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `instance` holds per-node transformation data
//! - `scene_graph` enables hierarchical scene organization

pub mod instance;
pub mod material;
pub mod model;
pub mod scene_graph;
pub mod texture;
