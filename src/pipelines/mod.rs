//! Render pipeline definitions.
//!
//! - `basic` builds the PBR model pipeline, once with back-face culling and
//!   once double-sided
//! - `light` packs the light rig into a uniform block

pub mod basic;
pub mod light;
