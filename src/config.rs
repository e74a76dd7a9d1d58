//! Fixed viewer configuration.
//!
//! Every constant the viewer needs at startup lives in [`ViewerConfig`]. The
//! [`Default`] implementation reproduces the stock viewer: camera placement,
//! light rig, asset names, material parameters and the DOM ids of the host
//! page. There is no runtime configuration surface; build a different
//! `ViewerConfig` before calling [`crate::flow::run`] to change anything.

use instant::Duration;

/// Everything needed to bootstrap a viewer.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub clear_colour: wgpu::Color,
    pub camera: CameraConfig,
    pub lights: Vec<Light>,
    pub renderer: RendererConfig,
    pub assets: AssetConfig,
    pub material: MaterialParams,
    pub model_transform: ModelTransform,
    /// How long the progress bar stays visible after the model finished loading.
    pub progress_hide_delay: Duration,
    pub dom: DomIds,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let [r, g, b] = hex_to_linear(0xf7f7f7);
        Self {
            clear_colour: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            },
            camera: CameraConfig::default(),
            lights: vec![
                Light::Directional {
                    colour: 0xfffbee,
                    intensity: 0.4,
                    position: [20.0, 30.0, -20.0],
                },
                Light::Ambient {
                    colour: 0xffffff,
                    intensity: 0.3,
                },
                Light::Directional {
                    colour: 0xffffff,
                    intensity: 0.6,
                    position: [0.0, 12.0, 20.0],
                },
                Light::Hemisphere {
                    sky: 0xffffff,
                    ground: 0xaaaaaa,
                    intensity: 0.5,
                },
                Light::Directional {
                    colour: 0xffffff,
                    intensity: 0.4,
                    position: [0.0, 12.0, -20.0],
                },
            ],
            renderer: RendererConfig { antialias: true },
            assets: AssetConfig::default(),
            material: MaterialParams::default(),
            model_transform: ModelTransform::default(),
            progress_hide_delay: Duration::from_millis(500),
            dom: DomIds::default(),
        }
    }
}

/// Perspective camera and orbit-controller settings.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of the pending rotation applied per frame. `None` disables inertia.
    pub damping_factor: Option<f32>,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy_degrees: 75.0,
            znear: 0.1,
            zfar: 1000.0,
            position: [0.0, 12.0, 10.0],
            target: [0.0, 12.0, 0.0],
            min_distance: 3.0,
            max_distance: 15.0,
            damping_factor: Some(0.05),
            rotate_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

/// A light source. Colours are `0xRRGGBB` in sRGB.
#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    /// Parallel light shining from `position` towards the origin.
    Directional {
        colour: u32,
        intensity: f32,
        position: [f32; 3],
    },
    Ambient {
        colour: u32,
        intensity: f32,
    },
    /// Sky colour from above, ground colour from below, blended by the surface normal.
    Hemisphere {
        sky: u32,
        ground: u32,
        intensity: f32,
    },
}

#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Multisample the colour target (4x) when the surface format allows it.
    pub antialias: bool,
}

/// File names of the model and the two texture pairs, relative to the asset root.
#[derive(Clone, Debug)]
pub struct AssetConfig {
    pub model: String,
    pub texture_sets: [TexturePaths; 2],
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            model: "no map.glb".to_string(),
            texture_sets: [
                TexturePaths {
                    colour: "diffuse-1.jpg".to_string(),
                    normal: "normal-1.jpg".to_string(),
                },
                TexturePaths {
                    colour: "diffuse-2.jpg".to_string(),
                    normal: "normal-2.jpg".to_string(),
                },
            ],
        }
    }
}

#[derive(Clone, Debug)]
pub struct TexturePaths {
    pub colour: String,
    pub normal: String,
}

/// Shading parameters shared by every material the viewer builds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialParams {
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            metalness: 0.1,
            roughness: 0.5,
        }
    }
}

/// Transform applied to the model root once it is attached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelTransform {
    pub position: [f32; 3],
    pub scale: f32,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            scale: 10.0,
        }
    }
}

/// Ids of the elements the host page must provide.
#[derive(Clone, Debug)]
pub struct DomIds {
    pub container: String,
    pub progress_bar: String,
    pub progress_text: String,
    pub progress_container: String,
    pub settings_button: String,
    pub control_panel: String,
    pub texture_buttons: [String; 2],
}

impl Default for DomIds {
    fn default() -> Self {
        Self {
            container: "container".to_string(),
            progress_bar: "loading-bar".to_string(),
            progress_text: "loading-text".to_string(),
            progress_container: "loading-bar-container".to_string(),
            settings_button: "settings-btn".to_string(),
            control_panel: "control-panel".to_string(),
            texture_buttons: ["texture-1".to_string(), "texture-2".to_string()],
        }
    }
}

/// Converts a `0xRRGGBB` sRGB colour into linear RGB components.
///
/// The surface is an sRGB format, so everything handed to the GPU as a colour
/// (clear colour, light colours) has to be linear.
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
