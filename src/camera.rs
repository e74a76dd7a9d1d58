//! Orbit camera, projection and the input controller driving them.
//!
//! The camera is stored in spherical coordinates around a fixed target point.
//! [`OrbitController`] turns pointer drags and wheel steps into pending
//! rotation/zoom and applies them once per frame in [`OrbitController::update`],
//! optionally with damping so the camera keeps drifting after the drag ends.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use crate::config::CameraConfig;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

// Keeps the camera from flipping over the poles.
const POLAR_EPSILON: f32 = 0.000001;

/// A camera looking at `target` from a point on a sphere around it.
///
/// `theta` is the azimuth around the y axis (0 looks down -z from +z) and
/// `phi` the polar angle measured from +y.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    pub target: Point3<f32>,
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
}

impl OrbitCamera {
    pub fn new<P: Into<Point3<f32>>, T: Into<Point3<f32>>>(position: P, target: T) -> Self {
        let position = position.into();
        let target = target.into();
        let offset = position - target;
        let radius = offset.magnitude();
        let (theta, phi) = if radius == 0.0 {
            (0.0, PI / 2.0)
        } else {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        };
        Self {
            target,
            radius,
            theta,
            phi,
        }
    }

    pub fn position(&self) -> Point3<f32> {
        let sin_phi = self.phi.sin();
        self.target
            + Vector3::new(
                self.radius * sin_phi * self.theta.sin(),
                self.radius * self.phi.cos(),
                self.radius * sin_phi * self.theta.cos(),
            )
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.target, Vector3::unit_y())
    }
}

/// Perspective projection; the aspect ratio follows the output size.
#[derive(Clone, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Turns pointer input into orbit rotation and zoom.
///
/// Left drag rotates, the wheel zooms. A full drag across the viewport height
/// rotates by one full turn.
#[derive(Clone, Debug)]
pub struct OrbitController {
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    dragging: bool,
    cursor: Option<PhysicalPosition<f64>>,
    viewport_height: f32,
    min_distance: f32,
    max_distance: f32,
    damping_factor: Option<f32>,
    rotate_speed: f32,
    zoom_speed: f32,
}

impl OrbitController {
    pub fn new(config: &CameraConfig, viewport_height: u32) -> Self {
        Self {
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            dragging: false,
            cursor: None,
            viewport_height: viewport_height.max(1) as f32,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
        }
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    /// Feeds a window event to the controller. Returns `true` if it was consumed.
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.dragging {
                    if let Some(last) = self.cursor {
                        self.rotate(position.x - last.x, position.y - last.y);
                    }
                }
                self.cursor = Some(*position);
                self.dragging
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.dragging = false;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32 / 100.0,
                };
                self.zoom(steps);
                true
            }
            _ => false,
        }
    }

    /// Queues a rotation for a pointer movement of `dx`/`dy` pixels.
    pub fn rotate(&mut self, dx: f64, dy: f64) {
        let per_pixel = 2.0 * PI * self.rotate_speed / self.viewport_height;
        self.delta_theta -= dx as f32 * per_pixel;
        self.delta_phi -= dy as f32 * per_pixel;
    }

    /// Queues a zoom. Positive steps move the camera closer to the target.
    pub fn zoom(&mut self, steps: f32) {
        self.scale *= 0.95f32.powf(self.zoom_speed * steps);
    }

    /// Applies the queued input to `camera`. Call once per frame.
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        match self.damping_factor {
            Some(damping) => {
                camera.theta += self.delta_theta * damping;
                camera.phi += self.delta_phi * damping;
            }
            None => {
                camera.theta += self.delta_theta;
                camera.phi += self.delta_phi;
            }
        }
        camera.phi = camera.phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        camera.radius = (camera.radius * self.scale).clamp(self.min_distance, self.max_distance);

        match self.damping_factor {
            Some(damping) => {
                self.delta_theta *= 1.0 - damping;
                self.delta_phi *= 1.0 - damping;
            }
            None => {
                self.delta_theta = 0.0;
                self.delta_phi = 0.0;
            }
        }
        self.scale = 1.0;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: cgmath::Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &OrbitCamera, projection: &Projection) {
        self.view_position = camera.position().to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// The camera together with the GPU objects that feed it to the shaders.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: OrbitCamera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}
