use std::f32::consts::PI;

use cgmath::{InnerSpace, Point3};
use model_viewer::{
    camera::{OrbitCamera, OrbitController, Projection},
    config::CameraConfig,
};

const EPS: f32 = 1e-4;

fn default_camera() -> (OrbitCamera, CameraConfig) {
    let config = CameraConfig::default();
    (OrbitCamera::new(config.position, config.target), config)
}

fn undamped() -> CameraConfig {
    CameraConfig {
        damping_factor: None,
        ..Default::default()
    }
}

#[test]
fn starts_at_the_configured_position() {
    let (camera, _) = default_camera();

    assert!((camera.radius - 10.0).abs() < EPS);
    assert!((camera.phi - PI / 2.0).abs() < EPS);
    let position = camera.position();
    assert!((position - Point3::new(0.0, 12.0, 10.0)).magnitude() < EPS);
}

#[test]
fn position_round_trips_through_spherical_coordinates() {
    let camera = OrbitCamera::new([3.0, 5.0, -4.0], [0.0, 1.0, 0.0]);
    let position = camera.position();
    assert!((position - Point3::new(3.0, 5.0, -4.0)).magnitude() < EPS);
}

#[test]
fn drag_across_the_viewport_height_is_a_full_turn() {
    let (mut camera, _) = default_camera();
    let config = undamped();
    let mut controller = OrbitController::new(&config, 800);
    let theta = camera.theta;

    controller.rotate(800.0, 0.0);
    controller.update(&mut camera);

    let turned = (camera.theta - theta).abs();
    assert!((turned - 2.0 * PI).abs() < EPS, "turned by {turned}");
}

#[test]
fn damping_applies_a_fraction_per_frame() {
    let (mut camera, config) = default_camera();
    let mut controller = OrbitController::new(&config, 800);
    let theta = camera.theta;

    // a quarter turn
    controller.rotate(-200.0, 0.0);
    controller.update(&mut camera);
    let first = camera.theta - theta;
    assert!((first - PI / 2.0 * 0.05).abs() < EPS);

    controller.update(&mut camera);
    let second = camera.theta - theta - first;
    assert!((second - PI / 2.0 * 0.05 * 0.95).abs() < EPS);

    // the camera keeps drifting towards the full quarter turn
    for _ in 0..1000 {
        controller.update(&mut camera);
    }
    assert!((camera.theta - theta - PI / 2.0).abs() < 1e-3);
}

#[test]
fn polar_angle_never_reaches_the_poles() {
    let (mut camera, _) = default_camera();
    let mut controller = OrbitController::new(&undamped(), 800);

    controller.rotate(0.0, 10_000.0);
    controller.update(&mut camera);
    assert!(camera.phi > 0.0);
    assert!(camera.phi < PI);

    controller.rotate(0.0, -10_000.0);
    controller.update(&mut camera);
    assert!(camera.phi > 0.0);
    assert!(camera.phi < PI);
}

#[test]
fn zoom_is_clamped_to_the_distance_range() {
    let (mut camera, config) = default_camera();
    let mut controller = OrbitController::new(&config, 800);

    controller.zoom(1.0);
    controller.update(&mut camera);
    assert!((camera.radius - 9.5).abs() < EPS);

    for _ in 0..100 {
        controller.zoom(5.0);
        controller.update(&mut camera);
    }
    assert!((camera.radius - config.min_distance).abs() < EPS);

    for _ in 0..100 {
        controller.zoom(-5.0);
        controller.update(&mut camera);
    }
    assert!((camera.radius - config.max_distance).abs() < EPS);
}

#[test]
fn target_stays_fixed() {
    let (mut camera, config) = default_camera();
    let mut controller = OrbitController::new(&config, 600);

    controller.rotate(123.0, -45.0);
    controller.zoom(2.0);
    for _ in 0..10 {
        controller.update(&mut camera);
    }
    assert_eq!(camera.target, Point3::new(0.0, 12.0, 0.0));
}

#[test]
fn resize_sets_the_aspect_ratio_exactly() {
    let mut projection = Projection::new(800, 600, cgmath::Deg(75.0), 0.1, 1000.0);
    assert_eq!(projection.aspect(), 800.0 / 600.0);

    projection.resize(1920, 1080);
    assert_eq!(projection.aspect(), 1920.0 / 1080.0);

    projection.resize(333, 777);
    assert_eq!(projection.aspect(), 333.0 / 777.0);
}

#[test]
fn viewport_height_scales_rotation() {
    let (mut short, _) = default_camera();
    let (mut tall, _) = default_camera();
    let mut short_controller = OrbitController::new(&undamped(), 400);
    let mut tall_controller = OrbitController::new(&undamped(), 400);
    tall_controller.set_viewport_height(800);

    short_controller.rotate(100.0, 0.0);
    tall_controller.rotate(100.0, 0.0);
    short_controller.update(&mut short);
    tall_controller.update(&mut tall);

    let start = default_camera().0.theta;
    assert!(((short.theta - start) - 2.0 * (tall.theta - start)).abs() < EPS);
}
