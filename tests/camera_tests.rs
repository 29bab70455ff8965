use view_ngin::camera::{Camera, OrbitingCamera};

#[test]
fn drag_accumulates_yaw_and_pitch_from_deltas() {
    let mut camera = OrbitingCamera::new();
    let (yaw, pitch) = (camera.yaw, camera.pitch);

    camera.mouse_down(10.0, 10.0);
    camera.mouse_dragged(20.0, 15.0);
    assert_eq!(camera.yaw, yaw + 10.0);
    assert_eq!(camera.pitch, pitch + 5.0);

    camera.mouse_dragged(25.0, 15.0);
    assert_eq!(camera.yaw, yaw + 15.0);
    assert_eq!(camera.pitch, pitch + 5.0);
}

#[test]
fn a_new_drag_does_not_jump() {
    let mut camera = OrbitingCamera::new();
    let yaw = camera.yaw;

    camera.mouse_down(0.0, 0.0);
    camera.mouse_dragged(10.0, 0.0);
    camera.mouse_up(10.0, 0.0);

    // Pressing far away must not apply the gap as a delta.
    camera.mouse_down(500.0, 500.0);
    camera.mouse_dragged(505.0, 500.0);
    assert_eq!(camera.yaw, yaw + 15.0);
}

#[test]
fn pitch_clamps_at_the_poles() {
    let mut camera = OrbitingCamera::new();

    camera.mouse_down(0.0, 0.0);
    camera.mouse_dragged(0.0, 500.0);
    assert_eq!(camera.pitch, 90.0);

    camera.mouse_dragged(0.0, -1000.0);
    assert_eq!(camera.pitch, -90.0);
}

#[test]
fn wheel_zoom_follows_the_exponential_curve() {
    let mut camera = OrbitingCamera::new();
    let distance = camera.distance;

    camera.mouse_scrolled(120.0);
    let expected = distance * 0.999f32.powf(120.0);
    assert!((camera.distance - expected).abs() < 1e-4);
    assert!(camera.distance < distance);
}

#[test]
fn zoom_in_and_out_roundtrips() {
    let mut camera = OrbitingCamera::new();
    let distance = camera.distance;

    camera.mouse_scrolled(120.0);
    camera.mouse_scrolled(-120.0);
    assert!((camera.distance - distance).abs() < 1e-4);
}

#[test]
fn mouse_up_leaves_the_orbit_untouched() {
    let mut camera = OrbitingCamera::new();
    let (yaw, pitch, distance) = (camera.yaw, camera.pitch, camera.distance);

    camera.mouse_up(99.0, 99.0);
    assert_eq!(camera.yaw, yaw);
    assert_eq!(camera.pitch, pitch);
    assert_eq!(camera.distance, distance);
}

#[test]
fn aspect_ratio_scales_the_projection() {
    let mut camera = OrbitingCamera::new();
    camera.set_aspect_ratio(1.0);
    let narrow = camera.projection_matrix();

    camera.set_aspect_ratio(2.0);
    let wide = camera.projection_matrix();
    assert!((wide[0][0] - narrow[0][0] / 2.0).abs() < 1e-6);
    assert_eq!(wide[1][1], narrow[1][1]);
}

#[test]
fn matrices_stay_finite_after_wild_input() {
    let mut camera = OrbitingCamera::new();
    camera.mouse_down(0.0, 0.0);
    camera.mouse_dragged(1.0e6, -1.0e6);
    camera.mouse_scrolled(4000.0);
    camera.mouse_scrolled(-4000.0);

    let view: [[f32; 4]; 4] = camera.view_matrix().into();
    let proj: [[f32; 4]; 4] = camera.projection_matrix().into();
    for matrix in [view, proj] {
        for column in matrix {
            for value in column {
                assert!(value.is_finite());
            }
        }
    }
}

#[test]
fn drag_moves_the_view_matrix() {
    let mut camera = OrbitingCamera::new();
    let before: [[f32; 4]; 4] = camera.view_matrix().into();

    camera.mouse_down(0.0, 0.0);
    camera.mouse_dragged(45.0, 0.0);
    let after: [[f32; 4]; 4] = camera.view_matrix().into();
    assert_ne!(before, after);
}
