use std::sync::Arc;

use view_ngin::MouseButton;
use view_ngin::view::{View, scaled_viewport};

use crate::common::test_utils::{RecordingCamera, RecordingScene};
mod common;

#[test]
fn right_press_sets_capture_flag() {
    let (camera, _log) = RecordingCamera::new();
    let mut view = View::with_camera(Box::new(camera));

    assert!(!view.captures_mouse());
    view.mouse_pressed(MouseButton::Right, 10.0, 20.0);
    assert!(view.captures_mouse());
}

#[test]
fn right_press_forwards_position_to_camera() {
    let (camera, log) = RecordingCamera::new();
    let mut view = View::with_camera(Box::new(camera));

    view.mouse_pressed(MouseButton::Right, 10.0, 20.0);
    assert_eq!(log.lock().unwrap().downs, vec![(10.0, 20.0)]);
}

#[test]
fn other_buttons_do_not_capture() {
    let (camera, log) = RecordingCamera::new();
    let mut view = View::with_camera(Box::new(camera));

    view.mouse_pressed(MouseButton::Left, 10.0, 20.0);
    view.mouse_pressed(MouseButton::Middle, 10.0, 20.0);
    assert!(!view.captures_mouse());
    assert!(log.lock().unwrap().downs.is_empty());
}

#[test]
fn matching_release_clears_capture_flag() {
    let (camera, log) = RecordingCamera::new();
    let mut view = View::with_camera(Box::new(camera));

    view.mouse_pressed(MouseButton::Right, 10.0, 20.0);
    view.mouse_released(MouseButton::Right, 12.0, 22.0);
    assert!(!view.captures_mouse());
    assert_eq!(log.lock().unwrap().ups, vec![(12.0, 22.0)]);
}

#[test]
fn release_without_capture_is_ignored() {
    let (camera, log) = RecordingCamera::new();
    let mut view = View::with_camera(Box::new(camera));

    view.mouse_released(MouseButton::Right, 12.0, 22.0);
    assert!(log.lock().unwrap().ups.is_empty());
}

#[test]
fn other_button_release_keeps_the_drag_alive() {
    let (camera, _log) = RecordingCamera::new();
    let mut view = View::with_camera(Box::new(camera));

    view.mouse_pressed(MouseButton::Right, 10.0, 20.0);
    view.mouse_released(MouseButton::Left, 12.0, 22.0);
    assert!(view.captures_mouse());
}

#[test]
fn moves_without_capture_reach_no_camera() {
    let (camera, log) = RecordingCamera::new();
    let mut view = View::with_camera(Box::new(camera));

    view.mouse_moved(50.0, 60.0);
    view.mouse_moved(51.0, 61.0);
    assert!(log.lock().unwrap().drags.is_empty());
}

#[test]
fn moves_while_captured_forward_raw_positions() {
    let (camera, log) = RecordingCamera::new();
    let mut view = View::with_camera(Box::new(camera));

    view.mouse_pressed(MouseButton::Right, 10.0, 20.0);
    view.mouse_moved(15.0, 25.0);
    view.mouse_moved(16.0, 26.0);
    assert_eq!(
        log.lock().unwrap().drags,
        vec![(15.0, 25.0), (16.0, 26.0)]
    );
}

#[test]
fn moves_after_release_reach_no_camera() {
    let (camera, log) = RecordingCamera::new();
    let mut view = View::with_camera(Box::new(camera));

    view.mouse_pressed(MouseButton::Right, 10.0, 20.0);
    view.mouse_moved(15.0, 25.0);
    view.mouse_released(MouseButton::Right, 15.0, 25.0);
    view.mouse_moved(30.0, 30.0);
    assert_eq!(log.lock().unwrap().drags, vec![(15.0, 25.0)]);
}

#[test]
fn wheel_reaches_camera_unconditionally() {
    let (camera, log) = RecordingCamera::new();
    let mut view = View::with_camera(Box::new(camera));

    view.wheel(120.0);
    view.mouse_pressed(MouseButton::Right, 0.0, 0.0);
    view.wheel(-60.0);
    assert_eq!(log.lock().unwrap().scrolls, vec![120.0, -60.0]);
}

#[test]
fn render_with_no_scene_draws_nothing() {
    let view = View::new();
    assert!(view.render().is_none());
}

#[test]
fn render_delegates_to_the_loaded_scene() {
    let (scene, log) = RecordingScene::new();
    let mut view = View::new();

    view.install_scene(Box::new(scene));
    let _ = view.render();
    let _ = view.render();
    assert_eq!(log.lock().unwrap().renders, 2);
}

#[test]
fn install_scene_replaces_the_old_scene_entirely() {
    let (first, first_log) = RecordingScene::new();
    let (second, second_log) = RecordingScene::new();
    let mut view = View::new();

    view.install_scene(Box::new(first));
    view.settings_changed();
    assert_eq!(first_log.lock().unwrap().settings_changes, 1);

    view.install_scene(Box::new(second));
    view.settings_changed();
    let _ = view.render();

    let first_log = first_log.lock().unwrap();
    assert_eq!(first_log.settings_changes, 1);
    assert_eq!(first_log.renders, 0);
    let second_log_guard = second_log.lock().unwrap();
    assert_eq!(second_log_guard.settings_changes, 1);
    assert_eq!(second_log_guard.renders, 1);
}

#[test]
fn replaced_scene_is_dropped() {
    let (first, first_log) = RecordingScene::new();
    let (second, _second_log) = RecordingScene::new();
    let mut view = View::new();

    view.install_scene(Box::new(first));
    assert_eq!(Arc::strong_count(&first_log), 2);
    view.install_scene(Box::new(second));
    assert_eq!(Arc::strong_count(&first_log), 1);
}

#[test]
fn resize_sets_camera_aspect_to_the_pixel_ratio() {
    let (camera, log) = RecordingCamera::new();
    let mut view = View::with_camera(Box::new(camera));

    let viewport = view.resize(1600, 900, 2.0);
    assert_eq!(log.lock().unwrap().aspect_ratios, vec![2.0]);
    assert_eq!(viewport, [800, 450]);
}

#[test]
fn viewport_scaling_truncates_toward_zero() {
    assert_eq!(scaled_viewport(1605, 903, 2.0), [802, 451]);
    assert_eq!(scaled_viewport(100, 100, 3.0), [33, 33]);
    assert_eq!(scaled_viewport(800, 600, 1.0), [800, 600]);
    assert_eq!(scaled_viewport(1920, 1080, 1.5), [1280, 720]);
}

#[test]
fn settings_changed_reaches_the_scene_and_marks_dirty() {
    let (scene, log) = RecordingScene::new();
    let mut view = View::new();
    view.install_scene(Box::new(scene));
    let _ = view.take_dirty();

    view.settings_changed();
    assert_eq!(log.lock().unwrap().settings_changes, 1);
    assert!(view.take_dirty());
}

#[test]
fn settings_changed_without_scene_only_marks_dirty() {
    let mut view = View::new();
    let _ = view.take_dirty();

    view.settings_changed();
    assert!(view.take_dirty());
}

#[test]
fn tick_marks_the_view_dirty() {
    let mut view = View::new();
    let _ = view.take_dirty();

    view.tick();
    assert!(view.take_dirty());
    assert!(!view.take_dirty());
}

#[test]
fn initialize_updates_the_camera_matrices() {
    let (camera, log) = RecordingCamera::new();
    let mut view = View::with_camera(Box::new(camera));

    view.initialize();
    assert_eq!(log.lock().unwrap().update_matrices_calls, 1);
}
