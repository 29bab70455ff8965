use std::sync::{Arc, Mutex};

use view_ngin::camera::Camera;
use view_ngin::context::InitContext;
use view_ngin::render::Render;
use view_ngin::scene::{Scene, SceneParser};
use view_ngin::{Matrix4, SquareMatrix};

/// Everything a [`RecordingCamera`] saw, shared with the test body.
#[derive(Default)]
pub struct CameraLog {
    pub downs: Vec<(f32, f32)>,
    pub drags: Vec<(f32, f32)>,
    pub ups: Vec<(f32, f32)>,
    pub scrolls: Vec<f32>,
    pub aspect_ratios: Vec<f32>,
    pub update_matrices_calls: u32,
}

/// Camera double that records every call it receives.
pub struct RecordingCamera {
    log: Arc<Mutex<CameraLog>>,
}

impl RecordingCamera {
    pub fn new() -> (Self, Arc<Mutex<CameraLog>>) {
        let log = Arc::new(Mutex::new(CameraLog::default()));
        (Self { log: log.clone() }, log)
    }
}

impl Camera for RecordingCamera {
    fn update_matrices(&mut self) {
        self.log.lock().unwrap().update_matrices_calls += 1;
    }

    fn set_aspect_ratio(&mut self, ratio: f32) {
        self.log.lock().unwrap().aspect_ratios.push(ratio);
    }

    fn mouse_down(&mut self, x: f32, y: f32) {
        self.log.lock().unwrap().downs.push((x, y));
    }

    fn mouse_dragged(&mut self, x: f32, y: f32) {
        self.log.lock().unwrap().drags.push((x, y));
    }

    fn mouse_up(&mut self, x: f32, y: f32) {
        self.log.lock().unwrap().ups.push((x, y));
    }

    fn mouse_scrolled(&mut self, delta: f32) {
        self.log.lock().unwrap().scrolls.push(delta);
    }

    fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::identity()
    }

    fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::identity()
    }
}

/// Everything a [`RecordingScene`] saw, shared with the test body.
#[derive(Default)]
pub struct SceneLog {
    pub settings_changes: u32,
    pub renders: u32,
}

/// Scene double that records every call it receives and draws nothing.
pub struct RecordingScene {
    log: Arc<Mutex<SceneLog>>,
}

impl RecordingScene {
    pub fn new() -> (Self, Arc<Mutex<SceneLog>>) {
        let log = Arc::new(Mutex::new(SceneLog::default()));
        (Self { log: log.clone() }, log)
    }
}

impl Scene for RecordingScene {
    fn load_scene(&mut self, _gpu: &InitContext, _parser: &dyn SceneParser) -> anyhow::Result<()> {
        Ok(())
    }

    fn settings_changed(&mut self) {
        self.log.lock().unwrap().settings_changes += 1;
    }

    fn render<'a, 'pass>(&'a self) -> Render<'a, 'pass> {
        self.log.lock().unwrap().renders += 1;
        Render::None
    }
}
