//! Camera types and uniforms for view/projection.
//!
//! The viewer treats the camera as a polymorphic collaborator: anything that
//! implements [`Camera`] can be driven by the view controller. Mouse
//! positions are forwarded raw; the camera is responsible for computing the
//! drag delta itself. [`OrbitingCamera`] is the stock implementation: it
//! orbits the origin with yaw/pitch angles and zooms with the scroll wheel.

use std::fmt::Debug;

use cgmath::{Deg, Matrix4, SquareMatrix};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Capability set the view controller drives.
///
/// `mouse_down`/`mouse_dragged`/`mouse_up` receive raw window coordinates;
/// `mouse_scrolled` receives the wheel delta in eighth-of-a-degree units.
pub trait Camera {
    /// Recompute the view and projection matrices from the current state.
    fn update_matrices(&mut self);

    fn set_aspect_ratio(&mut self, ratio: f32);

    /// A drag begins at (x, y).
    fn mouse_down(&mut self, x: f32, y: f32);

    /// The cursor moved to (x, y) while dragging.
    fn mouse_dragged(&mut self, x: f32, y: f32);

    /// The drag ended at (x, y).
    fn mouse_up(&mut self, x: f32, y: f32);

    /// The wheel scrolled by `delta`.
    fn mouse_scrolled(&mut self, delta: f32);

    fn view_matrix(&self) -> Matrix4<f32>;

    fn projection_matrix(&self) -> Matrix4<f32>;
}

impl Debug for dyn Camera + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Camera")
    }
}

/// Camera orbiting the scene origin.
///
/// Dragging adds the cursor delta to the yaw/pitch angles (in degrees, one
/// degree per pixel), pitch clamped so the camera never flips over the poles.
/// Scrolling moves the camera along its view axis with an exponential zoom
/// curve.
#[derive(Clone, Debug)]
pub struct OrbitingCamera {
    /// Rotation about the world y axis, in degrees.
    pub yaw: f32,
    /// Rotation about the camera x axis, in degrees. Clamped to [-90, 90].
    pub pitch: f32,
    /// Distance from the origin along the view axis.
    pub distance: f32,
    pub aspect_ratio: f32,
    pub fov_y: Deg<f32>,
    pub z_near: f32,
    pub z_far: f32,
    old_x: f32,
    old_y: f32,
    view: Matrix4<f32>,
    proj: Matrix4<f32>,
}

impl OrbitingCamera {
    pub fn new() -> Self {
        let mut camera = Self {
            yaw: 0.0,
            pitch: -30.0,
            distance: 5.0,
            aspect_ratio: 1.0,
            fov_y: Deg(45.0),
            z_near: 0.1,
            z_far: 500.0,
            old_x: 0.0,
            old_y: 0.0,
            view: Matrix4::identity(),
            proj: Matrix4::identity(),
        };
        camera.update_matrices();
        camera
    }
}

impl Default for OrbitingCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for OrbitingCamera {
    fn update_matrices(&mut self) {
        self.view = Matrix4::from_translation([0.0, 0.0, -self.distance].into())
            * Matrix4::from_angle_x(Deg(self.pitch))
            * Matrix4::from_angle_y(Deg(self.yaw));
        self.proj = cgmath::perspective(self.fov_y, self.aspect_ratio, self.z_near, self.z_far);
    }

    fn set_aspect_ratio(&mut self, ratio: f32) {
        self.aspect_ratio = ratio;
        self.update_matrices();
    }

    fn mouse_down(&mut self, x: f32, y: f32) {
        self.old_x = x;
        self.old_y = y;
    }

    fn mouse_dragged(&mut self, x: f32, y: f32) {
        self.yaw += x - self.old_x;
        self.pitch += y - self.old_y;
        self.old_x = x;
        self.old_y = y;

        self.pitch = self.pitch.clamp(-90.0, 90.0);
        self.update_matrices();
    }

    fn mouse_up(&mut self, _x: f32, _y: f32) {}

    fn mouse_scrolled(&mut self, delta: f32) {
        self.distance *= 0.999f32.powf(delta);
        self.update_matrices();
    }

    fn view_matrix(&self) -> Matrix4<f32> {
        self.view
    }

    fn projection_matrix(&self) -> Matrix4<f32> {
        self.proj
    }
}

/// CPU-side copy of the camera matrices in shader layout.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &dyn Camera) {
        self.view_proj =
            (OPENGL_TO_WGPU_MATRIX * camera.projection_matrix() * camera.view_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU-side camera bundle: uniform, buffer and bind group.
#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}
