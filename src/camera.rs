//! Free-flying camera, projection and the input controller that drives them.
//!
//! The [`Camera`] keeps yaw and pitch in degrees and derives its orthonormal
//! basis (front, right, up) from them after every rotation. Movement is
//! expressed as discrete intents ([`PanMovement`], `rotate`, `zoom`) so the
//! same camera can be driven by keyboard and mouse through
//! [`CameraController`] or scripted directly.

use std::time::Duration;

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseScrollDelta},
    keyboard::KeyCode,
};

use crate::shader::ShaderProgram;

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_PANNING_SPEED: f32 = 2.5;
pub const DEFAULT_ROTATIONAL_SPEED: f32 = 0.1;
pub const DEFAULT_ZOOM: f32 = 45.0;

/// Smallest field of view in degrees.
pub const MIN_ZOOM: f32 = 1.0;
/// Largest field of view in degrees.
pub const MAX_ZOOM: f32 = 45.0;
/// Pitch is kept strictly away from ±90° so `front × world_up` never vanishes.
pub const PITCH_LIMIT: f32 = 89.0;

/// wgpu's clip space has z in [0, 1] while `cgmath::perspective` targets OpenGL's [-1, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanMovement {
    Forward,
    Back,
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    /// Units per second.
    pub panning_speed: f32,
    /// Degrees per unit of input delta.
    pub rotational_speed: f32,
    front: Vector3<f32>,
    up: Vector3<f32>,
    right: Vector3<f32>,
    world_up: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    zoom: f32,
}

impl Camera {
    /// Camera at `position` using +Y as world up.
    pub fn new<V: Into<Point3<f32>>, Y: Into<cgmath::Deg<f32>>, P: Into<cgmath::Deg<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self::with_world_up(position, Vector3::unit_y(), yaw, pitch)
    }

    pub fn with_world_up<V: Into<Point3<f32>>, Y: Into<cgmath::Deg<f32>>, P: Into<cgmath::Deg<f32>>>(
        position: V,
        world_up: Vector3<f32>,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            panning_speed: DEFAULT_PANNING_SPEED,
            rotational_speed: DEFAULT_ROTATIONAL_SPEED,
            front: -Vector3::unit_z(),
            up: world_up,
            right: Vector3::unit_x(),
            world_up,
            yaw: yaw.into().0,
            pitch: pitch.into().0.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            zoom: DEFAULT_ZOOM,
        };
        camera.update_vectors();
        camera
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn world_up(&self) -> Vector3<f32> {
        self.world_up
    }

    /// Yaw in degrees. Unbounded; the trigonometry wraps it.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees, always within `[-PITCH_LIMIT, PITCH_LIMIT]`.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees, always within `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn fov(&self) -> f32 {
        self.zoom
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Moves along ±front or ±right by `panning_speed * elapsed`.
    pub fn pan(&mut self, direction: PanMovement, elapsed: Duration) {
        let delta = self.panning_speed * elapsed.as_secs_f32();
        match direction {
            PanMovement::Forward => self.position += self.front * delta,
            PanMovement::Back => self.position -= self.front * delta,
            PanMovement::Right => self.position += self.right * delta,
            PanMovement::Left => self.position -= self.right * delta,
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.rotational_speed;
        self.pitch = (self.pitch + dy * self.rotational_speed).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    pub fn zoom(&mut self, delta: f32) {
        self.zoom = (self.zoom - delta).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Writes `view`, `projection` and `viewPos` into `shader`.
    pub fn apply(&self, shader: &mut dyn ShaderProgram, projection: &Projection) {
        shader.set_mat4("view", self.view_matrix());
        shader.set_mat4("projection", projection.calc_matrix(cgmath::Deg(self.zoom)));
        shader.set_vec3("viewPos", self.position.to_vec());
    }

    fn update_vectors(&mut self) {
        let (sin_yaw, cos_yaw) = Rad::from(cgmath::Deg(self.yaw)).0.sin_cos();
        let (sin_pitch, cos_pitch) = Rad::from(cgmath::Deg(self.pitch)).0.sin_cos();
        self.front = Vector3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new((0.0, 0.0, 3.0), cgmath::Deg(DEFAULT_YAW), cgmath::Deg(DEFAULT_PITCH))
    }
}

/// Perspective parameters that don't depend on the camera pose.
#[derive(Clone, Debug)]
pub struct Projection {
    aspect: f32,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix<F: Into<Rad<f32>>>(&self, fovy: F) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Camera data in the layout a WGSL uniform block expects.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj =
            (projection.calc_matrix(cgmath::Deg(camera.fov())) * camera.view_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects keyboard, mouse and scroll input between frames and turns it into camera intents.
///
/// W/A/S/D pan, left shift doubles the panning speed while held, mouse motion
/// rotates and the wheel zooms.
#[derive(Debug)]
pub struct CameraController {
    speed: f32,
    sensitivity: f32,
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
    boost: bool,
    rotate_horizontal: f32,
    rotate_vertical: f32,
    scroll: f32,
}

impl CameraController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            speed,
            sensitivity,
            forward: false,
            back: false,
            left: false,
            right: false,
            boost: false,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            scroll: 0.0,
        }
    }

    /// Returns whether the key was consumed.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => self.forward = pressed,
            KeyCode::KeyS | KeyCode::ArrowDown => self.back = pressed,
            KeyCode::KeyA | KeyCode::ArrowLeft => self.left = pressed,
            KeyCode::KeyD | KeyCode::ArrowRight => self.right = pressed,
            KeyCode::ShiftLeft => self.boost = pressed,
            _ => return false,
        }
        true
    }

    pub fn process_mouse(&mut self, dx: f64, dy: f64) {
        self.rotate_horizontal += dx as f32;
        self.rotate_vertical += dy as f32;
    }

    pub fn process_scroll(&mut self, delta: &MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, scroll) => *scroll,
            MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => *scroll as f32,
        };
    }

    pub fn update_camera(&mut self, camera: &mut Camera, dt: Duration) {
        camera.panning_speed = if self.boost { self.speed * 2.0 } else { self.speed };
        camera.rotational_speed = self.sensitivity;

        let intents = [
            (self.forward, PanMovement::Forward),
            (self.back, PanMovement::Back),
            (self.right, PanMovement::Right),
            (self.left, PanMovement::Left),
        ];
        for (_, direction) in intents.into_iter().filter(|(active, _)| *active) {
            camera.pan(direction, dt);
        }

        if self.rotate_horizontal != 0.0 || self.rotate_vertical != 0.0 {
            // screen y grows downwards, pitch grows upwards
            camera.rotate(self.rotate_horizontal, -self.rotate_vertical);
            self.rotate_horizontal = 0.0;
            self.rotate_vertical = 0.0;
        }

        if self.scroll != 0.0 {
            camera.zoom(self.scroll);
            self.scroll = 0.0;
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(DEFAULT_PANNING_SPEED, DEFAULT_ROTATIONAL_SPEED)
    }
}
