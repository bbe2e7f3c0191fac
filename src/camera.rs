use glam::{Mat4, Vec3};
use sdl2::keyboard::Scancode;

use crate::config::RenderConfig;
use crate::engine::input::InputState;

/// Where the camera is and where it looks. Feeds the flashlight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub direction: Vec3,
}

/// Per-frame camera matrices consumed by the color pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub view: Mat4,
    pub projection: Mat4,
    pub eye_position: Vec3,
}

pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            yaw: -90.0_f32,
            pitch: 0.0,
            speed: 5.0,
            sensitivity: 0.1,
            fov: config.fov_degrees,
            near: config.near,
            far: config.far,
        }
    }

    pub fn look(&mut self, mouse_dx: f32, mouse_dy: f32) {
        self.yaw += mouse_dx * self.sensitivity;
        self.pitch -= mouse_dy * self.sensitivity;
        self.pitch = self.pitch.clamp(-89.0, 89.0);
    }

    pub fn move_wasd(&mut self, input: &InputState, dt: f32) {
        let front = self.front();
        let right = front.cross(Vec3::Y).normalize();
        let velocity = self.speed * dt;

        if input.is_key_held(Scancode::W) {
            self.position += front * velocity;
        }
        if input.is_key_held(Scancode::S) {
            self.position -= front * velocity;
        }
        if input.is_key_held(Scancode::A) {
            self.position -= right * velocity;
        }
        if input.is_key_held(Scancode::D) {
            self.position += right * velocity;
        }
        if input.is_key_held(Scancode::Space) {
            self.position += Vec3::Y * velocity;
        }
        if input.is_key_held(Scancode::LShift) {
            self.position -= Vec3::Y * velocity;
        }
    }

    pub fn front(&self) -> Vec3 {
        let yaw_rad = self.yaw.to_radians();
        let pitch_rad = self.pitch.to_radians();
        Vec3::new(
            yaw_rad.cos() * pitch_rad.cos(),
            pitch_rad.sin(),
            yaw_rad.sin() * pitch_rad.cos(),
        )
        .normalize()
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            direction: self.front(),
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        let front = self.front();
        Mat4::look_at_rh(self.position, self.position + front, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect, self.near, self.far)
    }

    pub fn view(&self, aspect: f32) -> CameraView {
        CameraView {
            view: self.view_matrix(),
            projection: self.projection_matrix(aspect),
            eye_position: self.position,
        }
    }
}
