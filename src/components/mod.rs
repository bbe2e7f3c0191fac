pub mod render;

pub use render::{Hidden, MeshHandle, TextureHandle};

use glam::{Mat4, Quat, Vec3};

/// Position, rotation and scale of a drawable in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Constant rotation about an axis, advanced by the app each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub axis: Vec3,
    pub degrees_per_second: f32,
}
