//! GPU command interface.
//!
//! Everything in the renderer that touches GPU state goes through [`Gpu`].
//! [`GlGpu`] forwards to OpenGL; [`HeadlessGpu`] keeps the same state in
//! memory so the pass sequence can run without a window.

pub mod opengl;
pub mod headless;

use std::fmt;
use std::rc::Rc;

use glam::{Mat4, Vec3};

pub use self::opengl::GlGpu;
pub use self::headless::HeadlessGpu;

/// Shared handle to the backend. All rendering happens on one thread.
pub type GpuHandle = Rc<dyn Gpu>;

/// `GL_FRAMEBUFFER_COMPLETE`.
pub const FRAMEBUFFER_COMPLETE: u32 = 0x8CD5;

/// The default (window) framebuffer.
pub const DEFAULT_FRAMEBUFFER: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// A resolved uniform location. `NOT_FOUND` (-1) is a legal value: writes to
/// it are ignored, exactly as the driver ignores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(i32);

impl UniformLocation {
    pub const NOT_FOUND: Self = Self(-1);

    pub fn new(raw: i32) -> Self {
        if raw < 0 {
            Self::NOT_FOUND
        } else {
            Self(raw)
        }
    }

    pub fn raw(self) -> i32 {
        self.0
    }

    pub fn is_found(self) -> bool {
        self.0 >= 0
    }
}

impl Default for UniformLocation {
    fn default() -> Self {
        Self::NOT_FOUND
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    Depth,
    ColorAndDepth,
}

/// One float attribute inside an interleaved vertex.
#[derive(Debug, Clone, Copy)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: i32,
    /// Offset in floats from the start of the vertex.
    pub offset: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct VertexLayout {
    /// Vertex size in floats.
    pub stride: usize,
    pub attributes: &'static [VertexAttribute],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshBuffers {
    pub vao: u32,
    pub vbo: u32,
    pub ebo: u32,
}

/// The subset of the GPU API this renderer issues.
///
/// Handles are plain `u32` names, 0 meaning "none". Uniform writes target
/// the current program. Methods take `&self`; backends that keep state use
/// interior mutability.
pub trait Gpu {
    /// Enables depth testing and sets the clear color.
    fn init_state(&self, clear_color: Vec3);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear(&self, target: ClearTarget);

    fn create_program(&self) -> u32;
    /// Compiles one stage. On failure the shader object is already deleted
    /// and the driver's info log is returned.
    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<u32, String>;
    fn attach_shader(&self, program: u32, shader: u32);
    fn delete_shader(&self, shader: u32);
    fn link_program(&self, program: u32) -> Result<(), String>;
    fn validate_program(&self, program: u32) -> Result<(), String>;
    fn delete_program(&self, program: u32);
    fn use_program(&self, program: u32);
    fn current_program(&self) -> u32;
    fn uniform_location(&self, program: u32, name: &str) -> UniformLocation;

    fn uniform_i32(&self, location: UniformLocation, value: i32);
    fn uniform_f32(&self, location: UniformLocation, value: f32);
    fn uniform_vec3(&self, location: UniformLocation, value: Vec3);
    fn uniform_mat4(&self, location: UniformLocation, value: &Mat4);

    /// Uploads an RGBA8 image with repeat wrapping, linear filtering and mipmaps.
    fn create_texture_rgba(&self, width: u32, height: u32, pixels: &[u8]) -> u32;
    /// Allocates a depth-component texture clamped to a border depth of 1.0.
    fn create_depth_texture(&self, width: u32, height: u32) -> u32;
    fn bind_texture(&self, unit: u32, texture: u32);
    fn delete_texture(&self, texture: u32);

    fn create_framebuffer(&self) -> u32;
    /// Attaches `texture` as the only (depth) attachment of `framebuffer`
    /// with color reads and writes disabled, and returns the completeness
    /// status. The default framebuffer is bound again on return.
    fn attach_depth_texture(&self, framebuffer: u32, texture: u32) -> u32;
    fn bind_framebuffer(&self, framebuffer: u32);
    fn delete_framebuffer(&self, framebuffer: u32);

    fn create_mesh(&self, vertices: &[f32], indices: &[u32], layout: &VertexLayout) -> MeshBuffers;
    fn draw_indexed(&self, vao: u32, index_count: i32);
    fn delete_mesh(&self, buffers: MeshBuffers);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_locations_collapse_to_not_found() {
        assert_eq!(UniformLocation::new(-7), UniformLocation::NOT_FOUND);
        assert!(!UniformLocation::new(-1).is_found());
        assert!(UniformLocation::new(0).is_found());
        assert_eq!(UniformLocation::default(), UniformLocation::NOT_FOUND);
    }
}
