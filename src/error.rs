//! Error types for the renderer.
//!
//! Only failures that abort a resource's setup, or that carry driver
//! diagnostics the caller should report, have a variant here. A uniform the
//! compiler optimised away and a light list longer than the program's
//! capacity are absorbed by policy and never surface as errors.

use thiserror::Error;

use crate::gpu::ShaderStage;

#[derive(Error, Debug)]
pub enum RenderError {
    /// The driver returned handle 0 for a program, framebuffer or texture.
    #[error("Failed to create {resource}")]
    ResourceCreation { resource: &'static str },

    /// The shadow framebuffer cannot be rendered to on this driver.
    #[error("Framebuffer incomplete: status 0x{status:04X}")]
    FramebufferIncomplete { status: u32 },

    #[error("{stage} shader compile error: {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("Shader link error: {log}")]
    Link { log: String },

    #[error("Shader validation error: {log}")]
    Validate { log: String },

    /// A cleared program cannot be built again; create a new one.
    #[error("Shader program was cleared")]
    ProgramCleared,

    /// SDL2 reports its failures as plain strings.
    #[error("Window system error: {0}")]
    Window(String),
}

/// Alias for `Result<T, RenderError>`.
pub type Result<T> = std::result::Result<T, RenderError>;
