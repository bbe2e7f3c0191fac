//! Forward renderer with a directional shadow pass and multi-light shading.

pub mod app;
pub mod camera;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod lighting;
pub mod renderer;
pub mod scene;
pub mod systems;

pub use error::{RenderError, Result};
