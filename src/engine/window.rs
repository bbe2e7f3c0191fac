use sdl2::video::{GLContext, GLProfile, Window};
use sdl2::Sdl;

use crate::error::{RenderError, Result};

pub struct GameWindow {
    _gl_context: GLContext,
    window: Window,
}

impl GameWindow {
    /// Opens a window with a 3.3 core context and loads the GL entry points.
    pub fn new(sdl: &Sdl, title: &str, width: u32, height: u32) -> Result<Self> {
        let video = sdl.video().map_err(RenderError::Window)?;

        let gl_attr = video.gl_attr();
        gl_attr.set_context_profile(GLProfile::Core);
        gl_attr.set_context_version(3, 3);

        let window = video
            .window(title, width, height)
            .opengl()
            .resizable()
            .position_centered()
            .build()
            .map_err(|e| RenderError::Window(e.to_string()))?;

        let gl_context = window.gl_create_context().map_err(RenderError::Window)?;

        gl::load_with(|s| video.gl_get_proc_address(s) as *const _);

        Ok(Self {
            _gl_context: gl_context,
            window,
        })
    }

    pub fn swap(&self) {
        self.window.gl_swap_window();
    }

    /// Size of the default framebuffer in pixels. Differs from the window
    /// size on high-DPI displays.
    pub fn drawable_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }

    pub fn aspect_ratio(&self) -> f32 {
        let (w, h) = self.drawable_size();
        w as f32 / h.max(1) as f32
    }
}
