use std::rc::Rc;

use log::{debug, info, warn};
use sdl2::keyboard::Scancode;
use sdl2::Sdl;

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::engine::input::InputState;
use crate::engine::time::FrameTimer;
use crate::engine::window::GameWindow;
use crate::error::{RenderError, Result};
use crate::gpu::{GlGpu, GpuHandle, HeadlessGpu};
use crate::renderer::{FrameRenderer, FrameStats};
use crate::scene::demo_scene::build_demo_scene;
use crate::scene::SceneContext;

/// Interactive viewer: WASD + mouse camera, spot light 0 as a flashlight.
/// `F` freezes the flashlight in place; `Escape` quits.
pub struct ViewerApp {
    scene: SceneContext,
    camera: Camera,
    renderer: FrameRenderer,
}

impl ViewerApp {
    /// Must be called with the window's GL context current.
    pub fn new(config: &RenderConfig) -> Result<Self> {
        let gpu: GpuHandle = Rc::new(GlGpu::new());
        let renderer = FrameRenderer::new(gpu.clone(), config);
        let scene = build_demo_scene(&gpu, config)?;
        Ok(Self {
            scene,
            camera: Camera::new(config),
            renderer,
        })
    }

    pub fn run(&mut self, sdl: &Sdl, window: &GameWindow) -> Result<()> {
        sdl.mouse().set_relative_mouse_mode(true);
        let mut event_pump = sdl.event_pump().map_err(RenderError::Window)?;
        let mut input = InputState::new();
        let mut timer = FrameTimer::new();

        loop {
            let fps = timer.tick();
            input.update(&mut event_pump);
            if input.quit {
                break;
            }
            if input.resized {
                let (w, h) = window.drawable_size();
                debug!("Framebuffer resized to {w}x{h}");
            }

            self.handle_input(&input, timer.dt);
            let stats = self.render(window);
            if let Some(fps) = fps {
                debug!("{fps:.1} fps, {stats:?}");
            }

            window.swap();
        }

        info!("Viewer closed");
        Ok(())
    }

    fn handle_input(&mut self, input: &InputState, dt: f32) {
        self.camera.look(input.mouse_dx, input.mouse_dy);
        self.camera.move_wasd(input, dt);

        if input.was_key_pressed(Scancode::F) {
            if let Some(flashlight) = self.scene.flashlight.as_mut() {
                flashlight.follow = !flashlight.follow;
                info!(
                    "Flashlight {}",
                    if flashlight.follow { "follows camera" } else { "frozen" }
                );
            }
        }

        self.scene.update(self.camera.pose(), dt);
    }

    fn render(&self, window: &GameWindow) -> FrameStats {
        let view = self.camera.view(window.aspect_ratio());
        self.renderer
            .render_frame(&self.scene, &view, window.drawable_size())
    }
}

/// Renders `frames` frames of the demo scene with no window or GL context.
/// GL-style errors from every frame are reported as warnings at the end.
pub fn run_headless(config: &RenderConfig, frames: u32) -> Result<()> {
    let headless = Rc::new(HeadlessGpu::new());
    let last = render_headless(&headless, config, frames)?;

    let errors = headless.errors();
    for error in &errors {
        warn!("GPU error: {error}");
    }
    info!(
        "Rendered {frames} headless frames: {} shadow draws, {} color draws, {} point + {} spot lights, {} draw calls in the last frame, {} GPU errors",
        last.shadow_draws,
        last.color_draws,
        last.point_lights,
        last.spot_lights,
        headless.draw_calls().len(),
        errors.len()
    );
    Ok(())
}

/// Only the latest frame's events stay recorded on `headless`.
fn render_headless(headless: &Rc<HeadlessGpu>, config: &RenderConfig, frames: u32) -> Result<FrameStats> {
    let gpu: GpuHandle = headless.clone();

    let renderer = FrameRenderer::new(gpu.clone(), config);
    let mut scene = build_demo_scene(&gpu, config)?;
    let mut camera = Camera::new(config);
    let aspect = config.window_width as f32 / config.window_height.max(1) as f32;
    let size = (config.window_width, config.window_height);
    let dt = 1.0 / 60.0;

    let mut last = FrameStats::default();
    for frame in 0..frames {
        headless.clear_events();
        camera.look(2.0, 0.0);
        scene.update(camera.pose(), dt);
        last = renderer.render_frame(&scene, &camera.view(aspect), size);
        debug!("Frame {frame}: {last:?}");
    }
    Ok(last)
}
