use glam::Mat4;
use log::trace;

use crate::camera::CameraView;
use crate::config::RenderConfig;
use crate::gpu::{ClearTarget, GpuHandle};
use crate::lighting::DirectionalLight;
use crate::renderer::{render_scene, ShaderProgram, DIFFUSE_TEXTURE_UNIT, SHADOW_MAP_TEXTURE_UNIT};
use crate::scene::SceneContext;

const SHADER_VERT: &str = include_str!("../../shaders/shader.vert");
const SHADER_FRAG: &str = include_str!("../../shaders/shader.frag");
const SHADOW_VERT: &str = include_str!("../../shaders/directional_shadow_map.vert");
const SHADOW_FRAG: &str = include_str!("../../shaders/directional_shadow_map.frag");

/// What one call to [`FrameRenderer::render_frame`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Transform handed to both passes. `None` when the scene has no
    /// directional light and the shadow pass was skipped.
    pub light_transform: Option<Mat4>,
    pub shadow_draws: usize,
    pub color_draws: usize,
    pub point_lights: usize,
    pub spot_lights: usize,
}

/// Owns the two programs and runs the shadow pass then the color pass.
pub struct FrameRenderer {
    gpu: GpuHandle,
    main_program: ShaderProgram,
    shadow_program: ShaderProgram,
}

impl FrameRenderer {
    /// Sets global pipeline state and builds both programs from the
    /// bundled GLSL. A program that fails to build is kept void; the frame
    /// still runs and the failure is in the log.
    pub fn new(gpu: GpuHandle, config: &RenderConfig) -> Self {
        gpu.init_state(config.clear_color);
        let capacity = config.light_capacity;
        let main_program = ShaderProgram::from_sources(gpu.clone(), capacity, SHADER_VERT, SHADER_FRAG);
        let shadow_program = ShaderProgram::from_sources(gpu.clone(), capacity, SHADOW_VERT, SHADOW_FRAG);
        Self::with_programs(gpu, main_program, shadow_program)
    }

    pub fn with_programs(gpu: GpuHandle, main_program: ShaderProgram, shadow_program: ShaderProgram) -> Self {
        Self {
            gpu,
            main_program,
            shadow_program,
        }
    }

    pub fn main_program(&self) -> &ShaderProgram {
        &self.main_program
    }

    pub fn shadow_program(&self) -> &ShaderProgram {
        &self.shadow_program
    }

    /// Renders one frame into the default framebuffer.
    ///
    /// The light transform is computed once and written to both programs,
    /// so the depth the shadow pass stores and the lookup the color pass
    /// performs agree exactly.
    pub fn render_frame(&self, scene: &SceneContext, camera: &CameraView, framebuffer_size: (u32, u32)) -> FrameStats {
        let mut stats = FrameStats::default();

        if let Some(light) = scene.lights.directional() {
            let transform = light.light_transform();
            stats.light_transform = Some(transform);
            stats.shadow_draws = self.shadow_pass(scene, light, &transform);
        } else {
            trace!("No directional light; skipping shadow pass");
        }

        self.color_pass(scene, camera, framebuffer_size, &mut stats);
        stats
    }

    fn shadow_pass(&self, scene: &SceneContext, light: &DirectionalLight, transform: &Mat4) -> usize {
        let shadow_map = light.shadow_map();
        self.shadow_program.bind();
        self.gpu.viewport(0, 0, shadow_map.width() as i32, shadow_map.height() as i32);
        shadow_map.write();
        self.gpu.clear(ClearTarget::Depth);

        self.shadow_program.set_directional_light_transform(transform);
        let draws = render_scene(&self.shadow_program, &scene.world, &scene.meshes, &scene.textures);

        shadow_map.unbind();
        draws
    }

    fn color_pass(&self, scene: &SceneContext, camera: &CameraView, framebuffer_size: (u32, u32), stats: &mut FrameStats) {
        let program = &self.main_program;
        program.bind();
        self.gpu.viewport(0, 0, framebuffer_size.0 as i32, framebuffer_size.1 as i32);
        self.gpu.clear(ClearTarget::ColorAndDepth);

        program.set_projection(&camera.projection);
        program.set_view(&camera.view);
        program.set_eye_position(camera.eye_position);

        let lights = &scene.lights;
        if let Some(light) = lights.directional() {
            program.set_directional_light(light);
        }
        stats.point_lights = program.set_point_lights(lights.point_lights());
        stats.spot_lights = program.set_spot_lights(lights.spot_lights());

        if let (Some(light), Some(transform)) = (lights.directional(), stats.light_transform.as_ref()) {
            program.set_directional_light_transform(transform);
            light.shadow_map().read(SHADOW_MAP_TEXTURE_UNIT);
            program.set_directional_shadow_map(SHADOW_MAP_TEXTURE_UNIT);
        }
        program.set_texture(DIFFUSE_TEXTURE_UNIT);

        stats.color_draws = render_scene(program, &scene.world, &scene.meshes, &scene.textures);
    }
}
