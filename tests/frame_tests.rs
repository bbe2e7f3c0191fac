//! Frame Orchestration Tests
//!
//! Tests for:
//! - Pass ordering: shadow depth pass before color pass
//! - Light transform shared bit-for-bit by both passes
//! - Render target, viewport and texture unit state after a frame
//! - Scenes without a directional light, hidden entities, void programs

use std::rc::Rc;

use glam::Vec3;

use umbra::camera::{Camera, CameraView};
use umbra::components::{Hidden, Transform};
use umbra::config::{LightCapacity, RenderConfig};
use umbra::gpu::headless::{DrawCall, GpuEvent, UniformValue};
use umbra::gpu::{ClearTarget, Gpu, GpuHandle, HeadlessGpu, DEFAULT_FRAMEBUFFER};
use umbra::lighting::{Attenuation, LightBase, Material, PointLight};
use umbra::renderer::mesh::create_pyramid;
use umbra::renderer::texture::Texture;
use umbra::renderer::{FrameRenderer, SHADOW_MAP_TEXTURE_UNIT};
use umbra::scene::demo_scene::build_demo_scene;
use umbra::scene::{SceneContext, SceneLights};

const FRAMEBUFFER: (u32, u32) = (1280, 720);

struct Fixture {
    headless: Rc<HeadlessGpu>,
    gpu: GpuHandle,
    config: RenderConfig,
    renderer: FrameRenderer,
    camera: CameraView,
}

impl Fixture {
    fn new(config: RenderConfig) -> Self {
        let headless = Rc::new(HeadlessGpu::new());
        let gpu: GpuHandle = headless.clone();
        let renderer = FrameRenderer::new(gpu.clone(), &config);
        let camera = Camera::new(&config).view(FRAMEBUFFER.0 as f32 / FRAMEBUFFER.1 as f32);
        Self {
            headless,
            gpu,
            config,
            renderer,
            camera,
        }
    }

    fn demo_scene(&self) -> SceneContext {
        build_demo_scene(&self.gpu, &self.config).expect("demo scene should build")
    }

    fn main_id(&self) -> u32 {
        self.renderer.main_program().id()
    }

    fn shadow_id(&self) -> u32 {
        self.renderer.shadow_program().id()
    }
}

fn position_of(events: &[GpuEvent], wanted: &GpuEvent) -> usize {
    events
        .iter()
        .position(|e| e == wanted)
        .unwrap_or_else(|| panic!("{wanted:?} not found in {events:?}"))
}

// ============================================================================
// Pass sequence
// ============================================================================

#[test]
fn shadow_pass_runs_first_into_the_shadow_framebuffer() {
    let fx = Fixture::new(RenderConfig::default());
    let scene = fx.demo_scene();
    let shadow_fb = scene.lights.directional().unwrap().shadow_map().framebuffer();
    fx.headless.clear_events();

    fx.renderer.render_frame(&scene, &fx.camera, FRAMEBUFFER);

    let events = fx.headless.events();
    assert_eq!(
        &events[..4],
        &[
            GpuEvent::UseProgram(fx.shadow_id()),
            GpuEvent::Viewport {
                width: 2048,
                height: 2048
            },
            GpuEvent::BindFramebuffer(shadow_fb),
            GpuEvent::Clear(ClearTarget::Depth),
        ]
    );

    let unbind = position_of(&events, &GpuEvent::BindFramebuffer(DEFAULT_FRAMEBUFFER));
    let use_main = position_of(&events, &GpuEvent::UseProgram(fx.main_id()));
    assert!(unbind < use_main);
    assert_eq!(events[use_main + 1], GpuEvent::Viewport { width: 1280, height: 720 });
    assert_eq!(events[use_main + 2], GpuEvent::Clear(ClearTarget::ColorAndDepth));
}

#[test]
fn every_drawable_is_drawn_once_per_pass() {
    let fx = Fixture::new(RenderConfig::default());
    let scene = fx.demo_scene();
    let shadow_fb = scene.lights.directional().unwrap().shadow_map().framebuffer();
    fx.headless.clear_events();

    let stats = fx.renderer.render_frame(&scene, &fx.camera, FRAMEBUFFER);

    let draws = fx.headless.draw_calls();
    let (shadow, color): (Vec<&DrawCall>, Vec<&DrawCall>) = draws.iter().partition(|d| d.framebuffer == shadow_fb);
    assert_eq!(stats.shadow_draws, 4);
    assert_eq!(stats.color_draws, 4);
    assert_eq!(shadow.len(), 4);
    assert_eq!(color.len(), 4);
    assert!(shadow.iter().all(|d| d.program == fx.shadow_id()));
    assert!(color
        .iter()
        .all(|d| d.program == fx.main_id() && d.framebuffer == DEFAULT_FRAMEBUFFER));
}

#[test]
fn both_passes_receive_the_identical_light_transform() {
    let fx = Fixture::new(RenderConfig::default());
    let scene = fx.demo_scene();

    let stats = fx.renderer.render_frame(&scene, &fx.camera, FRAMEBUFFER);

    let transform = stats.light_transform.expect("scene has a directional light");
    let expected = Some(UniformValue::Mat4(transform));
    let name = "u_directional_light_transform";
    assert_eq!(fx.headless.uniform(fx.shadow_id(), name), expected);
    assert_eq!(fx.headless.uniform(fx.main_id(), name), expected);
    assert_eq!(
        transform.to_cols_array().map(f32::to_bits),
        scene.lights.directional().unwrap().light_transform().to_cols_array().map(f32::to_bits)
    );
}

#[test]
fn frame_ends_on_default_framebuffer_with_shadow_map_on_its_unit() {
    let fx = Fixture::new(RenderConfig::default());
    let scene = fx.demo_scene();

    fx.renderer.render_frame(&scene, &fx.camera, FRAMEBUFFER);

    let shadow_map = scene.lights.directional().unwrap().shadow_map();
    assert_eq!(fx.headless.bound_framebuffer(), DEFAULT_FRAMEBUFFER);
    assert_eq!(fx.headless.viewport_size(), (1280, 720));
    assert_eq!(fx.headless.texture_at(SHADOW_MAP_TEXTURE_UNIT), shadow_map.texture());
    assert_eq!(
        fx.headless.uniform(fx.main_id(), "u_directional_shadow_map"),
        Some(UniformValue::Int(SHADOW_MAP_TEXTURE_UNIT as i32))
    );
    assert_eq!(fx.headless.uniform(fx.main_id(), "u_texture"), Some(UniformValue::Int(0)));
}

#[test]
fn repeated_frames_record_no_gpu_errors() {
    let fx = Fixture::new(RenderConfig::default());
    let mut scene = fx.demo_scene();
    let mut camera = Camera::new(&fx.config);

    for _ in 0..5 {
        camera.look(10.0, 2.0);
        scene.update(camera.pose(), 1.0 / 60.0);
        fx.renderer.render_frame(&scene, &camera.view(16.0 / 9.0), FRAMEBUFFER);
    }

    assert!(fx.headless.errors().is_empty(), "{:?}", fx.headless.errors());
}

#[test]
fn camera_uniforms_are_uploaded_to_the_main_program() {
    let fx = Fixture::new(RenderConfig::default());
    let scene = fx.demo_scene();

    fx.renderer.render_frame(&scene, &fx.camera, FRAMEBUFFER);

    let id = fx.main_id();
    assert_eq!(fx.headless.uniform(id, "u_view"), Some(UniformValue::Mat4(fx.camera.view)));
    assert_eq!(
        fx.headless.uniform(id, "u_projection"),
        Some(UniformValue::Mat4(fx.camera.projection))
    );
    assert_eq!(
        fx.headless.uniform(id, "u_eye_position"),
        Some(UniformValue::Vec3(fx.camera.eye_position))
    );
}

// ============================================================================
// Lights
// ============================================================================

#[test]
fn demo_lights_fit_default_capacity() {
    let fx = Fixture::new(RenderConfig::default());
    let scene = fx.demo_scene();

    let stats = fx.renderer.render_frame(&scene, &fx.camera, FRAMEBUFFER);

    assert_eq!((stats.point_lights, stats.spot_lights), (2, 2));
    assert_eq!(
        fx.headless.uniform(fx.main_id(), "u_point_light_count"),
        Some(UniformValue::Int(2))
    );
}

#[test]
fn lights_past_capacity_are_dropped_silently() {
    let config = RenderConfig {
        light_capacity: LightCapacity { point: 1, spot: 1 },
        ..RenderConfig::default()
    };
    let fx = Fixture::new(config);
    let scene = fx.demo_scene();

    let stats = fx.renderer.render_frame(&scene, &fx.camera, FRAMEBUFFER);

    assert_eq!((stats.point_lights, stats.spot_lights), (1, 1));
    assert_eq!(
        fx.headless.uniform(fx.main_id(), "u_spot_light_count"),
        Some(UniformValue::Int(1))
    );
    assert!(fx.headless.errors().is_empty());
}

#[test]
fn flashlight_tracks_the_camera_into_the_uniforms() {
    let fx = Fixture::new(RenderConfig::default());
    let mut scene = fx.demo_scene();
    let mut camera = Camera::new(&fx.config);
    camera.position = Vec3::new(1.0, 2.0, 3.0);

    scene.update(camera.pose(), 0.0);
    fx.renderer.render_frame(&scene, &camera.view(16.0 / 9.0), FRAMEBUFFER);

    assert_eq!(
        fx.headless.uniform(fx.main_id(), "u_spot_lights[0].point.position"),
        Some(UniformValue::Vec3(Vec3::new(1.0, 1.7, 3.0)))
    );
}

// ============================================================================
// Degenerate scenes
// ============================================================================

fn single_pyramid_scene(gpu: &GpuHandle, lights: SceneLights) -> SceneContext {
    let mut scene = SceneContext::new(lights);
    let mesh = scene.meshes.add(create_pyramid(gpu.clone()));
    let texture = scene
        .textures
        .add(Texture::solid(gpu.clone(), [255, 255, 255, 255]).unwrap());
    scene
        .world
        .spawn((Transform::new(Vec3::ZERO), mesh, texture, Material::matte()));
    scene
}

#[test]
fn scene_without_directional_light_skips_the_shadow_pass() {
    let fx = Fixture::new(RenderConfig::default());
    let lights = SceneLights::from_lights([PointLight::new(
        LightBase::default(),
        Vec3::Y,
        Attenuation::default(),
    )
    .into()]);
    let scene = single_pyramid_scene(&fx.gpu, lights);
    fx.headless.clear_events();

    let stats = fx.renderer.render_frame(&scene, &fx.camera, FRAMEBUFFER);

    assert_eq!(stats.light_transform, None);
    assert_eq!(stats.shadow_draws, 0);
    assert_eq!(stats.color_draws, 1);
    assert!(!fx.headless.events().contains(&GpuEvent::UseProgram(fx.shadow_id())));
    assert!(fx
        .headless
        .draw_calls()
        .iter()
        .all(|d| d.framebuffer == DEFAULT_FRAMEBUFFER));
    assert_eq!(fx.headless.uniform(fx.main_id(), "u_directional_light_transform"), None);
    assert_eq!(fx.headless.uniform(fx.main_id(), "u_directional_shadow_map"), None);
    assert_eq!(fx.headless.texture_at(SHADOW_MAP_TEXTURE_UNIT), 0);
    assert!(fx.headless.errors().is_empty());
}

#[test]
fn hidden_entities_are_skipped_by_both_passes() {
    let fx = Fixture::new(RenderConfig::default());
    let mut scene = fx.demo_scene();
    let hidden = scene
        .world
        .query::<&Transform>()
        .iter()
        .map(|(entity, _)| entity)
        .next()
        .unwrap();
    scene.world.insert_one(hidden, Hidden).unwrap();

    let stats = fx.renderer.render_frame(&scene, &fx.camera, FRAMEBUFFER);

    assert_eq!(stats.shadow_draws, 3);
    assert_eq!(stats.color_draws, 3);
}

#[test]
fn void_main_program_draws_nothing_in_the_color_pass() {
    let headless = Rc::new(HeadlessGpu::new());
    let gpu: GpuHandle = headless.clone();
    headless.fail_next_link("error: main program failed");
    let config = RenderConfig::default();
    let renderer = FrameRenderer::new(gpu.clone(), &config);
    let scene = build_demo_scene(&gpu, &config).unwrap();
    let camera = Camera::new(&config).view(1.0);

    assert!(renderer.main_program().is_void());
    assert!(!renderer.shadow_program().is_void());

    let stats = renderer.render_frame(&scene, &camera, FRAMEBUFFER);

    assert_eq!(stats.shadow_draws, 4);
    assert_eq!(stats.color_draws, 0);
    assert_eq!(stats.point_lights, 0);
    assert!(headless.draw_calls().iter().all(|d| d.program != 0));
    assert_eq!(headless.bound_framebuffer(), DEFAULT_FRAMEBUFFER);
    assert_eq!(headless.current_program(), 0);
    assert!(headless.errors().is_empty(), "{:?}", headless.errors());
}
