//! Lighting Tests
//!
//! Tests for:
//! - Shadow map creation, binding and teardown
//! - Directional light transform construction
//! - Light and material parameters as uploaded to the shading program

use std::rc::Rc;

use glam::{Mat4, Vec3};

use umbra::config::{LightCapacity, SceneBounds};
use umbra::gpu::headless::UniformValue;
use umbra::gpu::{Gpu, GpuHandle, HeadlessGpu, DEFAULT_FRAMEBUFFER};
use umbra::lighting::{
    Attenuation, DirectionalLight, LightBase, Material, PointLight, ShadowMap, SpotLight,
};
use umbra::renderer::ShaderProgram;
use umbra::RenderError;

const VERT: &str = include_str!("../shaders/shader.vert");
const FRAG: &str = include_str!("../shaders/shader.frag");

const EPSILON: f32 = 1e-5;

fn headless() -> (Rc<HeadlessGpu>, GpuHandle) {
    let headless = Rc::new(HeadlessGpu::new());
    let gpu: GpuHandle = headless.clone();
    (headless, gpu)
}

fn bound_program(gpu: &GpuHandle) -> ShaderProgram {
    let program = ShaderProgram::from_sources(gpu.clone(), LightCapacity::default(), VERT, FRAG);
    assert!(!program.is_void());
    program.bind();
    program
}

fn sun(gpu: &GpuHandle, direction: Vec3) -> DirectionalLight {
    DirectionalLight::new(
        gpu.clone(),
        LightBase::new(Vec3::ONE, 0.1, 0.3),
        direction,
        (1024, 1024),
        SceneBounds::default(),
    )
    .expect("shadow map should be created")
}

// ============================================================================
// ShadowMap
// ============================================================================

#[test]
fn shadow_map_reports_its_dimensions() {
    let (headless, gpu) = headless();
    let map = ShadowMap::new(gpu, 2048, 2048).unwrap();

    assert_eq!((map.width(), map.height()), (2048, 2048));
    assert_eq!(map.size(), (2048, 2048));
    assert_eq!(headless.texture_size(map.texture()), Some((2048, 2048)));
    assert!(headless.is_depth_texture(map.texture()));
}

#[test]
fn shadow_map_accepts_non_square_sizes() {
    let (_headless, gpu) = headless();
    let map = ShadowMap::new(gpu, 1024, 512).unwrap();
    assert_eq!(map.size(), (1024, 512));
}

#[test]
fn shadow_map_write_then_unbind_restores_default_framebuffer() {
    let (headless, gpu) = headless();
    let map = ShadowMap::new(gpu, 512, 512).unwrap();

    map.write();
    assert_eq!(headless.bound_framebuffer(), map.framebuffer());

    map.unbind();
    assert_eq!(headless.bound_framebuffer(), DEFAULT_FRAMEBUFFER);
}

#[test]
fn shadow_map_read_binds_depth_texture_to_unit() {
    let (headless, gpu) = headless();
    let map = ShadowMap::new(gpu, 512, 512).unwrap();

    map.read(1);

    assert_eq!(headless.texture_at(1), map.texture());
    assert_eq!(headless.texture_at(0), 0);
}

#[test]
fn incomplete_framebuffer_is_an_error_and_leaks_nothing() {
    let (headless, gpu) = headless();
    // GL_FRAMEBUFFER_INCOMPLETE_ATTACHMENT
    headless.force_framebuffer_status(0x8CD6);

    let err = ShadowMap::new(gpu, 2048, 2048).err().expect("creation should fail");

    assert!(matches!(err, RenderError::FramebufferIncomplete { status: 0x8CD6 }));
    // First two names: framebuffer, depth texture.
    assert!(!headless.is_live_framebuffer(1));
    assert_eq!(headless.texture_size(2), None);
}

#[test]
fn dropping_shadow_map_releases_resources() {
    let (headless, gpu) = headless();
    let map = ShadowMap::new(gpu, 256, 256).unwrap();
    let (framebuffer, texture) = (map.framebuffer(), map.texture());

    drop(map);

    assert!(!headless.is_live_framebuffer(framebuffer));
    assert_eq!(headless.texture_size(texture), None);
}

// ============================================================================
// DirectionalLight
// ============================================================================

#[test]
fn directional_light_keeps_requested_shadow_resolution() {
    let (_headless, gpu) = headless();
    let light = DirectionalLight::new(
        gpu,
        LightBase::new(Vec3::ONE, 0.1, 0.3),
        Vec3::new(0.0, -15.0, -10.0),
        (2048, 2048),
        SceneBounds::default(),
    )
    .unwrap();

    assert_eq!(light.shadow_map().size(), (2048, 2048));
    assert_eq!(light.base().color(), Vec3::ONE);
}

#[test]
fn light_transform_is_projection_times_view() {
    let (_headless, gpu) = headless();
    let direction = Vec3::new(0.0, -15.0, -10.0);
    let light = sun(&gpu, direction);
    let bounds = SceneBounds::default();

    let expected = bounds.projection() * bounds.light_view(direction);
    assert_eq!(light.light_transform(), expected);
}

#[test]
fn light_transform_is_stable_across_calls() {
    let (_headless, gpu) = headless();
    let light = sun(&gpu, Vec3::new(0.3, -1.0, 0.2));
    assert_eq!(light.light_transform(), light.light_transform());
}

#[test]
fn scene_center_projects_inside_the_shadow_volume() {
    let (_headless, gpu) = headless();
    let light = sun(&gpu, Vec3::new(0.0, -15.0, -10.0));

    let clip = light.light_transform() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
    let ndc = clip.truncate() / clip.w;
    assert!(ndc.x.abs() < EPSILON && ndc.y.abs() < EPSILON, "{ndc}");
    assert!(ndc.z > -1.0 && ndc.z < 1.0, "{ndc}");
}

#[test]
fn straight_down_light_has_a_valid_view() {
    let (_headless, gpu) = headless();
    let light = sun(&gpu, Vec3::NEG_Y);
    let transform = light.light_transform();
    assert!(transform.is_finite());
    assert_ne!(transform, Mat4::ZERO);
}

#[test]
fn directional_light_uploads_base_and_direction() {
    let (headless, gpu) = headless();
    let program = bound_program(&gpu);
    let direction = Vec3::new(0.0, -15.0, -10.0);
    let light = sun(&gpu, direction);

    program.set_directional_light(&light);

    let id = program.id();
    assert_eq!(
        headless.uniform(id, "u_directional_light.direction"),
        Some(UniformValue::Vec3(direction))
    );
    assert_eq!(
        headless.uniform(id, "u_directional_light.base.ambient_intensity"),
        Some(UniformValue::Float(0.1))
    );
    assert_eq!(
        headless.uniform(id, "u_directional_light.base.diffuse_intensity"),
        Some(UniformValue::Float(0.3))
    );
}

// ============================================================================
// Parameter clamping
// ============================================================================

#[test]
fn light_color_is_clamped_per_channel() {
    let (headless, gpu) = headless();
    let program = bound_program(&gpu);
    let light = PointLight::new(
        LightBase::new(Vec3::new(1.5, -0.5, 0.5), 0.0, 1.0),
        Vec3::ZERO,
        Attenuation::default(),
    );

    program.set_point_lights(&[light]);

    assert_eq!(
        headless.uniform(program.id(), "u_point_lights[0].base.color"),
        Some(UniformValue::Vec3(Vec3::new(1.0, 0.0, 0.5)))
    );
}

#[test]
fn negative_intensities_become_zero() {
    let base = LightBase::new(Vec3::ONE, -1.0, -2.0);
    assert_eq!(base.ambient_intensity(), 0.0);
    assert_eq!(base.diffuse_intensity(), 0.0);
}

#[test]
fn attenuation_constant_stays_positive() {
    let attenuation = Attenuation::new(0.0, -1.0, 0.5);
    assert!(attenuation.constant > 0.0);
    assert_eq!(attenuation.linear, 0.0);
    assert!(attenuation.factor(0.0).is_finite());
}

#[test]
fn attenuation_factor_follows_quadratic_falloff() {
    let attenuation = Attenuation::new(0.3, 0.2, 0.1);
    let d = 2.0;
    let expected = 1.0 / (0.1 * d * d + 0.2 * d + 0.3);
    assert!((attenuation.factor(d) - expected).abs() < EPSILON);
}

#[test]
fn point_light_uploads_attenuation_terms() {
    let (headless, gpu) = headless();
    let program = bound_program(&gpu);
    let light = PointLight::new(
        LightBase::new(Vec3::new(0.0, 0.0, 1.0), 0.0, 1.0),
        Vec3::new(-4.0, 2.0, 0.0),
        Attenuation::new(0.3, 0.2, 0.1),
    );

    program.set_point_lights(&[light]);

    let id = program.id();
    assert_eq!(headless.uniform(id, "u_point_lights[0].constant"), Some(UniformValue::Float(0.3)));
    assert_eq!(headless.uniform(id, "u_point_lights[0].linear"), Some(UniformValue::Float(0.2)));
    assert_eq!(headless.uniform(id, "u_point_lights[0].exponent"), Some(UniformValue::Float(0.1)));
    assert_eq!(
        headless.uniform(id, "u_point_lights[0].position"),
        Some(UniformValue::Vec3(Vec3::new(-4.0, 2.0, 0.0)))
    );
}

#[test]
fn spot_light_uploads_cosine_of_edge_and_unit_direction() {
    let (headless, gpu) = headless();
    let program = bound_program(&gpu);
    let light = SpotLight::new(
        LightBase::new(Vec3::ONE, 0.0, 2.0),
        Vec3::new(0.0, -1.5, 0.0),
        Vec3::new(-100.0, -1.0, 0.0),
        Attenuation::new(1.0, 0.0, 0.0),
        20.0,
    );

    program.set_spot_lights(&[light]);

    let id = program.id();
    let Some(UniformValue::Float(edge)) = headless.uniform(id, "u_spot_lights[0].edge") else {
        panic!("edge not written");
    };
    assert!((edge - 20.0_f32.to_radians().cos()).abs() < EPSILON);

    let Some(UniformValue::Vec3(direction)) = headless.uniform(id, "u_spot_lights[0].direction")
    else {
        panic!("direction not written");
    };
    assert!((direction.length() - 1.0).abs() < EPSILON);
    assert!(direction.x < 0.0);
}

#[test]
fn spot_edge_is_clamped_inside_a_hemisphere() {
    let wide = SpotLight::new(LightBase::default(), Vec3::ZERO, Vec3::Z, Attenuation::default(), 120.0);
    let narrow = SpotLight::new(LightBase::default(), Vec3::ZERO, Vec3::Z, Attenuation::default(), -5.0);

    assert_eq!(wide.edge_degrees(), SpotLight::MAX_EDGE_DEGREES);
    assert_eq!(narrow.edge_degrees(), SpotLight::MIN_EDGE_DEGREES);
    assert!(wide.edge_cos() > 0.0 && narrow.edge_cos() < 1.0);
}

#[test]
fn material_uploads_specular_terms() {
    let (headless, gpu) = headless();
    let program = bound_program(&gpu);

    program.set_material(&Material::glossy());

    let id = program.id();
    assert_eq!(
        headless.uniform(id, "u_material.specular_intensity"),
        Some(UniformValue::Float(1.0))
    );
    assert_eq!(headless.uniform(id, "u_material.shininess"), Some(UniformValue::Float(32.0)));
    assert!(headless.errors().is_empty());
}

#[test]
fn writes_target_the_bound_program_only() {
    let (headless, gpu) = headless();
    let first = bound_program(&gpu);
    let second = ShaderProgram::from_sources(gpu.clone(), LightCapacity::default(), VERT, FRAG);

    first.set_material(&Material::matte());

    assert_eq!(headless.uniform_write_count(second.id()), 0);
    assert_eq!(headless.current_program(), first.id());
}
