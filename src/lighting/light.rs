//! Light sources.
//!
//! Each variant knows how to write its own parameters into the uniform
//! handles of one program slot; it never resolves locations itself. Those
//! are owned by [`ProgramUniforms`](crate::renderer::uniforms::ProgramUniforms).

use glam::{Mat4, Vec3};

use crate::config::SceneBounds;
use crate::error::Result;
use crate::gpu::{Gpu, GpuHandle};
use crate::lighting::ShadowMap;
use crate::renderer::uniforms::{
    DirectionalLightUniforms, LightUniforms, PointLightUniforms, ProgramUniforms,
    SpotLightUniforms,
};

/// Parameters shared by every light kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightBase {
    color: Vec3,
    ambient_intensity: f32,
    diffuse_intensity: f32,
}

impl LightBase {
    /// Color channels are clamped to [0, 1], intensities to >= 0.
    pub fn new(color: Vec3, ambient_intensity: f32, diffuse_intensity: f32) -> Self {
        Self {
            color: color.clamp(Vec3::ZERO, Vec3::ONE),
            ambient_intensity: ambient_intensity.max(0.0),
            diffuse_intensity: diffuse_intensity.max(0.0),
        }
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn ambient_intensity(&self) -> f32 {
        self.ambient_intensity
    }

    pub fn diffuse_intensity(&self) -> f32 {
        self.diffuse_intensity
    }

    fn apply_to(&self, uniforms: &LightUniforms, gpu: &dyn Gpu) {
        gpu.uniform_vec3(uniforms.color, self.color);
        gpu.uniform_f32(uniforms.ambient_intensity, self.ambient_intensity);
        gpu.uniform_f32(uniforms.diffuse_intensity, self.diffuse_intensity);
    }
}

impl Default for LightBase {
    fn default() -> Self {
        Self::new(Vec3::ONE, 1.0, 0.0)
    }
}

/// Falloff `1 / (exponent * d^2 + linear * d + constant)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub exponent: f32,
}

impl Attenuation {
    /// Smallest constant term accepted; keeps the denominator away from 0 at d = 0.
    pub const MIN_CONSTANT: f32 = 1e-3;

    pub fn new(constant: f32, linear: f32, exponent: f32) -> Self {
        Self {
            constant: constant.max(Self::MIN_CONSTANT),
            linear: linear.max(0.0),
            exponent: exponent.max(0.0),
        }
    }

    /// Attenuation factor at distance `d`.
    pub fn factor(&self, d: f32) -> f32 {
        1.0 / (self.exponent * d * d + self.linear * d + self.constant)
    }
}

impl Default for Attenuation {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }
}

/// Sun-like light. The only shadow caster: owns the shadow map and the
/// orthographic projection covering the scene bounds.
pub struct DirectionalLight {
    base: LightBase,
    direction: Vec3,
    bounds: SceneBounds,
    light_projection: Mat4,
    shadow_map: ShadowMap,
}

impl DirectionalLight {
    pub fn new(
        gpu: GpuHandle,
        base: LightBase,
        direction: Vec3,
        shadow_size: (u32, u32),
        bounds: SceneBounds,
    ) -> Result<Self> {
        let shadow_map = ShadowMap::new(gpu, shadow_size.0, shadow_size.1)?;
        Ok(Self {
            base,
            direction,
            bounds,
            light_projection: bounds.projection(),
            shadow_map,
        })
    }

    pub fn base(&self) -> &LightBase {
        &self.base
    }

    /// Direction as given; not normalized.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn shadow_map(&self) -> &ShadowMap {
        &self.shadow_map
    }

    /// Light-space projection x view. A pure function of the light's
    /// direction and bounds, so repeated calls give bit-identical results.
    pub fn light_transform(&self) -> Mat4 {
        self.light_projection * self.bounds.light_view(self.direction)
    }

    pub fn apply_to(&self, uniforms: &DirectionalLightUniforms, gpu: &dyn Gpu) {
        self.base.apply_to(&uniforms.base, gpu);
        gpu.uniform_vec3(uniforms.direction, self.direction);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    base: LightBase,
    position: Vec3,
    attenuation: Attenuation,
}

impl PointLight {
    pub fn new(base: LightBase, position: Vec3, attenuation: Attenuation) -> Self {
        Self {
            base,
            position,
            attenuation,
        }
    }

    pub fn base(&self) -> &LightBase {
        &self.base
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn attenuation(&self) -> Attenuation {
        self.attenuation
    }

    pub fn apply_to(&self, uniforms: &PointLightUniforms, gpu: &dyn Gpu) {
        self.base.apply_to(&uniforms.base, gpu);
        gpu.uniform_vec3(uniforms.position, self.position);
        gpu.uniform_f32(uniforms.constant, self.attenuation.constant);
        gpu.uniform_f32(uniforms.linear, self.attenuation.linear);
        gpu.uniform_f32(uniforms.exponent, self.attenuation.exponent);
    }
}

/// Point light restricted to a cone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    point: PointLight,
    direction: Vec3,
    edge_degrees: f32,
    edge_cos: f32,
}

impl SpotLight {
    pub const MIN_EDGE_DEGREES: f32 = 0.1;
    pub const MAX_EDGE_DEGREES: f32 = 89.9;

    /// `edge_degrees` is the cone half-angle, clamped into (0, 90).
    pub fn new(
        base: LightBase,
        position: Vec3,
        direction: Vec3,
        attenuation: Attenuation,
        edge_degrees: f32,
    ) -> Self {
        let edge_degrees = edge_degrees.clamp(Self::MIN_EDGE_DEGREES, Self::MAX_EDGE_DEGREES);
        Self {
            point: PointLight::new(base, position, attenuation),
            direction: direction.try_normalize().unwrap_or(Vec3::NEG_Y),
            edge_degrees,
            edge_cos: edge_degrees.to_radians().cos(),
        }
    }

    pub fn base(&self) -> &LightBase {
        self.point.base()
    }

    pub fn position(&self) -> Vec3 {
        self.point.position
    }

    /// Unit facing direction.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn edge_degrees(&self) -> f32 {
        self.edge_degrees
    }

    pub fn edge_cos(&self) -> f32 {
        self.edge_cos
    }

    /// Re-aims the light, e.g. to follow the camera as a torch.
    pub fn set_flash(&mut self, position: Vec3, direction: Vec3) {
        self.point.position = position;
        if let Some(dir) = direction.try_normalize() {
            self.direction = dir;
        }
    }

    pub fn apply_to(&self, uniforms: &SpotLightUniforms, gpu: &dyn Gpu) {
        self.point.apply_to(&uniforms.point, gpu);
        gpu.uniform_vec3(uniforms.direction, self.direction);
        gpu.uniform_f32(uniforms.edge, self.edge_cos);
    }
}

/// Any light the scene can hold.
pub enum Light {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

impl Light {
    pub fn base(&self) -> &LightBase {
        match self {
            Light::Directional(light) => light.base(),
            Light::Point(light) => light.base(),
            Light::Spot(light) => light.base(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Light::Directional(_) => "directional",
            Light::Point(_) => "point",
            Light::Spot(_) => "spot",
        }
    }

    /// Writes this light into `slot` of its kind's uniform array. The
    /// directional light has a single slot and ignores `slot`; a slot past
    /// the program's capacity writes nothing.
    pub fn apply_to(&self, uniforms: &ProgramUniforms, slot: usize, gpu: &dyn Gpu) {
        match self {
            Light::Directional(light) => light.apply_to(uniforms.directional_light(), gpu),
            Light::Point(light) => {
                if let Some(u) = uniforms.point_light(slot) {
                    light.apply_to(u, gpu);
                }
            }
            Light::Spot(light) => {
                if let Some(u) = uniforms.spot_light(slot) {
                    light.apply_to(u, gpu);
                }
            }
        }
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Light::Directional(light)
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

impl From<SpotLight> for Light {
    fn from(light: SpotLight) -> Self {
        Light::Spot(light)
    }
}
