//! Uniform handle cache.
//!
//! Resolved once after a successful link and stored beside the program.
//! Names the linked program does not expose resolve to
//! [`UniformLocation::NOT_FOUND`]; writes to them are ignored.

use log::debug;

use crate::config::LightCapacity;
use crate::gpu::{Gpu, UniformLocation};

pub const MODEL: &str = "u_model";
pub const VIEW: &str = "u_view";
pub const PROJECTION: &str = "u_projection";
pub const EYE_POSITION: &str = "u_eye_position";
pub const TEXTURE: &str = "u_texture";
pub const DIRECTIONAL_SHADOW_MAP: &str = "u_directional_shadow_map";
pub const DIRECTIONAL_LIGHT_TRANSFORM: &str = "u_directional_light_transform";
pub const DIRECTIONAL_LIGHT: &str = "u_directional_light";
pub const POINT_LIGHTS: &str = "u_point_lights";
pub const SPOT_LIGHTS: &str = "u_spot_lights";
pub const POINT_LIGHT_COUNT: &str = "u_point_light_count";
pub const SPOT_LIGHT_COUNT: &str = "u_spot_light_count";
pub const MATERIAL: &str = "u_material";

struct Resolver<'a> {
    gpu: &'a dyn Gpu,
    program: u32,
    found: usize,
    total: usize,
}

impl Resolver<'_> {
    fn get(&mut self, name: &str) -> UniformLocation {
        let location = self.gpu.uniform_location(self.program, name);
        self.total += 1;
        if location.is_found() {
            self.found += 1;
        }
        location
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightUniforms {
    pub color: UniformLocation,
    pub ambient_intensity: UniformLocation,
    pub diffuse_intensity: UniformLocation,
}

impl LightUniforms {
    fn resolve(r: &mut Resolver, prefix: &str) -> Self {
        Self {
            color: r.get(&format!("{prefix}.color")),
            ambient_intensity: r.get(&format!("{prefix}.ambient_intensity")),
            diffuse_intensity: r.get(&format!("{prefix}.diffuse_intensity")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionalLightUniforms {
    pub base: LightUniforms,
    pub direction: UniformLocation,
}

impl DirectionalLightUniforms {
    fn resolve(r: &mut Resolver, prefix: &str) -> Self {
        Self {
            base: LightUniforms::resolve(r, &format!("{prefix}.base")),
            direction: r.get(&format!("{prefix}.direction")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointLightUniforms {
    pub base: LightUniforms,
    pub position: UniformLocation,
    pub constant: UniformLocation,
    pub linear: UniformLocation,
    pub exponent: UniformLocation,
}

impl PointLightUniforms {
    fn resolve(r: &mut Resolver, prefix: &str) -> Self {
        Self {
            base: LightUniforms::resolve(r, &format!("{prefix}.base")),
            position: r.get(&format!("{prefix}.position")),
            constant: r.get(&format!("{prefix}.constant")),
            linear: r.get(&format!("{prefix}.linear")),
            exponent: r.get(&format!("{prefix}.exponent")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpotLightUniforms {
    pub point: PointLightUniforms,
    pub direction: UniformLocation,
    pub edge: UniformLocation,
}

impl SpotLightUniforms {
    fn resolve(r: &mut Resolver, prefix: &str) -> Self {
        Self {
            point: PointLightUniforms::resolve(r, &format!("{prefix}.point")),
            direction: r.get(&format!("{prefix}.direction")),
            edge: r.get(&format!("{prefix}.edge")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialUniforms {
    pub specular_intensity: UniformLocation,
    pub shininess: UniformLocation,
}

/// Every handle the renderer writes, with one entry per light slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramUniforms {
    model: UniformLocation,
    view: UniformLocation,
    projection: UniformLocation,
    eye_position: UniformLocation,
    texture: UniformLocation,
    directional_shadow_map: UniformLocation,
    directional_light_transform: UniformLocation,
    point_light_count: UniformLocation,
    spot_light_count: UniformLocation,
    material: MaterialUniforms,
    directional_light: DirectionalLightUniforms,
    point_lights: Vec<PointLightUniforms>,
    spot_lights: Vec<SpotLightUniforms>,
}

impl ProgramUniforms {
    /// Looks up every handle of the fixed interface in a linked program.
    pub fn resolve(gpu: &dyn Gpu, program: u32, capacity: LightCapacity) -> Self {
        let mut r = Resolver {
            gpu,
            program,
            found: 0,
            total: 0,
        };

        let uniforms = Self {
            model: r.get(MODEL),
            view: r.get(VIEW),
            projection: r.get(PROJECTION),
            eye_position: r.get(EYE_POSITION),
            texture: r.get(TEXTURE),
            directional_shadow_map: r.get(DIRECTIONAL_SHADOW_MAP),
            directional_light_transform: r.get(DIRECTIONAL_LIGHT_TRANSFORM),
            point_light_count: r.get(POINT_LIGHT_COUNT),
            spot_light_count: r.get(SPOT_LIGHT_COUNT),
            material: MaterialUniforms {
                specular_intensity: r.get(&format!("{MATERIAL}.specular_intensity")),
                shininess: r.get(&format!("{MATERIAL}.shininess")),
            },
            directional_light: DirectionalLightUniforms::resolve(&mut r, DIRECTIONAL_LIGHT),
            point_lights: (0..capacity.point)
                .map(|i| PointLightUniforms::resolve(&mut r, &format!("{POINT_LIGHTS}[{i}]")))
                .collect(),
            spot_lights: (0..capacity.spot)
                .map(|i| SpotLightUniforms::resolve(&mut r, &format!("{SPOT_LIGHTS}[{i}]")))
                .collect(),
        };

        debug!(
            "Program {program}: {} of {} uniforms resolved",
            r.found, r.total
        );
        uniforms
    }

    pub fn model(&self) -> UniformLocation {
        self.model
    }

    pub fn view(&self) -> UniformLocation {
        self.view
    }

    pub fn projection(&self) -> UniformLocation {
        self.projection
    }

    pub fn eye_position(&self) -> UniformLocation {
        self.eye_position
    }

    pub fn texture(&self) -> UniformLocation {
        self.texture
    }

    pub fn directional_shadow_map(&self) -> UniformLocation {
        self.directional_shadow_map
    }

    pub fn directional_light_transform(&self) -> UniformLocation {
        self.directional_light_transform
    }

    pub fn point_light_count(&self) -> UniformLocation {
        self.point_light_count
    }

    pub fn spot_light_count(&self) -> UniformLocation {
        self.spot_light_count
    }

    pub fn material(&self) -> &MaterialUniforms {
        &self.material
    }

    pub fn directional_light(&self) -> &DirectionalLightUniforms {
        &self.directional_light
    }

    pub fn point_light(&self, slot: usize) -> Option<&PointLightUniforms> {
        self.point_lights.get(slot)
    }

    pub fn spot_light(&self, slot: usize) -> Option<&SpotLightUniforms> {
        self.spot_lights.get(slot)
    }

    pub fn point_slots(&self) -> usize {
        self.point_lights.len()
    }

    pub fn spot_slots(&self) -> usize {
        self.spot_lights.len()
    }

    /// Forgets the model/view/projection handles. Light and material
    /// handles are only replaced by a new link.
    pub(crate) fn reset_transforms(&mut self) {
        self.model = UniformLocation::NOT_FOUND;
        self.view = UniformLocation::NOT_FOUND;
        self.projection = UniformLocation::NOT_FOUND;
    }
}
