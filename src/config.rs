//! Renderer configuration.
//!
//! Every knob has a default matching the demo scene; the command line in
//! `main.rs` overrides the ones users commonly change.

use glam::{Mat4, Vec3};

/// How many point and spot lights the shading program can hold. The values
/// are injected into the GLSL sources as `MAX_POINT_LIGHTS` /
/// `MAX_SPOT_LIGHTS`, so CPU and GPU always agree on the array sizes.
/// GLSL has no zero-length arrays, so each kind holds at least one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightCapacity {
    pub point: usize,
    pub spot: usize,
}

impl LightCapacity {
    pub fn new(point: usize, spot: usize) -> Self {
        Self {
            point: point.max(1),
            spot: spot.max(1),
        }
    }
}

impl Default for LightCapacity {
    fn default() -> Self {
        Self { point: 3, spot: 3 }
    }
}

/// Box covered by the directional light's orthographic shadow projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBounds {
    pub center: Vec3,
    /// Half width and half height of the box, in world units.
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from `center` to the virtual light eye, against the light direction.
    pub light_distance: f32,
}

impl Default for SceneBounds {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            half_extent: 20.0,
            near: 0.1,
            far: 100.0,
            light_distance: 20.0,
        }
    }
}

impl SceneBounds {
    pub fn projection(&self) -> Mat4 {
        let h = self.half_extent;
        Mat4::orthographic_rh_gl(-h, h, -h, h, self.near, self.far)
    }

    /// Look-at view onto `center` from the side the light comes from.
    /// `direction` need not be normalized; a zero vector means straight down.
    pub fn light_view(&self, direction: Vec3) -> Mat4 {
        let dir = direction.try_normalize().unwrap_or(Vec3::NEG_Y);
        let up = if dir.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
        let eye = self.center - dir * self.light_distance;
        Mat4::look_at_rh(eye, self.center, up)
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub light_capacity: LightCapacity,
    pub shadow_width: u32,
    pub shadow_height: u32,
    pub scene_bounds: SceneBounds,
    pub clear_color: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            light_capacity: LightCapacity::default(),
            shadow_width: 2048,
            shadow_height: 2048,
            scene_bounds: SceneBounds::default(),
            clear_color: Vec3::ZERO,
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}
