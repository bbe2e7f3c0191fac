pub mod demo_scene;
pub mod prefabs;

use glam::Vec3;
use hecs::World;
use log::warn;

use crate::camera::CameraPose;
use crate::lighting::{DirectionalLight, Light, PointLight, SpotLight};
use crate::renderer::{MeshStore, TextureStore};
use crate::systems::spin_system;

/// The lights of one scene, grouped by kind.
///
/// At most one directional light exists; it is the only shadow caster.
/// Point and spot lists may exceed the program capacity; the extras are
/// simply not uploaded.
#[derive(Default)]
pub struct SceneLights {
    directional: Option<DirectionalLight>,
    points: Vec<PointLight>,
    spots: Vec<SpotLight>,
}

impl SceneLights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorts lights by kind, preserving order. A second directional light
    /// is dropped with a warning.
    pub fn from_lights(lights: impl IntoIterator<Item = Light>) -> Self {
        let mut scene_lights = Self::new();
        for light in lights {
            scene_lights.add(light);
        }
        scene_lights
    }

    pub fn add(&mut self, light: Light) {
        match light {
            Light::Directional(light) => {
                if self.directional.is_some() {
                    warn!("Scene already has a directional light; ignoring another one");
                } else {
                    self.directional = Some(light);
                }
            }
            Light::Point(light) => self.points.push(light),
            Light::Spot(light) => self.spots.push(light),
        }
    }

    pub fn directional(&self) -> Option<&DirectionalLight> {
        self.directional.as_ref()
    }

    pub fn point_lights(&self) -> &[PointLight] {
        &self.points
    }

    pub fn spot_lights(&self) -> &[SpotLight] {
        &self.spots
    }

    pub fn spot_light_mut(&mut self, index: usize) -> Option<&mut SpotLight> {
        self.spots.get_mut(index)
    }
}

/// Binds one spot light to the camera so it follows the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flashlight {
    pub spot_index: usize,
    /// Added to the camera position; keeps the cone origin just below the eye.
    pub offset: Vec3,
    /// When false the light stays where it was last placed.
    pub follow: bool,
}

impl Flashlight {
    pub fn new(spot_index: usize) -> Self {
        Self {
            spot_index,
            offset: Vec3::new(0.0, -0.3, 0.0),
            follow: true,
        }
    }

    pub fn apply(&self, lights: &mut SceneLights, pose: CameraPose) {
        if !self.follow {
            return;
        }
        if let Some(spot) = lights.spot_light_mut(self.spot_index) {
            spot.set_flash(pose.position + self.offset, pose.direction);
        }
    }
}

/// Everything a frame draws: drawable entities, the GPU resources they
/// reference, and the lights.
pub struct SceneContext {
    pub world: World,
    pub meshes: MeshStore,
    pub textures: TextureStore,
    pub lights: SceneLights,
    pub flashlight: Option<Flashlight>,
}

impl SceneContext {
    pub fn new(lights: SceneLights) -> Self {
        Self {
            world: World::new(),
            meshes: MeshStore::new(),
            textures: TextureStore::new(),
            lights,
            flashlight: None,
        }
    }

    /// Per-frame scene update: animates spinning entities and moves the
    /// flashlight to the camera.
    pub fn update(&mut self, pose: CameraPose, dt: f32) {
        spin_system(&mut self.world, dt);
        if let Some(flashlight) = self.flashlight {
            flashlight.apply(&mut self.lights, pose);
        }
    }
}
