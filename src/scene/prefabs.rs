use glam::Vec3;
use hecs::Entity;

use crate::components::{MeshHandle, Spin, TextureHandle, Transform};
use crate::lighting::Material;
use crate::scene::SceneContext;

/// Spawns a drawable: transform, mesh, diffuse texture and material.
pub fn spawn_textured_mesh(
    scene: &mut SceneContext,
    mesh: MeshHandle,
    texture: TextureHandle,
    material: Material,
    transform: Transform,
) -> Entity {
    scene.world.spawn((transform, mesh, texture, material))
}

/// Pyramid that turns about +Y at `degrees_per_second`.
pub fn spawn_spinning_pyramid(
    scene: &mut SceneContext,
    pyramid: MeshHandle,
    texture: TextureHandle,
    material: Material,
    position: Vec3,
    degrees_per_second: f32,
) -> Entity {
    let entity = spawn_textured_mesh(scene, pyramid, texture, material, Transform::new(position));
    let _ = scene.world.insert_one(
        entity,
        Spin {
            axis: Vec3::Y,
            degrees_per_second,
        },
    );
    entity
}

/// Flat ground plane at height `y`.
pub fn spawn_floor(
    scene: &mut SceneContext,
    floor: MeshHandle,
    texture: TextureHandle,
    material: Material,
    y: f32,
) -> Entity {
    spawn_textured_mesh(scene, floor, texture, material, Transform::new(Vec3::new(0.0, y, 0.0)))
}
