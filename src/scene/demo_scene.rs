use glam::Vec3;
use log::info;

use crate::components::Transform;
use crate::config::RenderConfig;
use crate::error::Result;
use crate::gpu::GpuHandle;
use crate::lighting::{Attenuation, DirectionalLight, Light, LightBase, Material, PointLight, SpotLight};
use crate::renderer::mesh::{create_floor, create_pyramid, create_sphere};
use crate::renderer::texture::Texture;
use crate::scene::prefabs::{spawn_floor, spawn_spinning_pyramid, spawn_textured_mesh};
use crate::scene::{Flashlight, SceneContext, SceneLights};

const BRICK: ([u8; 4], [u8; 4]) = ([168, 64, 48, 255], [120, 40, 32, 255]);
const DIRT: ([u8; 4], [u8; 4]) = ([112, 84, 52, 255], [92, 66, 40, 255]);
const PLAIN: [u8; 4] = [255, 255, 255, 255];

/// Builds the demo scene: two pyramids, a sphere and a floor lit by one
/// shadow-casting directional light, two point lights and two spot lights.
/// Spot light 0 is the camera flashlight.
pub fn build_demo_scene(gpu: &GpuHandle, config: &RenderConfig) -> Result<SceneContext> {
    let mut scene = SceneContext::new(demo_lights(gpu, config)?);
    scene.flashlight = Some(Flashlight::new(0));

    let brick = scene.textures.add(Texture::checker(gpu.clone(), 64, 8, BRICK.0, BRICK.1)?);
    let dirt = scene.textures.add(Texture::checker(gpu.clone(), 64, 4, DIRT.0, DIRT.1)?);
    let plain = scene.textures.add(Texture::solid(gpu.clone(), PLAIN)?);

    let pyramid = scene.meshes.add(create_pyramid(gpu.clone()));
    let floor = scene.meshes.add(create_floor(gpu.clone(), 10.0, 10.0));
    let sphere = scene.meshes.add(create_sphere(gpu.clone(), 0.75, 16, 24));

    spawn_spinning_pyramid(
        &mut scene,
        pyramid,
        brick,
        Material::glossy(),
        Vec3::new(0.0, 0.0, -2.5),
        30.0,
    );
    spawn_textured_mesh(
        &mut scene,
        pyramid,
        dirt,
        Material::matte(),
        Transform::new(Vec3::new(0.0, 4.0, -2.5)),
    );
    spawn_textured_mesh(
        &mut scene,
        sphere,
        plain,
        Material::glossy(),
        Transform::new(Vec3::new(3.0, -1.25, -4.0)),
    );
    spawn_floor(&mut scene, floor, plain, Material::glossy(), -2.0);

    info!(
        "Demo scene: {} meshes, {} point lights, {} spot lights",
        scene.meshes.len(),
        scene.lights.point_lights().len(),
        scene.lights.spot_lights().len()
    );
    Ok(scene)
}

fn demo_lights(gpu: &GpuHandle, config: &RenderConfig) -> Result<SceneLights> {
    let sun = DirectionalLight::new(
        gpu.clone(),
        LightBase::new(Vec3::ONE, 0.1, 0.3),
        Vec3::new(0.0, -15.0, -10.0),
        (config.shadow_width, config.shadow_height),
        config.scene_bounds,
    )?;

    let lights: [Light; 5] = [
        sun.into(),
        PointLight::new(
            LightBase::new(Vec3::new(0.0, 0.0, 1.0), 0.0, 1.0),
            Vec3::new(4.0, 0.0, 0.0),
            Attenuation::new(0.3, 0.2, 0.1),
        )
        .into(),
        PointLight::new(
            LightBase::new(Vec3::new(0.0, 1.0, 0.0), 0.0, 1.0),
            Vec3::new(-4.0, 2.0, 0.0),
            Attenuation::new(0.3, 0.1, 0.1),
        )
        .into(),
        SpotLight::new(
            LightBase::new(Vec3::ONE, 0.0, 2.0),
            Vec3::ZERO,
            Vec3::NEG_Y,
            Attenuation::new(1.0, 0.0, 0.0),
            20.0,
        )
        .into(),
        SpotLight::new(
            LightBase::new(Vec3::ONE, 0.0, 1.0),
            Vec3::new(0.0, -1.5, 0.0),
            Vec3::new(-100.0, -1.0, 0.0),
            Attenuation::new(1.0, 0.0, 0.0),
            20.0,
        )
        .into(),
    ];
    Ok(SceneLights::from_lights(lights))
}
