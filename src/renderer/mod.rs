pub mod frame;
pub mod mesh;
pub mod shader;
pub mod texture;
pub mod uniforms;

pub use frame::{FrameRenderer, FrameStats};
pub use shader::{ProgramState, ShaderProgram};

use hecs::World;
use mesh::Mesh;
use texture::Texture;

use crate::components::{Hidden, MeshHandle, TextureHandle, Transform};
use crate::lighting::Material;

/// Sampler unit of the diffuse texture.
pub const DIFFUSE_TEXTURE_UNIT: u32 = 0;
/// Sampler unit of the directional shadow map. Must differ from the diffuse unit.
pub const SHADOW_MAP_TEXTURE_UNIT: u32 = 1;

/// Holds all loaded meshes. Entities reference meshes by MeshHandle index.
#[derive(Default)]
pub struct MeshStore {
    meshes: Vec<Mesh>,
}

impl MeshStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mesh: Mesh) -> MeshHandle {
        let handle = MeshHandle(self.meshes.len());
        self.meshes.push(mesh);
        handle
    }

    pub fn get(&self, handle: MeshHandle) -> &Mesh {
        &self.meshes[handle.0]
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

#[derive(Default)]
pub struct TextureStore {
    textures: Vec<Texture>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, texture: Texture) -> TextureHandle {
        let handle = TextureHandle(self.textures.len());
        self.textures.push(texture);
        handle
    }

    pub fn get(&self, handle: TextureHandle) -> &Texture {
        &self.textures[handle.0]
    }
}

/// Draws every visible entity under the currently bound program.
///
/// Used unchanged by the shadow and color passes: texture and material are
/// bound before each draw, and a program that does not declare those
/// uniforms simply ignores them. A void program draws nothing. Returns the
/// number of draw calls.
pub fn render_scene(
    program: &ShaderProgram,
    world: &World,
    meshes: &MeshStore,
    textures: &TextureStore,
) -> usize {
    if program.is_void() {
        return 0;
    }
    let mut draws = 0;
    for (_entity, (transform, mesh, texture, material, hidden)) in world
        .query::<(&Transform, &MeshHandle, Option<&TextureHandle>, Option<&Material>, Option<&Hidden>)>()
        .iter()
    {
        if hidden.is_some() {
            continue;
        }
        program.set_model(&transform.matrix());
        if let Some(texture) = texture {
            textures.get(*texture).use_texture(DIFFUSE_TEXTURE_UNIT);
        }
        if let Some(material) = material {
            program.set_material(material);
        }
        meshes.get(*mesh).render();
        draws += 1;
    }
    draws
}
