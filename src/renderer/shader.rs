use glam::{Mat4, Vec3};
use log::{error, info, trace};

use crate::config::LightCapacity;
use crate::error::{RenderError, Result};
use crate::gpu::{GpuHandle, ShaderStage};
use crate::lighting::{DirectionalLight, Light, Material, PointLight, SpotLight};
use crate::renderer::uniforms::ProgramUniforms;

/// Lifecycle of a [`ShaderProgram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramState {
    Uninitialized,
    Compiling,
    /// Compile, link or validation failed; the program is void.
    LinkFailed,
    Linked,
    /// Linked and currently bound on the GPU.
    Active,
    /// Released by `clear`. Terminal.
    Cleared,
}

/// A linked vertex + fragment program and its uniform handles.
///
/// A program whose build failed keeps handle 0 (it is "void"): binding it
/// unbinds any program and every setter is a no-op.
pub struct ShaderProgram {
    gpu: GpuHandle,
    id: u32,
    state: ProgramState,
    capacity: LightCapacity,
    uniforms: ProgramUniforms,
}

impl ShaderProgram {
    pub fn new(gpu: GpuHandle, capacity: LightCapacity) -> Self {
        Self {
            gpu,
            id: 0,
            state: ProgramState::Uninitialized,
            capacity,
            uniforms: ProgramUniforms::default(),
        }
    }

    /// Builds a program, logging any failure and returning it void instead.
    pub fn from_sources(gpu: GpuHandle, capacity: LightCapacity, vert_src: &str, frag_src: &str) -> Self {
        let mut program = Self::new(gpu, capacity);
        if let Err(e) = program.compile_and_link(vert_src, frag_src) {
            error!("{e}");
        }
        program
    }

    /// Compiles both stages, links, validates, then resolves every uniform
    /// handle once. Any previous program object is released first. A
    /// cleared program stays cleared.
    pub fn compile_and_link(&mut self, vert_src: &str, frag_src: &str) -> Result<()> {
        if self.state == ProgramState::Cleared {
            return Err(RenderError::ProgramCleared);
        }
        if self.id != 0 {
            self.gpu.delete_program(self.id);
            self.id = 0;
        }
        self.state = ProgramState::Compiling;

        // Arrays keep one slot even at zero capacity; the count uniform stays 0.
        let defines = [
            ("MAX_POINT_LIGHTS", self.capacity.point.max(1)),
            ("MAX_SPOT_LIGHTS", self.capacity.spot.max(1)),
        ];
        let vert_src = inject_defines(vert_src, &defines);
        let frag_src = inject_defines(frag_src, &defines);

        match self.build(&vert_src, &frag_src) {
            Ok(id) => {
                self.id = id;
                self.uniforms = ProgramUniforms::resolve(self.gpu.as_ref(), id, self.capacity);
                self.state = ProgramState::Linked;
                info!("Shader program {id} linked");
                Ok(())
            }
            Err(e) => {
                self.uniforms = ProgramUniforms::default();
                self.state = ProgramState::LinkFailed;
                Err(e)
            }
        }
    }

    fn build(&self, vert_src: &str, frag_src: &str) -> Result<u32> {
        let gpu = self.gpu.as_ref();
        let program = gpu.create_program();
        if program == 0 {
            return Err(RenderError::ResourceCreation {
                resource: "shader program",
            });
        }

        let vert = match gpu.compile_shader(ShaderStage::Vertex, vert_src) {
            Ok(shader) => shader,
            Err(log) => {
                gpu.delete_program(program);
                return Err(RenderError::Compile {
                    stage: ShaderStage::Vertex,
                    log,
                });
            }
        };
        let frag = match gpu.compile_shader(ShaderStage::Fragment, frag_src) {
            Ok(shader) => shader,
            Err(log) => {
                gpu.delete_shader(vert);
                gpu.delete_program(program);
                return Err(RenderError::Compile {
                    stage: ShaderStage::Fragment,
                    log,
                });
            }
        };

        gpu.attach_shader(program, vert);
        gpu.attach_shader(program, frag);
        let linked = gpu.link_program(program);
        gpu.delete_shader(vert);
        gpu.delete_shader(frag);

        if let Err(log) = linked {
            gpu.delete_program(program);
            return Err(RenderError::Link { log });
        }
        if let Err(log) = gpu.validate_program(program) {
            gpu.delete_program(program);
            return Err(RenderError::Validate { log });
        }
        Ok(program)
    }

    /// Makes this the current program. A void program unbinds instead.
    pub fn bind(&self) {
        if self.is_void() {
            trace!("Binding void shader program");
        }
        self.gpu.use_program(self.id);
    }

    /// Releases the program object. Transform handles are forgotten; light
    /// and material handles stay until the next `compile_and_link`.
    pub fn clear(&mut self) {
        if self.id != 0 {
            self.gpu.delete_program(self.id);
            self.id = 0;
        }
        self.uniforms.reset_transforms();
        self.state = ProgramState::Cleared;
    }

    pub fn state(&self) -> ProgramState {
        if self.state == ProgramState::Linked && self.gpu.current_program() == self.id {
            ProgramState::Active
        } else {
            self.state
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn is_void(&self) -> bool {
        self.id == 0
    }

    pub fn capacity(&self) -> LightCapacity {
        self.capacity
    }

    pub fn uniforms(&self) -> &ProgramUniforms {
        &self.uniforms
    }

    pub fn set_model(&self, model: &Mat4) {
        if !self.is_void() {
            self.gpu.uniform_mat4(self.uniforms.model(), model);
        }
    }

    pub fn set_view(&self, view: &Mat4) {
        if !self.is_void() {
            self.gpu.uniform_mat4(self.uniforms.view(), view);
        }
    }

    pub fn set_projection(&self, projection: &Mat4) {
        if !self.is_void() {
            self.gpu.uniform_mat4(self.uniforms.projection(), projection);
        }
    }

    pub fn set_eye_position(&self, eye: Vec3) {
        if !self.is_void() {
            self.gpu.uniform_vec3(self.uniforms.eye_position(), eye);
        }
    }

    pub fn set_material(&self, material: &Material) {
        if !self.is_void() {
            material.apply_to(self.uniforms.material(), self.gpu.as_ref());
        }
    }

    pub fn set_directional_light(&self, light: &DirectionalLight) {
        if !self.is_void() {
            light.apply_to(self.uniforms.directional_light(), self.gpu.as_ref());
        }
    }

    /// Writes up to `capacity.point` lights into consecutive slots and
    /// pushes the count written. Lights past capacity are dropped; slots past
    /// the count keep whatever they held. Returns the count written.
    pub fn set_point_lights(&self, lights: &[PointLight]) -> usize {
        if self.is_void() {
            return 0;
        }
        let count = lights.len().min(self.uniforms.point_slots());
        self.gpu.uniform_i32(self.uniforms.point_light_count(), count as i32);
        for (slot, light) in lights.iter().take(count).enumerate() {
            if let Some(uniforms) = self.uniforms.point_light(slot) {
                light.apply_to(uniforms, self.gpu.as_ref());
            }
        }
        count
    }

    /// Spot-light counterpart of [`set_point_lights`](Self::set_point_lights).
    pub fn set_spot_lights(&self, lights: &[SpotLight]) -> usize {
        if self.is_void() {
            return 0;
        }
        let count = lights.len().min(self.uniforms.spot_slots());
        self.gpu.uniform_i32(self.uniforms.spot_light_count(), count as i32);
        for (slot, light) in lights.iter().take(count).enumerate() {
            if let Some(uniforms) = self.uniforms.spot_light(slot) {
                light.apply_to(uniforms, self.gpu.as_ref());
            }
        }
        count
    }

    /// Writes one light into `slot` of its kind's array without touching the
    /// light counts. Slots past capacity are ignored.
    pub fn set_light(&self, light: &Light, slot: usize) {
        if !self.is_void() {
            light.apply_to(&self.uniforms, slot, self.gpu.as_ref());
        }
    }

    pub fn set_texture(&self, unit: u32) {
        if !self.is_void() {
            self.gpu.uniform_i32(self.uniforms.texture(), unit as i32);
        }
    }

    pub fn set_directional_shadow_map(&self, unit: u32) {
        if !self.is_void() {
            self.gpu.uniform_i32(self.uniforms.directional_shadow_map(), unit as i32);
        }
    }

    pub fn set_directional_light_transform(&self, transform: &Mat4) {
        if !self.is_void() {
            self.gpu.uniform_mat4(self.uniforms.directional_light_transform(), transform);
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if self.id != 0 {
            self.gpu.delete_program(self.id);
        }
    }
}

/// Inserts `#define NAME value` lines right after the `#version` directive,
/// or at the top when there is none.
pub fn inject_defines(source: &str, defines: &[(&str, usize)]) -> String {
    let block: String = defines
        .iter()
        .map(|(name, value)| format!("#define {name} {value}\n"))
        .collect();

    let version_line = source
        .lines()
        .next()
        .filter(|line| line.trim_start().starts_with("#version"));
    match version_line {
        Some(line) => {
            let rest = source[line.len()..].trim_start_matches(['\r', '\n']);
            format!("{line}\n{block}{rest}")
        }
        None => format!("{block}{source}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defines_follow_version_line() {
        let out = inject_defines("#version 330\nvoid main() {}\n", &[("MAX_POINT_LIGHTS", 4)]);
        assert_eq!(out, "#version 330\n#define MAX_POINT_LIGHTS 4\nvoid main() {}\n");
    }

    #[test]
    fn defines_go_first_without_version() {
        let out = inject_defines("void main() {}", &[("A", 1), ("B", 2)]);
        assert_eq!(out, "#define A 1\n#define B 2\nvoid main() {}");
    }
}
