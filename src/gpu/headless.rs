//! In-memory backend.
//!
//! Tracks the same implicit state a GL context would (current program,
//! bound framebuffer, viewport, texture units, uniform values) and records
//! every state change in order. Misuse that a driver would flag, such as a
//! uniform write with no program bound, is collected in [`HeadlessGpu::errors`]
//! instead of being silently dropped.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use glam::{Mat4, Vec3};

use super::{
    ClearTarget, Gpu, MeshBuffers, ShaderStage, UniformLocation, VertexLayout,
    DEFAULT_FRAMEBUFFER, FRAMEBUFFER_COMPLETE,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
}

/// Ordered record of state changes and draws.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuEvent {
    UseProgram(u32),
    BindFramebuffer(u32),
    Viewport { width: i32, height: i32 },
    Clear(ClearTarget),
    BindTexture { unit: u32, texture: u32 },
    Draw(DrawCall),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub program: u32,
    pub framebuffer: u32,
    pub vao: u32,
    pub index_count: i32,
}

#[derive(Default)]
struct ProgramRecord {
    sources: Vec<String>,
    linked: bool,
    /// Root uniform name -> declared array length (None for non-arrays).
    declared: HashMap<String, Option<usize>>,
    locations: HashMap<String, i32>,
    values: HashMap<i32, UniformValue>,
}

struct State {
    next_name: u32,
    shaders: HashMap<u32, String>,
    programs: HashMap<u32, ProgramRecord>,
    textures: HashMap<u32, (u32, u32)>,
    depth_textures: HashSet<u32>,
    framebuffers: HashSet<u32>,
    meshes: HashMap<u32, usize>,
    current_program: u32,
    framebuffer: u32,
    viewport: [i32; 4],
    texture_units: HashMap<u32, u32>,
    events: Vec<GpuEvent>,
    errors: Vec<String>,
    hidden_uniforms: HashSet<String>,
    link_failure: Option<String>,
    framebuffer_status: u32,
}

impl Default for State {
    fn default() -> Self {
        Self {
            next_name: 1,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            textures: HashMap::new(),
            depth_textures: HashSet::new(),
            framebuffers: HashSet::new(),
            meshes: HashMap::new(),
            current_program: 0,
            framebuffer: DEFAULT_FRAMEBUFFER,
            viewport: [0; 4],
            texture_units: HashMap::new(),
            events: Vec::new(),
            errors: Vec::new(),
            hidden_uniforms: HashSet::new(),
            link_failure: None,
            framebuffer_status: FRAMEBUFFER_COMPLETE,
        }
    }
}

impl State {
    fn gen_name(&mut self) -> u32 {
        let name = self.next_name;
        self.next_name += 1;
        name
    }

    fn write_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        if !location.is_found() {
            return;
        }
        let current = self.current_program;
        let Some(program) = self.programs.get_mut(&current) else {
            self.errors
                .push(format!("INVALID_OPERATION: uniform {} written with no program", location.raw()));
            return;
        };
        if !program.locations.values().any(|&l| l == location.raw()) {
            self.errors.push(format!(
                "INVALID_OPERATION: location {} does not belong to program {current}",
                location.raw()
            ));
            return;
        }
        program.values.insert(location.raw(), value);
    }
}

#[derive(Default)]
pub struct HeadlessGpu {
    state: RefCell<State>,
}

impl HeadlessGpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `name` resolve to `NOT_FOUND` in every program linked from now
    /// on, as if the compiler had optimised it out.
    pub fn hide_uniform(&self, name: &str) {
        self.state.borrow_mut().hidden_uniforms.insert(name.to_string());
    }

    /// The next link fails with `log`.
    pub fn fail_next_link(&self, log: &str) {
        self.state.borrow_mut().link_failure = Some(log.to_string());
    }

    /// Status reported by subsequent framebuffer completeness checks.
    pub fn force_framebuffer_status(&self, status: u32) {
        self.state.borrow_mut().framebuffer_status = status;
    }

    pub fn bound_framebuffer(&self) -> u32 {
        self.state.borrow().framebuffer
    }

    pub fn viewport_size(&self) -> (i32, i32) {
        let vp = self.state.borrow().viewport;
        (vp[2], vp[3])
    }

    /// Texture bound at `unit`, 0 if none.
    pub fn texture_at(&self, unit: u32) -> u32 {
        self.state.borrow().texture_units.get(&unit).copied().unwrap_or(0)
    }

    pub fn texture_size(&self, texture: u32) -> Option<(u32, u32)> {
        self.state.borrow().textures.get(&texture).copied()
    }

    pub fn is_depth_texture(&self, texture: u32) -> bool {
        self.state.borrow().depth_textures.contains(&texture)
    }

    pub fn is_live_program(&self, program: u32) -> bool {
        self.state.borrow().programs.contains_key(&program)
    }

    pub fn live_program_count(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn is_live_framebuffer(&self, framebuffer: u32) -> bool {
        self.state.borrow().framebuffers.contains(&framebuffer)
    }

    /// Last value written to `name` in `program`, if the name was resolved
    /// and written at least once.
    pub fn uniform(&self, program: u32, name: &str) -> Option<UniformValue> {
        let state = self.state.borrow();
        let record = state.programs.get(&program)?;
        let location = record.locations.get(name)?;
        record.values.get(location).copied()
    }

    /// Number of uniform values currently stored for `program`.
    pub fn uniform_write_count(&self, program: u32) -> usize {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map_or(0, |p| p.values.len())
    }

    pub fn events(&self) -> Vec<GpuEvent> {
        self.state.borrow().events.clone()
    }

    pub fn draw_calls(&self) -> Vec<DrawCall> {
        self.state
            .borrow()
            .events
            .iter()
            .filter_map(|e| match e {
                GpuEvent::Draw(call) => Some(*call),
                _ => None,
            })
            .collect()
    }

    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }

    pub fn errors(&self) -> Vec<String> {
        self.state.borrow().errors.clone()
    }
}

impl Gpu for HeadlessGpu {
    fn init_state(&self, _clear_color: Vec3) {}

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        let mut state = self.state.borrow_mut();
        state.viewport = [x, y, width, height];
        state.events.push(GpuEvent::Viewport { width, height });
    }

    fn clear(&self, target: ClearTarget) {
        self.state.borrow_mut().events.push(GpuEvent::Clear(target));
    }

    fn create_program(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let name = state.gen_name();
        state.programs.insert(name, ProgramRecord::default());
        name
    }

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<u32, String> {
        if let Some(line) = source.lines().position(|l| l.trim_start().starts_with("#error")) {
            return Err(format!("0:{}(1): error: #error directive in {stage} shader", line + 1));
        }
        if !source.contains("main") {
            return Err("0:1(1): error: function `main' is undefined".to_string());
        }
        let declared = declared_uniforms(&[source.to_string()]);
        if let Some((name, _)) = declared.iter().find(|(_, len)| **len == Some(0)) {
            return Err(format!("0:1(1): error: array size of `{name}' must be greater than zero"));
        }
        let mut state = self.state.borrow_mut();
        let name = state.gen_name();
        state.shaders.insert(name, source.to_string());
        Ok(name)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        let Some(source) = state.shaders.get(&shader).cloned() else {
            state.errors.push(format!("INVALID_VALUE: shader {shader} does not exist"));
            return;
        };
        match state.programs.get_mut(&program) {
            Some(record) => record.sources.push(source),
            None => state.errors.push(format!("INVALID_VALUE: program {program} does not exist")),
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn link_program(&self, program: u32) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        if let Some(log) = state.link_failure.take() {
            return Err(log);
        }
        let Some(record) = state.programs.get_mut(&program) else {
            return Err(format!("program {program} does not exist"));
        };
        if record.sources.len() < 2 {
            return Err("program needs a vertex and a fragment stage".to_string());
        }
        record.declared = declared_uniforms(&record.sources);
        record.locations.clear();
        record.values.clear();
        record.linked = true;
        Ok(())
    }

    fn validate_program(&self, program: u32) -> Result<(), String> {
        match self.state.borrow().programs.get(&program) {
            Some(record) if record.linked => Ok(()),
            _ => Err(format!("program {program} is not linked")),
        }
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        if state.current_program == program {
            state.current_program = 0;
        }
    }

    fn use_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let linked = state.programs.get(&program).is_some_and(|p| p.linked);
        if program != 0 && !linked {
            state.errors.push(format!("INVALID_OPERATION: program {program} is not linked"));
            return;
        }
        state.current_program = program;
        state.events.push(GpuEvent::UseProgram(program));
    }

    fn current_program(&self) -> u32 {
        self.state.borrow().current_program
    }

    fn uniform_location(&self, program: u32, name: &str) -> UniformLocation {
        let mut state = self.state.borrow_mut();
        if state.hidden_uniforms.contains(name) {
            return UniformLocation::NOT_FOUND;
        }
        let Some(record) = state.programs.get_mut(&program) else {
            return UniformLocation::NOT_FOUND;
        };
        if !record.linked || !is_declared(&record.declared, name) {
            return UniformLocation::NOT_FOUND;
        }
        let next = record.locations.len() as i32;
        UniformLocation::new(*record.locations.entry(name.to_string()).or_insert(next))
    }

    fn uniform_i32(&self, location: UniformLocation, value: i32) {
        self.state.borrow_mut().write_uniform(location, UniformValue::Int(value));
    }

    fn uniform_f32(&self, location: UniformLocation, value: f32) {
        self.state.borrow_mut().write_uniform(location, UniformValue::Float(value));
    }

    fn uniform_vec3(&self, location: UniformLocation, value: Vec3) {
        self.state.borrow_mut().write_uniform(location, UniformValue::Vec3(value));
    }

    fn uniform_mat4(&self, location: UniformLocation, value: &Mat4) {
        self.state.borrow_mut().write_uniform(location, UniformValue::Mat4(*value));
    }

    fn create_texture_rgba(&self, width: u32, height: u32, _pixels: &[u8]) -> u32 {
        let mut state = self.state.borrow_mut();
        let name = state.gen_name();
        state.textures.insert(name, (width, height));
        name
    }

    fn create_depth_texture(&self, width: u32, height: u32) -> u32 {
        let mut state = self.state.borrow_mut();
        let name = state.gen_name();
        state.textures.insert(name, (width, height));
        state.depth_textures.insert(name);
        name
    }

    fn bind_texture(&self, unit: u32, texture: u32) {
        let mut state = self.state.borrow_mut();
        state.texture_units.insert(unit, texture);
        state.events.push(GpuEvent::BindTexture { unit, texture });
    }

    fn delete_texture(&self, texture: u32) {
        let mut state = self.state.borrow_mut();
        state.textures.remove(&texture);
        state.depth_textures.remove(&texture);
        state.texture_units.retain(|_, bound| *bound != texture);
    }

    fn create_framebuffer(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let name = state.gen_name();
        state.framebuffers.insert(name);
        name
    }

    fn attach_depth_texture(&self, framebuffer: u32, texture: u32) -> u32 {
        let state = self.state.borrow();
        if !state.framebuffers.contains(&framebuffer) || !state.depth_textures.contains(&texture) {
            // GL_FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT
            return 0x8CD7;
        }
        state.framebuffer_status
    }

    fn bind_framebuffer(&self, framebuffer: u32) {
        let mut state = self.state.borrow_mut();
        if framebuffer != DEFAULT_FRAMEBUFFER && !state.framebuffers.contains(&framebuffer) {
            state.errors.push(format!("INVALID_OPERATION: framebuffer {framebuffer} does not exist"));
            return;
        }
        state.framebuffer = framebuffer;
        state.events.push(GpuEvent::BindFramebuffer(framebuffer));
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        let mut state = self.state.borrow_mut();
        state.framebuffers.remove(&framebuffer);
        if state.framebuffer == framebuffer {
            state.framebuffer = DEFAULT_FRAMEBUFFER;
        }
    }

    fn create_mesh(&self, _vertices: &[f32], indices: &[u32], _layout: &VertexLayout) -> MeshBuffers {
        let mut state = self.state.borrow_mut();
        let vao = state.gen_name();
        let vbo = state.gen_name();
        let ebo = state.gen_name();
        state.meshes.insert(vao, indices.len());
        MeshBuffers { vao, vbo, ebo }
    }

    fn draw_indexed(&self, vao: u32, index_count: i32) {
        let mut state = self.state.borrow_mut();
        if state.current_program == 0 {
            state.errors.push("INVALID_OPERATION: draw with no program bound".to_string());
        }
        if !state.meshes.contains_key(&vao) {
            state.errors.push(format!("INVALID_OPERATION: vertex array {vao} does not exist"));
            return;
        }
        let call = DrawCall {
            program: state.current_program,
            framebuffer: state.framebuffer,
            vao,
            index_count,
        };
        state.events.push(GpuEvent::Draw(call));
    }

    fn delete_mesh(&self, buffers: MeshBuffers) {
        self.state.borrow_mut().meshes.remove(&buffers.vao);
    }
}

/// Collects `uniform` declarations from GLSL sources, resolving array
/// lengths given as literals or `#define`d names.
fn declared_uniforms(sources: &[String]) -> HashMap<String, Option<usize>> {
    let mut defines: HashMap<String, usize> = HashMap::new();
    let mut declared = HashMap::new();

    for line in sources.iter().flat_map(|s| s.lines()) {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("#define") {
            let mut parts = rest.split_whitespace();
            if let (Some(name), Some(value)) = (parts.next(), parts.next()) {
                if let Ok(value) = value.parse() {
                    defines.insert(name.to_string(), value);
                }
            }
            continue;
        }
        let Some(decl) = line.strip_prefix("uniform ") else {
            continue;
        };
        let decl = decl.split(';').next().unwrap_or_default();
        let Some(name) = decl.split_whitespace().last() else {
            continue;
        };
        match name.split_once('[') {
            Some((root, len)) => {
                let len = len.trim_end_matches(']');
                let len = len.parse().ok().or_else(|| defines.get(len).copied());
                declared.insert(root.to_string(), len);
            }
            None => {
                declared.insert(name.to_string(), None);
            }
        }
    }
    declared
}

fn is_declared(declared: &HashMap<String, Option<usize>>, name: &str) -> bool {
    let root_end = name.find(['[', '.']).unwrap_or(name.len());
    let Some(len) = declared.get(&name[..root_end]) else {
        return false;
    };
    let rest = &name[root_end..];
    match (rest.strip_prefix('['), len) {
        (Some(index), Some(len)) => index
            .split(']')
            .next()
            .and_then(|i| i.parse::<usize>().ok())
            .is_some_and(|i| i < *len),
        (Some(_), None) => false,
        (None, _) => true,
    }
}
