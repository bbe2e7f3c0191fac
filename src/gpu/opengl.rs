use gl::types::*;
use glam::{Mat4, Vec3};
use std::ffi::CString;
use std::marker::PhantomData;
use std::{mem, ptr};

use super::{ClearTarget, Gpu, MeshBuffers, ShaderStage, UniformLocation, VertexLayout};

/// OpenGL backend. Requires a current context whose function pointers have
/// been loaded with `gl::load_with` (see `engine::window`).
pub struct GlGpu {
    // GL contexts are bound to the thread that made them current.
    _not_send: PhantomData<*const ()>,
}

impl GlGpu {
    pub fn new() -> Self {
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Default for GlGpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Gpu for GlGpu {
    fn init_state(&self, clear_color: Vec3) {
        unsafe {
            gl::Enable(gl::DEPTH_TEST);
            gl::ClearColor(clear_color.x, clear_color.y, clear_color.z, 1.0);
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe {
            gl::Viewport(x, y, width, height);
        }
    }

    fn clear(&self, target: ClearTarget) {
        let mask = match target {
            ClearTarget::Depth => gl::DEPTH_BUFFER_BIT,
            ClearTarget::ColorAndDepth => gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT,
        };
        unsafe {
            gl::Clear(mask);
        }
    }

    fn create_program(&self) -> u32 {
        unsafe { gl::CreateProgram() }
    }

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<u32, String> {
        let c_src = CString::new(source).map_err(|e| format!("source contains NUL: {e}"))?;
        let shader_type = match stage {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        };
        unsafe {
            let shader = gl::CreateShader(shader_type);
            if shader == 0 {
                return Err("glCreateShader returned 0".to_string());
            }
            gl::ShaderSource(shader, 1, &c_src.as_ptr(), ptr::null());
            gl::CompileShader(shader);

            let mut success = 0;
            gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success);
            if success == 0 {
                let mut len = 0;
                gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
                let mut buf = vec![0u8; len.max(1) as usize];
                gl::GetShaderInfoLog(shader, len, ptr::null_mut(), buf.as_mut_ptr() as *mut _);
                buf.pop(); // remove null terminator
                gl::DeleteShader(shader);
                return Err(String::from_utf8_lossy(&buf).trim_end().to_string());
            }
            Ok(shader)
        }
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        unsafe {
            gl::AttachShader(program, shader);
        }
    }

    fn delete_shader(&self, shader: u32) {
        unsafe {
            gl::DeleteShader(shader);
        }
    }

    fn link_program(&self, program: u32) -> Result<(), String> {
        unsafe {
            gl::LinkProgram(program);
            program_status(program, gl::LINK_STATUS)
        }
    }

    fn validate_program(&self, program: u32) -> Result<(), String> {
        unsafe {
            gl::ValidateProgram(program);
            program_status(program, gl::VALIDATE_STATUS)
        }
    }

    fn delete_program(&self, program: u32) {
        unsafe {
            gl::DeleteProgram(program);
        }
    }

    fn use_program(&self, program: u32) {
        unsafe {
            gl::UseProgram(program);
        }
    }

    fn current_program(&self) -> u32 {
        let mut current = 0;
        unsafe {
            gl::GetIntegerv(gl::CURRENT_PROGRAM, &mut current);
        }
        current as u32
    }

    fn uniform_location(&self, program: u32, name: &str) -> UniformLocation {
        let Ok(cname) = CString::new(name) else {
            return UniformLocation::NOT_FOUND;
        };
        UniformLocation::new(unsafe { gl::GetUniformLocation(program, cname.as_ptr()) })
    }

    fn uniform_i32(&self, location: UniformLocation, value: i32) {
        unsafe {
            gl::Uniform1i(location.raw(), value);
        }
    }

    fn uniform_f32(&self, location: UniformLocation, value: f32) {
        unsafe {
            gl::Uniform1f(location.raw(), value);
        }
    }

    fn uniform_vec3(&self, location: UniformLocation, value: Vec3) {
        unsafe {
            gl::Uniform3f(location.raw(), value.x, value.y, value.z);
        }
    }

    fn uniform_mat4(&self, location: UniformLocation, value: &Mat4) {
        unsafe {
            gl::UniformMatrix4fv(location.raw(), 1, gl::FALSE, value.to_cols_array().as_ptr());
        }
    }

    fn create_texture_rgba(&self, width: u32, height: u32, pixels: &[u8]) -> u32 {
        let mut texture = 0;
        unsafe {
            gl::GenTextures(1, &mut texture);
            gl::BindTexture(gl::TEXTURE_2D, texture);

            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::REPEAT as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::REPEAT as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR_MIPMAP_LINEAR as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);

            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGBA as GLint,
                width as GLsizei,
                height as GLsizei,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                pixels.as_ptr() as *const _,
            );
            gl::GenerateMipmap(gl::TEXTURE_2D);
            gl::BindTexture(gl::TEXTURE_2D, 0);
        }
        texture
    }

    fn create_depth_texture(&self, width: u32, height: u32) -> u32 {
        let mut texture = 0;
        let border = [1.0f32, 1.0, 1.0, 1.0];
        unsafe {
            gl::GenTextures(1, &mut texture);
            gl::BindTexture(gl::TEXTURE_2D, texture);
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::DEPTH_COMPONENT as GLint,
                width as GLsizei,
                height as GLsizei,
                0,
                gl::DEPTH_COMPONENT,
                gl::FLOAT,
                ptr::null(),
            );

            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_BORDER as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_BORDER as GLint);
            gl::TexParameterfv(gl::TEXTURE_2D, gl::TEXTURE_BORDER_COLOR, border.as_ptr());
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::NEAREST as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::NEAREST as GLint);
            gl::BindTexture(gl::TEXTURE_2D, 0);
        }
        texture
    }

    fn bind_texture(&self, unit: u32, texture: u32) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit);
            gl::BindTexture(gl::TEXTURE_2D, texture);
        }
    }

    fn delete_texture(&self, texture: u32) {
        unsafe {
            gl::DeleteTextures(1, &texture);
        }
    }

    fn create_framebuffer(&self) -> u32 {
        let mut fbo = 0;
        unsafe {
            gl::GenFramebuffers(1, &mut fbo);
        }
        fbo
    }

    fn attach_depth_texture(&self, framebuffer: u32, texture: u32) -> u32 {
        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, framebuffer);
            gl::FramebufferTexture2D(
                gl::FRAMEBUFFER,
                gl::DEPTH_ATTACHMENT,
                gl::TEXTURE_2D,
                texture,
                0,
            );
            gl::DrawBuffer(gl::NONE);
            gl::ReadBuffer(gl::NONE);
            let status = gl::CheckFramebufferStatus(gl::FRAMEBUFFER);
            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
            status
        }
    }

    fn bind_framebuffer(&self, framebuffer: u32) {
        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, framebuffer);
        }
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        unsafe {
            gl::DeleteFramebuffers(1, &framebuffer);
        }
    }

    fn create_mesh(&self, vertices: &[f32], indices: &[u32], layout: &VertexLayout) -> MeshBuffers {
        let mut vao = 0;
        let mut vbo = 0;
        let mut ebo = 0;

        unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::GenBuffers(1, &mut vbo);
            gl::GenBuffers(1, &mut ebo);

            gl::BindVertexArray(vao);

            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                mem::size_of_val(vertices) as GLsizeiptr,
                vertices.as_ptr() as *const _,
                gl::STATIC_DRAW,
            );

            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ebo);
            gl::BufferData(
                gl::ELEMENT_ARRAY_BUFFER,
                mem::size_of_val(indices) as GLsizeiptr,
                indices.as_ptr() as *const _,
                gl::STATIC_DRAW,
            );

            let stride = (layout.stride * mem::size_of::<f32>()) as GLsizei;
            for attr in layout.attributes {
                gl::VertexAttribPointer(
                    attr.location,
                    attr.components,
                    gl::FLOAT,
                    gl::FALSE,
                    stride,
                    (attr.offset * mem::size_of::<f32>()) as *const _,
                );
                gl::EnableVertexAttribArray(attr.location);
            }

            gl::BindVertexArray(0);
        }

        MeshBuffers { vao, vbo, ebo }
    }

    fn draw_indexed(&self, vao: u32, index_count: i32) {
        unsafe {
            gl::BindVertexArray(vao);
            gl::DrawElements(gl::TRIANGLES, index_count, gl::UNSIGNED_INT, ptr::null());
            gl::BindVertexArray(0);
        }
    }

    fn delete_mesh(&self, buffers: MeshBuffers) {
        unsafe {
            gl::DeleteVertexArrays(1, &buffers.vao);
            gl::DeleteBuffers(1, &buffers.vbo);
            gl::DeleteBuffers(1, &buffers.ebo);
        }
    }
}

unsafe fn program_status(program: GLuint, pname: GLenum) -> Result<(), String> {
    let mut success = 0;
    gl::GetProgramiv(program, pname, &mut success);
    if success != 0 {
        return Ok(());
    }
    let mut len = 0;
    gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
    let mut buf = vec![0u8; len.max(1) as usize];
    gl::GetProgramInfoLog(program, len, ptr::null_mut(), buf.as_mut_ptr() as *mut _);
    buf.pop();
    Err(String::from_utf8_lossy(&buf).trim_end().to_string())
}
