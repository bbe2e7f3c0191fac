use crate::error::{RenderError, Result};
use crate::gpu::GpuHandle;

/// RGBA8 2D texture.
pub struct Texture {
    gpu: GpuHandle,
    id: u32,
    width: u32,
    height: u32,
}

impl Texture {
    pub fn from_rgba(gpu: GpuHandle, width: u32, height: u32, pixels: &[u8]) -> Result<Self> {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        let id = gpu.create_texture_rgba(width, height, pixels);
        if id == 0 {
            return Err(RenderError::ResourceCreation { resource: "texture" });
        }
        Ok(Self {
            gpu,
            id,
            width,
            height,
        })
    }

    /// 1x1 texture of a single color.
    pub fn solid(gpu: GpuHandle, rgba: [u8; 4]) -> Result<Self> {
        Self::from_rgba(gpu, 1, 1, &rgba)
    }

    /// `size`x`size` checkerboard of `cells` squares per side.
    pub fn checker(gpu: GpuHandle, size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> Result<Self> {
        let pixels = checker_pixels(size, cells, a, b);
        Self::from_rgba(gpu, size, size, &pixels)
    }

    pub fn use_texture(&self, unit: u32) {
        self.gpu.bind_texture(unit, self.id);
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.gpu.delete_texture(self.id);
    }
}

fn checker_pixels(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> Vec<u8> {
    let cell = (size / cells.max(1)).max(1);
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let color = if (x / cell + y / cell) % 2 == 0 { a } else { b };
            pixels.extend_from_slice(&color);
        }
    }
    pixels
}
