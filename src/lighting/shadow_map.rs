use log::{error, info};

use crate::error::{RenderError, Result};
use crate::gpu::{GpuHandle, DEFAULT_FRAMEBUFFER, FRAMEBUFFER_COMPLETE};

/// Depth-only render target sampled by the color pass.
///
/// Bind with [`write`](Self::write), render, then [`unbind`](Self::unbind)
/// before anything calls [`read`](Self::read). Reading and writing the same
/// map within one pass is not allowed.
pub struct ShadowMap {
    gpu: GpuHandle,
    framebuffer: u32,
    texture: u32,
    width: u32,
    height: u32,
}

impl ShadowMap {
    /// Creates the framebuffer and its depth texture. An incomplete
    /// framebuffer is a driver limitation and is returned as an error.
    pub fn new(gpu: GpuHandle, width: u32, height: u32) -> Result<Self> {
        let framebuffer = gpu.create_framebuffer();
        if framebuffer == 0 {
            return Err(RenderError::ResourceCreation {
                resource: "shadow framebuffer",
            });
        }

        let texture = gpu.create_depth_texture(width, height);
        if texture == 0 {
            gpu.delete_framebuffer(framebuffer);
            return Err(RenderError::ResourceCreation {
                resource: "shadow depth texture",
            });
        }

        let status = gpu.attach_depth_texture(framebuffer, texture);
        if status != FRAMEBUFFER_COMPLETE {
            error!("Shadow map {width}x{height} incomplete (status 0x{status:04X})");
            gpu.delete_texture(texture);
            gpu.delete_framebuffer(framebuffer);
            return Err(RenderError::FramebufferIncomplete { status });
        }

        info!("Shadow map created ({width}x{height})");
        Ok(Self {
            gpu,
            framebuffer,
            texture,
            width,
            height,
        })
    }

    /// Makes the depth framebuffer the render target. The caller clears depth.
    pub fn write(&self) {
        self.gpu.bind_framebuffer(self.framebuffer);
    }

    /// Restores the window framebuffer.
    pub fn unbind(&self) {
        self.gpu.bind_framebuffer(DEFAULT_FRAMEBUFFER);
    }

    /// Binds the depth texture to sampler unit `unit`.
    pub fn read(&self, unit: u32) {
        self.gpu.bind_texture(unit, self.texture);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn framebuffer(&self) -> u32 {
        self.framebuffer
    }

    pub fn texture(&self) -> u32 {
        self.texture
    }
}

impl Drop for ShadowMap {
    fn drop(&mut self) {
        self.gpu.delete_texture(self.texture);
        self.gpu.delete_framebuffer(self.framebuffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::HeadlessGpu;
    use std::rc::Rc;

    #[test]
    fn write_then_unbind_restores_default_framebuffer() {
        let gpu = Rc::new(HeadlessGpu::new());
        let map = ShadowMap::new(gpu.clone(), 512, 256).unwrap();
        assert_eq!(map.size(), (512, 256));

        map.write();
        assert_eq!(gpu.bound_framebuffer(), map.framebuffer());
        map.unbind();
        assert_eq!(gpu.bound_framebuffer(), DEFAULT_FRAMEBUFFER);

        map.read(1);
        assert_eq!(gpu.texture_at(1), map.texture());
        assert!(gpu.is_depth_texture(map.texture()));
    }

    #[test]
    fn incomplete_framebuffer_is_fatal_and_releases_resources() {
        let gpu = Rc::new(HeadlessGpu::new());
        gpu.force_framebuffer_status(0x8CDD);
        let err = ShadowMap::new(gpu.clone(), 1024, 1024).err().unwrap();
        assert!(matches!(err, RenderError::FramebufferIncomplete { status: 0x8CDD }));
        // Framebuffer 1 and texture 2 were created, then deleted.
        assert!(!gpu.is_live_framebuffer(1));
        assert_eq!(gpu.texture_size(2), None);
    }

    #[test]
    fn drop_deletes_framebuffer() {
        let gpu = Rc::new(HeadlessGpu::new());
        let map = ShadowMap::new(gpu.clone(), 64, 64).unwrap();
        let fbo = map.framebuffer();
        drop(map);
        assert!(!gpu.is_live_framebuffer(fbo));
    }
}
