use crate::gpu::Gpu;
use crate::renderer::uniforms::MaterialUniforms;

/// Specular response of a surface. Attached to drawables as a component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    specular_intensity: f32,
    shininess: f32,
}

impl Material {
    /// Negative intensities become 0; shininess is kept strictly positive.
    pub fn new(specular_intensity: f32, shininess: f32) -> Self {
        Self {
            specular_intensity: specular_intensity.max(0.0),
            shininess: shininess.max(f32::EPSILON),
        }
    }

    pub fn glossy() -> Self {
        Self::new(1.0, 32.0)
    }

    pub fn matte() -> Self {
        Self::new(0.3, 4.0)
    }

    pub fn specular_intensity(&self) -> f32 {
        self.specular_intensity
    }

    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    pub fn apply_to(&self, uniforms: &MaterialUniforms, gpu: &dyn Gpu) {
        gpu.uniform_f32(uniforms.specular_intensity, self.specular_intensity);
        gpu.uniform_f32(uniforms.shininess, self.shininess);
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}
