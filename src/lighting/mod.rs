pub mod light;
pub mod material;
pub mod shadow_map;

pub use light::{Attenuation, DirectionalLight, Light, LightBase, PointLight, SpotLight};
pub use material::Material;
pub use shadow_map::ShadowMap;
