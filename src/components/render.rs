/// Index into the scene's `MeshStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHandle(pub usize);

/// Index into the scene's `TextureStore`. Bound to the diffuse unit before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureHandle(pub usize);

/// Marker: entity is skipped by both passes.
pub struct Hidden;
