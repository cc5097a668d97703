//! Meshes handed over by the scene host once the model is loaded

use crate::material::SceneMaterial;

/// A loaded mesh and its materials.
///
/// The host keeps ownership; the engine only borrows meshes to patch them.
#[derive(Debug, Clone)]
pub struct SceneMesh {
    pub name: String,
    /// Whether the mesh carries a UV channel
    pub has_uv: bool,
    pub materials: Vec<SceneMaterial>,
}

impl SceneMesh {
    pub fn new(name: impl Into<String>, has_uv: bool) -> Self {
        Self {
            name: name.into(),
            has_uv,
            materials: Vec::new(),
        }
    }

    pub fn with_material(mut self, material: SceneMaterial) -> Self {
        self.materials.push(material);
        self
    }
}
