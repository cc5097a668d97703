//! Non-destructive PBR patch: sample the decoration texture and blend it into
//! the base color.

use tracing::{debug, info, warn};

use super::shaders::{
    BASE_COLOR_ANCHOR, BLEND_MARKER, FRAGMENT_ENTRY, GRADIENT_BLEND, GRADIENT_UNIFORMS,
    UNIFORMS_MARKER,
};
use super::{CompileHook, SceneMaterial, ShaderProgram, UniformValue};
use crate::mesh::SceneMesh;
use crate::texture::TextureHandle;

/// Identifies the blend hook on patched materials
pub const BLEND_HOOK_ID: &str = "dzyn:gradient-blend";

/// Uniform holding the decoration texture
pub const GRADIENT_TEXTURE_UNIFORM: &str = "gradient_texture";

/// Uniform holding the blend strength
pub const GRADIENT_STRENGTH_UNIFORM: &str = "gradient_strength";

/// What [`patch`] did to a material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Hook installed and uniforms bound
    Patched,
    /// Already patched; only the uniforms were rebound
    Rebound,
    /// Not a PBR material; left untouched
    Skipped,
}

/// Summary of a batch patch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub patched: usize,
    pub rebound: usize,
    pub skipped_materials: usize,
    /// Meshes excluded because they have no UV channel
    pub skipped_meshes: Vec<String>,
}

impl PatchReport {
    fn record(&mut self, outcome: PatchOutcome) {
        match outcome {
            PatchOutcome::Patched => self.patched += 1,
            PatchOutcome::Rebound => self.rebound += 1,
            PatchOutcome::Skipped => self.skipped_materials += 1,
        }
    }
}

/// Bind `texture` into `material`, blended into its base color by `strength`.
///
/// Installs the blend hook on first use and only rebinds the uniforms on
/// later calls, so repeated patching never stacks injections. Materials
/// without a PBR base color are skipped.
pub fn patch(material: &mut SceneMaterial, texture: TextureHandle, strength: f32) -> PatchOutcome {
    if !material.shading().is_pbr() {
        debug!(
            "Skipping non-PBR material {:?} ({:?})",
            material.name,
            material.shading()
        );
        return PatchOutcome::Skipped;
    }

    let strength = if strength.is_nan() { 0.0 } else { strength.clamp(0.0, 1.0) };
    let outcome = if material.has_hook(BLEND_HOOK_ID) {
        PatchOutcome::Rebound
    } else {
        material.set_compile_hook(CompileHook {
            id: BLEND_HOOK_ID,
            apply: inject_gradient_blend,
        });
        PatchOutcome::Patched
    };

    material.set_uniform(GRADIENT_TEXTURE_UNIFORM, UniformValue::Texture(texture));
    material.set_uniform(GRADIENT_STRENGTH_UNIFORM, UniformValue::Float(strength));

    debug!(
        "{:?} material {:?} with texture {:?} at strength {:.2}",
        outcome, material.name, texture, strength
    );
    outcome
}

/// Patch every material of every mesh that has UVs.
///
/// Meshes without a UV channel are logged and excluded; the rest of the
/// batch still goes through.
pub fn patch_meshes(meshes: &mut [SceneMesh], texture: TextureHandle, strength: f32) -> PatchReport {
    let mut report = PatchReport::default();
    for mesh in meshes.iter_mut() {
        if !mesh.has_uv {
            warn!("Mesh {:?} has no UV channel, excluding it from patching", mesh.name);
            report.skipped_meshes.push(mesh.name.clone());
            continue;
        }
        for material in &mut mesh.materials {
            report.record(patch(material, texture, strength));
        }
    }
    info!(
        "Bound texture {:?}: {} patched, {} rebound, {} skipped materials, {} skipped meshes",
        texture,
        report.patched,
        report.rebound,
        report.skipped_materials,
        report.skipped_meshes.len()
    );
    report
}

/// Compile hook: declare the gradient uniforms and blend the sampled layer
/// right after the material's own base color is resolved.
///
/// A program that already carries the blend is left alone.
pub fn inject_gradient_blend(program: &mut ShaderProgram) {
    let source = &mut program.fragment;
    if source.contains(BLEND_MARKER) {
        return;
    }
    let Some(anchor) = source.find(BASE_COLOR_ANCHOR) else {
        warn!("Fragment shader has no base color anchor, gradient blend not injected");
        return;
    };

    source.insert_str(anchor + BASE_COLOR_ANCHOR.len(), GRADIENT_BLEND);

    if !source.contains(UNIFORMS_MARKER) {
        // The anchor lives inside the entry point, so the entry precedes it
        let at = source.find(FRAGMENT_ENTRY).unwrap_or(0);
        source.insert_str(at, GRADIENT_UNIFORMS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{ShadingModel, PBR_FRAGMENT_SHADER};

    fn handle(id: u64) -> TextureHandle {
        TextureHandle(id)
    }

    #[test]
    fn test_patch_binds_uniforms() {
        let mut material = SceneMaterial::new("fabric", ShadingModel::Standard);
        let outcome = patch(&mut material, handle(7), 0.5);

        assert_eq!(outcome, PatchOutcome::Patched);
        assert!(material.take_needs_update());
        assert_eq!(
            material.uniform(GRADIENT_TEXTURE_UNIFORM),
            Some(UniformValue::Texture(handle(7)))
        );
        assert_eq!(
            material.uniform(GRADIENT_STRENGTH_UNIFORM),
            Some(UniformValue::Float(0.5))
        );
    }

    #[test]
    fn test_repatch_rebinds_without_stacking() {
        let mut material = SceneMaterial::new("fabric", ShadingModel::Standard);
        patch(&mut material, handle(1), 0.5);
        let outcome = patch(&mut material, handle(2), 0.8);
        assert_eq!(outcome, PatchOutcome::Rebound);

        let compiled = material.compile();
        assert_eq!(compiled.fragment.matches(BLEND_MARKER).count(), 1);
        assert_eq!(compiled.fragment.matches(UNIFORMS_MARKER).count(), 1);
        assert_eq!(
            compiled
                .fragment
                .matches("textureSample(gradient_texture")
                .count(),
            1
        );
        assert_eq!(
            material.uniform(GRADIENT_TEXTURE_UNIFORM),
            Some(UniformValue::Texture(handle(2)))
        );
        assert_eq!(
            material.uniform(GRADIENT_STRENGTH_UNIFORM),
            Some(UniformValue::Float(0.8))
        );
    }

    #[test]
    fn test_blend_follows_base_color() {
        let mut material = SceneMaterial::new("fabric", ShadingModel::Physical);
        patch(&mut material, handle(3), 0.9);
        let fragment = material.compile().fragment;

        let anchor = fragment.find(BASE_COLOR_ANCHOR).unwrap();
        let blend = fragment.find(BLEND_MARKER).unwrap();
        let lighting = fragment.find("apply_pbr_lighting(pbr_input)").unwrap();
        let uniforms = fragment.find(UNIFORMS_MARKER).unwrap();
        let entry = fragment.find(FRAGMENT_ENTRY).unwrap();

        assert!(anchor < blend && blend < lighting);
        assert!(uniforms < entry);
        assert!(fragment.contains("gradient_layer.a * gradient_strength"));
    }

    #[test]
    fn test_non_pbr_is_noop() {
        let mut material = SceneMaterial::new("decal", ShadingModel::Unlit);
        assert_eq!(patch(&mut material, handle(1), 0.5), PatchOutcome::Skipped);
        assert!(material.compile_hook().is_none());
        assert!(material.uniforms().is_empty());
        assert!(!material.needs_update());
    }

    #[test]
    fn test_injection_is_guarded() {
        let mut program = ShaderProgram::new(PBR_FRAGMENT_SHADER);
        inject_gradient_blend(&mut program);
        let once = program.clone();
        inject_gradient_blend(&mut program);
        assert_eq!(program, once);
    }

    #[test]
    fn test_missing_anchor_leaves_program() {
        let mut program = ShaderProgram::new("@fragment fn fragment() {}");
        inject_gradient_blend(&mut program);
        assert_eq!(program.fragment, "@fragment fn fragment() {}");
    }

    #[test]
    fn test_strength_is_clamped() {
        let mut material = SceneMaterial::new("fabric", ShadingModel::Standard);
        patch(&mut material, handle(1), 3.0);
        assert_eq!(
            material.uniform(GRADIENT_STRENGTH_UNIFORM),
            Some(UniformValue::Float(1.0))
        );
    }

    #[test]
    fn test_patch_meshes_skips_meshes_without_uv() {
        let mut meshes = vec![
            SceneMesh::new("body", true).with_material(SceneMaterial::new("cotton", ShadingModel::Standard)),
            SceneMesh::new("zipper", false).with_material(SceneMaterial::new("metal", ShadingModel::Standard)),
            SceneMesh::new("label", true).with_material(SceneMaterial::new("print", ShadingModel::Basic)),
        ];

        let report = patch_meshes(&mut meshes, handle(5), 0.9);
        assert_eq!(report.patched, 1);
        assert_eq!(report.skipped_materials, 1);
        assert_eq!(report.skipped_meshes, vec!["zipper".to_string()]);
        assert!(meshes[1].materials[0].compile_hook().is_none());

        let again = patch_meshes(&mut meshes, handle(6), 0.9);
        assert_eq!(again.rebound, 1);
        assert_eq!(again.patched, 0);
    }
}
