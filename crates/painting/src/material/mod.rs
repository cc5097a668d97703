//! Host materials as the engine sees them, and the patch that blends the
//! decoration texture into their base color.
//!
//! A material keeps its base shader program untouched. Patching only installs
//! a compile hook and binds two uniforms; the hook rewrites a copy of the
//! program each time the host recompiles.

mod patcher;
mod shaders;

use std::collections::BTreeMap;

use crate::texture::TextureHandle;

pub use patcher::{
    inject_gradient_blend, patch, patch_meshes, PatchOutcome, PatchReport, BLEND_HOOK_ID,
    GRADIENT_STRENGTH_UNIFORM, GRADIENT_TEXTURE_UNIFORM,
};
pub use shaders::{BASE_COLOR_ANCHOR, BLEND_MARKER, PBR_FRAGMENT_SHADER, UNLIT_FRAGMENT_SHADER};

/// Lighting model of a host material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingModel {
    /// Metallic-roughness PBR
    Standard,
    /// PBR with clearcoat, sheen and transmission extensions
    Physical,
    /// Flat color, no lighting
    Unlit,
    /// Lambert/Phong style legacy material
    Basic,
}

impl ShadingModel {
    /// Whether the model has a base-color term the blend can target
    pub fn is_pbr(self) -> bool {
        matches!(self, Self::Standard | Self::Physical)
    }
}

/// WGSL source of a material's fragment stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgram {
    pub fragment: String,
}

impl ShaderProgram {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
        }
    }
}

/// A uniform bound on a material
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Texture(TextureHandle),
    Float(f32),
}

/// Source rewrite run on a copy of the base program before compilation
#[derive(Debug, Clone, Copy)]
pub struct CompileHook {
    pub id: &'static str,
    pub apply: fn(&mut ShaderProgram),
}

/// Program ready to hand to the host's shader compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledShader {
    pub fragment: String,
    /// Id of the hook that produced it, if any
    pub hook: Option<&'static str>,
}

/// A host-owned material, borrowed mutably while patching
#[derive(Debug, Clone)]
pub struct SceneMaterial {
    pub name: String,
    shading: ShadingModel,
    base_program: ShaderProgram,
    uniforms: BTreeMap<String, UniformValue>,
    compile_hook: Option<CompileHook>,
    needs_update: bool,
}

impl SceneMaterial {
    /// A material using the default fragment shader for its shading model
    pub fn new(name: impl Into<String>, shading: ShadingModel) -> Self {
        let fragment = if shading.is_pbr() {
            PBR_FRAGMENT_SHADER
        } else {
            UNLIT_FRAGMENT_SHADER
        };
        Self::with_program(name, shading, ShaderProgram::new(fragment))
    }

    pub fn with_program(name: impl Into<String>, shading: ShadingModel, program: ShaderProgram) -> Self {
        Self {
            name: name.into(),
            shading,
            base_program: program,
            uniforms: BTreeMap::new(),
            compile_hook: None,
            needs_update: false,
        }
    }

    #[inline]
    pub fn shading(&self) -> ShadingModel {
        self.shading
    }

    #[inline]
    pub fn base_program(&self) -> &ShaderProgram {
        &self.base_program
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }

    pub fn uniforms(&self) -> &BTreeMap<String, UniformValue> {
        &self.uniforms
    }

    /// Bind a uniform value; changing a value flags the material
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        if self.uniforms.get(name) != Some(&value) {
            self.uniforms.insert(name.to_owned(), value);
            self.needs_update = true;
        }
    }

    pub fn compile_hook(&self) -> Option<&CompileHook> {
        self.compile_hook.as_ref()
    }

    /// Install `hook`, replacing any existing one. Forces a recompile.
    pub fn set_compile_hook(&mut self, hook: CompileHook) {
        self.compile_hook = Some(hook);
        self.needs_update = true;
    }

    /// Whether a hook with `id` is installed
    pub fn has_hook(&self, id: &str) -> bool {
        self.compile_hook.is_some_and(|hook| hook.id == id)
    }

    /// Run the compile hook over a copy of the base program
    pub fn compile(&self) -> CompiledShader {
        let mut program = self.base_program.clone();
        if let Some(hook) = &self.compile_hook {
            (hook.apply)(&mut program);
        }
        CompiledShader {
            fragment: program.fragment,
            hook: self.compile_hook.map(|hook| hook.id),
        }
    }

    #[inline]
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Return and reset the recompile flag
    pub fn take_needs_update(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }
}
