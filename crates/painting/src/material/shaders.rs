//! WGSL sources for default materials and the gradient blend injection

/// Line after which the material's own base color is final
pub const BASE_COLOR_ANCHOR: &str =
    "pbr_input.material.base_color = alpha_discard(pbr_input.material, pbr_input.material.base_color);";

/// Marks an injected blend; a program never carries more than one
pub const BLEND_MARKER: &str = "// dzyn:gradient-blend";

/// Marks the injected uniform declarations
pub const UNIFORMS_MARKER: &str = "// dzyn:gradient-uniforms";

/// Entry point the uniform declarations are inserted before
pub const FRAGMENT_ENTRY: &str = "@fragment";

/// Default metallic-roughness fragment stage
pub const PBR_FRAGMENT_SHADER: &str = r#"#import bevy_pbr::{
    pbr_fragment::pbr_input_from_standard_material,
    pbr_functions::{alpha_discard, apply_pbr_lighting, main_pass_post_lighting_processing},
    forward_io::{VertexOutput, FragmentOutput},
}

@fragment
fn fragment(
    in: VertexOutput,
    @builtin(front_facing) is_front: bool,
) -> FragmentOutput {
    var pbr_input = pbr_input_from_standard_material(in, is_front);
    pbr_input.material.base_color = alpha_discard(pbr_input.material, pbr_input.material.base_color);

    var out: FragmentOutput;
    out.color = apply_pbr_lighting(pbr_input);
    out.color = main_pass_post_lighting_processing(pbr_input, out.color);
    return out;
}
"#;

/// Default unlit fragment stage; has no PBR base-color term
pub const UNLIT_FRAGMENT_SHADER: &str = r#"#import bevy_pbr::forward_io::{VertexOutput, FragmentOutput}

@group(#{MATERIAL_BIND_GROUP}) @binding(0) var<uniform> color: vec4<f32>;

@fragment
fn fragment(in: VertexOutput) -> FragmentOutput {
    var out: FragmentOutput;
    out.color = color;
    return out;
}
"#;

/// Uniforms sampled by the blend
pub(crate) const GRADIENT_UNIFORMS: &str = r#"// dzyn:gradient-uniforms
@group(#{MATERIAL_BIND_GROUP}) @binding(100) var gradient_texture: texture_2d<f32>;
@group(#{MATERIAL_BIND_GROUP}) @binding(101) var gradient_sampler: sampler;
@group(#{MATERIAL_BIND_GROUP}) @binding(102) var<uniform> gradient_strength: f32;

"#;

/// mix(base, layer.rgb, layer.a * strength), base alpha preserved
pub(crate) const GRADIENT_BLEND: &str = r#"
    // dzyn:gradient-blend
    let gradient_layer = textureSample(gradient_texture, gradient_sampler, in.uv);
    pbr_input.material.base_color = vec4<f32>(
        mix(pbr_input.material.base_color.rgb, gradient_layer.rgb, gradient_layer.a * gradient_strength),
        pbr_input.material.base_color.a,
    );"#;
