//! GLSL wrapping and shader-module compilation.
//!
//! User shaders are written WebGL-style: their own `main()` writing
//! `gl_FragColor`, referencing the documented uniforms by bare name. To
//! compile them as Vulkan GLSL we strip the declarations the prelude
//! re-provides, lift custom uniform declarations into a std140 block, alias
//! the original names back onto block fields with macros, and wrap the user
//! entry point so `gl_FragCoord` keeps its WebGL bottom-left origin.

use std::borrow::Cow;

use wgpu::naga::ShaderStage;

use crate::error::PlaygroundError;
use crate::types::UniformType;

/// Uniform names owned by the playground; user declarations of these are
/// stripped and replaced by the injected prelude.
const STANDARD_UNIFORMS: [&str; 4] = ["uResolution", "uTime", "uMousePosition", "uMousePressed"];

/// A user fragment shader rewritten for the naga GLSL front-end.
pub(crate) struct WrappedFragment {
    pub source: String,
    /// Custom uniforms lifted out of the user source, in declaration order.
    pub user_uniforms: Vec<(String, UniformType)>,
}

/// Produces a self-contained Vulkan GLSL fragment shader from WebGL-style
/// user code.
///
/// Steps performed:
///
/// 1. Strip `#version` and `precision` directives plus declarations of the
///    standard uniforms so the prelude can inject its own definitions.
/// 2. Lift declarations of supported custom uniform shapes into a std140
///    user block; unsupported declarations stay in place for the compiler to
///    judge.
/// 3. Prepend [`build_header`] which declares the uniform blocks and macro
///    aliases (including `gl_FragColor` and the user `main` rename).
/// 4. Append [`FOOTER`] which remaps `gl_FragCoord` to a bottom-left origin
///    and delegates to the renamed user entry point.
pub(crate) fn wrap_fragment(source: &str) -> WrappedFragment {
    let mut skipped_version = false;
    let mut user_uniforms = Vec::new();
    let mut sanitized = String::new();

    for line in source.lines() {
        let trimmed = line.trim_start();
        if !skipped_version && trimmed.starts_with("#version") {
            skipped_version = true;
            continue;
        }
        if trimmed.starts_with("precision ") {
            continue;
        }
        if trimmed.starts_with("uniform ") {
            if STANDARD_UNIFORMS.iter().any(|name| trimmed.contains(name)) {
                continue;
            }
            if let Some(declaration) = parse_uniform_declaration(trimmed) {
                user_uniforms.push(declaration);
                continue;
            }
        }
        sanitized.push_str(line);
        sanitized.push('\n');
    }

    let header = build_header(&user_uniforms);
    let source = format!("{header}\n#line 1\n{sanitized}{FOOTER}");

    WrappedFragment {
        source,
        user_uniforms,
    }
}

/// Parses `uniform <type> <name>;` for the supported shapes. Arrays and
/// unsupported types return `None` and the line is left untouched.
fn parse_uniform_declaration(line: &str) -> Option<(String, UniformType)> {
    let rest = line.strip_prefix("uniform ")?;
    let mut tokens = rest.split_whitespace();
    let ty = UniformType::from_glsl(tokens.next()?)?;
    let name = tokens.next()?.trim_end_matches(';');
    if name.is_empty() || name.contains('[') || tokens.next().is_some() {
        return None;
    }
    Some((name.to_string(), ty))
}

/// GLSL prologue injected ahead of every user fragment shader.
///
/// The frame block layout must match `FrameUniforms` in `gpu/uniforms.rs`;
/// the user block layout must match the std140 offsets computed by
/// `UserUniformLayout` for the same declaration order.
fn build_header(user_uniforms: &[(String, UniformType)]) -> String {
    let mut header = String::from(
        r"#version 450
layout(location = 0) out vec4 shaderquad_fragColor;
#define gl_FragColor shaderquad_fragColor

layout(std140, set = 0, binding = 0) uniform FrameParams {
    vec2 _uResolution;
    vec2 _uMousePosition;
    float _uTime;
    int _uMousePressed;
} shaderquad_frame;

#define uResolution shaderquad_frame._uResolution
#define uMousePosition shaderquad_frame._uMousePosition
#define uTime shaderquad_frame._uTime
#define uMousePressed shaderquad_frame._uMousePressed
",
    );

    if !user_uniforms.is_empty() {
        header.push_str("\nlayout(std140, set = 0, binding = 1) uniform UserParams {\n");
        for (name, ty) in user_uniforms {
            header.push_str(&format!("    {} _{};\n", ty.glsl_name(), name));
        }
        header.push_str("} shaderquad_user;\n");
        for (name, _) in user_uniforms {
            header.push_str(&format!("#define {name} shaderquad_user._{name}\n"));
        }
    }

    header.push_str(
        r"
vec4 shaderquad_fragCoord;
#define gl_FragCoord shaderquad_fragCoord
#define main shaderquad_main
",
    );

    header
}

/// GLSL epilogue that remaps `gl_FragCoord` to the WebGL bottom-left origin
/// and delegates to the renamed user entry point.
const FOOTER: &str = r"#undef main

void main() {
    #undef gl_FragCoord
    vec2 builtinFC = vec2(gl_FragCoord.x, gl_FragCoord.y);
    #define gl_FragCoord shaderquad_fragCoord
    shaderquad_fragCoord = vec4(builtinFC.x, uResolution.y - builtinFC.y, 0.0, 1.0);
    shaderquad_main();
}
";

/// Minimal full-screen quad vertex shader; consumes the static 4-vertex
/// position buffer as its single attribute.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec3 aPosition;

void main() {
    gl_Position = vec4(aPosition, 1.0);
}
";

/// Compiles the static full-screen quad vertex shader.
pub(crate) fn compile_vertex_module(
    device: &wgpu::Device,
) -> Result<wgpu::ShaderModule, PlaygroundError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen quad vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    });
    match pollster::block_on(device.pop_error_scope()) {
        None => Ok(module),
        Some(err) => Err(PlaygroundError::EnvironmentUnavailable(format!(
            "vertex stage rejected: {err}"
        ))),
    }
}

/// Compiles a wrapped user fragment shader, surfacing the compiler
/// diagnostic on rejection.
pub(crate) fn compile_fragment_module(
    device: &wgpu::Device,
    wrapped: &WrappedFragment,
) -> Result<wgpu::ShaderModule, PlaygroundError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("playground fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(&wrapped.source),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    });
    match pollster::block_on(device.pop_error_scope()) {
        None => Ok(module),
        Some(err) => Err(PlaygroundError::CompileFailure {
            log: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_strips_standard_uniforms() {
        let source = r#"
            #version 100
            precision mediump float;
            uniform float uTime;
            uniform vec2 uResolution;
            void main() {
                gl_FragColor = vec4(uResolution / uResolution, uTime, 1.0);
            }
        "#;

        let wrapped = wrap_fragment(source);
        assert!(!wrapped.source.contains("uniform float uTime"));
        assert!(!wrapped.source.contains("uniform vec2 uResolution"));
        assert!(!wrapped.source.contains("precision mediump"));
        assert!(wrapped.source.contains("void main()"));
        assert!(wrapped.source.contains("#define gl_FragColor"));
        assert!(wrapped.user_uniforms.is_empty());
    }

    #[test]
    fn wrap_renames_the_user_entry_point() {
        let wrapped = wrap_fragment("void main() { gl_FragColor = vec4(1.0); }\n");
        assert!(wrapped.source.contains("#define main shaderquad_main"));
        assert!(wrapped.source.contains("shaderquad_main();"));
        // The real entry point lives in the footer, after the rename is undone.
        assert!(wrapped.source.contains("#undef main"));
    }

    #[test]
    fn wrap_lifts_custom_uniforms_into_the_user_block() {
        let source = r#"
            uniform float uScale;
            uniform vec3 uTint;
            void main() {
                gl_FragColor = vec4(uTint * uScale, 1.0);
            }
        "#;

        let wrapped = wrap_fragment(source);
        assert_eq!(
            wrapped.user_uniforms,
            vec![
                ("uScale".to_string(), UniformType::Float),
                ("uTint".to_string(), UniformType::Vec3),
            ]
        );
        assert!(wrapped.source.contains("uniform UserParams"));
        assert!(wrapped.source.contains("float _uScale;"));
        assert!(wrapped
            .source
            .contains("#define uTint shaderquad_user._uTint"));
        assert!(!wrapped.source.contains("uniform float uScale"));
    }

    #[test]
    fn wrap_leaves_unsupported_declarations_for_the_compiler() {
        let source = "uniform sampler2D uTexture;\nvoid main() { gl_FragColor = vec4(1.0); }\n";
        let wrapped = wrap_fragment(source);
        assert!(wrapped.user_uniforms.is_empty());
        assert!(wrapped.source.contains("uniform sampler2D uTexture;"));
    }

    #[test]
    fn wrap_emits_no_user_block_without_custom_uniforms() {
        let wrapped = wrap_fragment("void main() { gl_FragColor = vec4(1.0); }\n");
        assert!(!wrapped.source.contains("UserParams"));
    }

    #[test]
    fn declaration_parser_rejects_arrays() {
        assert_eq!(parse_uniform_declaration("uniform float uValues[4];"), None);
        assert_eq!(
            parse_uniform_declaration("uniform vec2 uOffset;"),
            Some(("uOffset".to_string(), UniformType::Vec2))
        );
    }
}
