//! Fragment and vertex program synthesis for the plasma effect.
//!
//! Generation is stateless and deterministic: the emitted source never
//! depends on any effect field, so two generators (or two calls into
//! one) produce byte-identical text and the program cache can key
//! compiled programs on the paint alpha alone.

use plasma::{ProgramUniforms, UniformBinder};

/// GLSL prologue shared by both stages.
///
/// The uniform block layout must match `PlasmaUniforms` in
/// `uniforms.rs`. `alpha` and `time` are the two scalar uniforms the
/// effect uploads per draw; the macros keep the body close to the
/// plain uniform names it was written against.
const HEADER: &str = r"layout(std140, set = 0, binding = 0) uniform EffectParams {
    vec4 _resolution;
    vec4 _transform0;
    vec4 _transform1;
    vec4 _inputColor;
    float _alpha;
    float _time;
    vec2 _padding;
} ubo;

#define alpha ubo._alpha
#define time ubo._time
#define inputColor ubo._inputColor
";

/// Full-screen triangle vertex stage.
///
/// Maps the clip-space triangle to object-space pixel coordinates and
/// pushes them through the effect's coordinate transform, so the
/// fragment stage receives a varying already in normalized tile space.
const VERTEX_BODY: &str = r"layout(location = 0) out vec2 v_coord;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    vec2 object = (pos * 0.5 + vec2(0.5, 0.5)) * ubo._resolution.xy;
    v_coord = vec2(
        ubo._transform0.x * object.x + ubo._transform0.z * object.y + ubo._transform1.x,
        ubo._transform0.y * object.x + ubo._transform0.w * object.y + ubo._transform1.y);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

/// The plasma field: a fixed four-iteration domain warp over the
/// tile-space coordinate, shaded by three phase-shifted sine waves.
///
/// The final blend premultiplies against the upstream input alpha.
/// The `alpha` uniform is declared and uploaded but not applied in the
/// blend; that asymmetry is observed behavior and is kept as is (see
/// DESIGN.md).
const FRAGMENT_BODY: &str = r"layout(location = 0) in vec2 v_coord;
layout(location = 0) out vec4 outColor;

void main() {
    const float Pi = 3.14159;
    vec2 p = 3.32 * v_coord;
    for (int i = 1; i < 5; i++) {
        vec2 newp = p;
        newp.x += 0.12 / float(i) * sin(float(i) * Pi * p.y + time * 0.45) + 0.1;
        newp.y += 0.13 / float(i) * cos(float(i) * Pi * p.x + time * -0.4) - 0.1;
        p = newp;
    }
    vec3 col = vec3(
        sin(p.x + p.y) * .5 + .5,
        sin(p.x + p.y + 6.) * .5 + .5,
        sin(p.x + p.y + 12.) * .5 + .5);
    outColor = vec4(col.rgb * inputColor.aaa, inputColor.a);
}
";

/// Emits the vertex stage source.
pub fn vertex_source() -> String {
    format!("#version 450\n{HEADER}\n{VERTEX_BODY}")
}

/// Emits the fragment stage source.
pub fn fragment_source() -> String {
    format!("#version 450\n{HEADER}\n{FRAGMENT_BODY}")
}

/// Declares the program's two scalar uniforms through the backend
/// binder and returns the handles the effect uploads against.
pub fn declare_uniforms(binder: &mut dyn UniformBinder) -> ProgramUniforms {
    ProgramUniforms {
        alpha: binder.declare_float("alpha"),
        time: binder.declare_float("time"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plasma::UniformHandle;

    #[test]
    fn source_is_deterministic() {
        assert_eq!(fragment_source(), fragment_source());
        assert_eq!(vertex_source(), vertex_source());
    }

    #[test]
    fn fragment_declares_both_scalar_uniforms() {
        let source = fragment_source();
        assert!(source.contains("float _alpha;"));
        assert!(source.contains("float _time;"));
    }

    #[test]
    fn fragment_blend_uses_input_alpha() {
        let source = fragment_source();
        assert!(source.contains("col.rgb * inputColor.aaa"));
    }

    #[test]
    fn declares_alpha_then_time() {
        struct Names(Vec<&'static str>);
        impl UniformBinder for Names {
            fn declare_float(&mut self, name: &'static str) -> UniformHandle {
                self.0.push(name);
                UniformHandle::from_index(self.0.len() - 1)
            }
            fn set_float(&mut self, _handle: UniformHandle, _value: f32) {}
        }

        let mut names = Names(Vec::new());
        let uniforms = declare_uniforms(&mut names);
        assert_eq!(names.0, vec!["alpha", "time"]);
        assert_eq!(uniforms.alpha.index(), 0);
        assert_eq!(uniforms.time.index(), 1);
    }
}
