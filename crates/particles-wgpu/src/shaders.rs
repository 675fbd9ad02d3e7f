/// WGSL shader for size-attenuated point sprites.
///
/// `params` packs `(size, attenuate, viewport_width, viewport_height)`.
/// With attenuation the on-screen size is `size * (height / 2) / depth`,
/// otherwise `size` is taken as pixels.
pub const POINTS_SHADER: &str = r#"
struct Uniforms {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    model: mat4x4<f32>,
    color: vec4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct CornerInput {
    @location(0) corner: vec2<f32>,
};

struct PointInput {
    @location(1) position: vec3<f32>,
};

struct PointOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_points(vertex: CornerInput, point: PointInput) -> PointOutput {
    let view_pos = uniforms.view * uniforms.model * vec4<f32>(point.position, 1.0);
    let clip = uniforms.proj * view_pos;

    let size = uniforms.params.x;
    let attenuate = uniforms.params.y;
    let viewport = uniforms.params.zw;

    var size_px = size;
    if (attenuate > 0.5) {
        size_px = size * (viewport.y * 0.5) / max(-view_pos.z, 0.0001);
    }

    let offset = vertex.corner * size_px / viewport;

    var out: PointOutput;
    out.clip_position = vec4<f32>(clip.xy + offset * clip.w, clip.zw);
    out.color = uniforms.color;
    return out;
}

@fragment
fn fs_points(in: PointOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;
