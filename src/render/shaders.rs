/// Uniform blocks shared by every pipeline. Layouts mirror `FrameUniform`
/// and `ObjectUniform` in `gpu.rs`.
pub(crate) const UNIFORMS: &str = r#"
struct FrameUniform {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    ambient: vec4<f32>,
    light_direction: vec4<f32>,
    light_color: vec4<f32>,
    // x: shadows on, y: depth bias, z: shadow texel size
    shadow: vec4<f32>,
}

struct ObjectUniform {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    color: vec4<f32>,
    // x: side (0 front, 1 back, 2 double), y: receives shadows
    flags: vec4<f32>,
}
"#;

pub(crate) const SHADOW_SHADER: &str = r#"
@group(0) @binding(0)
var<uniform> frame: FrameUniform;

@group(1) @binding(0)
var<uniform> object: ObjectUniform;

@vertex
fn vs_shadow(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return frame.light_view_proj * object.model * vec4<f32>(position, 1.0);
}
"#;

pub(crate) const SCENE_SHADER: &str = r#"
const RECIPROCAL_PI: f32 = 0.3183098861837907;

@group(0) @binding(0)
var<uniform> frame: FrameUniform;

@group(0) @binding(1)
var shadow_map: texture_depth_2d;

@group(0) @binding(2)
var shadow_sampler: sampler_comparison;

@group(1) @binding(0)
var<uniform> object: ObjectUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) shadow_pos: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = frame.view_proj * world_position;
    out.world_pos = world_position.xyz;
    out.shadow_pos = frame.light_view_proj * world_position;

    let normal_matrix = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    );
    out.normal = normalize(normal_matrix * input.normal);
    return out;
}

fn shadow_factor(shadow_pos: vec4<f32>) -> f32 {
    let ndc = shadow_pos.xyz / shadow_pos.w;
    let uv = ndc.xy * vec2<f32>(0.5, -0.5) + vec2<f32>(0.5, 0.5);
    let depth = ndc.z - frame.shadow.y;
    let texel = frame.shadow.z;

    var lit = 0.0;
    for (var y = -1; y <= 1; y++) {
        for (var x = -1; x <= 1; x++) {
            let offset = vec2<f32>(f32(x), f32(y)) * texel;
            lit += textureSampleCompareLevel(shadow_map, shadow_sampler, uv + offset, depth);
        }
    }
    lit = lit / 9.0;

    let outside = any(uv < vec2<f32>(0.0)) || any(uv > vec2<f32>(1.0)) || depth > 1.0;
    return select(lit, 1.0, outside);
}

@fragment
fn fs_main(input: VertexOutput, @builtin(front_facing) front_facing: bool) -> @location(0) vec4<f32> {
    let side = object.flags.x;
    if (side < 0.5 && !front_facing) || (side > 0.5 && side < 1.5 && front_facing) {
        discard;
    }

    var normal = normalize(input.normal);
    if !front_facing {
        normal = -normal;
    }

    var shadow = 1.0;
    if frame.shadow.x > 0.5 && object.flags.y > 0.5 {
        shadow = shadow_factor(input.shadow_pos);
    }

    let dot_nl = max(dot(normal, frame.light_direction.xyz), 0.0);
    let irradiance = frame.ambient.rgb + frame.light_color.rgb * dot_nl * shadow;
    let color = object.color.rgb * RECIPROCAL_PI * irradiance;
    return vec4<f32>(color, object.color.a);
}
"#;
