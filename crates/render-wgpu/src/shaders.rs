/// WGSL Phong shader: per-frame lights, per-object material, optional texture.
///
/// Block layouts mirror `FrameUniforms` and `ObjectUniforms`.
pub const SCENE_SHADER: &str = r#"
const MAX_LIGHTS: u32 = 4u;

struct Light {
    position: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
};

struct Frame {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    view_position: vec4<f32>,
    // x: lighting enabled, y: light count
    flags: vec4<u32>,
    lights: array<Light, 4>,
};

struct Object {
    model: mat4x4<f32>,
    normal: mat4x4<f32>,
    color: vec4<f32>,
    // rgb: ambient color, w: ambient strength
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    // rgb: specular color, w: shininess
    specular: vec4<f32>,
    uv_scale: vec4<f32>,
    // x: texture enabled, y: texture unit
    flags: vec4<u32>,
};

@group(0) @binding(0)
var<uniform> per_frame: Frame;

@group(1) @binding(0)
var<uniform> per_object: Object;

@group(2) @binding(0)
var object_texture: texture_2d<f32>;
@group(2) @binding(1)
var object_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world = per_object.model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = per_frame.projection * per_frame.view * world;
    out.world_position = world.xyz;
    out.world_normal = (per_object.normal * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.uv = vertex.uv * per_object.uv_scale.xy;
    return out;
}

@fragment
fn fs_main(in: VertexOutput, @builtin(front_facing) front: bool) -> @location(0) vec4<f32> {
    let sampled = textureSample(object_texture, object_sampler, in.uv);
    let base = select(per_object.color, sampled, per_object.flags.x != 0u);

    if (per_frame.flags.x == 0u) {
        return base;
    }

    // Hollow shapes are drawn without culling; light their inner walls too.
    var normal = normalize(in.world_normal);
    if (!front) {
        normal = -normal;
    }
    let view_dir = normalize(per_frame.view_position.xyz - in.world_position);
    let shininess = max(per_object.specular.w, 1.0);

    var lit = vec3<f32>(0.0);
    let count = min(per_frame.flags.y, MAX_LIGHTS);
    for (var i = 0u; i < count; i++) {
        let light = per_frame.lights[i];
        let light_dir = normalize(light.position.xyz - in.world_position);

        let ambient = per_object.ambient.w * per_object.ambient.rgb * light.ambient.rgb;
        let diffuse = max(dot(normal, light_dir), 0.0) * per_object.diffuse.rgb * light.diffuse.rgb;
        let reflect_dir = reflect(-light_dir, normal);
        let highlight = pow(max(dot(view_dir, reflect_dir), 0.0), shininess);
        let specular = highlight * per_object.specular.rgb * light.specular.rgb;

        lit += ambient + diffuse + specular;
    }

    return vec4<f32>(lit * base.rgb, base.a);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_points_present() {
        assert!(SCENE_SHADER.contains("fn vs_main"));
        assert!(SCENE_SHADER.contains("fn fs_main"));
    }

    #[test]
    fn light_array_matches_staging() {
        let declared = format!("array<Light, {}>", crate::uniforms::MAX_LIGHTS);
        assert!(SCENE_SHADER.contains(&declared));
    }
}
