/// Shared uniform declarations for all three pipelines.
const COMMON: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    inv_view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
};

struct Sky {
    sun_dir: vec4<f32>,
    // turbidity, rayleigh, mie coefficient, mie directional g
    scattering: vec4<f32>,
};

struct Water {
    color_level: vec4<f32>,
    // distortion scale, uv tiling, phase, plane half-extent
    params: vec4<f32>,
    sun_dir: vec4<f32>,
};

@group(0) @binding(0) var<uniform> globals: Globals;
@group(0) @binding(1) var<uniform> sky: Sky;
@group(0) @binding(2) var<uniform> water: Water;
"#;

/// Sky background: fullscreen triangle, analytic gradient plus sun disk.
pub fn sky_shader() -> String {
    format!(
        "{COMMON}{}",
        r#"
struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) ndc: vec2<f32>,
};

@vertex
fn vs_sky(@builtin(vertex_index) vi: u32) -> SkyOutput {
    // Fullscreen triangle without a vertex buffer.
    var out: SkyOutput;
    let x = f32(i32(vi & 1u) * 4 - 1);
    let y = f32(i32(vi >> 1u) * 4 - 1);
    out.ndc = vec2<f32>(x, y);
    out.clip_position = vec4<f32>(x, y, 1.0, 1.0);
    return out;
}

@fragment
fn fs_sky(in: SkyOutput) -> @location(0) vec4<f32> {
    let far_point = globals.inv_view_proj * vec4<f32>(in.ndc, 1.0, 1.0);
    let dir = normalize(far_point.xyz / far_point.w - globals.camera_pos.xyz);
    let sun = normalize(sky.sun_dir.xyz);

    let turbidity = sky.scattering.x;
    let rayleigh = sky.scattering.y;
    let mie = sky.scattering.z;
    let mie_g = sky.scattering.w;

    // Height gradient: horizon haze thickens with turbidity.
    let up = clamp(dir.y, 0.0, 1.0);
    let zenith = vec3<f32>(0.18, 0.36, 0.66) * (rayleigh * 0.5);
    let horizon = vec3<f32>(0.82, 0.74, 0.62) * (0.6 + turbidity * 0.04);
    var color = mix(horizon, zenith, pow(up, 0.6));

    // Forward-scattered glow around the sun (Henyey-Greenstein shaped).
    let cos_theta = clamp(dot(dir, sun), -1.0, 1.0);
    let g2 = mie_g * mie_g;
    let phase = (1.0 - g2) / pow(1.0 + g2 - 2.0 * mie_g * cos_theta, 1.5);
    color += vec3<f32>(1.0, 0.85, 0.6) * phase * mie * 40.0;

    // Sun disk.
    color += vec3<f32>(1.0, 0.95, 0.85) * smoothstep(0.9995, 0.9999, cos_theta) * 20.0;

    // Below the horizon fade toward the water tint.
    let below = clamp(-dir.y * 4.0, 0.0, 1.0);
    color = mix(color, vec3<f32>(0.05, 0.12, 0.12), below);

    return vec4<f32>(color, 1.0);
}
"#
    )
}

/// Terrain mesh: sun-lit, height/slope tinted.
pub fn terrain_shader() -> String {
    format!(
        "{COMMON}{}",
        r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
};

@vertex
fn vs_terrain(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = globals.view_proj * vec4<f32>(vertex.position, 1.0);
    out.world_pos = vertex.position;
    out.world_normal = vertex.normal;
    return out;
}

@fragment
fn fs_terrain(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let sun = normalize(sky.sun_dir.xyz);

    // Sand near the water line, grass on flats, rock on slopes.
    let sand = vec3<f32>(0.76, 0.70, 0.50);
    let grass = vec3<f32>(0.25, 0.44, 0.20);
    let rock = vec3<f32>(0.42, 0.40, 0.38);
    let shore = smoothstep(0.2, 1.2, in.world_pos.y - water.color_level.w);
    var albedo = mix(sand, grass, shore);
    albedo = mix(rock, albedo, smoothstep(0.75, 0.95, n.y));

    let diffuse = max(dot(n, sun), 0.0) * 0.7;
    let ambient = 0.3;
    return vec4<f32>(albedo * (ambient + diffuse), 1.0);
}
"#
    )
}

/// Water plane: shader-generated quad, rippled normal, sun specular.
pub fn water_shader() -> String {
    format!(
        "{COMMON}{}",
        r#"
struct WaterOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_water(@builtin(vertex_index) vi: u32) -> WaterOutput {
    // Two triangles covering the square plane; no vertex buffer.
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0), vec2<f32>(1.0, -1.0), vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0), vec2<f32>(1.0, 1.0), vec2<f32>(-1.0, 1.0),
    );
    let c = corners[vi];
    let half_extent = water.params.w;
    let world = vec3<f32>(c.x * half_extent, water.color_level.w, c.y * half_extent);

    var out: WaterOutput;
    out.clip_position = globals.view_proj * vec4<f32>(world, 1.0);
    out.world_pos = world;
    out.uv = (c * 0.5 + 0.5) * water.params.y;
    return out;
}

fn ripple_normal(uv: vec2<f32>, phase: f32, distortion: f32) -> vec3<f32> {
    let a = sin(uv.x * 6.28318 + phase * 3.1) + sin(uv.x * 2.3 - phase * 1.7);
    let b = sin(uv.y * 6.28318 - phase * 2.3) + sin(uv.y * 3.1 + phase * 1.3);
    return normalize(vec3<f32>(a * 0.02 * distortion, 1.0, b * 0.02 * distortion));
}

@fragment
fn fs_water(in: WaterOutput) -> @location(0) vec4<f32> {
    let n = ripple_normal(in.uv, water.params.z, water.params.x);
    let sun = normalize(water.sun_dir.xyz);
    let view = normalize(globals.camera_pos.xyz - in.world_pos);

    let fresnel = pow(1.0 - max(dot(view, n), 0.0), 3.0);
    let sky_tint = vec3<f32>(0.45, 0.60, 0.70);
    var color = mix(water.color_level.rgb, sky_tint, fresnel * 0.6);

    let half_vec = normalize(sun + view);
    let spec = pow(max(dot(n, half_vec), 0.0), 120.0);
    color += vec3<f32>(1.0, 0.95, 0.85) * spec;

    return vec4<f32>(color, 0.88);
}
"#
    )
}
