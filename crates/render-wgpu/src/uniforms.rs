use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use stilllife_render::UniformValue;
use stilllife_render::uniform::{self, LightField};

/// Light slots available in the frame block.
pub const MAX_LIGHTS: usize = 4;

/// Distance between consecutive object blocks in the dynamic uniform buffer.
pub const OBJECT_STRIDE: u64 = 256;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

/// Mirror of the WGSL `Frame` block.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view_position: [f32; 4],
    /// x: lighting enabled, y: active light count.
    pub flags: [u32; 4],
    pub lights: [GpuLight; MAX_LIGHTS],
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            ..<Self as Zeroable>::zeroed()
        }
    }
}

/// Mirror of the WGSL `Object` block.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for normals.
    pub normal: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// rgb: ambient color, w: ambient strength.
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    /// rgb: specular color, w: shininess.
    pub specular: [f32; 4],
    /// xy: UV scale.
    pub uv_scale: [f32; 4],
    /// x: texture enabled, y: texture unit.
    pub flags: [u32; 4],
}

impl Default for ObjectUniforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            normal: Mat4::IDENTITY.to_cols_array_2d(),
            color: [1.0; 4],
            ambient: [1.0, 1.0, 1.0, 0.3],
            diffuse: [1.0, 1.0, 1.0, 0.0],
            specular: [0.2, 0.2, 0.2, 8.0],
            uv_scale: [1.0, 1.0, 0.0, 0.0],
            flags: [0; 4],
        }
    }
}

impl ObjectUniforms {
    pub fn uses_texture(&self) -> bool {
        self.flags[0] != 0
    }

    pub fn texture_unit(&self) -> u32 {
        self.flags[1]
    }
}

/// CPU-side uniform state, written by name and read back as GPU blocks.
///
/// Values persist until overwritten, like uniforms of a linked GL program.
#[derive(Debug, Clone, Default)]
pub struct UniformStaging {
    pub frame: FrameUniforms,
    pub object: ObjectUniforms,
}

impl UniformStaging {
    /// Write a named uniform. Returns `false` for names or value types the
    /// blocks have no slot for.
    pub fn apply(&mut self, name: &str, value: UniformValue) -> bool {
        use UniformValue as V;
        let frame = &mut self.frame;
        let object = &mut self.object;
        match (name, value) {
            (uniform::MODEL, V::Mat4(m)) => {
                object.model = m.to_cols_array_2d();
                object.normal = m.inverse().transpose().to_cols_array_2d();
            }
            (uniform::VIEW, V::Mat4(m)) => frame.view = m.to_cols_array_2d(),
            (uniform::PROJECTION, V::Mat4(m)) => frame.projection = m.to_cols_array_2d(),
            (uniform::VIEW_POSITION, V::Vec3(p)) => frame.view_position = p.extend(1.0).to_array(),
            (uniform::OBJECT_COLOR, V::Vec4(c)) => object.color = c.to_array(),
            (uniform::OBJECT_TEXTURE, V::Sampler2D(unit)) => object.flags[1] = unit,
            (uniform::OBJECT_TEXTURE, V::Int(unit)) if unit >= 0 => object.flags[1] = unit as u32,
            (uniform::USE_TEXTURE, V::Bool(on)) => object.flags[0] = on as u32,
            (uniform::USE_LIGHTING, V::Bool(on)) => frame.flags[0] = on as u32,
            (uniform::UV_SCALE, V::Vec2(uv)) => {
                object.uv_scale[0] = uv.x;
                object.uv_scale[1] = uv.y;
            }
            (uniform::MATERIAL_AMBIENT_COLOR, V::Vec3(c)) => set_rgb(&mut object.ambient, c),
            (uniform::MATERIAL_AMBIENT_STRENGTH, V::Float(s)) => object.ambient[3] = s,
            (uniform::MATERIAL_DIFFUSE_COLOR, V::Vec3(c)) => set_rgb(&mut object.diffuse, c),
            (uniform::MATERIAL_SPECULAR_COLOR, V::Vec3(c)) => set_rgb(&mut object.specular, c),
            (uniform::MATERIAL_SHININESS, V::Float(s)) => object.specular[3] = s,
            (name, V::Vec3(v)) => {
                let Some((index, field)) = uniform::parse_light(name) else {
                    return unknown(name);
                };
                let Some(light) = frame.lights.get_mut(index) else {
                    tracing::trace!(name, index, "light index beyond available slots");
                    return false;
                };
                match field {
                    LightField::Position => set_rgb(&mut light.position, v),
                    LightField::AmbientColor => set_rgb(&mut light.ambient, v),
                    LightField::DiffuseColor => set_rgb(&mut light.diffuse, v),
                    LightField::SpecularColor => set_rgb(&mut light.specular, v),
                }
                frame.flags[1] = frame.flags[1].max(index as u32 + 1);
            }
            (name, _) => return unknown(name),
        }
        true
    }
}

fn set_rgb(slot: &mut [f32; 4], v: glam::Vec3) {
    slot[..3].copy_from_slice(&v.to_array());
}

fn unknown(name: &str) -> bool {
    tracing::trace!(name, "uniform has no slot; ignored");
    false
}
