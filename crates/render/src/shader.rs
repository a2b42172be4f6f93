use glam::{Mat4, Vec2, Vec3, Vec4};

/// Uniform names shared by the scene, the view state and every backend.
pub mod uniform {
    pub const MODEL: &str = "model";
    pub const VIEW: &str = "view";
    pub const PROJECTION: &str = "projection";
    pub const VIEW_POSITION: &str = "viewPosition";
    pub const OBJECT_COLOR: &str = "objectColor";
    pub const OBJECT_TEXTURE: &str = "objectTexture";
    pub const USE_TEXTURE: &str = "bUseTexture";
    pub const USE_LIGHTING: &str = "bUseLighting";
    pub const UV_SCALE: &str = "UVscale";

    pub const MATERIAL_AMBIENT_COLOR: &str = "material.ambientColor";
    pub const MATERIAL_AMBIENT_STRENGTH: &str = "material.ambientStrength";
    pub const MATERIAL_DIFFUSE_COLOR: &str = "material.diffuseColor";
    pub const MATERIAL_SPECULAR_COLOR: &str = "material.specularColor";
    pub const MATERIAL_SHININESS: &str = "material.shininess";

    /// Field of one entry in the `lightSources` array.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LightField {
        Position,
        AmbientColor,
        DiffuseColor,
        SpecularColor,
    }

    impl LightField {
        pub fn as_str(self) -> &'static str {
            match self {
                LightField::Position => "position",
                LightField::AmbientColor => "ambientColor",
                LightField::DiffuseColor => "diffuseColor",
                LightField::SpecularColor => "specularColor",
            }
        }

        fn parse(s: &str) -> Option<Self> {
            match s {
                "position" => Some(LightField::Position),
                "ambientColor" => Some(LightField::AmbientColor),
                "diffuseColor" => Some(LightField::DiffuseColor),
                "specularColor" => Some(LightField::SpecularColor),
                _ => None,
            }
        }
    }

    /// `lightSources[index].field`
    pub fn light(index: usize, field: LightField) -> String {
        format!("lightSources[{index}].{}", field.as_str())
    }

    /// Inverse of [`light`]: split `lightSources[i].field` into its parts.
    pub fn parse_light(name: &str) -> Option<(usize, LightField)> {
        let rest = name.strip_prefix("lightSources[")?;
        let (index, field) = rest.split_once("].")?;
        Some((index.parse().ok()?, LightField::parse(field)?))
    }
}

/// A value written to a named uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Vec4(Vec4),
    Vec3(Vec3),
    Vec2(Vec2),
    Float(f32),
    Int(i32),
    Bool(bool),
    Sampler2D(u32),
}

/// A shader program addressed by uniform name.
///
/// There is exactly one program and its uniform state is shared by every
/// draw: a value stays set until someone overwrites it.
pub trait ShaderProgram {
    /// Make this program current.
    fn use_program(&mut self);

    /// Write a uniform. Unknown names are ignored by the backend.
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set_uniform(name, UniformValue::Mat4(value));
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.set_uniform(name, UniformValue::Vec4(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.set_uniform(name, UniformValue::Vec2(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.set_uniform(name, UniformValue::Bool(value));
    }

    /// Point a sampler uniform at a texture unit.
    fn set_sampler_2d(&mut self, name: &str, unit: u32) {
        self.set_uniform(name, UniformValue::Sampler2D(unit));
    }
}

#[cfg(test)]
mod tests {
    use super::uniform::*;

    #[test]
    fn light_names_round_trip() {
        let name = light(1, LightField::DiffuseColor);
        assert_eq!(name, "lightSources[1].diffuseColor");
        assert_eq!(parse_light(&name), Some((1, LightField::DiffuseColor)));
    }

    #[test]
    fn parse_light_rejects_other_names() {
        assert_eq!(parse_light(MODEL), None);
        assert_eq!(parse_light("lightSources[x].position"), None);
        assert_eq!(parse_light("lightSources[0].focalStrength"), None);
    }
}
