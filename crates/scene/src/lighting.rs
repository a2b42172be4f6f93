use glam::Vec3;
use serde::Serialize;
use stilllife_render::ShaderProgram;
use stilllife_render::uniform::{self, LightField};

/// A point light with Phong color terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LightSource {
    pub position: Vec3,
    pub ambient_color: Vec3,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
}

impl LightSource {
    /// Write this light into `lightSources[index]`.
    pub fn upload(&self, shader: &mut impl ShaderProgram, index: usize) {
        shader.set_vec3(&uniform::light(index, LightField::Position), self.position);
        shader.set_vec3(
            &uniform::light(index, LightField::AmbientColor),
            self.ambient_color,
        );
        shader.set_vec3(
            &uniform::light(index, LightField::DiffuseColor),
            self.diffuse_color,
        );
        shader.set_vec3(
            &uniform::light(index, LightField::SpecularColor),
            self.specular_color,
        );
    }
}
