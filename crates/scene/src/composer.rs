use std::collections::BTreeSet;
use std::path::PathBuf;

use glam::{Mat4, Vec2, Vec4};
use serde::Serialize;
use stilllife_assets::{AssetError, Material, MaterialRegistry, TextureRegistry};
use stilllife_render::{Graphics, MeshKind, MeshLibrary, ShaderProgram, TextureBackend, uniform};

use crate::animation::Spin;
use crate::descriptor::{SceneObject, Surface};
use crate::lighting::LightSource;
use crate::{SceneConfig, SceneDefinition};

/// An image file to load as a texture under `tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextureSource {
    pub file: PathBuf,
    pub tag: String,
}

impl TextureSource {
    pub fn new(file: impl Into<PathBuf>, tag: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            tag: tag.into(),
        }
    }
}

/// Outcome of [`SceneComposer::prepare`].
#[derive(Debug, Default)]
pub struct PrepareReport {
    pub meshes_loaded: Vec<MeshKind>,
    pub textures_loaded: usize,
    /// Textures that could not be loaded. Objects using them fall back to flat color.
    pub texture_failures: Vec<(String, AssetError)>,
}

/// Owns the scene table and its registries and issues the per-frame draws.
///
/// Lifecycle: [`prepare`](Self::prepare) once, then [`update`](Self::update)
/// and [`render`](Self::render) every frame, then [`release`](Self::release)
/// before the backend goes away.
pub struct SceneComposer {
    objects: Vec<SceneObject>,
    material_defs: Vec<Material>,
    lights: Vec<LightSource>,
    texture_sources: Vec<TextureSource>,
    texture_root: PathBuf,
    materials: MaterialRegistry,
    textures: TextureRegistry,
    spin: Spin,
    prepared: bool,
}

impl SceneComposer {
    pub fn new(definition: SceneDefinition, config: &SceneConfig) -> Self {
        Self {
            objects: definition.objects,
            material_defs: definition.materials,
            lights: definition.lights,
            texture_sources: definition.textures,
            texture_root: config.texture_root.clone(),
            materials: MaterialRegistry::new(),
            textures: TextureRegistry::new(),
            spin: Spin::new(
                config.spin_mode,
                config.spin_step_degrees,
                definition.spin_pivot,
            ),
            prepared: false,
        }
    }

    /// One-time setup: materials, lights, meshes, textures.
    pub fn prepare<G: Graphics>(&mut self, gfx: &mut G) -> PrepareReport {
        let mut report = PrepareReport::default();
        if self.prepared {
            tracing::warn!("scene already prepared; ignoring");
            return report;
        }

        for material in &self.material_defs {
            self.materials.register(material.clone());
        }

        gfx.use_program();
        gfx.set_bool(uniform::USE_LIGHTING, true);
        for (index, light) in self.lights.iter().enumerate() {
            light.upload(gfx, index);
        }

        let kinds: BTreeSet<MeshKind> = self.objects.iter().map(|o| o.mesh).collect();
        for kind in kinds {
            gfx.load_mesh(kind);
            report.meshes_loaded.push(kind);
        }

        for source in &self.texture_sources {
            let path = self.texture_root.join(&source.file);
            match self.textures.load(gfx, &path, source.tag.as_str()) {
                Ok(_) => report.textures_loaded += 1,
                Err(e) => {
                    tracing::warn!(tag = %source.tag, "texture unavailable, using flat color: {e}");
                    report.texture_failures.push((source.tag.clone(), e));
                }
            }
        }
        self.textures.bind_all(gfx);

        self.prepared = true;
        tracing::info!(
            objects = self.objects.len(),
            materials = self.materials.len(),
            textures = report.textures_loaded,
            "scene prepared"
        );
        report
    }

    /// Advance animated state by one frame.
    pub fn update(&mut self, delta_time: f32) {
        self.spin.update(delta_time);
    }

    /// Draw every object in table order. Returns the number of draws issued.
    pub fn render<G: ShaderProgram + MeshLibrary>(&self, gfx: &mut G) -> usize {
        gfx.use_program();
        gfx.set_bool(uniform::USE_LIGHTING, true);

        let spin = self.spin.rotation();
        for object in &self.objects {
            self.draw_object(gfx, object, spin);
        }
        self.objects.len()
    }

    fn draw_object<G: ShaderProgram + MeshLibrary>(
        &self,
        gfx: &mut G,
        object: &SceneObject,
        spin: Mat4,
    ) {
        let model = if object.spins {
            spin * object.placement.model_matrix()
        } else {
            object.placement.model_matrix()
        };
        self.set_transformations(gfx, model);

        let uv_scale = match &object.surface {
            Surface::Color(rgba) => {
                self.set_shader_color(gfx, *rgba);
                Vec2::ONE
            }
            Surface::Texture { tag, uv_scale } => {
                if !self.set_shader_texture(gfx, tag) {
                    tracing::trace!(%tag, object = %object.label, "texture missing, drawing flat");
                    self.set_shader_color(gfx, Vec4::ONE);
                }
                *uv_scale
            }
        };
        self.set_texture_uv_scale(gfx, uv_scale);

        match &object.material {
            Some(tag) => {
                self.set_shader_material(gfx, tag);
            }
            None => upload_material(gfx, &Material::neutral()),
        }

        gfx.draw_mesh(object.mesh, object.parts);
    }

    /// Upload `model` as the object's model matrix.
    pub fn set_transformations(&self, shader: &mut impl ShaderProgram, model: Mat4) {
        shader.set_mat4(uniform::MODEL, model);
    }

    /// Switch to flat-color mode with `rgba`.
    pub fn set_shader_color(&self, shader: &mut impl ShaderProgram, rgba: Vec4) {
        shader.set_bool(uniform::USE_TEXTURE, false);
        shader.set_vec4(uniform::OBJECT_COLOR, rgba);
    }

    /// Switch to texture mode sampling the unit registered for `tag`.
    ///
    /// Returns `false` and touches no uniform when the tag has no texture.
    pub fn set_shader_texture(&self, shader: &mut impl ShaderProgram, tag: &str) -> bool {
        let Some(slot) = self.textures.slot_of(tag) else {
            return false;
        };
        shader.set_bool(uniform::USE_TEXTURE, true);
        shader.set_sampler_2d(uniform::OBJECT_TEXTURE, slot as u32);
        true
    }

    pub fn set_texture_uv_scale(&self, shader: &mut impl ShaderProgram, uv_scale: Vec2) {
        shader.set_vec2(uniform::UV_SCALE, uv_scale);
    }

    /// Upload the material registered as `tag`.
    ///
    /// Returns `false` and leaves the current material uniforms as they are
    /// when no such material exists.
    pub fn set_shader_material(&self, shader: &mut impl ShaderProgram, tag: &str) -> bool {
        match self.materials.lookup(tag) {
            Some(material) => {
                upload_material(shader, material);
                true
            }
            None => false,
        }
    }

    /// Destroy scene textures. Safe to call more than once.
    pub fn release(&mut self, textures: &mut impl TextureBackend) {
        self.textures.release_all(textures);
        self.materials.clear();
        self.prepared = false;
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn lights(&self) -> &[LightSource] {
        &self.lights
    }

    pub fn spin(&self) -> &Spin {
        &self.spin
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }
}

fn upload_material(shader: &mut impl ShaderProgram, material: &Material) {
    shader.set_vec3(uniform::MATERIAL_AMBIENT_COLOR, material.ambient_color);
    shader.set_float(uniform::MATERIAL_AMBIENT_STRENGTH, material.ambient_strength);
    shader.set_vec3(uniform::MATERIAL_DIFFUSE_COLOR, material.diffuse_color);
    shader.set_vec3(uniform::MATERIAL_SPECULAR_COLOR, material.specular_color);
    shader.set_float(uniform::MATERIAL_SHININESS, material.shininess);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SpinMode;
    use crate::still_life;
    use glam::Vec3;
    use stilllife_common::Placement;
    use stilllife_render::{MeshParts, RecordingBackend, UniformValue};

    fn composer() -> SceneComposer {
        SceneComposer::new(still_life::definition(), &SceneConfig::default())
    }

    fn prepared(backend: &mut RecordingBackend) -> SceneComposer {
        let mut scene = composer();
        let report = scene.prepare(backend);
        assert!(report.texture_failures.is_empty());
        backend.clear_log();
        scene
    }

    #[test]
    fn prepare_loads_meshes_materials_lights_and_textures() {
        let mut backend = RecordingBackend::new();
        let mut scene = composer();
        let report = scene.prepare(&mut backend);

        assert_eq!(report.meshes_loaded.len(), MeshKind::ALL.len());
        for kind in MeshKind::ALL {
            assert!(backend.is_mesh_loaded(kind), "{kind} not loaded");
        }
        assert_eq!(scene.materials().len(), 11);
        assert_eq!(report.textures_loaded, 7);
        assert_eq!(scene.textures().slot_of("bowl"), Some(0));
        assert_eq!(scene.textures().slot_of("glass"), Some(6));
        assert_eq!(
            backend.uniform("lightSources[0].position"),
            Some(UniformValue::Vec3(Vec3::new(4.0, 6.0, 4.0)))
        );
        assert_eq!(
            backend.uniform("lightSources[1].diffuseColor"),
            Some(UniformValue::Vec3(Vec3::splat(0.4)))
        );
        assert_eq!(backend.uniform(uniform::USE_LIGHTING), Some(UniformValue::Bool(true)));
    }

    #[test]
    fn render_issues_one_draw_per_object_in_order() {
        let mut backend = RecordingBackend::new();
        let scene = prepared(&mut backend);

        let issued = scene.render(&mut backend);
        assert_eq!(issued, 24);
        let first: Vec<_> = backend.draws().iter().map(|d| (d.kind, d.parts)).collect();
        let expected: Vec<_> = scene.objects().iter().map(|o| (o.mesh, o.parts)).collect();
        assert_eq!(first, expected);

        backend.clear_log();
        scene.render(&mut backend);
        let second: Vec<_> = backend.draws().iter().map(|d| (d.kind, d.parts)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn textured_and_flat_draws_are_exclusive() {
        let mut backend = RecordingBackend::new();
        let scene = prepared(&mut backend);
        scene.render(&mut backend);

        let draws = backend.draws();
        // backdrop is flat colored
        assert!(!draws[0].uses_texture());
        assert_eq!(
            draws[0].uniform(uniform::OBJECT_COLOR),
            Some(UniformValue::Vec4(Vec4::new(0.25, 0.23, 0.22, 1.0)))
        );
        // table samples the blackwood unit
        assert!(draws[1].uses_texture());
        assert_eq!(
            draws[1].uniform(uniform::OBJECT_TEXTURE),
            Some(UniformValue::Sampler2D(4))
        );
        // apple follows the textured bowl but must not inherit its texture
        assert!(!draws[6].uses_texture());
        assert_eq!(draws[6].uniform(uniform::UV_SCALE), Some(UniformValue::Vec2(Vec2::ONE)));
    }

    #[test]
    fn every_draw_sets_model_and_uv_scale() {
        let mut backend = RecordingBackend::new();
        let scene = prepared(&mut backend);
        scene.render(&mut backend);

        let per_draw_models = backend
            .commands()
            .iter()
            .filter(|c| matches!(c, stilllife_render::Command::Uniform { name, .. } if name == uniform::MODEL))
            .count();
        assert_eq!(per_draw_models, 24);
        assert_eq!(
            backend.draws()[11].uniform(uniform::UV_SCALE),
            Some(UniformValue::Vec2(Vec2::new(2.0, 1.2)))
        );
    }

    #[test]
    fn material_miss_sets_no_uniforms() {
        let mut backend = RecordingBackend::new();
        let scene = prepared(&mut backend);
        assert!(!scene.set_shader_material(&mut backend, "marble"));
        assert_eq!(backend.uniform_call_count(), 0);

        assert!(scene.set_shader_material(&mut backend, "glass"));
        assert_eq!(backend.uniform_call_count(), 5);
        assert_eq!(
            backend.uniform(uniform::MATERIAL_SHININESS),
            Some(UniformValue::Float(64.0))
        );
    }

    #[test]
    fn texture_miss_sets_no_uniforms() {
        let mut backend = RecordingBackend::new();
        let scene = prepared(&mut backend);
        assert!(!scene.set_shader_texture(&mut backend, "marble"));
        assert_eq!(backend.uniform_call_count(), 0);
    }

    #[test]
    fn failed_texture_falls_back_to_flat_color() {
        let mut backend = RecordingBackend::new();
        backend.fail_texture(PathBuf::from("textures").join("blackwood.jpg"));
        let mut scene = composer();
        let report = scene.prepare(&mut backend);

        assert_eq!(report.texture_failures.len(), 1);
        assert_eq!(report.texture_failures[0].0, "blackwood");
        assert_eq!(report.textures_loaded, 6);
        // Later textures shift down one slot.
        assert_eq!(scene.textures().slot_of("cuttingboard"), Some(4));

        backend.clear_log();
        assert_eq!(scene.render(&mut backend), 24);
        let table = &backend.draws()[1];
        assert!(!table.uses_texture());
        assert_eq!(table.uniform(uniform::OBJECT_COLOR), Some(UniformValue::Vec4(Vec4::ONE)));
    }

    #[test]
    fn spinning_objects_turn_about_the_bowl_axis() {
        let mut backend = RecordingBackend::new();
        let config = SceneConfig {
            spin_mode: SpinMode::Frame,
            spin_step_degrees: 90.0,
            ..SceneConfig::default()
        };
        let mut scene = SceneComposer::new(still_life::definition(), &config);
        scene.prepare(&mut backend);
        scene.update(1.0 / 60.0);
        backend.clear_log();
        scene.render(&mut backend);

        let translation = |i: usize| match backend.draws()[i].uniform(uniform::MODEL) {
            Some(UniformValue::Mat4(m)) => m.w_axis.truncate(),
            other => panic!("model not a mat4: {other:?}"),
        };
        // apple sits at (-0.7, 3, -5); a quarter turn about (0, _, -5) moves it to (0, 3, -4.3)
        assert!((translation(6) - Vec3::new(0.0, 3.0, -4.3)).length() < 1e-4);
        // cutting board does not spin
        assert!((translation(11) - Vec3::new(-4.5, 0.06, -4.5)).length() < 1e-5);
    }

    #[test]
    fn update_advances_spin() {
        let config = SceneConfig {
            spin_step_degrees: 7.5,
            ..SceneConfig::default()
        };
        let mut scene = SceneComposer::new(still_life::definition(), &config);
        for _ in 0..50 {
            scene.update(0.016);
        }
        assert_eq!(scene.spin().angle_degrees(), 15.0);
    }

    #[test]
    fn release_destroys_textures_once() {
        let mut backend = RecordingBackend::new();
        let mut scene = composer();
        scene.prepare(&mut backend);
        assert_eq!(backend.live_texture_count(), 7);
        scene.release(&mut backend);
        scene.release(&mut backend);
        assert_eq!(backend.live_texture_count(), 0);
        assert_eq!(backend.invalid_destroy_count(), 0);
        assert!(!scene.is_prepared());
    }

    #[test]
    fn prepare_twice_is_ignored() {
        let mut backend = RecordingBackend::new();
        let mut scene = composer();
        scene.prepare(&mut backend);
        let report = scene.prepare(&mut backend);
        assert!(report.meshes_loaded.is_empty());
        assert_eq!(scene.materials().len(), 11);
        assert_eq!(scene.textures().len(), 7);
    }

    #[test]
    fn set_transformations_uploads_model() {
        let mut backend = RecordingBackend::new();
        let scene = composer();
        let placement = Placement::new(Vec3::ONE, Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        scene.set_transformations(&mut backend, placement.model_matrix());
        assert_eq!(
            backend.uniform(uniform::MODEL),
            Some(UniformValue::Mat4(Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))))
        );
    }

    #[test]
    fn mug_is_open_topped() {
        let mut backend = RecordingBackend::new();
        let scene = prepared(&mut backend);
        scene.render(&mut backend);
        let mug = &backend.draws()[12];
        assert_eq!(mug.kind, MeshKind::Cylinder);
        assert_eq!(mug.parts, MeshParts::OPEN_TOP);
    }
}
