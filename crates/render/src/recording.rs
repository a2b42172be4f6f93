use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::mesh::{MeshKind, MeshLibrary, MeshParts};
use crate::shader::{ShaderProgram, UniformValue, uniform};
use crate::texture::{TextureBackend, TextureError, TextureHandle};

/// One call made against a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    UseProgram,
    Uniform { name: String, value: UniformValue },
    LoadMesh(MeshKind),
    Draw(usize),
    CreateTexture { path: PathBuf, handle: TextureHandle },
    BindTexture { handle: TextureHandle, unit: u32 },
    DestroyTexture(TextureHandle),
}

/// A draw together with the uniform state that was live when it was issued.
#[derive(Debug, Clone)]
pub struct DrawRecord {
    pub kind: MeshKind,
    pub parts: MeshParts,
    pub uniforms: BTreeMap<String, UniformValue>,
}

impl DrawRecord {
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }

    pub fn uses_texture(&self) -> bool {
        matches!(
            self.uniform(uniform::USE_TEXTURE),
            Some(UniformValue::Bool(true))
        )
    }
}

/// Headless backend that records every call instead of talking to a GPU.
///
/// Used by tests and by the CLI to inspect what a frame would draw. Texture
/// creation succeeds unless the path was marked with
/// [`RecordingBackend::fail_texture`] or the call was marked with
/// [`RecordingBackend::fail_texture_call`].
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<Command>,
    draws: Vec<DrawRecord>,
    uniforms: BTreeMap<String, UniformValue>,
    loaded_meshes: HashSet<MeshKind>,
    live_textures: HashSet<TextureHandle>,
    failing: HashSet<PathBuf>,
    failing_calls: HashSet<usize>,
    texture_calls: usize,
    invalid_destroys: usize,
    next_handle: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create_texture` fail for `path`.
    pub fn fail_texture(&mut self, path: impl Into<PathBuf>) {
        self.failing.insert(path.into());
    }

    /// Make the `index`th `create_texture` call (counting from zero) fail,
    /// whatever its path.
    pub fn fail_texture_call(&mut self, index: usize) {
        self.failing_calls.insert(index);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Current value of a uniform.
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }

    /// Number of uniform writes since the last [`clear_log`](Self::clear_log).
    pub fn uniform_call_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Uniform { .. }))
            .count()
    }

    pub fn is_mesh_loaded(&self, kind: MeshKind) -> bool {
        self.loaded_meshes.contains(&kind)
    }

    pub fn live_texture_count(&self) -> usize {
        self.live_textures.len()
    }

    /// Destroys of handles that were never created or already destroyed.
    pub fn invalid_destroy_count(&self) -> usize {
        self.invalid_destroys
    }

    /// Forget recorded commands and draws. Uniform, mesh and texture state is kept.
    pub fn clear_log(&mut self) {
        self.commands.clear();
        self.draws.clear();
    }

    /// Human-readable listing of the recorded draws.
    pub fn describe_draws(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== {} draw calls ===", self.draws.len());
        for (i, draw) in self.draws.iter().enumerate() {
            let surface = if draw.uses_texture() {
                match draw.uniform(uniform::OBJECT_TEXTURE) {
                    Some(UniformValue::Sampler2D(unit)) => format!("texture unit {unit}"),
                    _ => "texture unit ?".to_string(),
                }
            } else {
                match draw.uniform(uniform::OBJECT_COLOR) {
                    Some(UniformValue::Vec4(c)) => {
                        format!("color ({:.2}, {:.2}, {:.2}, {:.2})", c.x, c.y, c.z, c.w)
                    }
                    _ => "color ?".to_string(),
                }
            };
            let position = match draw.uniform(uniform::MODEL) {
                Some(UniformValue::Mat4(m)) => {
                    let t = m.w_axis;
                    format!("({:.2}, {:.2}, {:.2})", t.x, t.y, t.z)
                }
                _ => "?".to_string(),
            };
            let _ = writeln!(
                out,
                "  [{i:2}] {:<16} {} at {position} {surface}",
                draw.kind.to_string(),
                draw.parts
            );
        }
        out
    }
}

impl ShaderProgram for RecordingBackend {
    fn use_program(&mut self) {
        self.commands.push(Command::UseProgram);
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.uniforms.insert(name.to_string(), value);
        self.commands.push(Command::Uniform {
            name: name.to_string(),
            value,
        });
    }
}

impl MeshLibrary for RecordingBackend {
    fn load_mesh(&mut self, kind: MeshKind) {
        self.loaded_meshes.insert(kind);
        self.commands.push(Command::LoadMesh(kind));
    }

    fn draw_mesh(&mut self, kind: MeshKind, parts: MeshParts) {
        if !self.loaded_meshes.contains(&kind) {
            tracing::warn!("draw of {kind} before it was loaded");
        }
        self.commands.push(Command::Draw(self.draws.len()));
        self.draws.push(DrawRecord {
            kind,
            parts,
            uniforms: self.uniforms.clone(),
        });
    }
}

impl TextureBackend for RecordingBackend {
    fn create_texture(&mut self, path: &Path) -> Result<TextureHandle, TextureError> {
        let call = self.texture_calls;
        self.texture_calls += 1;
        if self.failing.contains(path) || self.failing_calls.contains(&call) {
            return Err(TextureError::Decode {
                path: path.to_path_buf(),
                reason: "marked as failing".into(),
            });
        }
        let handle = TextureHandle(self.next_handle);
        self.next_handle += 1;
        self.live_textures.insert(handle);
        self.commands.push(Command::CreateTexture {
            path: path.to_path_buf(),
            handle,
        });
        Ok(handle)
    }

    fn bind_texture(&mut self, handle: TextureHandle, unit: u32) {
        self.commands.push(Command::BindTexture { handle, unit });
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        if !self.live_textures.remove(&handle) {
            tracing::warn!(?handle, "destroy of a texture that is not live");
            self.invalid_destroys += 1;
        }
        self.commands.push(Command::DestroyTexture(handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec4};

    #[test]
    fn draws_capture_live_uniforms() {
        let mut backend = RecordingBackend::new();
        backend.load_mesh(MeshKind::Sphere);
        backend.set_bool(uniform::USE_TEXTURE, true);
        backend.draw_mesh(MeshKind::Sphere, MeshParts::ALL);
        backend.set_bool(uniform::USE_TEXTURE, false);
        backend.draw_mesh(MeshKind::Sphere, MeshParts::ALL);

        assert_eq!(backend.draws().len(), 2);
        assert!(backend.draws()[0].uses_texture());
        assert!(!backend.draws()[1].uses_texture());
    }

    #[test]
    fn uniform_count_ignores_other_commands() {
        let mut backend = RecordingBackend::new();
        backend.use_program();
        backend.load_mesh(MeshKind::Box);
        backend.set_mat4(uniform::MODEL, Mat4::IDENTITY);
        backend.set_vec4(uniform::OBJECT_COLOR, Vec4::ONE);
        assert_eq!(backend.uniform_call_count(), 2);

        backend.clear_log();
        assert_eq!(backend.uniform_call_count(), 0);
        assert_eq!(backend.uniform(uniform::OBJECT_COLOR), Some(UniformValue::Vec4(Vec4::ONE)));
    }

    #[test]
    fn failing_texture_path() {
        let mut backend = RecordingBackend::new();
        backend.fail_texture("missing.jpg");
        assert!(backend.create_texture(Path::new("missing.jpg")).is_err());
        let h = backend.create_texture(Path::new("ok.jpg")).unwrap();
        assert_eq!(h, TextureHandle(0));
        assert_eq!(backend.live_texture_count(), 1);
    }

    #[test]
    fn failing_texture_call_leaves_shared_path_usable() {
        let mut backend = RecordingBackend::new();
        backend.fail_texture_call(1);
        assert!(backend.create_texture(Path::new("wood.jpg")).is_ok());
        assert!(backend.create_texture(Path::new("wood.jpg")).is_err());
        assert!(backend.create_texture(Path::new("wood.jpg")).is_ok());
        assert_eq!(backend.live_texture_count(), 2);
    }

    #[test]
    fn double_destroy_is_counted() {
        let mut backend = RecordingBackend::new();
        let h = backend.create_texture(Path::new("a.png")).unwrap();
        backend.destroy_texture(h);
        assert_eq!(backend.invalid_destroy_count(), 0);
        backend.destroy_texture(h);
        backend.destroy_texture(TextureHandle(42));
        assert_eq!(backend.invalid_destroy_count(), 2);
        assert_eq!(backend.live_texture_count(), 0);
    }

    #[test]
    fn describe_lists_each_draw() {
        let mut backend = RecordingBackend::new();
        backend.load_mesh(MeshKind::Plane);
        backend.set_mat4(uniform::MODEL, Mat4::IDENTITY);
        backend.set_bool(uniform::USE_TEXTURE, false);
        backend.set_vec4(uniform::OBJECT_COLOR, Vec4::ONE);
        backend.draw_mesh(MeshKind::Plane, MeshParts::ALL);
        let text = backend.describe_draws();
        assert!(text.contains("1 draw calls"));
        assert!(text.contains("plane"));
        assert!(text.contains("color (1.00"));
    }
}
