use glam::Vec3;
use serde::Serialize;
use stilllife_input::{ProjectionMode, ViewState};
use stilllife_render::{MeshKind, MeshParts};
use stilllife_scene::{SceneComposer, Surface};

/// Scene and view inspector for developer tooling.
///
/// Provides read-only queries for the HUD overlay and the CLI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene state.
    pub fn summary(scene: &SceneComposer) -> SceneSummary {
        let objects = scene.objects();
        SceneSummary {
            objects: objects.len(),
            spinning: objects.iter().filter(|o| o.spins).count(),
            textured: objects
                .iter()
                .filter(|o| matches!(o.surface, Surface::Texture { .. }))
                .count(),
            materials: scene.materials().len(),
            textures: scene.textures().len(),
            lights: scene.lights().len(),
            spin_degrees: scene.spin().angle_degrees(),
            prepared: scene.is_prepared(),
        }
    }

    /// Details of the object drawn at `index`.
    pub fn inspect_object(scene: &SceneComposer, index: usize) -> Option<ObjectInfo> {
        scene.objects().get(index).map(|obj| ObjectInfo {
            index,
            label: obj.label.clone(),
            mesh: obj.mesh,
            parts: obj.parts,
            position: obj.placement.position,
            scale: obj.placement.scale,
            surface: match &obj.surface {
                Surface::Color(_) => "color".to_string(),
                Surface::Texture { tag, .. } => match scene.textures().slot_of(tag) {
                    Some(slot) => format!("texture {tag} (unit {slot})"),
                    None => format!("texture {tag} (missing)"),
                },
            },
            material: obj.material.clone(),
            spins: obj.spins,
        })
    }

    /// Object labels in draw order.
    pub fn list_objects(scene: &SceneComposer) -> Vec<String> {
        scene.objects().iter().map(|o| o.label.clone()).collect()
    }

    pub fn view_summary(view: &ViewState) -> ViewSummary {
        ViewSummary {
            position: view.position(),
            yaw_degrees: view.yaw_degrees(),
            pitch_degrees: view.pitch_degrees(),
            speed: view.speed(),
            projection: view.projection(),
        }
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    pub objects: usize,
    pub spinning: usize,
    pub textured: usize,
    pub materials: usize,
    pub textures: usize,
    pub lights: usize,
    pub spin_degrees: f32,
    pub prepared: bool,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: objects={} spinning={} textured={} materials={} textures={} lights={} spin={:.2}°",
            self.objects,
            self.spinning,
            self.textured,
            self.materials,
            self.textures,
            self.lights,
            self.spin_degrees
        )
    }
}

/// Detailed info about a single scene object.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectInfo {
    pub index: usize,
    pub label: String,
    pub mesh: MeshKind,
    #[serde(skip)]
    pub parts: MeshParts,
    pub position: Vec3,
    pub scale: Vec3,
    pub surface: String,
    pub material: Option<String>,
    pub spins: bool,
}

impl std::fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{:<2} {:<18} {:<16} [{}] pos=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2}) {} material={}{}",
            self.index,
            self.label,
            self.mesh,
            self.parts,
            self.position.x,
            self.position.y,
            self.position.z,
            self.scale.x,
            self.scale.y,
            self.scale.z,
            self.surface,
            self.material.as_deref().unwrap_or("-"),
            if self.spins { " spins" } else { "" },
        )
    }
}

/// Summary of the camera for the inspector.
#[derive(Debug, Clone)]
pub struct ViewSummary {
    pub position: Vec3,
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
    pub speed: f32,
    pub projection: ProjectionMode,
}

impl std::fmt::Display for ViewSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Camera: ({:.1}, {:.1}, {:.1}) yaw={:.1} pitch={:.1} speed={:.1} {:?}",
            self.position.x,
            self.position.y,
            self.position.z,
            self.yaw_degrees,
            self.pitch_degrees,
            self.speed,
            self.projection
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stilllife_input::{Key, KeyAction};
    use stilllife_render::RecordingBackend;
    use stilllife_scene::{SceneConfig, still_life};

    fn scene() -> SceneComposer {
        SceneComposer::new(still_life::definition(), &SceneConfig::default())
    }

    #[test]
    fn summary_before_prepare() {
        let summary = SceneInspector::summary(&scene());
        assert_eq!(summary.objects, 24);
        assert_eq!(summary.spinning, 9);
        assert_eq!(summary.materials, 0);
        assert!(!summary.prepared);
    }

    #[test]
    fn summary_after_prepare() {
        let mut scene = scene();
        let mut backend = RecordingBackend::new();
        scene.prepare(&mut backend);
        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.materials, 11);
        assert_eq!(summary.textures, 7);
        assert_eq!(summary.lights, 2);
        assert!(summary.prepared);
    }

    #[test]
    fn inspect_object_found() {
        let mut scene = scene();
        scene.prepare(&mut RecordingBackend::new());
        let info = SceneInspector::inspect_object(&scene, 1).unwrap();
        assert_eq!(info.label, "table");
        assert_eq!(info.surface, "texture blackwood (unit 4)");
        assert_eq!(info.material.as_deref(), Some("blackwood"));
    }

    #[test]
    fn inspect_object_out_of_range() {
        assert!(SceneInspector::inspect_object(&scene(), 99).is_none());
    }

    #[test]
    fn list_objects_in_draw_order() {
        let labels = SceneInspector::list_objects(&scene());
        assert_eq!(labels.first().map(String::as_str), Some("backdrop"));
        assert_eq!(labels.last().map(String::as_str), Some("flower 3 center"));
    }

    #[test]
    fn summary_display() {
        let s = format!("{}", SceneInspector::summary(&scene()));
        assert!(s.contains("objects=24"));
    }

    #[test]
    fn view_summary_tracks_projection() {
        let mut view = ViewState::default();
        view.on_key(Key::P, KeyAction::Press);
        let summary = SceneInspector::view_summary(&view);
        assert_eq!(summary.projection, ProjectionMode::Orthographic);
        assert!(format!("{summary}").contains("Orthographic"));
    }
}
