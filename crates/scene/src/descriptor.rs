use glam::{Vec2, Vec3, Vec4};
use serde::Serialize;
use stilllife_common::Placement;
use stilllife_render::{MeshKind, MeshParts};

/// How an object's base color is produced.
///
/// Flat color and texture are mutually exclusive for a single draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Color(Vec4),
    Texture { tag: String, uv_scale: Vec2 },
}

impl Default for Surface {
    fn default() -> Self {
        Surface::Color(Vec4::ONE)
    }
}

/// One drawable object of the scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneObject {
    pub label: String,
    pub mesh: MeshKind,
    pub parts: MeshParts,
    pub placement: Placement,
    pub surface: Surface,
    /// Material tag. `None` draws with the neutral material.
    pub material: Option<String>,
    /// Whether the object turns with the scene's spin.
    pub spins: bool,
}

impl SceneObject {
    pub fn new(label: impl Into<String>, mesh: MeshKind) -> Self {
        Self {
            label: label.into(),
            mesh,
            parts: MeshParts::ALL,
            placement: Placement::default(),
            surface: Surface::default(),
            material: None,
            spins: false,
        }
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.placement.scale = scale;
        self
    }

    /// Rotation about X, Y and Z in degrees.
    pub fn rotate(mut self, degrees: Vec3) -> Self {
        self.placement.rotation_degrees = degrees;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.placement.position = position;
        self
    }

    pub fn parts(mut self, parts: MeshParts) -> Self {
        self.parts = parts;
        self
    }

    pub fn color(mut self, rgba: Vec4) -> Self {
        self.surface = Surface::Color(rgba);
        self
    }

    pub fn textured(mut self, tag: impl Into<String>, uv_scale: Vec2) -> Self {
        self.surface = Surface::Texture {
            tag: tag.into(),
            uv_scale,
        };
        self
    }

    pub fn material(mut self, tag: impl Into<String>) -> Self {
        self.material = Some(tag.into());
        self
    }

    pub fn spinning(mut self) -> Self {
        self.spins = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let obj = SceneObject::new("ball", MeshKind::Sphere);
        assert_eq!(obj.parts, MeshParts::ALL);
        assert_eq!(obj.placement, Placement::default());
        assert_eq!(obj.surface, Surface::Color(Vec4::ONE));
        assert!(obj.material.is_none());
        assert!(!obj.spins);
    }

    #[test]
    fn textured_replaces_color() {
        let obj = SceneObject::new("board", MeshKind::Box)
            .color(Vec4::new(1.0, 0.0, 0.0, 1.0))
            .textured("wood", Vec2::new(2.0, 1.2));
        assert!(matches!(obj.surface, Surface::Texture { ref tag, .. } if tag == "wood"));
    }

    #[test]
    fn serializes_for_inspection() {
        let obj = SceneObject::new("mug", MeshKind::Cylinder)
            .parts(MeshParts::OPEN_TOP)
            .material("ceramic");
        let json = serde_json::to_value(&obj).unwrap();
        assert_eq!(json["mesh"], "Cylinder");
        assert_eq!(json["parts"]["top"], false);
        assert_eq!(json["material"], "ceramic");
    }
}
