use glam::Vec3;
use serde::Serialize;

/// Phong material parameters, identified by tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Material {
    pub tag: String,
    pub ambient_strength: f32,
    pub ambient_color: Vec3,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub shininess: f32,
}

impl Material {
    pub fn new(
        tag: impl Into<String>,
        ambient_strength: f32,
        ambient_color: Vec3,
        diffuse_color: Vec3,
        specular_color: Vec3,
        shininess: f32,
    ) -> Self {
        Self {
            tag: tag.into(),
            ambient_strength,
            ambient_color,
            diffuse_color,
            specular_color,
            shininess,
        }
    }

    /// White, lightly specular. Used for objects that name no material.
    pub fn neutral() -> Self {
        Self::new("neutral", 0.3, Vec3::ONE, Vec3::ONE, Vec3::splat(0.2), 8.0)
    }
}

/// Ordered list of materials, looked up by tag.
///
/// Registration never rejects a duplicate tag. Lookup scans in registration
/// order and returns the first match, so a later duplicate is shadowed.
#[derive(Debug, Clone, Default)]
pub struct MaterialRegistry {
    materials: Vec<Material>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, material: Material) {
        if self.lookup(&material.tag).is_some() {
            tracing::debug!(tag = %material.tag, "material tag already registered; new entry is shadowed");
        }
        self.materials.push(material);
    }

    /// First material registered under `tag`.
    pub fn lookup(&self, tag: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.tag == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn clear(&mut self) {
        self.materials.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(tag: &str, shininess: f32) -> Material {
        Material::new(tag, 0.3, Vec3::ONE, Vec3::ONE, Vec3::ONE, shininess)
    }

    #[test]
    fn lookup_by_tag() {
        let mut reg = MaterialRegistry::new();
        reg.register(flat("wood", 12.0));
        reg.register(flat("glass", 64.0));
        assert_eq!(reg.lookup("glass").map(|m| m.shininess), Some(64.0));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn missing_tag_is_none() {
        let mut reg = MaterialRegistry::new();
        reg.register(flat("wood", 12.0));
        assert!(reg.lookup("marble").is_none());
    }

    #[test]
    fn first_registration_wins() {
        let mut reg = MaterialRegistry::new();
        reg.register(flat("wood", 12.0));
        reg.register(flat("wood", 99.0));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.lookup("wood").map(|m| m.shininess), Some(12.0));
    }
}
