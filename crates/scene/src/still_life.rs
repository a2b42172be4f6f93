//! The built-in scene: a wooden fruit bowl on a table with a cutting board,
//! a coffee mug and a vase of flowers.

use glam::{Vec2, Vec3, Vec4};
use stilllife_assets::Material;
use stilllife_render::{MeshKind, MeshParts};

use crate::SceneDefinition;
use crate::composer::TextureSource;
use crate::descriptor::SceneObject;
use crate::lighting::LightSource;

/// The bowl's vertical axis passes through this point; the bowl group spins about it.
pub const BOWL_CENTER: Vec3 = Vec3::new(0.0, 0.0, -5.0);

const FLOWER_HEADS: [Vec3; 3] = [
    Vec3::new(-5.1, 3.2, -6.9),
    Vec3::new(-4.8, 3.0, -7.2),
    Vec3::new(-5.4, 3.0, -7.2),
];

pub fn definition() -> SceneDefinition {
    SceneDefinition {
        materials: materials(),
        lights: lights().to_vec(),
        textures: textures(),
        objects: objects(),
        spin_pivot: BOWL_CENTER,
    }
}

fn v3(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z)
}

pub fn materials() -> Vec<Material> {
    vec![
        Material::new("wood", 0.3, v3(0.3, 0.2, 0.1), v3(0.55, 0.27, 0.07), v3(0.2, 0.2, 0.2), 12.0),
        Material::new("blackwood", 0.3, v3(0.2, 0.1, 0.05), v3(0.55, 0.27, 0.07), v3(0.3, 0.2, 0.1), 12.0),
        Material::new("apple", 0.3, v3(0.4, 0.1, 0.1), v3(0.85, 0.2, 0.2), v3(1.0, 0.6, 0.6), 32.0),
        Material::new("orange", 0.3, v3(0.6, 0.3, 0.1), v3(1.0, 0.6, 0.1), v3(1.0, 0.7, 0.3), 24.0),
        Material::new("lemon", 0.2, v3(0.8, 0.8, 0.2), v3(1.0, 1.0, 0.3), v3(0.9, 0.9, 0.4), 16.0),
        Material::new("pear", 0.3, v3(0.2, 0.6, 0.2), v3(0.3, 0.8, 0.3), v3(0.6, 0.9, 0.6), 20.0),
        Material::new("stem", 0.2, v3(0.1, 0.3, 0.1), v3(0.1, 0.4, 0.1), v3(0.2, 0.2, 0.2), 8.0),
        Material::new("ceramic", 0.3, v3(0.8, 0.8, 0.8), v3(0.9, 0.9, 0.9), v3(1.0, 1.0, 1.0), 40.0),
        Material::new("glass", 0.2, v3(0.6, 0.5, 0.6), v3(0.8, 0.7, 0.8), v3(1.0, 1.0, 1.0), 64.0),
        Material::new("petal", 0.3, v3(1.0, 0.8, 0.8), v3(1.0, 0.6, 0.6), v3(1.0, 0.9, 0.9), 24.0),
        Material::new("center", 0.3, v3(1.0, 1.0, 0.0), v3(1.0, 1.0, 0.0), v3(1.0, 1.0, 0.0), 16.0),
    ]
}

/// Warm key light front-right, soft white fill back-left.
pub fn lights() -> [LightSource; 2] {
    [
        LightSource {
            position: v3(4.0, 6.0, 4.0),
            ambient_color: v3(0.3, 0.2, 0.2),
            diffuse_color: v3(0.9, 0.6, 0.5),
            specular_color: v3(1.0, 0.8, 0.7),
        },
        LightSource {
            position: v3(-4.0, 3.0, -3.0),
            ambient_color: v3(0.05, 0.05, 0.05),
            diffuse_color: v3(0.4, 0.4, 0.4),
            specular_color: v3(0.6, 0.6, 0.6),
        },
    ]
}

/// Image files relative to the texture root. One image may back several tags.
pub fn textures() -> Vec<TextureSource> {
    [
        ("rusticwood.jpg", "bowl"),
        ("rusticwood.jpg", "bowl_inner"),
        ("rusticwood.jpg", "rim"),
        ("rusticwood.jpg", "base"),
        ("blackwood.jpg", "blackwood"),
        ("rusticwood.jpg", "cuttingboard"),
        ("glass.jpg", "glass"),
    ]
    .into_iter()
    .map(|(file, tag)| TextureSource::new(file, tag))
    .collect()
}

pub fn objects() -> Vec<SceneObject> {
    let mut objects = vec![
        SceneObject::new("backdrop", MeshKind::Plane)
            .scale(v3(20.0, 1.0, 20.0))
            .rotate(v3(90.0, 0.0, 0.0))
            .at(v3(0.0, 10.0, -15.0))
            .color(Vec4::new(0.25, 0.23, 0.22, 1.0)),
        SceneObject::new("table", MeshKind::Plane)
            .scale(v3(20.0, 1.0, 20.0))
            .textured("blackwood", Vec2::ONE)
            .material("blackwood"),
        // Bowl
        SceneObject::new("bowl wall", MeshKind::Cylinder)
            .scale(v3(3.0, 2.0, 3.0))
            .at(v3(0.0, 1.0, -5.0))
            .textured("bowl", Vec2::splat(2.0))
            .material("wood")
            .spinning(),
        SceneObject::new("bowl hollow", MeshKind::Cylinder)
            .scale(v3(2.9, 0.5, 2.9))
            .at(v3(0.0, 0.525, -5.0))
            .textured("bowl_inner", Vec2::splat(1.5))
            .material("wood")
            .spinning(),
        SceneObject::new("bowl rim", MeshKind::Cylinder)
            .scale(v3(3.05, 0.05, 3.05))
            .at(v3(0.0, 1.025, -5.0))
            .textured("rim", Vec2::ONE)
            .material("wood")
            .spinning(),
        SceneObject::new("bowl foot", MeshKind::Cylinder)
            .scale(v3(1.2, 0.1, 1.2))
            .at(v3(0.0, 0.1, -5.0))
            .textured("base", Vec2::ONE)
            .material("wood")
            .spinning(),
        // Fruit
        SceneObject::new("apple", MeshKind::Sphere)
            .scale(Vec3::splat(0.8))
            .at(v3(-0.7, 3.0, -5.0))
            .material("apple")
            .spinning(),
        SceneObject::new("orange", MeshKind::Sphere)
            .scale(Vec3::splat(0.9))
            .at(v3(0.5, 3.0, -5.2))
            .material("orange")
            .spinning(),
        SceneObject::new("lemon", MeshKind::Sphere)
            .scale(v3(1.0, 0.8, 0.8))
            .at(v3(0.0, 2.8, -4.8))
            .material("lemon")
            .spinning(),
        SceneObject::new("pear", MeshKind::Sphere)
            .scale(v3(0.8, 1.2, 0.8))
            .at(v3(0.2, 3.0, -5.0))
            .material("pear")
            .spinning(),
        SceneObject::new("pear stem", MeshKind::Cylinder)
            .scale(v3(0.05, 0.3, 0.05))
            .rotate(v3(15.0, 0.0, 0.0))
            .at(v3(0.2, 3.1, -5.0))
            .material("stem")
            .spinning(),
        // Table items
        SceneObject::new("cutting board", MeshKind::Box)
            .scale(v3(4.0, 0.12, 2.2))
            .rotate(v3(0.0, 15.0, 0.0))
            .at(v3(-4.5, 0.06, -4.5))
            .textured("cuttingboard", Vec2::new(2.0, 1.2))
            .material("wood"),
        SceneObject::new("mug", MeshKind::Cylinder)
            .scale(v3(0.85, 1.2, 0.85))
            .rotate(v3(0.0, -25.0, 0.0))
            .at(v3(4.2, 0.6, -4.2))
            .parts(MeshParts::OPEN_TOP)
            .material("ceramic"),
        SceneObject::new("mug handle", MeshKind::Torus)
            .scale(Vec3::splat(0.32))
            .rotate(v3(0.0, 90.0, 0.0))
            .at(v3(4.8, 1.1, -4.2))
            .material("ceramic"),
        SceneObject::new("vase", MeshKind::TaperedCylinder)
            .scale(v3(0.8, 2.0, 0.8))
            .at(v3(-5.0, 1.0, -7.0))
            .textured("glass", Vec2::ONE)
            .material("glass"),
    ];

    for (i, head) in FLOWER_HEADS.into_iter().enumerate() {
        objects.push(
            SceneObject::new(format!("flower {} stem", i + 1), MeshKind::Cylinder)
                .scale(v3(0.015, 0.9, 0.015))
                .rotate(v3(-5.0 + i as f32 * 6.0, 0.0, 0.0))
                .at(head - v3(0.0, 0.45, 0.0))
                .material("stem"),
        );
        objects.push(
            SceneObject::new(format!("flower {} petals", i + 1), MeshKind::Cone)
                .scale(v3(0.09, 0.14, 0.09))
                .at(head)
                .material("petal"),
        );
        objects.push(
            SceneObject::new(format!("flower {} center", i + 1), MeshKind::Sphere)
                .scale(Vec3::splat(0.04))
                .at(head + v3(0.0, 0.03, 0.0))
                .material("center"),
        );
    }

    objects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Surface;
    use std::collections::HashSet;

    #[test]
    fn scene_has_twenty_four_objects() {
        assert_eq!(objects().len(), 24);
    }

    #[test]
    fn every_material_tag_is_registered() {
        let registered: HashSet<_> = materials().into_iter().map(|m| m.tag).collect();
        for obj in objects() {
            if let Some(tag) = &obj.material {
                assert!(registered.contains(tag), "{} uses unknown material {tag}", obj.label);
            }
        }
    }

    #[test]
    fn every_texture_tag_is_loaded() {
        let loaded: HashSet<_> = textures().into_iter().map(|t| t.tag).collect();
        for obj in objects() {
            if let Surface::Texture { tag, .. } = &obj.surface {
                assert!(loaded.contains(tag), "{} uses unknown texture {tag}", obj.label);
            }
        }
    }

    #[test]
    fn texture_list_fits_registry() {
        assert!(textures().len() <= stilllife_assets::TEXTURE_CAPACITY);
    }

    #[test]
    fn only_the_bowl_group_spins() {
        let spinning: Vec<_> = objects()
            .into_iter()
            .filter(|o| o.spins)
            .map(|o| o.label)
            .collect();
        assert_eq!(spinning.len(), 9);
        assert!(spinning.iter().all(|l| l.starts_with("bowl")
            || ["apple", "orange", "lemon", "pear", "pear stem"].contains(&l.as_str())));
    }
}
