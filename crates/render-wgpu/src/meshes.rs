use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use std::f32::consts::TAU;
use std::ops::Range;
use stilllife_render::{MeshKind, MeshParts};

const SEGMENTS: u32 = 36;
const RINGS: u32 = 18;
const TORUS_MINOR_RADIUS: f32 = 0.25;
const TAPER_TOP_RADIUS: f32 = 0.6;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// CPU geometry for one primitive, with index ranges per sub-surface.
///
/// Shapes are unit sized: planes span `[-1, 1]` in X and Z, spheres and
/// tori have radius 1, boxes are unit cubes centred on the origin, and the
/// round solids stand on `y = 0` with height 1 and base radius 1.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub parts: PartRanges,
}

/// Index ranges of each sub-surface. Shapes without caps put everything in `sides`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRanges {
    pub top: Range<u32>,
    pub bottom: Range<u32>,
    pub sides: Range<u32>,
}

impl PartRanges {
    /// Index ranges to draw for `parts`, skipping empty ones.
    pub fn select(&self, parts: MeshParts) -> Vec<Range<u32>> {
        [
            (parts.top, &self.top),
            (parts.bottom, &self.bottom),
            (parts.sides, &self.sides),
        ]
        .into_iter()
        .filter(|(on, range)| *on && !range.is_empty())
        .map(|(_, range)| range.clone())
        .collect()
    }
}

impl MeshData {
    pub fn build(kind: MeshKind) -> Self {
        let mut b = Builder::default();
        let (top, bottom, sides) = match kind {
            MeshKind::Plane => (0..0, 0..0, b.section(plane)),
            MeshKind::Box => (0..0, 0..0, b.section(unit_box)),
            MeshKind::Sphere => (0..0, 0..0, b.section(sphere)),
            MeshKind::Torus => (0..0, 0..0, b.section(torus)),
            MeshKind::Cylinder => b.frustum(1.0, 1.0),
            MeshKind::Cone => b.frustum(1.0, 0.0),
            MeshKind::TaperedCylinder => b.frustum(1.0, TAPER_TOP_RADIUS),
        };
        Self {
            vertices: b.vertices,
            indices: b.indices,
            parts: PartRanges { top, bottom, sides },
        }
    }
}

#[derive(Default)]
struct Builder {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl Builder {
    fn vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2) -> u32 {
        self.vertices.push(Vertex {
            position: position.to_array(),
            normal: normal.normalize_or_zero().to_array(),
            uv: uv.to_array(),
        });
        self.vertices.len() as u32 - 1
    }

    fn quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, c, c, d, a]);
    }

    /// Run `emit` and return the index range it appended.
    fn section(&mut self, emit: impl FnOnce(&mut Self)) -> Range<u32> {
        let start = self.indices.len() as u32;
        emit(self);
        start..self.indices.len() as u32
    }

    /// Grid of `(columns + 1) x (rows + 1)` vertices produced by `at(u, v)`.
    fn grid(&mut self, columns: u32, rows: u32, at: impl Fn(f32, f32) -> (Vec3, Vec3)) {
        let base = self.vertices.len() as u32;
        for row in 0..=rows {
            let v = row as f32 / rows as f32;
            for col in 0..=columns {
                let u = col as f32 / columns as f32;
                let (position, normal) = at(u, v);
                self.vertex(position, normal, Vec2::new(u, v));
            }
        }
        let stride = columns + 1;
        for row in 0..rows {
            for col in 0..columns {
                let i = base + row * stride + col;
                self.quad(i, i + 1, i + stride + 1, i + stride);
            }
        }
    }

    /// Flat disc at height `y` facing `normal_y` (+1 or -1).
    fn cap(&mut self, radius: f32, y: f32, normal_y: f32) {
        let normal = Vec3::Y * normal_y;
        let center = self.vertex(Vec3::new(0.0, y, 0.0), normal, Vec2::splat(0.5));
        let first = self.vertices.len() as u32;
        for i in 0..=SEGMENTS {
            let (sin, cos) = (i as f32 / SEGMENTS as f32 * TAU).sin_cos();
            self.vertex(
                Vec3::new(cos * radius, y, sin * radius),
                normal,
                Vec2::new(0.5 + cos * 0.5, 0.5 + sin * 0.5),
            );
        }
        for i in 0..SEGMENTS {
            self.indices.extend_from_slice(&[center, first + i, first + i + 1]);
        }
    }

    /// Open-ended or capped solid of revolution between two radii.
    /// Returns `(top, bottom, sides)` index ranges.
    fn frustum(&mut self, bottom_radius: f32, top_radius: f32) -> (Range<u32>, Range<u32>, Range<u32>) {
        let slope = bottom_radius - top_radius;
        let sides = self.section(|b| {
            b.grid(SEGMENTS, 1, |u, v| {
                let (sin, cos) = (u * TAU).sin_cos();
                let radius = bottom_radius + (top_radius - bottom_radius) * v;
                (
                    Vec3::new(cos * radius, v, sin * radius),
                    Vec3::new(cos, slope, sin),
                )
            })
        });
        let bottom = self.section(|b| b.cap(bottom_radius, 0.0, -1.0));
        let top = if top_radius > 0.0 {
            self.section(|b| b.cap(top_radius, 1.0, 1.0))
        } else {
            0..0
        };
        (top, bottom, sides)
    }
}

fn plane(b: &mut Builder) {
    b.grid(1, 1, |u, v| {
        (Vec3::new(u * 2.0 - 1.0, 0.0, v * 2.0 - 1.0), Vec3::Y)
    });
}

fn unit_box(b: &mut Builder) {
    let faces = [
        (Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_X, Vec3::Z),
        (Vec3::Y, Vec3::X),
        (Vec3::NEG_Y, Vec3::X),
        (Vec3::Z, Vec3::X),
        (Vec3::NEG_Z, Vec3::NEG_X),
    ];
    for (normal, tangent) in faces {
        let bitangent = normal.cross(tangent);
        b.grid(1, 1, |u, v| {
            (
                normal * 0.5 + tangent * (u - 0.5) + bitangent * (v - 0.5),
                normal,
            )
        });
    }
}

fn sphere(b: &mut Builder) {
    b.grid(SEGMENTS, RINGS, |u, v| {
        let (sin_theta, cos_theta) = (u * TAU).sin_cos();
        let (sin_phi, cos_phi) = (v * std::f32::consts::PI).sin_cos();
        let p = Vec3::new(cos_theta * sin_phi, -cos_phi, sin_theta * sin_phi);
        (p, p)
    });
}

/// Ring of major radius 1 lying in the XY plane.
fn torus(b: &mut Builder) {
    b.grid(SEGMENTS, RINGS, |u, v| {
        let (sin_major, cos_major) = (u * TAU).sin_cos();
        let (sin_minor, cos_minor) = (v * TAU).sin_cos();
        let center = Vec3::new(cos_major, sin_major, 0.0);
        let normal = center * cos_minor + Vec3::Z * sin_minor;
        (center + normal * TORUS_MINOR_RADIUS, normal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_meshes() -> impl Iterator<Item = (MeshKind, MeshData)> {
        MeshKind::ALL.into_iter().map(|k| (k, MeshData::build(k)))
    }

    #[test]
    fn indices_stay_in_bounds() {
        for (kind, mesh) in all_meshes() {
            let count = mesh.vertices.len() as u32;
            assert!(mesh.indices.iter().all(|&i| i < count), "{kind}");
            assert_eq!(mesh.indices.len() % 3, 0, "{kind}");
        }
    }

    #[test]
    fn normals_are_unit_length() {
        for (kind, mesh) in all_meshes() {
            for v in &mesh.vertices {
                let n = Vec3::from_array(v.normal);
                assert!((n.length() - 1.0).abs() < 1e-4, "{kind}: {n}");
            }
        }
    }

    #[test]
    fn ranges_partition_the_index_buffer() {
        for (kind, mesh) in all_meshes() {
            let covered: u32 = mesh.parts.select(MeshParts::ALL).iter().map(|r| r.len() as u32).sum();
            assert_eq!(covered, mesh.indices.len() as u32, "{kind}");
        }
    }

    #[test]
    fn capless_shapes_are_all_sides() {
        for (kind, mesh) in all_meshes().filter(|(k, _)| !k.has_caps()) {
            assert!(mesh.parts.top.is_empty() && mesh.parts.bottom.is_empty(), "{kind}");
            assert_eq!(mesh.parts.select(MeshParts::SIDES_ONLY).len(), 1);
        }
    }

    #[test]
    fn open_top_skips_the_top_cap() {
        let mesh = MeshData::build(MeshKind::Cylinder);
        let ranges = mesh.parts.select(MeshParts::OPEN_TOP);
        assert_eq!(ranges, vec![mesh.parts.bottom.clone(), mesh.parts.sides.clone()]);
    }

    #[test]
    fn cone_has_no_top_cap() {
        let mesh = MeshData::build(MeshKind::Cone);
        assert!(mesh.parts.top.is_empty());
        assert!(!mesh.parts.bottom.is_empty());
    }

    #[test]
    fn tapered_top_is_narrower() {
        let mesh = MeshData::build(MeshKind::TaperedCylinder);
        let top_extent = mesh.vertices[mesh.indices[mesh.parts.top.start as usize + 1] as usize].position;
        let r = Vec2::new(top_extent[0], top_extent[2]).length();
        assert!((r - TAPER_TOP_RADIUS).abs() < 1e-5);
    }

    #[test]
    fn sphere_vertices_on_unit_radius() {
        let mesh = MeshData::build(MeshKind::Sphere);
        for v in &mesh.vertices {
            assert!((Vec3::from_array(v.position).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn empty_parts_draw_nothing() {
        let parts = MeshParts {
            top: false,
            bottom: false,
            sides: false,
        };
        assert!(MeshData::build(MeshKind::Box).parts.select(parts).is_empty());
    }
}
