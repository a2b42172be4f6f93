use serde::{Deserialize, Serialize};

/// Primitive shapes the mesh library can build and draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MeshKind {
    Plane,
    Cylinder,
    Torus,
    Sphere,
    Box,
    Cone,
    TaperedCylinder,
}

impl MeshKind {
    pub const ALL: [MeshKind; 7] = [
        MeshKind::Plane,
        MeshKind::Cylinder,
        MeshKind::Torus,
        MeshKind::Sphere,
        MeshKind::Box,
        MeshKind::Cone,
        MeshKind::TaperedCylinder,
    ];

    /// Whether the shape has separable top/bottom caps.
    pub fn has_caps(self) -> bool {
        matches!(
            self,
            MeshKind::Cylinder | MeshKind::Cone | MeshKind::TaperedCylinder
        )
    }
}

impl std::fmt::Display for MeshKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MeshKind::Plane => "plane",
            MeshKind::Cylinder => "cylinder",
            MeshKind::Torus => "torus",
            MeshKind::Sphere => "sphere",
            MeshKind::Box => "box",
            MeshKind::Cone => "cone",
            MeshKind::TaperedCylinder => "tapered-cylinder",
        };
        f.pad(name)
    }
}

/// Which sub-surfaces of a shape to emit.
///
/// Only cylinders, cones and tapered cylinders have caps. For every other
/// kind the whole surface counts as `sides`. A cone has no top cap, so its
/// `top` flag is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshParts {
    pub top: bool,
    pub bottom: bool,
    pub sides: bool,
}

impl MeshParts {
    pub const ALL: MeshParts = MeshParts {
        top: true,
        bottom: true,
        sides: true,
    };

    /// Bottom cap and walls, no top: an open vessel.
    pub const OPEN_TOP: MeshParts = MeshParts {
        top: false,
        bottom: true,
        sides: true,
    };

    pub const SIDES_ONLY: MeshParts = MeshParts {
        top: false,
        bottom: false,
        sides: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.top || self.bottom || self.sides)
    }
}

impl Default for MeshParts {
    fn default() -> Self {
        Self::ALL
    }
}

impl std::fmt::Display for MeshParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flag = |on: bool, c: char| if on { c } else { '-' };
        write!(
            f,
            "{}{}{}",
            flag(self.top, 'T'),
            flag(self.bottom, 'B'),
            flag(self.sides, 'S')
        )
    }
}

/// Geometry service: builds each primitive once and draws it on demand.
pub trait MeshLibrary {
    /// Build the geometry for `kind`. Loading the same kind twice is a no-op.
    fn load_mesh(&mut self, kind: MeshKind);

    /// Draw `kind` with the current shader state, restricted to `parts`.
    fn draw_mesh(&mut self, kind: MeshKind, parts: MeshParts);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_display() {
        assert_eq!(MeshParts::ALL.to_string(), "TBS");
        assert_eq!(MeshParts::OPEN_TOP.to_string(), "-BS");
    }

    #[test]
    fn only_round_shapes_have_caps() {
        let capped: Vec<_> = MeshKind::ALL.iter().filter(|k| k.has_caps()).collect();
        assert_eq!(capped.len(), 3);
        assert!(!MeshKind::Torus.has_caps());
    }

    #[test]
    fn empty_parts() {
        let none = MeshParts {
            top: false,
            bottom: false,
            sides: false,
        };
        assert!(none.is_empty());
        assert!(!MeshParts::SIDES_ONLY.is_empty());
    }
}
