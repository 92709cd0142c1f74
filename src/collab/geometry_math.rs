//! Minimal math primitives.
//!
//! Spec §1 treats vectors/quaternions/frusta/bounding spheres as externally
//! supplied math primitives. A concrete type is still needed for the
//! `RenderContext::current_frustum` return value and for the fakes in
//! `tests/support`, so this module carries a small, self-contained
//! implementation adapted from the teacher's `scene/camera::Frustum`
//! (Gribb–Hartmann plane extraction) rather than reinventing one.

use glam::{Mat4, Vec3, Vec4};

/// A view frustum expressed as six signed-distance planes (`ax+by+cz+d`,
/// normalized so that the plane normal has unit length).
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Default for Frustum {
    fn default() -> Self {
        // All-zero planes never cull anything; a sane default for code
        // paths that haven't computed a real frustum yet.
        Self {
            planes: [Vec4::ZERO; 6],
        }
    }
}

impl Frustum {
    /// Extracts the six frustum planes from a combined view-projection
    /// matrix (Gribb–Hartmann method).
    #[must_use]
    pub fn from_matrix(m: Mat4) -> Self {
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];

        let mut planes = [
            rows[3] + rows[0], // left
            rows[3] - rows[0], // right
            rows[3] + rows[1], // bottom
            rows[3] - rows[1], // top
            rows[3] + rows[2], // near
            rows[3] - rows[2], // far
        ];

        for plane in &mut planes {
            let len = Vec3::new(plane.x, plane.y, plane.z).length();
            if len > 1e-6 {
                *plane /= len;
            } else {
                *plane = Vec4::ZERO;
            }
        }

        Self { planes }
    }

    /// A frustum that intersects everything — used when a collaborator has
    /// no meaningful frustum concept (e.g. a cube-map face before its
    /// camera is set up).
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Sphere/frustum intersection test.
    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        for plane in &self.planes {
            if plane.x == 0.0 && plane.y == 0.0 && plane.z == 0.0 {
                continue;
            }
            let dist = plane.x * center.x + plane.y * center.y + plane.z * center.z + plane.w;
            if dist < -radius {
                return false;
            }
        }
        true
    }
}

/// A bounding sphere in some consistent coordinate space (camera-relative
/// throughout this crate).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// The smallest sphere containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &BoundingSphere) -> BoundingSphere {
        let offset = other.center - self.center;
        let distance = offset.length();

        if distance + other.radius <= self.radius {
            return *self;
        }
        if distance + self.radius <= other.radius {
            return *other;
        }

        let new_radius = (self.radius + other.radius + distance) * 0.5;
        let direction = if distance > 1e-9 {
            offset / distance
        } else {
            Vec3::ZERO
        };
        let new_center = self.center + direction * (new_radius - self.radius);
        BoundingSphere::new(new_center, new_radius)
    }
}
