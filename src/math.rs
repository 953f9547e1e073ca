//! Vector math for the mesh editing model
//!
//! Positions and UVs are compared with exact equality: the weld-group index
//! and the boundary-edge matching both rely on bitwise-identical floats, not
//! epsilon neighborhoods.

use std::ops::{Add, Sub, Mul, Neg};
use serde::{Serialize, Deserialize};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn sqr_len(self) -> f32 {
        self.dot(self)
    }

    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).len()
    }

    /// Component-wise comparison within a small tolerance.
    /// Used for normal matching when hunting for a quad partner triangle;
    /// everywhere else positions are compared exactly.
    pub fn approximately_equal(self, other: Vec3) -> bool {
        const EPS: f32 = 1e-4;
        (self.x - other.x).abs() < EPS
            && (self.y - other.y).abs() < EPS
            && (self.z - other.z).abs() < EPS
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// 2D Vector (for texture coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn len(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// How far along the segment a-b the projection of p falls, as a fraction.
/// 0 at a, 1 at b; unclamped. A zero-length segment yields 0.
pub fn proportion_along_segment(a: Vec3, b: Vec3, p: Vec3) -> f32 {
    let ab = b - a;
    let sqr_len = ab.sqr_len();
    if sqr_len < 1e-12 {
        return 0.0;
    }
    (p - a).dot(ab) / sqr_len
}

/// Closest point to p on the segment a-b (clamped to the endpoints).
pub fn nearest_point_on_segment(a: Vec3, b: Vec3, p: Vec3) -> Vec3 {
    let t = proportion_along_segment(a, b, p).clamp(0.0, 1.0);
    a + (b - a) * t
}

/// Distance from p to the segment a-b.
pub fn distance_to_segment(a: Vec3, b: Vec3, p: Vec3) -> f32 {
    nearest_point_on_segment(a, b, p).distance(p)
}

/// Project a 3D point into the 2D coordinate frame spanned by two
/// (ideally orthonormal) plane axes. Used by the UV tweak tool to turn
/// tool motion into UV-space motion.
pub fn project_to_2d(plane_up: Vec3, plane_right: Vec3, v: Vec3) -> Vec2 {
    Vec2::new(v.dot(plane_right), v.dot(plane_up))
}
