use serde::{Deserialize, Serialize};

use super::core::{Point3, Vec3};
use super::transform::Transform;

/// Axis-aligned range that may be null (empty).
///
/// A null range has `low > high` on every axis, so extending it with the first
/// point makes it exactly that point. Length queries on a null range return 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range3 {
    pub low: Point3,
    pub high: Point3,
}

impl Range3 {
    #[must_use]
    pub const fn null() -> Self {
        Self {
            low: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            high: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    /// Range spanning both corners; the corners may be given in any order.
    #[must_use]
    pub fn from_xyz_xyz(x0: f64, y0: f64, z0: f64, x1: f64, y1: f64, z1: f64) -> Self {
        let mut range = Self::null();
        range.extend_point(Point3::new(x0, y0, z0));
        range.extend_point(Point3::new(x1, y1, z1));
        range
    }

    #[must_use]
    pub fn from_points(points: &[Point3]) -> Self {
        let mut range = Self::null();
        for p in points {
            range.extend_point(*p);
        }
        range
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.low.x > self.high.x || self.low.y > self.high.y || self.low.z > self.high.z
    }

    pub fn extend_point(&mut self, p: Point3) {
        self.low.x = self.low.x.min(p.x);
        self.low.y = self.low.y.min(p.y);
        self.low.z = self.low.z.min(p.z);
        self.high.x = self.high.x.max(p.x);
        self.high.y = self.high.y.max(p.y);
        self.high.z = self.high.z.max(p.z);
    }

    /// Extend by the image of `p` under `transform`.
    pub fn extend_transformed_point(&mut self, transform: &Transform, p: Point3) {
        self.extend_point(transform.multiply_point(p));
    }

    pub fn extend_range(&mut self, other: &Self) {
        if other.is_null() {
            return;
        }
        self.extend_point(other.low);
        self.extend_point(other.high);
    }

    #[must_use]
    pub fn x_length(&self) -> f64 {
        if self.is_null() { 0.0 } else { self.high.x - self.low.x }
    }

    #[must_use]
    pub fn y_length(&self) -> f64 {
        if self.is_null() { 0.0 } else { self.high.y - self.low.y }
    }

    #[must_use]
    pub fn z_length(&self) -> f64 {
        if self.is_null() { 0.0 } else { self.high.z - self.low.z }
    }

    /// Largest single-axis extent.
    #[must_use]
    pub fn max_length(&self) -> f64 {
        self.x_length().max(self.y_length()).max(self.z_length())
    }

    #[must_use]
    pub fn diagonal(&self) -> Vec3 {
        Vec3::new(self.x_length(), self.y_length(), self.z_length())
    }

    /// Point at fractional coordinates of the box. Fractions outside `[0, 1]`
    /// extrapolate. A null range yields the origin.
    #[must_use]
    pub fn fraction_to_point(&self, fx: f64, fy: f64, fz: f64) -> Point3 {
        if self.is_null() {
            return Point3::ORIGIN;
        }
        Point3::new(
            self.low.x + fx * self.x_length(),
            self.low.y + fy * self.y_length(),
            self.low.z + fz * self.z_length(),
        )
    }

    /// The eight corners, x varying fastest. Empty for a null range.
    #[must_use]
    pub fn corners(&self) -> Vec<Point3> {
        if self.is_null() {
            return Vec::new();
        }
        let mut corners = Vec::with_capacity(8);
        for fz in [0.0, 1.0] {
            for fy in [0.0, 1.0] {
                for fx in [0.0, 1.0] {
                    corners.push(self.fraction_to_point(fx, fy, fz));
                }
            }
        }
        corners
    }

    #[must_use]
    pub fn contains_point(&self, p: Point3) -> bool {
        !self.is_null()
            && p.x >= self.low.x
            && p.x <= self.high.x
            && p.y >= self.low.y
            && p.y <= self.high.y
            && p.z >= self.low.z
            && p.z <= self.high.z
    }
}

impl Default for Range3 {
    fn default() -> Self {
        Self::null()
    }
}
