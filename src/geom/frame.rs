//! Incremental construction of orthonormal frames.
//!
//! [`FrameBuilder`] accepts an unordered stream of points and vectors. The first
//! point becomes the origin; every later point contributes its offset from the
//! origin as a direction. Directions are orthogonalized against those already
//! saved (Gram-Schmidt) and kept only when the residual is significant, so the
//! saved count is the rank of the spanned subspace, capped at 3.
//!
//! The range-to-frame constructors build axis-aligned scaled frames from a
//! [`Range3`] and share the same [`Transform`] vocabulary.

use serde::{Deserialize, Serialize};

use super::core::{Point3, Tolerance, Vec3};
use super::curve::{BoundaryCurve, Curve3};
use super::matrix::Matrix3;
use super::range::Range3;
use super::transform::Transform;

// ─────────────────────────────────────────────────────────────────────────────
// FrameBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// A position or a direction fed to [`FrameBuilder::announce`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameDatum {
    Point(Point3),
    Vector(Vec3),
}

impl From<Point3> for FrameDatum {
    fn from(p: Point3) -> Self {
        Self::Point(p)
    }
}

impl From<Vec3> for FrameDatum {
    fn from(v: Vec3) -> Self {
        Self::Vector(v)
    }
}

const MAX_RANK: usize = 3;

/// Rank-tracking accumulator of points and vectors.
///
/// Saved vectors are mutually orthogonal but not normalized; normalization
/// happens only when a frame is extracted. Extraction never mutates the
/// builder.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuilder {
    origin: Option<Point3>,
    vectors: [Vec3; MAX_RANK],
    rank: usize,
    tol: Tolerance,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_tolerance(Tolerance::SMALL_METRIC_DISTANCE)
    }

    #[must_use]
    pub const fn with_tolerance(tol: Tolerance) -> Self {
        Self {
            origin: None,
            vectors: [Vec3::ZERO; MAX_RANK],
            rank: 0,
            tol,
        }
    }

    pub fn clear(&mut self) {
        self.origin = None;
        self.vectors = [Vec3::ZERO; MAX_RANK];
        self.rank = 0;
    }

    #[must_use]
    pub const fn has_origin(&self) -> bool {
        self.origin.is_some()
    }

    #[must_use]
    pub const fn origin(&self) -> Option<Point3> {
        self.origin
    }

    #[must_use]
    pub const fn saved_vector_count(&self) -> usize {
        self.rank
    }

    /// The `index`-th saved (orthogonalized, unnormalized) direction.
    #[must_use]
    pub fn saved_vector(&self, index: usize) -> Option<Vec3> {
        (index < self.rank).then(|| self.vectors[index])
    }

    /// First call sets the origin. Later calls announce the offset from the
    /// origin; a point within tolerance of the origin changes nothing.
    pub fn announce_point(&mut self, p: Point3) -> usize {
        if !p.is_finite() {
            log::debug!("FrameBuilder: ignoring non-finite point");
            return self.rank;
        }
        match self.origin {
            None => {
                self.origin = Some(p);
                self.rank
            }
            Some(origin) => {
                let offset = p.sub_point(origin);
                if self.tol.is_zero_vec3(offset) {
                    return self.rank;
                }
                self.announce_vector(offset)
            }
        }
    }

    /// Saves the part of `v` orthogonal to every saved vector, if it is
    /// significant relative to the magnitudes involved and fewer than three
    /// vectors are saved.
    pub fn announce_vector(&mut self, v: Vec3) -> usize {
        if self.rank >= MAX_RANK || !v.is_finite() {
            return self.rank;
        }

        let mut residual = v;
        let mut scale = v.length();
        for saved in &self.vectors[..self.rank] {
            let saved_sq = saved.length_squared();
            residual = residual.plus_scaled(*saved, -residual.dot(*saved) / saved_sq);
            scale = scale.max(saved_sq.sqrt());
        }

        if self.tol.is_small_relative(residual.length(), scale) {
            return self.rank;
        }
        self.vectors[self.rank] = residual;
        self.rank += 1;
        self.rank
    }

    pub fn announce(&mut self, datum: impl Into<FrameDatum>) -> usize {
        match datum.into() {
            FrameDatum::Point(p) => self.announce_point(p),
            FrameDatum::Vector(v) => self.announce_vector(v),
        }
    }

    pub fn announce_points(&mut self, points: &[Point3]) -> usize {
        for p in points {
            self.announce_point(*p);
        }
        self.rank
    }

    /// Announces the defining geometry of a boundary curve: segment ends, line
    /// string vertices, or an arc's start point followed by its in-plane axes.
    pub fn announce_curve(&mut self, curve: &BoundaryCurve) -> usize {
        match curve {
            BoundaryCurve::LineSegment(line) => {
                self.announce_point(line.start);
                self.announce_point(line.end);
            }
            BoundaryCurve::LineString(polyline) => {
                self.announce_points(polyline.points());
            }
            BoundaryCurve::Arc(arc) => {
                self.announce_point(arc.start_point());
                self.announce_vector(arc.vector0);
                self.announce_vector(arc.vector90);
            }
            BoundaryCurve::Loop(curve_loop) => {
                for child in curve_loop.children() {
                    self.announce_curve(child);
                }
            }
        }
        self.rank
    }

    /// Orthonormal frame at the origin, local X along the first saved vector.
    ///
    /// A right-handed request needs two saved vectors and takes Z as `X × Y`.
    /// With `allow_left_handed` all three saved vectors are required and the
    /// third is used as-is, so the result may be left-handed. `None` without
    /// an origin or with too few saved vectors.
    #[must_use]
    pub fn get_validated_frame(&self, allow_left_handed: bool) -> Option<Transform> {
        let origin = self.origin?;
        let required = if allow_left_handed { 3 } else { 2 };
        if self.rank < required {
            return None;
        }

        let x = self.vectors[0].normalized()?;
        let y = self.vectors[1].plus_scaled(x, -self.vectors[1].dot(x)).normalized()?;
        let z = if allow_left_handed {
            let right_handed = x.cross(y);
            if self.vectors[2].dot(right_handed) < 0.0 {
                right_handed.neg()
            } else {
                right_handed
            }
        } else {
            x.cross(y)
        };
        Some(Transform::from_origin_and_axes(origin, x, y, z))
    }

    /// Right-handed frame for a collection of curves.
    ///
    /// Uses the validated frame when the curves span two or more directions.
    /// When they span only one (a straight run), `default_up` completes the
    /// frame with local Z as close to it as possible.
    #[must_use]
    pub fn create_right_handed_frame(default_up: Option<Vec3>, curves: &[BoundaryCurve]) -> Option<Transform> {
        let mut builder = Self::new();
        for curve in curves {
            builder.announce_curve(curve);
        }
        if let Some(frame) = builder.get_validated_frame(false) {
            return Some(frame);
        }

        let origin = builder.origin?;
        let x = builder.saved_vector(0)?.normalized()?;
        let Some(up) = default_up else {
            log::debug!("FrameBuilder: curves span rank {} without a default up vector", builder.rank);
            return None;
        };
        let y = up.cross(x).normalized()?;
        Some(Transform::from_origin_and_axes(origin, x, y, x.cross(y)))
    }

    #[must_use]
    pub fn create_right_handed_local_to_world(curves: &[BoundaryCurve]) -> Option<Transform> {
        Self::create_right_handed_frame(None, curves)
    }

    /// Local-to-world frame of the plane containing `curves`, or `None` when
    /// they do not span a plane or leave it by more than `tol`.
    #[must_use]
    pub fn curves_to_plane(curves: &[BoundaryCurve], tol: Tolerance) -> Option<Transform> {
        let frame = Self::create_right_handed_local_to_world(curves)?;
        let world_to_local = frame.inverse()?;

        let mut local_range = Range3::null();
        for curve in curves {
            local_range.extend_range(&curve.range_in(&world_to_local));
        }
        let thickness = local_range.z_length();
        if thickness <= tol.eps {
            Some(frame)
        } else {
            log::debug!("curves_to_plane: out-of-plane extent {thickness:e} exceeds {:e}", tol.eps);
            None
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Range frames
    // ─────────────────────────────────────────────────────────────────────

    /// Axis-aligned frame scaled from `range`.
    ///
    /// The origin sits at the given fractions of the range. A null range gives
    /// the identity. Axis lengths within tolerance of zero, and a degenerate
    /// `default_axis_length`, are replaced so the result stays invertible.
    #[must_use]
    pub fn create_local_to_world_transform_in_range(
        range: &Range3,
        select: AxisScaleSelect,
        origin_fraction_x: f64,
        origin_fraction_y: f64,
        origin_fraction_z: f64,
        default_axis_length: f64,
    ) -> Transform {
        if range.is_null() {
            return Transform::identity();
        }

        let tol = Tolerance::SMALL_METRIC_DISTANCE;
        let default_length = if default_axis_length.is_finite() && default_axis_length.abs() > tol.eps {
            default_axis_length
        } else {
            log::debug!("range frame: replacing default axis length {default_axis_length} with 1");
            1.0
        };

        let (ax, ay, az) = match select {
            AxisScaleSelect::Unit => (default_length, default_length, default_length),
            AxisScaleSelect::LongestRangeDirection => {
                let a = tol.correct_small_metric_distance(range.max_length(), default_length);
                (a, a, a)
            }
            AxisScaleSelect::NonUniformRangeContainment => (
                tol.correct_small_metric_distance(range.x_length(), default_length),
                tol.correct_small_metric_distance(range.y_length(), default_length),
                tol.correct_small_metric_distance(range.z_length(), default_length),
            ),
        };

        let origin = range.fraction_to_point(origin_fraction_x, origin_fraction_y, origin_fraction_z);
        Transform::from_matrix_origin(Matrix3::diagonal(ax, ay, az), origin)
    }

    #[must_use]
    pub fn create_local_to_world_transform_with_options(range: &Range3, options: &RangeFrameOptions) -> Transform {
        let [fx, fy, fz] = options.origin_fraction;
        Self::create_local_to_world_transform_in_range(
            range,
            options.select,
            fx,
            fy,
            fz,
            options.default_axis_length,
        )
    }
}

/// Axis scaling policy for range frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisScaleSelect {
    /// Every axis gets the default axis length.
    #[default]
    Unit,
    /// Every axis gets the largest single-axis extent of the range.
    LongestRangeDirection,
    /// Each axis gets its own extent, so the unit cube maps onto the range.
    NonUniformRangeContainment,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RangeFrameOptions {
    pub select: AxisScaleSelect,
    pub origin_fraction: [f64; 3],
    pub default_axis_length: f64,
}

impl Default for RangeFrameOptions {
    fn default() -> Self {
        Self {
            select: AxisScaleSelect::Unit,
            origin_fraction: [0.0, 0.0, 0.0],
            default_axis_length: 1.0,
        }
    }
}
