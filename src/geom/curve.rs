//! Boundary curve primitives consumed by the frame builder and the area-moment
//! integrator.
//!
//! The kernel only needs a handful of capabilities from a curve: parametric
//! evaluation, range, closest point, and its oriented boundary-integral
//! contribution. [`BoundaryCurve`] is the single dispatch point for all of
//! them.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use super::core::{Point3, Tolerance, Vec3};
use super::range::Range3;
use super::transform::Transform;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("line string requires at least {min} points, got {found}")]
    TooFewPoints { min: usize, found: usize },
    #[error("curve coordinates must be finite")]
    NonFinite,
    #[error("a loop may only contain curve primitives, not other loops")]
    NestedLoop,
}

pub trait Curve3 {
    /// Position at `t` in `[0, 1]`.
    fn point_at(&self, t: f64) -> Point3;

    fn length(&self) -> f64;

    #[must_use]
    fn is_closed(&self) -> bool {
        false
    }

    #[must_use]
    fn start_point(&self) -> Point3 {
        self.point_at(0.0)
    }

    #[must_use]
    fn end_point(&self) -> Point3 {
        self.point_at(1.0)
    }

    /// `d point / dt`; central difference unless the curve knows better.
    #[must_use]
    fn derivative_at(&self, t: f64) -> Vec3 {
        const H: f64 = 1e-6;
        let t0 = (t - H).max(0.0);
        let t1 = (t + H).min(1.0);
        if t1 <= t0 {
            return Vec3::ZERO;
        }
        self.point_at(t1)
            .sub_point(self.point_at(t0))
            .mul_scalar(1.0 / (t1 - t0))
    }
}

/// Closest point on a curve to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveLocation {
    pub point: Point3,
    pub distance: f64,
}

impl CurveLocation {
    fn at(point: Point3, query: Point3) -> Self {
        Self {
            point,
            distance: point.distance_to(query),
        }
    }

    fn closer(self, other: Self) -> Self {
        if other.distance < self.distance { other } else { self }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Line segment
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line3 {
    pub start: Point3,
    pub end: Point3,
}

impl Line3 {
    #[must_use]
    pub const fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn direction(self) -> Vec3 {
        self.end.sub_point(self.start)
    }

    #[must_use]
    pub fn closest_point(&self, p: Point3) -> CurveLocation {
        CurveLocation::at(closest_point_on_segment(self.start, self.end, p), p)
    }
}

impl Curve3 for Line3 {
    fn point_at(&self, t: f64) -> Point3 {
        self.start.lerp(self.end, t)
    }

    fn length(&self) -> f64 {
        self.direction().length()
    }

    fn derivative_at(&self, _t: f64) -> Vec3 {
        self.direction()
    }
}

fn closest_point_on_segment(a: Point3, b: Point3, p: Point3) -> Point3 {
    let d = b.sub_point(a);
    let dd = d.length_squared();
    if dd <= 0.0 {
        return a;
    }
    let t = (p.sub_point(a).dot(d) / dd).clamp(0.0, 1.0);
    a.lerp(b, t)
}

// ─────────────────────────────────────────────────────────────────────────────
// Line string
// ─────────────────────────────────────────────────────────────────────────────

/// Line string parameterized by arc length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolylineData", into = "PolylineData")]
pub struct Polyline3 {
    points: Vec<Point3>,
    cumulative_lengths: Vec<f64>,
    total_length: f64,
    closed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PolylineData {
    points: Vec<Point3>,
    #[serde(default)]
    closed: bool,
}

impl TryFrom<PolylineData> for Polyline3 {
    type Error = CurveError;
    fn try_from(data: PolylineData) -> Result<Self, Self::Error> {
        Self::new(data.points, data.closed)
    }
}

impl From<Polyline3> for PolylineData {
    fn from(polyline: Polyline3) -> Self {
        Self {
            points: polyline.points,
            closed: polyline.closed,
        }
    }
}

impl Polyline3 {
    /// A closed line string drops a repeated final point; the closing edge is
    /// implicit.
    pub fn new(mut points: Vec<Point3>, closed: bool) -> Result<Self, CurveError> {
        if points.len() < 2 {
            return Err(CurveError::TooFewPoints {
                min: 2,
                found: points.len(),
            });
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(CurveError::NonFinite);
        }
        if closed && points.len() > 2 && points.first() == points.last() {
            points.pop();
        }

        let mut cumulative_lengths = Vec::with_capacity(points.len());
        cumulative_lengths.push(0.0);
        let mut total = 0.0;
        for window in points.windows(2) {
            total += window[1].sub_point(window[0]).length();
            cumulative_lengths.push(total);
        }

        if closed {
            total += points
                .first()
                .copied()
                .zip(points.last().copied())
                .map(|(first, last)| first.sub_point(last).length())
                .unwrap_or(0.0);
        }

        Ok(Self {
            points,
            cumulative_lengths,
            total_length: total,
            closed,
        })
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Consecutive vertex pairs, including the closing edge when closed.
    pub fn edges(&self) -> impl Iterator<Item = (Point3, Point3)> + '_ {
        let closing = if self.closed {
            self.points.last().copied().zip(self.points.first().copied())
        } else {
            None
        };
        self.points
            .windows(2)
            .map(|w| (w[0], w[1]))
            .chain(closing)
    }

    #[must_use]
    pub fn closest_point(&self, p: Point3) -> CurveLocation {
        let mut best = CurveLocation::at(self.points[0], p);
        for (a, b) in self.edges() {
            best = best.closer(CurveLocation::at(closest_point_on_segment(a, b, p), p));
        }
        best
    }
}

impl Curve3 for Polyline3 {
    fn point_at(&self, t: f64) -> Point3 {
        if self.total_length <= 0.0 || !self.total_length.is_finite() {
            return self.points[0];
        }

        let mut target = t.clamp(0.0, 1.0) * self.total_length;

        let last_index = self.points.len() - 1;
        if target >= self.cumulative_lengths[last_index] {
            if !self.closed {
                return self.points[last_index];
            }

            let last = self.points[last_index];
            let first = self.points[0];
            let segment_length = first.sub_point(last).length();
            if segment_length == 0.0 {
                return last;
            }
            let ratio =
                ((target - self.cumulative_lengths[last_index]) / segment_length).clamp(0.0, 1.0);
            return last.lerp(first, ratio);
        }

        let idx = match self
            .cumulative_lengths
            .binary_search_by(|value| value.total_cmp(&target))
        {
            Ok(i) => i,
            Err(i) => i.max(1) - 1,
        };

        let seg_start = self.points[idx];
        let seg_end = self.points[idx + 1];
        let seg_len = seg_end.sub_point(seg_start).length();
        if seg_len == 0.0 {
            return seg_start;
        }
        target -= self.cumulative_lengths[idx];
        seg_start.lerp(seg_end, (target / seg_len).clamp(0.0, 1.0))
    }

    fn length(&self) -> f64 {
        self.total_length
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Arc
// ─────────────────────────────────────────────────────────────────────────────

/// Arc `center + cos(θ) * vector0 + sin(θ) * vector90` for θ from
/// `start_angle` to `start_angle + sweep_angle`.
///
/// Circular arcs have perpendicular vectors of equal length (the radius).
/// Affine images of an arc keep this form, which makes them elliptic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arc3 {
    pub center: Point3,
    pub vector0: Vec3,
    pub vector90: Vec3,
    pub start_angle: f64,
    pub sweep_angle: f64,
}

impl Arc3 {
    /// Circular arc in the plane with the given normal.
    #[must_use]
    pub fn new(center: Point3, normal: Vec3, radius: f64, start_angle: f64, sweep_angle: f64) -> Option<Self> {
        let (x_axis, y_axis) = frame_axes_from_normal(normal)?;
        Some(Self {
            center,
            vector0: x_axis.mul_scalar(radius),
            vector90: y_axis.mul_scalar(radius),
            start_angle,
            sweep_angle,
        })
    }

    /// Full counterclockwise circle in the XY plane.
    #[must_use]
    pub fn full_circle_xy(center: Point3, radius: f64) -> Self {
        Self {
            center,
            vector0: Vec3::X.mul_scalar(radius),
            vector90: Vec3::Y.mul_scalar(radius),
            start_angle: 0.0,
            sweep_angle: TAU,
        }
    }

    /// Circular arc that starts at `start`, passes through `middle` and ends at
    /// `end`. `None` when the points are collinear or coincident.
    #[must_use]
    pub fn from_start_middle_end(start: Point3, middle: Point3, end: Point3) -> Option<Self> {
        let u = middle.sub_point(start);
        let v = end.sub_point(start);
        let w = u.cross(v);
        let ww = w.length_squared();
        let scale = u.length_squared().max(v.length_squared());
        if !ww.is_finite() || ww <= Tolerance::ZERO_LENGTH.eps * scale * scale {
            return None;
        }

        let offset = v
            .cross(w)
            .mul_scalar(u.length_squared())
            .add(w.cross(u).mul_scalar(v.length_squared()))
            .mul_scalar(0.5 / ww);
        let center = start.add_vec(offset);
        let normal = w.normalized()?;
        let vector0 = start.sub_point(center);
        let vector90 = normal.cross(vector0);

        let to_end = end.sub_point(center);
        let mut sweep = to_end.dot(vector90).atan2(to_end.dot(vector0));
        if sweep <= 0.0 {
            sweep += TAU;
        }

        Some(Self {
            center,
            vector0,
            vector90,
            start_angle: 0.0,
            sweep_angle: sweep,
        })
    }

    #[must_use]
    pub fn angle_at(&self, t: f64) -> f64 {
        self.start_angle + self.sweep_angle * t
    }

    #[must_use]
    pub fn point_at_angle(&self, angle: f64) -> Point3 {
        self.center
            .add_vec(self.vector0.mul_scalar(angle.cos()))
            .add_vec(self.vector90.mul_scalar(angle.sin()))
    }

    #[must_use]
    pub fn is_circular(&self, tol: Tolerance) -> bool {
        let r0 = self.vector0.length();
        let r90 = self.vector90.length();
        tol.approx_eq_f64(r0, r90) && tol.is_small_relative(self.vector0.dot(self.vector90), r0 * r0)
    }

    /// Fraction of the sweep at which `angle` lies, or `None` when outside.
    #[must_use]
    pub fn angle_to_fraction(&self, angle: f64) -> Option<f64> {
        if self.sweep_angle == 0.0 {
            return None;
        }
        let mut delta = (angle - self.start_angle).rem_euclid(TAU);
        if self.sweep_angle < 0.0 && delta > 0.0 {
            delta -= TAU;
        }
        let t = delta / self.sweep_angle;
        if (0.0..=1.0).contains(&t) { Some(t) } else { None }
    }

    #[must_use]
    pub fn closest_point(&self, p: Point3) -> CurveLocation {
        let mut best =
            CurveLocation::at(self.point_at(0.0), p).closer(CurveLocation::at(self.point_at(1.0), p));

        if self.is_circular(Tolerance::SMALL_METRIC_DISTANCE) {
            let d = p.sub_point(self.center);
            let angle = d.dot(self.vector90).atan2(d.dot(self.vector0));
            if let Some(t) = self.angle_to_fraction(angle) {
                best = best.closer(CurveLocation::at(self.point_at(t), p));
            }
            return best;
        }

        // Elliptic image: dense sampling is enough for closest-point queries.
        const SAMPLES: usize = 128;
        for i in 1..SAMPLES {
            let t = i as f64 / SAMPLES as f64;
            best = best.closer(CurveLocation::at(self.point_at(t), p));
        }
        best
    }

    #[must_use]
    pub fn range(&self) -> Range3 {
        let mut range = Range3::null();
        range.extend_point(self.point_at(0.0));
        range.extend_point(self.point_at(1.0));
        for axis in 0..3 {
            // d/dθ of the coordinate vanishes at atan2(v90, v0) and opposite.
            let extreme = self.vector90.at(axis).atan2(self.vector0.at(axis));
            for angle in [extreme, extreme + PI] {
                if let Some(t) = self.angle_to_fraction(angle) {
                    range.extend_point(self.point_at(t));
                }
            }
        }
        range
    }

    #[must_use]
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            center: transform.multiply_point(self.center),
            vector0: transform.multiply_vec(self.vector0),
            vector90: transform.multiply_vec(self.vector90),
            start_angle: self.start_angle,
            sweep_angle: self.sweep_angle,
        }
    }
}

impl Curve3 for Arc3 {
    fn point_at(&self, t: f64) -> Point3 {
        self.point_at_angle(self.angle_at(t))
    }

    fn length(&self) -> f64 {
        if self.is_circular(Tolerance::SMALL_METRIC_DISTANCE) {
            return self.vector0.length() * self.sweep_angle.abs();
        }
        const SAMPLES: usize = 256;
        let mut total = 0.0;
        let mut previous = self.point_at(0.0);
        for i in 1..=SAMPLES {
            let next = self.point_at(i as f64 / SAMPLES as f64);
            total += next.distance_to(previous);
            previous = next;
        }
        total
    }

    fn is_closed(&self) -> bool {
        (self.sweep_angle.abs() - TAU).abs() <= Tolerance::SMALL_ANGLE.eps
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        let (sin, cos) = self.angle_at(t).sin_cos();
        self.vector90
            .mul_scalar(cos)
            .sub(self.vector0.mul_scalar(sin))
            .mul_scalar(self.sweep_angle)
    }
}

/// Two unit axes perpendicular to `normal` with `x × y = normal`.
fn frame_axes_from_normal(normal: Vec3) -> Option<(Vec3, Vec3)> {
    let n = normal.normalized()?;
    let reference = if n.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    let x_axis = reference.sub(n.mul_scalar(reference.dot(n))).normalized()?;
    let y_axis = n.cross(x_axis);
    Some((x_axis, y_axis))
}

// ─────────────────────────────────────────────────────────────────────────────
// Loop
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered chain of primitives expected to close on itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LoopData", into = "LoopData")]
pub struct CurveLoop {
    children: Vec<BoundaryCurve>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoopData {
    children: Vec<BoundaryCurve>,
}

impl TryFrom<LoopData> for CurveLoop {
    type Error = CurveError;
    fn try_from(data: LoopData) -> Result<Self, Self::Error> {
        Self::from_children(data.children)
    }
}

impl From<CurveLoop> for LoopData {
    fn from(curve_loop: CurveLoop) -> Self {
        Self {
            children: curve_loop.children,
        }
    }
}

impl CurveLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_children(children: Vec<BoundaryCurve>) -> Result<Self, CurveError> {
        let mut curve_loop = Self::new();
        for child in children {
            curve_loop.try_add_child(child)?;
        }
        Ok(curve_loop)
    }

    pub fn try_add_child(&mut self, child: BoundaryCurve) -> Result<(), CurveError> {
        if matches!(child, BoundaryCurve::Loop(_)) {
            return Err(CurveError::NestedLoop);
        }
        self.children.push(child);
        Ok(())
    }

    #[must_use]
    pub fn children(&self) -> &[BoundaryCurve] {
        &self.children
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Largest distance between the end of one child and the start of the
    /// next, wrapping around. `0.0` for an empty loop.
    #[must_use]
    pub fn closure_gap(&self) -> f64 {
        let n = self.children.len();
        (0..n)
            .map(|i| {
                let end = self.children[i].end_point();
                let next = self.children[(i + 1) % n].start_point();
                end.distance_to(next)
            })
            .fold(0.0, f64::max)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Every curve kind the kernel integrates over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BoundaryCurve {
    LineSegment(Line3),
    LineString(Polyline3),
    Arc(Arc3),
    Loop(CurveLoop),
}

impl BoundaryCurve {
    #[must_use]
    pub fn range(&self) -> Range3 {
        match self {
            Self::LineSegment(line) => Range3::from_points(&[line.start, line.end]),
            Self::LineString(polyline) => Range3::from_points(polyline.points()),
            Self::Arc(arc) => arc.range(),
            Self::Loop(curve_loop) => {
                let mut range = Range3::null();
                for child in curve_loop.children() {
                    range.extend_range(&child.range());
                }
                range
            }
        }
    }

    /// Range of the curve as seen through `transform`.
    #[must_use]
    pub fn range_in(&self, transform: &Transform) -> Range3 {
        self.transformed(transform).range()
    }

    /// A loop that closes within tolerance, or a single primitive that closes on
    /// itself.
    #[must_use]
    pub fn is_closed_loop(&self) -> bool {
        match self {
            Self::Loop(curve_loop) => {
                !curve_loop.is_empty()
                    && curve_loop.closure_gap() <= Tolerance::SMALL_METRIC_DISTANCE.eps
            }
            other => other.is_closed(),
        }
    }

    #[must_use]
    pub fn closest_point(&self, p: Point3) -> Option<CurveLocation> {
        match self {
            Self::LineSegment(line) => Some(line.closest_point(p)),
            Self::LineString(polyline) => Some(polyline.closest_point(p)),
            Self::Arc(arc) => Some(arc.closest_point(p)),
            Self::Loop(curve_loop) => curve_loop
                .children()
                .iter()
                .filter_map(|child| child.closest_point(p))
                .reduce(CurveLocation::closer),
        }
    }

    #[must_use]
    pub fn transformed(&self, transform: &Transform) -> Self {
        match self {
            Self::LineSegment(line) => Self::LineSegment(Line3::new(
                transform.multiply_point(line.start),
                transform.multiply_point(line.end),
            )),
            Self::LineString(polyline) => {
                let points = polyline
                    .points()
                    .iter()
                    .map(|p| transform.multiply_point(*p))
                    .collect();
                match Polyline3::new(points, polyline.is_closed()) {
                    Ok(moved) => Self::LineString(moved),
                    Err(_) => Self::LineString(polyline.clone()),
                }
            }
            Self::Arc(arc) => Self::Arc(arc.transformed(transform)),
            Self::Loop(curve_loop) => Self::Loop(CurveLoop {
                children: curve_loop
                    .children()
                    .iter()
                    .map(|child| child.transformed(transform))
                    .collect(),
            }),
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        match self {
            Self::LineSegment(line) => line.start.is_finite() && line.end.is_finite(),
            Self::LineString(polyline) => polyline.points().iter().all(|p| p.is_finite()),
            Self::Arc(arc) => {
                arc.center.is_finite()
                    && arc.vector0.is_finite()
                    && arc.vector90.is_finite()
                    && arc.start_angle.is_finite()
                    && arc.sweep_angle.is_finite()
            }
            Self::Loop(curve_loop) => curve_loop.children().iter().all(Self::is_finite),
        }
    }

    /// Number of primitives (a loop counts its children).
    #[must_use]
    pub fn primitive_count(&self) -> usize {
        match self {
            Self::Loop(curve_loop) => curve_loop.children().len(),
            _ => 1,
        }
    }
}

impl Curve3 for BoundaryCurve {
    /// For a loop, `t` is split evenly across the children.
    fn point_at(&self, t: f64) -> Point3 {
        match self {
            Self::LineSegment(line) => line.point_at(t),
            Self::LineString(polyline) => polyline.point_at(t),
            Self::Arc(arc) => arc.point_at(t),
            Self::Loop(curve_loop) => {
                let n = curve_loop.children().len();
                if n == 0 {
                    return Point3::ORIGIN;
                }
                let scaled = t.clamp(0.0, 1.0) * n as f64;
                let index = (scaled.floor() as usize).min(n - 1);
                curve_loop.children()[index].point_at(scaled - index as f64)
            }
        }
    }

    fn length(&self) -> f64 {
        match self {
            Self::LineSegment(line) => line.length(),
            Self::LineString(polyline) => polyline.length(),
            Self::Arc(arc) => arc.length(),
            Self::Loop(curve_loop) => curve_loop.children().iter().map(Curve3::length).sum(),
        }
    }

    fn is_closed(&self) -> bool {
        match self {
            Self::LineSegment(_) => false,
            Self::LineString(polyline) => polyline.is_closed(),
            Self::Arc(arc) => arc.is_closed(),
            Self::Loop(_) => self.is_closed_loop(),
        }
    }
}

impl From<Line3> for BoundaryCurve {
    fn from(line: Line3) -> Self {
        Self::LineSegment(line)
    }
}

impl From<Polyline3> for BoundaryCurve {
    fn from(polyline: Polyline3) -> Self {
        Self::LineString(polyline)
    }
}

impl From<Arc3> for BoundaryCurve {
    fn from(arc: Arc3) -> Self {
        Self::Arc(arc)
    }
}

impl From<CurveLoop> for BoundaryCurve {
    fn from(curve_loop: CurveLoop) -> Self {
        Self::Loop(curve_loop)
    }
}
