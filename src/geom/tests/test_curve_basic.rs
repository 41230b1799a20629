use std::f64::consts::{FRAC_PI_2, PI};

use crate::geom::{
    Arc3, BoundaryCurve, Curve3, CurveError, CurveLoop, Line3, Point3, Polyline3, Tolerance, Transform, Vec3,
};

fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

fn square_loop(size: f64) -> Polyline3 {
    Polyline3::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(size, 0.0, 0.0),
            Point3::new(size, size, 0.0),
            Point3::new(0.0, size, 0.0),
        ],
        true,
    )
    .expect("valid square")
}

#[test]
fn polyline_rejects_short_and_non_finite_input() {
    assert_eq!(
        Polyline3::new(vec![Point3::ORIGIN], false),
        Err(CurveError::TooFewPoints { min: 2, found: 1 })
    );
    assert_eq!(
        Polyline3::new(vec![Point3::ORIGIN, Point3::new(f64::NAN, 0.0, 0.0)], false),
        Err(CurveError::NonFinite)
    );
}

#[test]
fn closed_polyline_drops_repeated_end_and_walks_closing_edge() {
    let square = Polyline3::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ],
        true,
    )
    .unwrap();
    assert_eq!(square.points().len(), 4);
    assert_eq!(square.edges().count(), 4);
    assert!(approx_eq(square.length(), 8.0, 1e-12));
    assert!(square.is_closed());

    let mid = square.point_at(0.5);
    assert!(Tolerance::DEFAULT.approx_eq_point3(mid, Point3::new(2.0, 2.0, 0.0)));
    assert!(Tolerance::DEFAULT.approx_eq_point3(square.end_point(), square.start_point()));
}

#[test]
fn arc_through_three_points_is_circular() {
    let start = Point3::new(0.0, 10.0, 0.0);
    let middle = Point3::new(-5.0, 5.0, 0.0);
    let end = Point3::new(0.0, 0.0, 0.0);
    let arc = Arc3::from_start_middle_end(start, middle, end).expect("arc");

    assert!(arc.is_circular(Tolerance::DEFAULT));
    assert!(Tolerance::DEFAULT.approx_eq_point3(arc.center, Point3::new(0.0, 5.0, 0.0)));
    assert!(approx_eq(arc.sweep_angle, PI, 1e-12));
    assert!(Tolerance::DEFAULT.approx_eq_point3(arc.start_point(), start));
    assert!(Tolerance::DEFAULT.approx_eq_point3(arc.point_at(0.5), middle));
    assert!(Tolerance::SMALL_METRIC_DISTANCE.approx_eq_point3(arc.end_point(), end));
    assert!(approx_eq(arc.length(), 5.0 * PI, 1e-9));
}

#[test]
fn collinear_points_make_no_arc() {
    let arc = Arc3::from_start_middle_end(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(2.0, 2.0, 2.0),
    );
    assert!(arc.is_none());
}

#[test]
fn full_circle_range_and_closest_point() {
    let circle = Arc3::full_circle_xy(Point3::new(1.0, 2.0, 0.0), 3.0);
    assert!(circle.is_closed());

    let range = circle.range();
    assert!(approx_eq(range.low.x, -2.0, 1e-12));
    assert!(approx_eq(range.high.x, 4.0, 1e-12));
    assert!(approx_eq(range.low.y, -1.0, 1e-12));
    assert!(approx_eq(range.high.y, 5.0, 1e-12));
    assert!(approx_eq(range.z_length(), 0.0, 1e-12));

    let hit = circle.closest_point(Point3::new(1.0, 10.0, 0.0));
    assert!(Tolerance::DEFAULT.approx_eq_point3(hit.point, Point3::new(1.0, 5.0, 0.0)));
    assert!(approx_eq(hit.distance, 5.0, 1e-9));
}

#[test]
fn arc_derivative_is_tangent() {
    let arc = Arc3::new(Point3::ORIGIN, Vec3::Z, 2.0, 0.0, FRAC_PI_2).unwrap();
    let d = arc.derivative_at(0.0);
    // Speed is radius * sweep, direction +Y at the start of a CCW arc.
    assert!(Tolerance::DEFAULT.approx_eq_vec3(d, Vec3::new(0.0, 2.0 * FRAC_PI_2, 0.0)));

    let line = Line3::new(Point3::ORIGIN, Point3::new(3.0, 4.0, 0.0));
    assert_eq!(line.derivative_at(0.3), Vec3::new(3.0, 4.0, 0.0));
}

#[test]
fn loop_rejects_nested_loops() {
    let inner = CurveLoop::from_children(vec![square_loop(1.0).into()]).unwrap();
    let mut outer = CurveLoop::new();
    assert_eq!(outer.try_add_child(inner.into()), Err(CurveError::NestedLoop));
    assert!(outer.is_empty());
}

#[test]
fn loop_of_line_and_arc_closes() {
    let a = 10.0;
    let line_string = Polyline3::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(a, 0.0, 0.0),
            Point3::new(a, a, 0.0),
            Point3::new(0.0, a, 0.0),
        ],
        false,
    )
    .unwrap();
    let arc = Arc3::from_start_middle_end(
        Point3::new(0.0, a, 0.0),
        Point3::new(-a / 2.0, a / 2.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
    )
    .unwrap();
    let curve: BoundaryCurve = CurveLoop::from_children(vec![line_string.into(), arc.into()])
        .unwrap()
        .into();

    assert!(curve.is_closed_loop());
    assert_eq!(curve.primitive_count(), 2);
    assert!(approx_eq(curve.length(), 3.0 * a + PI * a / 2.0, 1e-9));

    let range = curve.range();
    assert!(approx_eq(range.low.x, -a / 2.0, 1e-9));
    assert!(approx_eq(range.high.x, a, 1e-12));

    let hit = curve.closest_point(Point3::new(-20.0, 5.0, 0.0)).unwrap();
    assert!(Tolerance::DEFAULT.approx_eq_point3(hit.point, Point3::new(-5.0, 5.0, 0.0)));
}

#[test]
fn transformed_curve_range_follows_transform() {
    let curve: BoundaryCurve = square_loop(2.0).into();
    let shift = Transform::translate(Vec3::new(10.0, 0.0, -1.0));
    let range = curve.range_in(&shift);
    assert_eq!(range.low, Point3::new(10.0, 0.0, -1.0));
    assert_eq!(range.high, Point3::new(12.0, 2.0, -1.0));
}

#[test]
fn boundary_curves_round_trip_through_json() {
    let curve: BoundaryCurve = CurveLoop::from_children(vec![
        Line3::new(Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)).into(),
        Arc3 {
            center: Point3::new(1.0, 1.0, 0.0),
            vector0: Vec3::new(0.0, -1.0, 0.0),
            vector90: Vec3::new(1.0, 0.0, 0.0),
            start_angle: 0.0,
            sweep_angle: 1.5,
        }
        .into(),
        Polyline3::new(vec![Point3::new(2.0, 0.0, 0.0), Point3::ORIGIN], false)
            .unwrap()
            .into(),
    ])
    .unwrap()
    .into();

    let json = serde_json::to_string(&curve).expect("serialize");
    assert!(json.contains("\"type\":\"loop\""));
    assert!(json.contains("\"type\":\"lineSegment\""));
    assert!(json.contains("\"sweepAngle\":1.5"));
    let back: BoundaryCurve = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, curve);
}

#[test]
fn nested_loop_json_is_rejected() {
    let json = r#"{"type":"loop","children":[{"type":"loop","children":[]}]}"#;
    assert!(serde_json::from_str::<BoundaryCurve>(json).is_err());

    let short = r#"{"type":"lineString","points":[{"x":0.0,"y":0.0,"z":0.0}]}"#;
    assert!(serde_json::from_str::<BoundaryCurve>(short).is_err());
}
