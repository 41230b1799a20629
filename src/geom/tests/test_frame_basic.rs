use crate::geom::{
    Arc3, AxisScaleSelect, BoundaryCurve, CurveLoop, FrameBuilder, Line3, Matrix3, Point3, Polyline3, Range3,
    RangeFrameOptions, Tolerance, Transform, Vec3,
};

fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

#[test]
fn three_points_give_validated_right_handed_frame() {
    let cases = [
        [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
        [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)],
        [Point3::new(1.0, 2.0, -1.0), Point3::new(1.0, 3.0, 5.0), Point3::new(-2.0, 1.0, 7.0)],
    ];

    let mut builder = FrameBuilder::new();
    assert!(!builder.has_origin());

    for [p0, p1, p2] in cases {
        builder.clear();
        assert!(builder.get_validated_frame(false).is_none());

        let count0 = builder.announce_point(p0);
        let count1 = builder.announce_point(p0);
        assert_eq!(count0, count1, "repeated point is ignored");
        assert!(builder.has_origin());
        assert!(builder.get_validated_frame(false).is_none());

        builder.announce_point(p1);
        assert_eq!(builder.saved_vector_count(), 1);
        assert!(builder.get_validated_frame(false).is_none());

        builder.announce_point(p2);
        assert!(builder.get_validated_frame(true).is_none(), "left-handed request needs rank 3");

        let frame = builder.get_validated_frame(false).expect("right handed frame");
        assert!(frame.matrix.is_rigid(Tolerance::DEFAULT));

        let inverse = frame.inverse().expect("invertible frame");
        assert!(frame.multiply_transform(&inverse).is_identity(Tolerance::DEFAULT));

        let q0 = inverse.multiply_point(p0);
        let q1 = inverse.multiply_point(p1);
        let q2 = inverse.multiply_point(p2);
        assert!(Tolerance::DEFAULT.approx_eq_point3(q0, Point3::ORIGIN));
        assert!(approx_eq(q1.y, 0.0, 1e-12));
        assert!(approx_eq(q1.z, 0.0, 1e-12));
        assert!(approx_eq(q2.z, 0.0, 1e-12));
        assert!(q2.y >= 0.0);
    }
}

#[test]
fn unit_axis_points_give_identity_frame() {
    let mut builder = FrameBuilder::new();
    builder.announce_points(&[Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)]);
    let frame = builder.get_validated_frame(false).unwrap();
    assert!(frame.is_identity(Tolerance::DEFAULT));
}

#[test]
fn announced_vectors_track_rank() {
    let mut builder = FrameBuilder::new();
    builder.announce_point(Point3::new(0.0, 1.0, 1.0));
    assert_eq!(builder.saved_vector_count(), 0);
    builder.announce_vector(Vec3::ZERO);
    assert_eq!(builder.saved_vector_count(), 0);

    builder.clear();
    let (v0, v1, v2) = (Vec3::X, Vec3::Y, Vec3::Z);
    builder.announce(Point3::new(1.0, 2.0, 3.0));
    assert!(builder.get_validated_frame(false).is_none());
    assert_eq!(builder.announce(v0), 1);
    assert_eq!(builder.announce(v0), 1);
    assert_eq!(builder.announce_vector(v1), 2);
    assert_eq!(builder.announce_vector(v1.plus_scaled(v0, 2.0)), 2);
    assert_eq!(builder.announce_vector(v2), 3);

    let frame = builder.get_validated_frame(true).unwrap();
    assert_eq!(frame.origin, Point3::new(1.0, 2.0, 3.0));
    assert!(frame.matrix.is_rigid(Tolerance::DEFAULT));
}

#[test]
fn rank_tolerance_scales_with_magnitude() {
    let mut builder = FrameBuilder::new();
    builder.announce_point(Point3::ORIGIN);
    builder.announce_vector(Vec3::new(1.0e6, 0.0, 0.0));
    // Off-axis by far less than the relative bound at this magnitude.
    assert_eq!(builder.announce_vector(Vec3::new(1.0e6, 1.0e-5, 0.0)), 1);
    assert_eq!(builder.announce_vector(Vec3::new(1.0e6, 1.0, 0.0)), 2);
}

#[test]
fn null_range_gives_identity() {
    let t = FrameBuilder::create_local_to_world_transform_in_range(
        &Range3::null(),
        AxisScaleSelect::Unit,
        0.0,
        0.0,
        0.0,
        2.0,
    );
    assert_eq!(t, Transform::identity());
}

#[test]
fn range_frames_are_diagonal_and_invertible() {
    let range = Range3::from_xyz_xyz(1.0, 2.0, 3.0, 5.0, 7.0, 9.0);
    let expected = [
        (AxisScaleSelect::Unit, Matrix3::diagonal(2.0, 2.0, 2.0)),
        (AxisScaleSelect::LongestRangeDirection, Matrix3::diagonal(6.0, 6.0, 6.0)),
        (AxisScaleSelect::NonUniformRangeContainment, Matrix3::diagonal(4.0, 5.0, 6.0)),
    ];

    for (select, matrix) in expected {
        let t = FrameBuilder::create_local_to_world_transform_in_range(&range, select, 0.0, 0.0, 0.0, 2.0);
        assert_eq!(t.matrix, matrix, "{select:?}");
        assert!(t.matrix.is_diagonal(Tolerance::DEFAULT));
        assert!(t.inverse().is_some());
        assert_eq!(t.origin, range.low);
    }

    // Containment maps the unit cube onto the range.
    let t = FrameBuilder::create_local_to_world_transform_in_range(
        &range,
        AxisScaleSelect::NonUniformRangeContainment,
        0.0,
        0.0,
        0.0,
        1.0,
    );
    assert_eq!(t.multiply_point(Point3::new(1.0, 1.0, 1.0)), range.high);
}

#[test]
fn flat_wide_ranges_still_invert() {
    for (hx, hy, hz) in [(1.0e6, 1.0e-3, 1.0), (1.0e4, 1.0e-5, 1.0e-5), (1.0e3, 1.0e-4, 1.0)] {
        let range = Range3::from_xyz_xyz(0.0, 0.0, 0.0, hx, hy, hz);
        let t = FrameBuilder::create_local_to_world_transform_in_range(
            &range,
            AxisScaleSelect::NonUniformRangeContainment,
            0.0,
            0.0,
            0.0,
            1.0,
        );
        assert_eq!(t.matrix, Matrix3::diagonal(hx, hy, hz));

        let inverse = t.inverse().unwrap_or_else(|| panic!("extents ({hx}, {hy}, {hz}) must invert"));
        assert!(t.multiply_transform(&inverse).is_identity(Tolerance::DEFAULT));
        let unit = inverse.multiply_point(range.high);
        assert!(Tolerance::DEFAULT.approx_eq_point3(unit, Point3::new(1.0, 1.0, 1.0)));
    }
}

#[test]
fn range_frame_options_place_origin() {
    let range = Range3::from_xyz_xyz(1.0, 2.0, 3.0, 5.0, 7.0, 9.0);
    let options = RangeFrameOptions {
        select: AxisScaleSelect::Unit,
        origin_fraction: [0.5, 0.5, 0.5],
        ..RangeFrameOptions::default()
    };
    let t = FrameBuilder::create_local_to_world_transform_with_options(&range, &options);
    assert_eq!(t.origin, Point3::new(3.0, 4.5, 6.0));
    assert!(t.matrix.is_identity(Tolerance::DEFAULT));
}

#[test]
fn flat_range_uses_default_length_for_missing_axis() {
    let range = Range3::from_xyz_xyz(0.0, 0.0, 0.0, 4.0, 3.0, 0.0);
    let t = FrameBuilder::create_local_to_world_transform_in_range(
        &range,
        AxisScaleSelect::NonUniformRangeContainment,
        0.0,
        0.0,
        0.0,
        2.0,
    );
    assert_eq!(t.matrix, Matrix3::diagonal(4.0, 3.0, 2.0));
}

fn square_and_bulge(zz: f64) -> BoundaryCurve {
    let a = 10.0;
    let mut curve_loop = CurveLoop::new();
    curve_loop
        .try_add_child(
            Polyline3::new(
                vec![
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(a, 0.0, 0.0),
                    Point3::new(a, a, 0.0),
                    Point3::new(0.0, a, 0.0),
                ],
                false,
            )
            .unwrap()
            .into(),
        )
        .unwrap();
    curve_loop
        .try_add_child(
            Arc3::from_start_middle_end(
                Point3::new(0.0, a, 0.0),
                Point3::new(-a / 2.0, a / 2.0, zz),
                Point3::new(0.0, 0.0, 0.0),
            )
            .unwrap()
            .into(),
        )
        .unwrap();
    curve_loop.into()
}

#[test]
fn curves_to_plane_detects_non_planar_loops() {
    for zz in [-1.0, 0.0, 1.0] {
        let curve = square_and_bulge(zz);
        let plane = FrameBuilder::curves_to_plane(std::slice::from_ref(&curve), Tolerance::SMALL_METRIC_DISTANCE);
        assert_eq!(plane.is_some(), zz == 0.0, "zz = {zz}");
    }

    let plane = FrameBuilder::curves_to_plane(&[square_and_bulge(0.0)], Tolerance::SMALL_METRIC_DISTANCE).unwrap();
    assert!(plane.matrix.is_rigid(Tolerance::DEFAULT));
    assert!(Tolerance::DEFAULT.approx_eq_vec3(plane.matrix.column(2), Vec3::Z));

    let segment: BoundaryCurve = Line3::new(Point3::new(1.0, 2.0, 4.0), Point3::new(5.0, 2.0, 3.0)).into();
    assert!(FrameBuilder::curves_to_plane(&[segment], Tolerance::SMALL_METRIC_DISTANCE).is_none());
}

#[test]
fn default_up_completes_frame_for_straight_curve() {
    let segment: BoundaryCurve = Line3::new(Point3::new(1.0, 2.0, 0.0), Point3::new(5.0, 2.0, 0.0)).into();
    assert!(FrameBuilder::create_right_handed_local_to_world(std::slice::from_ref(&segment)).is_none());

    let frame = FrameBuilder::create_right_handed_frame(Some(Vec3::Z), &[segment]).unwrap();
    assert!(frame.matrix.is_rigid(Tolerance::DEFAULT));
    assert_eq!(frame.origin, Point3::new(1.0, 2.0, 0.0));
    assert!(Tolerance::DEFAULT.approx_eq_vec3(frame.matrix.column(0), Vec3::X));
    assert!(Tolerance::DEFAULT.approx_eq_vec3(frame.matrix.column(2), Vec3::Z));
}

#[test]
fn arc_alone_spans_its_plane() {
    let arc = Arc3::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 1.0, 1.0), 2.0, 0.0, 1.0).unwrap();
    let curve: BoundaryCurve = arc.into();
    let plane = FrameBuilder::curves_to_plane(&[curve], Tolerance::SMALL_METRIC_DISTANCE).unwrap();
    let normal = Vec3::new(0.0, 1.0, 1.0).normalized().unwrap();
    assert!(approx_eq(plane.matrix.column(2).dot(normal).abs(), 1.0, 1e-12));
}
