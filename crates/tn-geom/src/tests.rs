//! Unit tests for the geometry kernel.
//!
//! Fixtures are laid out near (0°, 0°) where a degree of longitude and a
//! degree of latitude are nearly the same length, so "meter" coordinates can
//! be converted with the equatorial constant and stay intuitive.

#[cfg(test)]
mod fixtures {
    use tn_core::{Coord3, Polyline, meters_to_degrees};

    /// A coordinate from nominal meter offsets east/north of the origin.
    pub fn m(x: f64, y: f64) -> Coord3 {
        Coord3::xy(meters_to_degrees(x), meters_to_degrees(y))
    }

    pub fn mz(x: f64, y: f64, ele: f64) -> Coord3 {
        let mut c = m(x, y);
        c.ele = ele;
        c
    }

    pub fn line(pts: &[(f64, f64)]) -> Polyline {
        Polyline::new(pts.iter().map(|&(x, y)| m(x, y)).collect())
    }
}

#[cfg(test)]
mod geodesic {
    use approx::assert_relative_eq;
    use tn_core::{Coord3, Polyline};

    use crate::geodesic::{distance_m, elevation_gain_loss, length_m};
    use crate::GeomError;

    #[test]
    fn equatorial_degree_of_longitude() {
        let d = distance_m(Coord3::xy(0.0, 0.0), Coord3::xy(1.0, 0.0));
        assert_relative_eq!(d, 111_319.49, epsilon = 1.0);
    }

    #[test]
    fn meridian_degree_shorter_than_equatorial() {
        let d = distance_m(Coord3::xy(0.0, 0.0), Coord3::xy(0.0, 1.0));
        assert_relative_eq!(d, 110_574.4, epsilon = 1.0);
    }

    #[test]
    fn length_sums_vertices() {
        let p = Polyline::new(vec![
            Coord3::xy(0.0, 0.0),
            Coord3::xy(0.001, 0.0),
            Coord3::xy(0.002, 0.0),
        ]);
        let whole = length_m(&p).unwrap();
        let direct = distance_m(p.start(), p.end());
        assert_relative_eq!(whole, direct, epsilon = 1e-6);
    }

    #[test]
    fn single_point_is_an_error() {
        let p = Polyline::new(vec![Coord3::xy(0.0, 0.0)]);
        assert!(matches!(length_m(&p), Err(GeomError::TooFewPoints(1))));
    }

    #[test]
    fn gain_loss_from_vertex_deltas() {
        let p = Polyline::new(vec![
            Coord3::new(0.0, 0.0, 100.0),
            Coord3::new(0.001, 0.0, 150.0),
            Coord3::new(0.002, 0.0, 120.0),
        ]);
        let (gain, loss) = elevation_gain_loss(&p);
        assert_relative_eq!(gain, 50.0);
        assert_relative_eq!(loss, 30.0);
    }

    #[test]
    fn nan_elevation_contributes_nothing() {
        let p = Polyline::new(vec![
            Coord3::new(0.0, 0.0, f64::NAN),
            Coord3::new(0.001, 0.0, 150.0),
        ]);
        let (gain, loss) = elevation_gain_loss(&p);
        assert_eq!((gain, loss), (0.0, 0.0));
    }
}

#[cfg(test)]
mod projection {
    use approx::assert_relative_eq;

    use super::fixtures::{line, m};
    use crate::ops::closest_point_on;

    #[test]
    fn midpoint_projection() {
        let p = line(&[(0.0, 0.0), (0.0, 100.0)]);
        let proj = closest_point_on(&p, m(-10.0, 50.0)).unwrap();
        assert_relative_eq!(proj.ratio, 0.5, epsilon = 1e-9);
        assert!(proj.point.same_position(m(0.0, 50.0)));
    }

    #[test]
    fn beyond_end_clamps_to_endpoint() {
        let p = line(&[(0.0, 0.0), (0.0, 100.0)]);
        let proj = closest_point_on(&p, m(5.0, 120.0)).unwrap();
        assert_relative_eq!(proj.ratio, 1.0, epsilon = 1e-9);
        assert!(proj.point.same_position(m(0.0, 100.0)));
    }

    #[test]
    fn on_line_distance_zero() {
        let p = line(&[(0.0, 0.0), (0.0, 100.0)]);
        let proj = closest_point_on(&p, m(0.0, 25.0)).unwrap();
        assert!(proj.distance_deg < 1e-12);
        assert_relative_eq!(proj.ratio, 0.25, epsilon = 1e-9);
    }
}

#[cfg(test)]
mod substring_and_split {
    use approx::assert_relative_eq;

    use super::fixtures::line;
    use crate::geodesic::length_m;
    use crate::ops::{point_at, split_at, substring};
    use crate::GeomError;

    #[test]
    fn substring_half() {
        let p = line(&[(0.0, 0.0), (0.0, 100.0)]);
        let half = substring(&p, 0.0, 0.5, 0.0).unwrap();
        assert!(half.end().same_position(point_at(&p, 0.5).unwrap()));
        assert_relative_eq!(
            length_m(&half).unwrap(),
            length_m(&p).unwrap() / 2.0,
            max_relative = 1e-6
        );
    }

    #[test]
    fn substring_keeps_interior_vertices() {
        let p = line(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0)]);
        let mid = substring(&p, 0.25, 0.75, 0.0).unwrap();
        // Covers [7.5 m, 22.5 m]: interpolated ends plus the 10 m and 20 m
        // interior vertices.
        assert_eq!(mid.vertex_count(), 4);
    }

    #[test]
    fn substring_rejects_bad_ranges() {
        let p = line(&[(0.0, 0.0), (0.0, 100.0)]);
        assert!(matches!(
            substring(&p, 0.7, 0.3, 0.0),
            Err(GeomError::BadRange { .. })
        ));
        assert!(matches!(
            substring(&p, -0.1, 0.5, 0.0),
            Err(GeomError::BadRange { .. })
        ));
    }

    #[test]
    fn substring_enforces_length_floor() {
        let p = line(&[(0.0, 0.0), (0.0, 100.0)]);
        let err = substring(&p, 0.5, 0.503, 1.0).unwrap_err();
        assert!(matches!(err, GeomError::BelowMinimumLength { .. }));
    }

    #[test]
    fn split_lengths_sum_to_original() {
        let p = line(&[(0.0, 0.0), (50.0, 0.0), (100.0, 0.0)]);
        let parts = split_at(&p, &[0.2, 0.6], 0.001).unwrap();
        assert_eq!(parts.len(), 3);
        let total: f64 = parts.iter().map(|s| length_m(s).unwrap()).sum();
        assert_relative_eq!(total, length_m(&p).unwrap(), max_relative = 1e-9);
    }

    #[test]
    fn split_ignores_positions_at_the_rim() {
        let p = line(&[(0.0, 0.0), (0.0, 100.0)]);
        let parts = split_at(&p, &[0.0005, 0.9999, 0.5], 0.001).unwrap();
        assert_eq!(parts.len(), 2, "only the 0.5 cut survives");
    }

    #[test]
    fn split_with_no_usable_positions_passes_through() {
        let p = line(&[(0.0, 0.0), (0.0, 100.0)]);
        let parts = split_at(&p, &[], 0.001).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0], p);
    }

    #[test]
    fn split_disjoint_sets_commute() {
        // Splitting at A∪B equals splitting at A then at B.
        let p = line(&[(0.0, 0.0), (0.0, 200.0)]);
        let both = split_at(&p, &[0.25, 0.75], 0.001).unwrap();

        let first = split_at(&p, &[0.25], 0.001).unwrap();
        let mut sequential = vec![first[0].clone()];
        // 0.75 on the whole is 2/3 of the remainder [0.25, 1].
        sequential.extend(split_at(&first[1], &[(0.75 - 0.25) / 0.75], 0.001).unwrap());

        assert_eq!(both.len(), sequential.len());
        for (a, b) in both.iter().zip(&sequential) {
            assert!(a.start().same_position(b.start()));
            assert!(a.end().same_position(b.end()));
        }
    }
}

#[cfg(test)]
mod forcing {
    use crate::ops::force_2d_keepz;
    use tn_core::{Coord3, Polyline};

    #[test]
    fn repairs_elevation_keeps_planar() {
        let p = Polyline::new(vec![
            Coord3::new(0.001, 0.002, f64::NAN),
            Coord3::new(0.003, 0.004, 1650.0),
        ]);
        let f = force_2d_keepz(&p);
        assert_eq!(f.coords[0].ele, 0.0);
        assert_eq!(f.coords[1].ele, 1650.0);
        assert_eq!((f.coords[0].lon, f.coords[0].lat), (0.001, 0.002));
    }

    #[test]
    fn finite_input_is_unchanged() {
        let p = Polyline::new(vec![
            Coord3::new(0.0, 0.0, 10.0),
            Coord3::new(0.001, 0.0, 20.0),
        ]);
        assert_eq!(force_2d_keepz(&p), p);
    }
}

#[cfg(test)]
mod snap {
    use super::fixtures::line;
    use crate::ops::snap_to_grid;
    use tn_core::{Coord3, Polyline};

    #[test]
    fn collapses_duplicate_run() {
        let p = Polyline::new(vec![
            Coord3::xy(0.0, 0.0),
            Coord3::xy(1e-9, 1e-9), // same cell at 1e-6
            Coord3::xy(0.001, 0.0),
        ]);
        let s = snap_to_grid(&p, 1e-6);
        assert_eq!(s.vertex_count(), 2);
    }

    #[test]
    fn preserves_order_and_endpoints() {
        let p = line(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let s = snap_to_grid(&p, 1e-6);
        assert_eq!(s.vertex_count(), 3);
        assert!(s.start().same_position(p.start()));
        assert!(s.end().same_position(p.end()));
    }

    #[test]
    fn keeps_first_elevation_of_a_run() {
        let p = Polyline::new(vec![
            Coord3::new(0.0, 0.0, 100.0),
            Coord3::new(1e-9, 0.0, 999.0),
            Coord3::new(0.001, 0.0, 200.0),
        ]);
        let s = snap_to_grid(&p, 1e-6);
        assert_eq!(s.coords[0].ele, 100.0);
    }
}

#[cfg(test)]
mod proximity {
    use approx::assert_relative_eq;
    use tn_core::degrees_to_meters;

    use super::fixtures::line;
    use crate::ops::{closest_approach, crossings};

    #[test]
    fn crossing_pair_has_zero_gap() {
        let a = line(&[(0.0, 0.0), (10.0, 10.0)]);
        let b = line(&[(0.0, 10.0), (10.0, 0.0)]);
        let ca = closest_approach(&a, &b).unwrap();
        assert_eq!(ca.distance_deg, 0.0);
    }

    #[test]
    fn parallel_lines_gap() {
        let a = line(&[(0.0, 0.0), (100.0, 0.0)]);
        let b = line(&[(0.0, 2.0), (100.0, 2.0)]);
        let ca = closest_approach(&a, &b).unwrap();
        assert_relative_eq!(degrees_to_meters(ca.distance_deg), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn x_crossing_found_at_center() {
        let a = line(&[(0.0, 0.0), (10.0, 10.0)]);
        let b = line(&[(0.0, 10.0), (10.0, 0.0)]);
        let hits = crossings(&a, &b).unwrap();
        assert_eq!(hits.len(), 1);
        let hit = hits[0];
        assert!(hit.proper);
        assert_relative_eq!(hit.ratio_a, 0.5, epsilon = 1e-9);
        assert_relative_eq!(hit.ratio_b, 0.5, epsilon = 1e-9);
        assert!(hit.point.same_position(super::fixtures::m(5.0, 5.0)));
    }

    #[test]
    fn endpoint_touch_is_improper() {
        let a = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let b = line(&[(10.0, 0.0), (10.0, 10.0)]);
        let hits = crossings(&a, &b).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(!hits[0].proper);
    }

    #[test]
    fn collinear_overlap_yields_no_points() {
        let a = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let b = line(&[(5.0, 0.0), (15.0, 0.0)]);
        let hits = crossings(&a, &b).unwrap();
        assert!(hits.is_empty(), "overlap spans are not point components");
    }
}

#[cfg(test)]
mod simplify {
    use super::fixtures::{line, mz};
    use crate::simplify::simplify_keepz;
    use tn_core::Polyline;

    #[test]
    fn removes_collinear_interior() {
        let p = line(&[(0.0, 0.0), (25.0, 0.0), (50.0, 0.0), (100.0, 0.0)]);
        let s = simplify_keepz(&p, 1e-7);
        assert_eq!(s.vertex_count(), 2);
        assert!(s.start().same_position(p.start()));
        assert!(s.end().same_position(p.end()));
    }

    #[test]
    fn keeps_a_real_corner() {
        let p = line(&[(0.0, 0.0), (50.0, 50.0), (100.0, 0.0)]);
        let s = simplify_keepz(&p, 1e-7);
        assert_eq!(s.vertex_count(), 3);
    }

    #[test]
    fn idempotent() {
        let p = line(&[
            (0.0, 0.0),
            (10.0, 0.2),
            (20.0, -0.1),
            (30.0, 8.0),
            (40.0, 0.0),
        ]);
        let once = simplify_keepz(&p, tn_core::meters_to_degrees(0.5));
        let twice = simplify_keepz(&once, tn_core::meters_to_degrees(0.5));
        assert_eq!(once, twice);
    }

    #[test]
    fn elevation_rides_along() {
        let p = Polyline::new(vec![
            mz(0.0, 0.0, 100.0),
            mz(50.0, 40.0, 150.0),
            mz(100.0, 0.0, 120.0),
        ]);
        let s = simplify_keepz(&p, 1e-7);
        assert_eq!(s.coords[1].ele, 150.0);
    }
}

#[cfg(test)]
mod validity {
    use super::fixtures::line;
    use crate::validity::{check_valid, is_simple, is_valid};
    use crate::GeomError;
    use tn_core::{Coord3, Polyline};

    #[test]
    fn straight_line_is_valid_and_simple() {
        let p = line(&[(0.0, 0.0), (100.0, 0.0)]);
        assert!(is_valid(&p));
        assert!(is_simple(&p));
    }

    #[test]
    fn bowtie_is_not_simple() {
        let p = line(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]);
        assert!(is_valid(&p));
        assert!(!is_simple(&p));
    }

    #[test]
    fn closed_ring_is_simple() {
        let p = line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
        assert!(is_simple(&p));
    }

    #[test]
    fn nan_coordinate_detected() {
        let p = Polyline::new(vec![Coord3::xy(f64::NAN, 0.0), Coord3::xy(0.0, 1.0)]);
        assert!(matches!(check_valid(&p), Err(GeomError::NonFinite(0))));
    }

    #[test]
    fn coincident_points_have_zero_length() {
        let p = Polyline::new(vec![Coord3::xy(1.0, 1.0), Coord3::xy(1.0, 1.0)]);
        assert!(matches!(check_valid(&p), Err(GeomError::ZeroLength)));
    }
}
