use crate::general::min;
use glam::{DVec2, DVec3};

/// ground_plane projects a point onto the ground plane, i.e. drops the height (y) coordinate.
pub fn ground_plane(p: DVec3) -> DVec2 {
    DVec2::new(p.x, p.z)
}

/// dist_point_segment returns the distance between point p and the segment [a, b] measured in the
/// ground plane.
pub fn dist_point_segment(p: DVec3, a: DVec3, b: DVec3) -> f64 {
    let (p, a, b) = (ground_plane(p), ground_plane(a), ground_plane(b));
    let ab = b - a;
    let len_sq = ab.length_squared();

    if len_sq == 0.0 {
        return p.distance(a);
    }

    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// dist_closed_polyline returns the distance between point p and the closed polyline through the
/// inserted points (the last point is connected back to the first one). Returns infinity for an
/// empty polyline.
pub fn dist_closed_polyline(p: DVec3, points: &[DVec3]) -> f64 {
    match points.len() {
        0 => f64::INFINITY,
        1 => ground_plane(p).distance(ground_plane(points[0])),
        n => {
            let dists: Vec<f64> = (0..n)
                .map(|i| dist_point_segment(p, points[i], points[(i + 1) % n]))
                .collect();
            min(&dists)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn segment_distance_ignores_height() {
        let a = DVec3::new(0.0, 0.0, 0.0);
        let b = DVec3::new(10.0, 0.0, 0.0);

        assert_relative_eq!(dist_point_segment(DVec3::new(5.0, 3.0, 2.0), a, b), 2.0);
        assert_relative_eq!(dist_point_segment(DVec3::new(-3.0, 0.0, 4.0), a, b), 5.0);
        assert_relative_eq!(dist_point_segment(DVec3::new(1.0, 0.0, 1.0), a, a), 2f64.sqrt());
    }

    #[test]
    fn closed_polyline_includes_closing_segment() {
        let square = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(10.0, 0.0, 0.0),
            DVec3::new(10.0, 0.0, 10.0),
            DVec3::new(0.0, 0.0, 10.0),
        ];

        // closest to the segment from the last point back to the first one
        assert_relative_eq!(
            dist_closed_polyline(DVec3::new(-1.0, 0.0, 5.0), &square),
            1.0
        );
        assert_relative_eq!(dist_closed_polyline(DVec3::new(5.0, 0.0, 5.0), &square), 5.0);
        assert!(dist_closed_polyline(DVec3::ZERO, &[]).is_infinite());
    }
}
