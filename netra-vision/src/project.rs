//! Coordinate conversions between image, rover, and world frames.
//!
//! All functions are pure. The rover frame puts the origin at the
//! bottom-center of the rectified image, x forward (up the image) and
//! y left (toward column zero).

use crate::core::{GridCoord, PointSet, PolarSet, Pose};
use crate::frame::Mask;

/// Reinterpret active mask pixels as rover-frame points.
pub fn rover_coords(mask: &Mask) -> PointSet {
    let h = mask.height() as f32;
    let half_w = mask.width() as f32 / 2.0;

    let mut points = PointSet::with_capacity(mask.count_nonzero());
    for (col, row) in mask.nonzero_pixels() {
        points.push(h - row as f32, half_w - col as f32);
    }
    points
}

/// Convert rover-frame points to polar (distance, angle).
pub fn to_polar(points: &PointSet) -> PolarSet {
    let mut polar = PolarSet {
        dist: Vec::with_capacity(points.len()),
        angles: Vec::with_capacity(points.len()),
    };
    for i in 0..points.len() {
        let (x, y) = (points.x[i], points.y[i]);
        polar.dist.push(x.hypot(y));
        polar.angles.push(y.atan2(x));
    }
    polar
}

/// Keep only points strictly closer than `max_dist`, bounding map
/// accumulation to trusted near-field data.
pub fn impose_range(points: &PointSet, max_dist: f32) -> PointSet {
    let mut kept = PointSet::default();
    for i in 0..points.len() {
        let (x, y) = (points.x[i], points.y[i]);
        if x.hypot(y) < max_dist {
            kept.push(x, y);
        }
    }
    kept
}

/// Map rover-frame points into world-grid cells for the given pose.
///
/// Rotation by yaw, scale from rectified pixels to world units, then
/// translation by the rover position; cell indices truncate and clip to
/// the grid bounds. This is the only place pose orientation and position
/// enter the pipeline.
pub fn to_world(points: &PointSet, pose: &Pose, scale: f32, world_size: usize) -> Vec<GridCoord> {
    let (sin, cos) = pose.yaw_rad().sin_cos();
    let max = world_size as i32 - 1;

    let mut cells = Vec::with_capacity(points.len());
    for i in 0..points.len() {
        let (x, y) = (points.x[i], points.y[i]);
        let xr = x * cos - y * sin;
        let yr = x * sin + y * cos;
        let xw = xr / scale + pose.x;
        let yw = yr / scale + pose.y;
        cells.push(GridCoord::new(
            (xw as i32).clamp(0, max),
            (yw as i32).clamp(0, max),
        ));
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rover_coords_origin_is_bottom_center() {
        let mut mask = Mask::new(320, 160);
        mask.mark(160, 159); // one pixel above bottom-center
        mask.mark(0, 159); // bottom-left corner

        let points = rover_coords(&mask);
        assert_eq!(points.len(), 2);

        // Bottom-left sorts first in row-major iteration.
        assert_eq!((points.x[0], points.y[0]), (1.0, 160.0));
        assert_eq!((points.x[1], points.y[1]), (1.0, 0.0));
    }

    #[test]
    fn test_polar_conversion() {
        let mut points = PointSet::default();
        points.push(3.0, 4.0);
        points.push(1.0, 0.0);

        let polar = to_polar(&points);
        assert!((polar.dist[0] - 5.0).abs() < 1e-6);
        assert!((polar.angles[0] - (4.0f32).atan2(3.0)).abs() < 1e-6);
        assert!((polar.dist[1] - 1.0).abs() < 1e-6);
        assert!(polar.angles[1].abs() < 1e-6);
    }

    #[test]
    fn test_impose_range_is_strict() {
        let mut points = PointSet::default();
        points.push(79.9, 0.0);
        points.push(80.0, 0.0);
        points.push(0.0, 81.0);

        let kept = impose_range(&points, 80.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.x[0], 79.9);
    }

    #[test]
    fn test_to_world_rotation_and_translation() {
        let mut points = PointSet::default();
        points.push(25.0, 0.0);

        // Facing east from (100, 100): forward maps to +x.
        let east = Pose::new(100.0, 100.0, 0.0, 0.0, 0.0);
        assert_eq!(to_world(&points, &east, 10.0, 200)[0], GridCoord::new(102, 100));

        // Facing north: forward maps to +y.
        let mut fwd = PointSet::default();
        fwd.push(20.0, 0.0);
        let north = Pose::new(100.2, 100.2, 90.0, 0.0, 0.0);
        assert_eq!(to_world(&fwd, &north, 10.0, 200)[0], GridCoord::new(100, 102));
    }

    #[test]
    fn test_to_world_clips_to_grid() {
        let mut points = PointSet::default();
        points.push(50.0, 0.0);

        // Facing west from the origin: forward would go negative.
        let west = Pose::new(0.0, 0.0, 180.0, 0.0, 0.0);
        assert_eq!(to_world(&points, &west, 10.0, 200)[0], GridCoord::new(0, 0));

        // Past the far edge in +x.
        let east = Pose::new(199.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(to_world(&points, &east, 10.0, 200)[0], GridCoord::new(199, 0));
    }
}
