//! Perspective rectification onto a fixed-scale top-down view.
//!
//! The camera calibration is a constant set of four source/destination
//! corner pairs mapping the ground trapezoid seen by the camera onto a
//! small bottom-centered square. The projective transform is solved from
//! the correspondences and applied by inverse mapping with bilinear
//! sampling. The calibration is fixed and known-valid, so there is no
//! error path for degenerate geometry.

use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

use crate::frame::Frame;

/// Ground-plane corners of the calibration grid in the camera image,
/// ordered bottom-left, bottom-right, top-right, top-left.
const SOURCE_QUAD: [[f32; 2]; 4] = [
    [14.0, 140.0],
    [301.0, 140.0],
    [200.0, 96.0],
    [118.0, 96.0],
];

/// Fixed source/destination quadrilateral pair for rectification.
#[derive(Clone, Debug)]
pub struct Calibration {
    /// Corner positions in the camera image.
    pub src: [[f32; 2]; 4],
    /// Corner positions in the top-down view.
    pub dst: [[f32; 2]; 4],
}

impl Calibration {
    /// Calibration for a frame of the given size: the source trapezoid is
    /// the surveyed grid square, the destination a `2 * dst_size` pixel
    /// square centered horizontally, `bottom_offset` pixels above the
    /// frame bottom.
    pub fn for_frame(width: usize, height: usize, dst_size: f32, bottom_offset: f32) -> Self {
        let w = width as f32;
        let h = height as f32;
        let dst = [
            [w / 2.0 - dst_size, h - bottom_offset],
            [w / 2.0 + dst_size, h - bottom_offset],
            [w / 2.0 + dst_size, h - 2.0 * dst_size - bottom_offset],
            [w / 2.0 - dst_size, h - 2.0 * dst_size - bottom_offset],
        ];
        Self {
            src: SOURCE_QUAD,
            dst,
        }
    }
}

/// Solve the projective transform mapping `src[i]` onto `dst[i]`.
///
/// Standard direct linear transform: eight equations in the eight unknown
/// matrix entries (h33 fixed at 1), solved by LU decomposition.
pub fn homography(src: &[[f32; 2]; 4], dst: &[[f32; 2]; 4]) -> Matrix3<f64> {
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for i in 0..4 {
        let (x, y) = (src[i][0] as f64, src[i][1] as f64);
        let (u, v) = (dst[i][0] as f64, dst[i][1] as f64);

        let r = 2 * i;
        a[(r, 0)] = x;
        a[(r, 1)] = y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -u * x;
        a[(r, 7)] = -u * y;
        b[r] = u;

        a[(r + 1, 3)] = x;
        a[(r + 1, 4)] = y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -v * x;
        a[(r + 1, 7)] = -v * y;
        b[r + 1] = v;
    }

    let h = a
        .lu()
        .solve(&b)
        .expect("calibration quadrilaterals are non-degenerate");

    Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0)
}

/// Reproject `frame` onto the top-down view defined by `calibration`.
///
/// Output has identical pixel dimensions; destination pixels that map
/// outside the source frame are zero.
pub fn warp(frame: &Frame, calibration: &Calibration) -> Frame {
    let h = homography(&calibration.src, &calibration.dst);
    let inv = h
        .try_inverse()
        .expect("calibration homography is invertible");

    let (w, height) = (frame.width(), frame.height());
    let mut out = Frame::new(w, height);

    for y in 0..height {
        for x in 0..w {
            let p = inv * Vector3::new(x as f64, y as f64, 1.0);
            if p[2].abs() < 1e-12 {
                continue;
            }
            let sx = p[0] / p[2];
            let sy = p[1] / p[2];
            if let Some(rgb) = sample_bilinear(frame, sx, sy) {
                out.set(x, y, rgb);
            }
        }
    }

    out
}

/// Bilinear sample at fractional coordinates; `None` outside the frame.
/// Coordinates within half a pixel of the border clamp onto it.
fn sample_bilinear(frame: &Frame, sx: f64, sy: f64) -> Option<[u8; 3]> {
    let max_x = (frame.width() - 1) as f64;
    let max_y = (frame.height() - 1) as f64;
    if sx < -0.5 || sy < -0.5 || sx >= max_x + 0.5 || sy >= max_y + 0.5 {
        return None;
    }
    let sx = sx.clamp(0.0, max_x);
    let sy = sy.clamp(0.0, max_y);

    let x0 = sx.floor() as usize;
    let y0 = sy.floor() as usize;
    let x1 = (x0 + 1).min(frame.width() - 1);
    let y1 = (y0 + 1).min(frame.height() - 1);
    let fx = sx - x0 as f64;
    let fy = sy - y0 as f64;

    let p00 = frame.get(x0, y0);
    let p10 = frame.get(x1, y0);
    let p01 = frame.get(x0, y1);
    let p11 = frame.get(x1, y1);

    let mut rgb = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        rgb[c] = (top * (1.0 - fy) + bottom * fy).round() as u8;
    }
    Some(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_homography() {
        let quad = [[1.0, 6.0], [6.0, 6.0], [6.0, 1.0], [1.0, 1.0]];
        let h = homography(&quad, &quad);

        for (i, expected) in [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
            .iter()
            .enumerate()
        {
            assert!((h[(i / 3, i % 3)] - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_homography_maps_corners() {
        let calib = Calibration::for_frame(320, 160, 5.0, 6.0);
        let h = homography(&calib.src, &calib.dst);

        for i in 0..4 {
            let p = h * Vector3::new(calib.src[i][0] as f64, calib.src[i][1] as f64, 1.0);
            let u = p[0] / p[2];
            let v = p[1] / p[2];
            assert!((u - calib.dst[i][0] as f64).abs() < 1e-6);
            assert!((v - calib.dst[i][1] as f64).abs() < 1e-6);
        }
    }

    #[test]
    fn test_identity_warp_preserves_frame() {
        let mut frame = Frame::new(8, 8);
        frame.set(3, 4, [10, 20, 30]);
        frame.set(0, 0, [200, 0, 0]);

        let quad = [[1.0, 6.0], [6.0, 6.0], [6.0, 1.0], [1.0, 1.0]];
        let calib = Calibration {
            src: quad,
            dst: quad,
        };

        let warped = warp(&frame, &calib);
        assert_eq!(warped, frame);
    }

    #[test]
    fn test_translation_warp() {
        let mut frame = Frame::new(8, 8);
        frame.set(3, 4, [100, 100, 100]);

        let src = [[1.0, 6.0], [6.0, 6.0], [6.0, 1.0], [1.0, 1.0]];
        let dst = [[3.0, 6.0], [8.0, 6.0], [8.0, 1.0], [3.0, 1.0]];
        let calib = Calibration { src, dst };

        let warped = warp(&frame, &calib);
        assert_eq!(warped.get(5, 4), [100, 100, 100]);
        // Columns with no source coverage stay zero.
        assert_eq!(warped.get(0, 4), [0, 0, 0]);
    }
}
