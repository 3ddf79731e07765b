//! Terrain classification of the rectified frame.
//!
//! Three independent binary passes: navigable ground (bright terrain),
//! obstacles (the complement of a weaker brightness test), and targets
//! (a distinct color signature). The navigability tests accept a pixel
//! when either the raw value or a Gaussian-blurred value clears the
//! threshold, which recovers pixels speckled by sensor noise.

use crate::frame::{Frame, Mask};

/// 5-tap binomial approximation of a Gaussian, applied separably.
const KERNEL: [u32; 5] = [1, 4, 6, 4, 1];

/// Blur the frame with a 5x5 Gaussian kernel.
///
/// Border handling clamps to the edge pixel. Weights sum to 256 after
/// both passes, so a uniform frame blurs to itself exactly.
pub fn gaussian_blur(frame: &Frame) -> Frame {
    let (w, h) = (frame.width(), frame.height());

    // Horizontal pass; per-channel sums stay within u16.
    let mut tmp = vec![0u16; w * h * 3];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u32; 3];
            for (k, &weight) in KERNEL.iter().enumerate() {
                let sx = (x as isize + k as isize - 2).clamp(0, w as isize - 1) as usize;
                let rgb = frame.get(sx, y);
                for c in 0..3 {
                    acc[c] += weight * rgb[c] as u32;
                }
            }
            let i = (y * w + x) * 3;
            for c in 0..3 {
                tmp[i + c] = acc[c] as u16;
            }
        }
    }

    // Vertical pass with rounding back to u8.
    let mut out = Frame::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u32; 3];
            for (k, &weight) in KERNEL.iter().enumerate() {
                let sy = (y as isize + k as isize - 2).clamp(0, h as isize - 1) as usize;
                let i = (sy * w + x) * 3;
                for c in 0..3 {
                    acc[c] += weight * tmp[i + c] as u32;
                }
            }
            let rgb = [
                ((acc[0] + 128) >> 8) as u8,
                ((acc[1] + 128) >> 8) as u8,
                ((acc[2] + 128) >> 8) as u8,
            ];
            out.set(x, y, rgb);
        }
    }

    out
}

/// All three channels strictly above their thresholds.
#[inline]
fn above(rgb: [u8; 3], thresh: [u8; 3]) -> bool {
    rgb[0] > thresh[0] && rgb[1] > thresh[1] && rgb[2] > thresh[2]
}

/// All three channels within the inclusive range.
#[inline]
fn in_range(rgb: [u8; 3], low: [u8; 3], high: [u8; 3]) -> bool {
    (0..3).all(|c| rgb[c] >= low[c] && rgb[c] <= high[c])
}

/// Navigable-ground mask: the raw pixel OR its blurred value clears the
/// threshold triple.
pub fn navigable_mask(raw: &Frame, blurred: &Frame, thresh: [u8; 3]) -> Mask {
    let mut mask = Mask::new(raw.width(), raw.height());
    for y in 0..raw.height() {
        for x in 0..raw.width() {
            if above(raw.get(x, y), thresh) || above(blurred.get(x, y), thresh) {
                mask.mark(x, y);
            }
        }
    }
    mask
}

/// Obstacle mask: the exact complement of the navigability union test,
/// evaluated at the (lower) obstacle thresholds.
pub fn obstacle_mask(raw: &Frame, blurred: &Frame, thresh: [u8; 3]) -> Mask {
    let mut mask = Mask::new(raw.width(), raw.height());
    for y in 0..raw.height() {
        for x in 0..raw.width() {
            if !(above(raw.get(x, y), thresh) || above(blurred.get(x, y), thresh)) {
                mask.mark(x, y);
            }
        }
    }
    mask
}

/// Target mask: pixels inside the inclusive RGB signature range.
pub fn target_mask(raw: &Frame, low: [u8; 3], high: [u8; 3]) -> Mask {
    let mut mask = Mask::new(raw.width(), raw.height());
    for y in 0..raw.height() {
        for x in 0..raw.width() {
            if in_range(raw.get(x, y), low, high) {
                mask.mark(x, y);
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(w: usize, h: usize, value: u8) -> Frame {
        let mut frame = Frame::new(w, h);
        for y in 0..h {
            for x in 0..w {
                frame.set(x, y, [value; 3]);
            }
        }
        frame
    }

    #[test]
    fn test_blur_preserves_uniform_frame() {
        let frame = uniform(10, 10, 173);
        let blurred = gaussian_blur(&frame);
        assert_eq!(blurred, frame);
    }

    #[test]
    fn test_navigable_requires_all_channels() {
        let mut frame = uniform(6, 6, 0);
        frame.set(1, 1, [200, 200, 200]);
        frame.set(3, 3, [200, 200, 100]); // blue channel too dark

        let blurred = gaussian_blur(&frame);
        let mask = navigable_mask(&frame, &blurred, [160, 160, 160]);

        assert_eq!(mask.get(1, 1), 255);
        assert_eq!(mask.get(3, 3), 0);
    }

    #[test]
    fn test_blur_union_recovers_speckled_pixel() {
        // Center pixel fails the raw test but its bright neighborhood
        // pulls the blurred value above threshold.
        let mut frame = uniform(7, 7, 255);
        frame.set(3, 3, [150, 150, 150]);

        let blurred = gaussian_blur(&frame);
        let mask = navigable_mask(&frame, &blurred, [160, 160, 160]);
        assert_eq!(mask.get(3, 3), 255);
    }

    #[test]
    fn test_obstacle_is_complement_of_weak_navigable() {
        let mut frame = uniform(8, 4, 40);
        frame.set(2, 1, [90, 90, 90]);
        frame.set(5, 2, [200, 210, 220]);

        let blurred = gaussian_blur(&frame);
        let thresh = [85, 85, 85];
        let weak_nav = navigable_mask(&frame, &blurred, thresh);
        let obstacles = obstacle_mask(&frame, &blurred, thresh);

        for y in 0..frame.height() {
            for x in 0..frame.width() {
                assert_ne!(weak_nav.get(x, y), obstacles.get(x, y));
                assert_eq!(weak_nav.get(x, y).max(obstacles.get(x, y)), 255);
            }
        }
    }

    #[test]
    fn test_target_range_is_inclusive() {
        let mut frame = uniform(6, 1, 0);
        frame.set(0, 0, [100, 100, 0]); // exact lower bound
        frame.set(1, 0, [255, 255, 55]); // exact upper bound
        frame.set(2, 0, [180, 170, 30]); // interior
        frame.set(3, 0, [99, 150, 30]); // red below range
        frame.set(4, 0, [150, 150, 56]); // blue above range

        let mask = target_mask(&frame, [100, 100, 0], [255, 255, 55]);
        assert_eq!(mask.get(0, 0), 255);
        assert_eq!(mask.get(1, 0), 255);
        assert_eq!(mask.get(2, 0), 255);
        assert_eq!(mask.get(3, 0), 0);
        assert_eq!(mask.get(4, 0), 0);
    }
}
