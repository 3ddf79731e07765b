//! Divide-and-conquer resolution of the navigation signal.
//!
//! The navigable mask of a foreshortened or half-occluded view biases the
//! mean steering angle. To counter that, the sky-cropped frame is split
//! into left and right halves, each rectified and classified on its own,
//! and a heuristic picks between the whole-frame signal and the two
//! half-signals. Near-ties are resolved by a coin flip so that tiny pixel
//! count differences cannot lock the rover into oscillation.

use crate::classify;
use crate::config::PerceptionConfig;
use crate::core::{PolarSet, RandomSource};
use crate::frame::Frame;
use crate::project::{rover_coords, to_polar};
use crate::rectify::{self, Calibration};

/// One half-view's polar signal and its active-pixel count.
struct HalfSignal {
    polar: PolarSet,
    count: usize,
}

/// Resolve the navigation signal for this cycle.
///
/// `cropped` is the sky-cropped camera frame (not yet rectified); `whole`
/// is the whole-frame polar signal already computed by the pipeline.
pub fn resolve_nav_signal(
    cropped: &Frame,
    calibration: &Calibration,
    config: &PerceptionConfig,
    whole: &PolarSet,
    rng: &mut RandomSource,
) -> PolarSet {
    let mid = cropped.width() / 2;
    let left = half_signal(&cropped.column_slice(0, mid), calibration, config);
    let right = half_signal(
        &cropped.column_slice(mid, cropped.width()),
        calibration,
        config,
    );
    choose(whole, left, right, config, rng)
}

/// Rectify and classify one half-view.
fn half_signal(half: &Frame, calibration: &Calibration, config: &PerceptionConfig) -> HalfSignal {
    let warped = rectify::warp(half, calibration);
    let blurred = classify::gaussian_blur(&warped);
    let mask = classify::navigable_mask(&warped, &blurred, config.nav_threshold);
    HalfSignal {
        count: mask.count_nonzero(),
        polar: to_polar(&rover_coords(&mask)),
    }
}

/// Priority rules between the whole-frame signal and the half-signals.
///
/// An empty half has a NaN mean angle; NaN fails every comparison, so
/// empty halves fall through to the count-based rules.
fn choose(
    whole: &PolarSet,
    left: HalfSignal,
    right: HalfSignal,
    config: &PerceptionConfig,
    rng: &mut RandomSource,
) -> PolarSet {
    let m1 = left.polar.mean_angle().abs();
    let m2 = right.polar.mean_angle().abs();

    // Straight corridor: both halves agree the view is symmetric.
    if m1 < config.straight_angle && m2 < config.straight_angle {
        return whole.clone();
    }

    // Asymmetric turn: one half clearly dominates, trust the aggregate.
    if m1 > config.dominant_angle && m2 < config.minor_angle {
        return whole.clone();
    }
    if m1 < config.minor_angle && m2 > config.dominant_angle {
        return whole.clone();
    }

    // Near-tie in coverage: explicit coin flip.
    if left.count.abs_diff(right.count) < config.tie_margin {
        return if rng.coin_flip() {
            left.polar
        } else {
            right.polar
        };
    }

    if left.count > right.count {
        left.polar
    } else {
        right.polar
    }
}
