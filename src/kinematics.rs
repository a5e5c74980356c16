use nalgebra as na;

use crate::calibration::CalibrationState;
use crate::sample::{PositionSample, VelocitySample};
use crate::track::TrackedPoint;

/// Derivative windows shorter than this (seconds) are skipped.
pub const MIN_DT: f64 = 1e-4;

/// Calibrated positions of time-sorted points.
///
/// `time_offset` is subtracted from every timestamp, `click_uncertainty` is in pixels.
pub fn position_samples(
    points: &[TrackedPoint],
    calibration: &CalibrationState,
    time_offset: f64,
    click_uncertainty: f64,
) -> Vec<PositionSample> {
    let uncertainty = calibration.to_physical_length(click_uncertainty);

    points
        .iter()
        .map(|p| {
            let pos = calibration.to_physical(p.pixel());

            PositionSample {
                time: p.time - time_offset,
                x: pos.x,
                y: pos.y,
                uncertainty,
            }
        })
        .collect()
}

/// Three-point velocity estimate for every time-sorted point.
///
/// The result is aligned with `points`; `None` marks a sample whose window
/// is degenerate. Fewer than three points yield no estimates at all.
pub fn estimate_velocities(
    points: &[TrackedPoint],
    calibration: &CalibrationState,
    time_offset: f64,
) -> Vec<Option<VelocitySample>> {
    let n = points.len();
    if n < 3 {
        return vec![None; n];
    }

    let pos: Vec<na::Point2<f64>> = points
        .iter()
        .map(|p| calibration.to_physical(p.pixel()))
        .collect();
    let ts: Vec<f64> = points.iter().map(|p| p.time).collect();

    (0..n)
        .map(|i| {
            let vel = if i == 0 {
                forward(&pos[..3], &ts[..3])
            } else if i == n - 1 {
                backward(&pos[n - 3..], &ts[n - 3..])
            } else {
                central(pos[i - 1], pos[i + 1], ts[i + 1] - ts[i - 1])
            };

            if vel.is_none() {
                log::trace!("skipping velocity at t={}: degenerate time window", ts[i]);
            }

            vel.map(|v| VelocitySample {
                time: ts[i] - time_offset,
                vx: v.x,
                vy: v.y,
            })
        })
        .collect()
}

/// Velocity samples with degenerate windows left out.
#[inline]
pub fn velocity_samples(
    points: &[TrackedPoint],
    calibration: &CalibrationState,
    time_offset: f64,
) -> Vec<VelocitySample> {
    estimate_velocities(points, calibration, time_offset)
        .into_iter()
        .flatten()
        .collect()
}

// (f(i+1) - f(i-1)) / dt
#[inline]
fn central(p0: na::Point2<f64>, p2: na::Point2<f64>, dt: f64) -> Option<na::Vector2<f64>> {
    if dt <= MIN_DT {
        return None;
    }

    Some((p2 - p0) / dt)
}

/// One-sided derivative at the first of three samples.
///
/// With even spacing `h` this is `(-3 f0 + 4 f1 - f2) / 2h`.
fn forward(p: &[na::Point2<f64>], t: &[f64]) -> Option<na::Vector2<f64>> {
    let (h1, h2) = (t[1] - t[0], t[2] - t[1]);
    if h1 <= MIN_DT || h2 <= MIN_DT {
        return None;
    }

    let c0 = -(2.0 * h1 + h2) / (h1 * (h1 + h2));
    let c1 = (h1 + h2) / (h1 * h2);
    let c2 = -h1 / (h2 * (h1 + h2));

    Some(p[0].coords * c0 + p[1].coords * c1 + p[2].coords * c2)
}

/// One-sided derivative at the last of three samples.
///
/// With even spacing `h` this is `(3 fN - 4 fN-1 + fN-2) / 2h`.
fn backward(p: &[na::Point2<f64>], t: &[f64]) -> Option<na::Vector2<f64>> {
    let (h1, h2) = (t[1] - t[0], t[2] - t[1]);
    if h1 <= MIN_DT || h2 <= MIN_DT {
        return None;
    }

    let c0 = h2 / (h1 * (h1 + h2));
    let c1 = -(h1 + h2) / (h1 * h2);
    let c2 = (h1 + 2.0 * h2) / (h2 * (h1 + h2));

    Some(p[0].coords * c0 + p[1].coords * c1 + p[2].coords * c2)
}
