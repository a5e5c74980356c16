use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::error::Error;

/// Frame of reference that maps pixel clicks to physical coordinates.
///
/// Pixel `y` grows downwards, physical `y` grows upwards.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct CalibrationState {
    pub origin: Option<na::Point2<f64>>,

    // radians, screen space
    pub rotation: f64,

    pub pixels_per_meter: Option<f64>,
}

impl CalibrationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn set_origin(&mut self, origin: na::Point2<f64>) {
        self.origin = Some(origin);
    }

    #[inline]
    pub fn clear_origin(&mut self) {
        self.origin = None;
    }

    #[inline]
    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
    }

    /// Points the physical x axis from the origin towards `toward` (pixels).
    ///
    /// Does nothing while no origin is set or when `toward` is the origin itself.
    pub fn align_x_axis(&mut self, toward: na::Point2<f64>) {
        if let Some(origin) = self.origin {
            let d = toward - origin;
            if d.norm_squared() > 0.0 {
                self.rotation = d.y.atan2(d.x);
            }
        }
    }

    /// Sets the pixels-per-meter ratio from two reference points `distance` meters apart.
    ///
    /// On error the previous ratio is kept.
    pub fn calibrate(
        &mut self,
        p1: na::Point2<f64>,
        p2: na::Point2<f64>,
        distance: f64,
    ) -> Result<f64, Error> {
        if !distance.is_finite() || distance <= 0.0 {
            log::warn!("rejecting calibration distance {}", distance);
            return Err(Error::InvalidCalibration(distance));
        }

        let pixels = na::distance(&p1, &p2);
        if !pixels.is_finite() || pixels <= 0.0 {
            log::warn!("rejecting calibration with coincident points {}", p1);
            return Err(Error::CoincidentReferencePoints);
        }

        let ppm = pixels / distance;
        self.pixels_per_meter = Some(ppm);

        Ok(ppm)
    }

    /// Usable pixels-per-meter ratio; zero, negative and non-finite ratios count as unset.
    #[inline]
    pub fn scale(&self) -> Option<f64> {
        self.pixels_per_meter.filter(|k| k.is_finite() && *k > 0.0)
    }

    #[inline]
    pub fn is_calibrated(&self) -> bool {
        self.scale().is_some()
    }

    #[inline]
    pub fn to_physical(&self, raw: na::Point2<f64>) -> na::Point2<f64> {
        to_physical(raw, self.origin, self.rotation, self.pixels_per_meter)
    }

    /// Converts a length measured in pixels into the calibrated unit.
    #[inline]
    pub fn to_physical_length(&self, pixels: f64) -> f64 {
        match self.scale() {
            Some(k) => pixels / k,
            None => pixels,
        }
    }
}

/// Pixel point to physical point.
///
/// Translation, rotation and the vertical flip only apply once an origin is
/// set; the pixels-per-meter scale applies whenever it is usable.
pub fn to_physical(
    raw: na::Point2<f64>,
    origin: Option<na::Point2<f64>>,
    rotation: f64,
    pixels_per_meter: Option<f64>,
) -> na::Point2<f64> {
    let local = match origin {
        Some(origin) => {
            let rotated = na::Rotation2::new(-rotation) * (raw - origin);

            // flip after rotating, screen y points down
            na::Point2::new(rotated.x, -rotated.y)
        }
        None => raw,
    };

    match pixels_per_meter.filter(|k| k.is_finite() && *k > 0.0) {
        Some(k) => local / k,
        None => local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_6};

    fn close(a: na::Point2<f64>, b: na::Point2<f64>) -> bool {
        na::distance(&a, &b) < 1e-9
    }

    #[test]
    fn uncalibrated_is_identity() {
        let p = na::Point2::new(123.5, -7.25);

        assert_eq!(CalibrationState::new().to_physical(p), p);
    }

    #[test]
    fn scale_without_origin_divides() {
        let p = na::Point2::new(40.0, 25.0);

        assert!(close(to_physical(p, None, 0.0, Some(10.0)), na::Point2::new(4.0, 2.5)));
    }

    #[test]
    fn zero_scale_counts_as_unset() {
        let p = na::Point2::new(40.0, 25.0);

        assert_eq!(to_physical(p, None, 0.0, Some(0.0)), p);
    }

    #[test]
    fn origin_translates_and_flips_y() {
        let origin = na::Point2::new(100.0, 200.0);
        let p = na::Point2::new(130.0, 160.0);

        let phys = to_physical(p, Some(origin), 0.0, Some(10.0));

        assert!(close(phys, na::Point2::new(3.0, 4.0)));
    }

    #[test]
    fn rotation_is_applied_before_flip() {
        let origin = na::Point2::new(0.0, 0.0);

        // x axis dragged straight down the screen
        let phys = to_physical(na::Point2::new(0.0, 50.0), Some(origin), FRAC_PI_2, None);
        assert!(close(phys, na::Point2::new(50.0, 0.0)));

        // a pixel to the right of the origin is then on the physical +y side
        let phys = to_physical(na::Point2::new(20.0, 0.0), Some(origin), FRAC_PI_2, None);
        assert!(close(phys, na::Point2::new(0.0, 20.0)));
    }

    #[test]
    fn rotation_preserves_distances() {
        let origin = Some(na::Point2::new(12.0, 34.0));
        let a = na::Point2::new(50.0, 80.0);
        let b = na::Point2::new(-20.0, 150.0);

        let reference = na::distance(
            &to_physical(a, origin, 0.0, Some(4.0)),
            &to_physical(b, origin, 0.0, Some(4.0)),
        );

        for rot in [FRAC_PI_6, 1.0, -2.5, 3.0] {
            let d = na::distance(
                &to_physical(a, origin, rot, Some(4.0)),
                &to_physical(b, origin, rot, Some(4.0)),
            );
            assert!((d - reference).abs() < 1e-9);
        }
    }

    #[test]
    fn calibrate_sets_ratio() {
        let mut state = CalibrationState::new();

        let ppm = state
            .calibrate(na::Point2::new(0.0, 0.0), na::Point2::new(30.0, 40.0), 2.0)
            .unwrap();

        assert!((ppm - 25.0).abs() < 1e-12);
        assert!(state.is_calibrated());
        assert!((state.to_physical_length(50.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_distance_keeps_previous_ratio() {
        let mut state = CalibrationState::new();
        state.pixels_per_meter = Some(7.0);

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let res = state.calibrate(na::Point2::new(0.0, 0.0), na::Point2::new(1.0, 0.0), bad);
            assert!(matches!(res, Err(Error::InvalidCalibration(_))));
            assert_eq!(state.pixels_per_meter, Some(7.0));
        }
    }

    #[test]
    fn coincident_points_are_rejected() {
        let mut state = CalibrationState::new();
        let p = na::Point2::new(5.0, 5.0);

        assert_eq!(state.calibrate(p, p, 1.0), Err(Error::CoincidentReferencePoints));
        assert!(!state.is_calibrated());
    }

    #[test]
    fn align_x_axis_puts_target_on_positive_x() {
        let mut state = CalibrationState::new();
        state.set_origin(na::Point2::new(10.0, 10.0));
        state.align_x_axis(na::Point2::new(40.0, 50.0));

        let phys = state.to_physical(na::Point2::new(40.0, 50.0));

        assert!(close(phys, na::Point2::new(50.0, 0.0)));
    }
}
