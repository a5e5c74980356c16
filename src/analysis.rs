use serde_derive::{Deserialize, Serialize};

use crate::calibration::CalibrationState;
use crate::kinematics::{estimate_velocities, position_samples};
use crate::regression::{fit_rows, FitResult, FitSelection};
use crate::sample::{join_rows, DataRow, PositionSample, Quantity, TimeOrigin, VelocitySample};
use crate::scale::AxisScale;
use crate::track::Track;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub time_origin: TimeOrigin,
    pub x_axis: Quantity,
    pub y_axis: Quantity,
    pub fit: FitSelection,

    // in px
    pub click_uncertainty_px: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            time_origin: TimeOrigin::FirstSample,
            x_axis: Quantity::Time,
            y_axis: Quantity::X,
            fit: FitSelection::None,
            click_uncertainty_px: 1.0,
        }
    }
}

/// Everything the table, chart and exporters show for one track.
///
/// Always rebuilt from scratch; never patched in place.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Analysis {
    pub positions: Vec<PositionSample>,
    pub velocities: Vec<VelocitySample>,
    pub rows: Vec<DataRow>,
    pub fit: Option<FitResult>,
    pub x_scale: AxisScale,
    pub y_scale: AxisScale,
    pub x_axis: Quantity,
    pub y_axis: Quantity,
    pub calibrated: bool,
}

impl Analysis {
    pub fn compute(track: &Track, calibration: &CalibrationState, config: &AnalysisConfig) -> Self {
        let points = track.sorted_points();
        let offset = config
            .time_origin
            .offset(points.first().map(|p| p.time));

        let positions =
            position_samples(&points, calibration, offset, config.click_uncertainty_px);
        let estimates = estimate_velocities(&points, calibration, offset);
        let rows = join_rows(&positions, &estimates);
        let velocities: Vec<VelocitySample> = estimates.into_iter().flatten().collect();

        let fit = config
            .fit
            .kind()
            .and_then(|kind| fit_rows(kind, &rows, config.x_axis, config.y_axis));

        let x_scale = axis_scale(&rows, config.x_axis);
        let y_scale = axis_scale(&rows, config.y_axis);

        log::debug!(
            "track {} ({}): {} positions, {} velocities, fit: {}",
            track.id,
            track.name,
            positions.len(),
            velocities.len(),
            fit.as_ref()
                .map(|f| f.model.to_string())
                .unwrap_or_else(|| "none".into()),
        );

        Self {
            positions,
            velocities,
            rows,
            fit,
            x_scale,
            y_scale,
            x_axis: config.x_axis,
            y_axis: config.y_axis,
            calibrated: calibration.is_calibrated(),
        }
    }

    /// Axis caption such as `Velocity X (m/s)`.
    pub fn axis_title(&self, quantity: Quantity) -> String {
        format!("{} ({})", quantity.label(), quantity.unit(self.calibrated))
    }

    /// `(x, y)` pairs of the selected axes, rows without a value are skipped.
    pub fn series(&self) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .map(|r| (r.get(self.x_axis), r.get(self.y_axis)))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect()
    }

    #[inline]
    pub fn trend_line(&self, segments: usize) -> Option<Vec<(f64, f64)>> {
        self.fit.as_ref().map(|f| f.trend_line(&self.x_scale, segments))
    }
}

/// Scale for one axis, time axes start at zero.
pub fn axis_scale(rows: &[DataRow], quantity: Quantity) -> AxisScale {
    AxisScale::from_values(rows.iter().map(|r| r.get(quantity)), quantity == Quantity::Time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regression::Model;

    fn falling_ball() -> Track {
        let mut track = Track::new(1, "Ball");
        // y in px grows downward, 100 px per meter, g = 9.8 m/s²
        for i in 0..10 {
            let t = 1.0 + i as f64 * 0.04;
            let dt = t - 1.0;
            track.add_point(300.0 + 50.0 * dt, 100.0 + 100.0 * 4.9 * dt * dt, t);
        }
        track
    }

    fn calibrated() -> CalibrationState {
        let mut cal = CalibrationState::new();
        cal.set_origin(nalgebra::Point2::new(300.0, 100.0));
        cal.pixels_per_meter = Some(100.0);
        cal
    }

    #[test]
    fn quadratic_fit_recovers_gravity() {
        let config = AnalysisConfig {
            y_axis: Quantity::Y,
            fit: FitSelection::Quadratic,
            ..Default::default()
        };

        let analysis = Analysis::compute(&falling_ball(), &calibrated(), &config);
        let fit = analysis.fit.unwrap();

        match fit.model {
            Model::Quadratic { a, b, c } => {
                assert!((a + 4.9).abs() < 1e-6);
                assert!(b.abs() < 1e-6);
                assert!(c.abs() < 1e-6);
            }
            _ => panic!("expected quadratic model"),
        }
        assert!((fit.r2 - 1.0).abs() < 1e-9);
        assert_eq!(analysis.x_scale.min, 0.0);
    }

    #[test]
    fn velocity_axis_fit_gives_acceleration() {
        let config = AnalysisConfig {
            y_axis: Quantity::Vy,
            fit: FitSelection::Linear,
            ..Default::default()
        };

        let analysis = Analysis::compute(&falling_ball(), &calibrated(), &config);

        match analysis.fit.unwrap().model {
            Model::Linear { slope, .. } => assert!((slope + 9.8).abs() < 1e-6),
            _ => panic!("expected linear model"),
        }
        assert_eq!(analysis.axis_title(Quantity::Vy), "Velocity Y (m/s)");
    }

    #[test]
    fn short_track_has_positions_only() {
        let mut track = Track::new(1, "A");
        track.add_point(0.0, 0.0, 0.0);
        track.add_point(1.0, 0.0, 0.1);

        let config = AnalysisConfig {
            y_axis: Quantity::Vx,
            fit: FitSelection::Linear,
            ..Default::default()
        };
        let analysis = Analysis::compute(&track, &CalibrationState::new(), &config);

        assert_eq!(analysis.positions.len(), 2);
        assert!(analysis.velocities.is_empty());
        assert!(analysis.fit.is_none());
        assert!(analysis.series().is_empty());
        assert_eq!(analysis.y_scale, AxisScale::default());
        assert!(analysis.trend_line(10).is_none());
    }

    #[test]
    fn absolute_time_keeps_timestamps() {
        let config = AnalysisConfig {
            time_origin: TimeOrigin::Absolute,
            ..Default::default()
        };

        let analysis = Analysis::compute(&falling_ball(), &calibrated(), &config);

        assert_eq!(analysis.positions[0].time, 1.0);
        assert_eq!(analysis.velocities[0].time, 1.0);
    }

    #[test]
    fn empty_track() {
        let analysis = Analysis::compute(
            &Track::new(1, "A"),
            &CalibrationState::new(),
            &AnalysisConfig::default(),
        );

        assert!(analysis.rows.is_empty());
        assert_eq!(analysis.x_scale, AxisScale::default());
    }
}
