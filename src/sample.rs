use serde_derive::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::Error;

/// Calibrated position of a tracked object at one instant.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub uncertainty: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct VelocitySample {
    pub time: f64,
    pub vx: f64,
    pub vy: f64,
}

/// One line of the data table: a position and, when available, its velocity.
///
/// Missing velocities are `NaN`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DataRow {
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl DataRow {
    #[inline]
    pub fn get(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::Time => self.time,
            Quantity::X => self.x,
            Quantity::Y => self.y,
            Quantity::Vx => self.vx,
            Quantity::Vy => self.vy,
        }
    }

    #[inline]
    pub fn has_velocity(&self) -> bool {
        self.vx.is_finite() && self.vy.is_finite()
    }
}

/// Joins positions with the velocities estimated at the same sample index.
pub fn join_rows(
    positions: &[PositionSample],
    velocities: &[Option<VelocitySample>],
) -> Vec<DataRow> {
    positions
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            let (vx, vy) = velocities
                .get(idx)
                .copied()
                .flatten()
                .map(|v| (v.vx, v.vy))
                .unwrap_or((f64::NAN, f64::NAN));

            DataRow {
                time: p.time,
                x: p.x,
                y: p.y,
                vx,
                vy,
            }
        })
        .collect()
}

/// Physical quantity that can be put on a chart axis.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    Time,
    X,
    Y,
    Vx,
    Vy,
}

impl Quantity {
    pub const ALL: [Quantity; 5] = [
        Quantity::Time,
        Quantity::X,
        Quantity::Y,
        Quantity::Vx,
        Quantity::Vy,
    ];

    #[inline]
    pub fn is_velocity(&self) -> bool {
        matches!(self, Quantity::Vx | Quantity::Vy)
    }

    pub fn unit(&self, calibrated: bool) -> &'static str {
        if *self == Quantity::Time {
            return "s";
        }

        match (self.is_velocity(), calibrated) {
            (false, true) => "m",
            (false, false) => "px",
            (true, true) => "m/s",
            (true, false) => "px/s",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quantity::Time => "Time",
            Quantity::X => "Position X",
            Quantity::Y => "Position Y",
            Quantity::Vx => "Velocity X",
            Quantity::Vy => "Velocity Y",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Quantity::Time => "time",
            Quantity::X => "x",
            Quantity::Y => "y",
            Quantity::Vx => "vx",
            Quantity::Vy => "vy",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Quantity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        Quantity::ALL
            .iter()
            .copied()
            .find(|q| q.name().eq_ignore_ascii_case(s))
            .or_else(|| s.eq_ignore_ascii_case("t").then_some(Quantity::Time))
            .ok_or_else(|| Error::UnknownQuantity(s.to_string()))
    }
}

/// Where `t = 0` sits on displayed and exported series.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeOrigin {
    /// Timestamps as clicked on the video timeline.
    Absolute,

    /// Shifted so the earliest sample of the track reads as zero.
    #[default]
    FirstSample,
}

impl TimeOrigin {
    /// Offset subtracted from every timestamp of a time-sorted series.
    #[inline]
    pub fn offset(&self, first_time: Option<f64>) -> f64 {
        match (self, first_time) {
            (TimeOrigin::FirstSample, Some(t0)) => t0,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(time: f64, x: f64) -> PositionSample {
        PositionSample {
            time,
            x,
            y: 0.0,
            uncertainty: 0.0,
        }
    }

    #[test]
    fn rows_leave_gaps_for_skipped_velocities() {
        let positions = [pos(0.0, 0.0), pos(0.5, 1.0), pos(1.0, 2.0)];
        let velocities = [
            Some(VelocitySample {
                time: 0.0,
                vx: 2.0,
                vy: 0.0,
            }),
            None,
            Some(VelocitySample {
                time: 1.0,
                vx: 2.0,
                vy: 0.0,
            }),
        ];

        let rows = join_rows(&positions, &velocities);

        assert_eq!(rows.len(), 3);
        assert!(rows[0].has_velocity());
        assert!(!rows[1].has_velocity());
        assert!(rows[1].get(Quantity::Vx).is_nan());
        assert_eq!(rows[2].get(Quantity::Vx), 2.0);
        assert_eq!(rows[2].get(Quantity::X), 2.0);
    }

    #[test]
    fn quantity_parses_case_insensitively() {
        assert_eq!("VX".parse::<Quantity>(), Ok(Quantity::Vx));
        assert_eq!(" time ".parse::<Quantity>(), Ok(Quantity::Time));
        assert_eq!("t".parse::<Quantity>(), Ok(Quantity::Time));
        assert_eq!(
            "speed".parse::<Quantity>(),
            Err(Error::UnknownQuantity("speed".into()))
        );

        for q in Quantity::ALL {
            assert_eq!(q.to_string().parse::<Quantity>(), Ok(q));
        }
    }

    #[test]
    fn units_follow_calibration() {
        assert_eq!(Quantity::X.unit(true), "m");
        assert_eq!(Quantity::Vy.unit(false), "px/s");
        assert_eq!(Quantity::Time.unit(false), "s");
        assert_eq!(Quantity::Y.unit(false), "px");
        assert_eq!(Quantity::Vx.unit(true), "m/s");
    }

    #[test]
    fn only_vx_and_vy_are_velocities() {
        let velocities: Vec<Quantity> = Quantity::ALL
            .iter()
            .copied()
            .filter(Quantity::is_velocity)
            .collect();

        assert_eq!(velocities, vec![Quantity::Vx, Quantity::Vy]);
    }

    #[test]
    fn time_origin_offset() {
        assert_eq!(TimeOrigin::FirstSample.offset(Some(3.5)), 3.5);
        assert_eq!(TimeOrigin::FirstSample.offset(None), 0.0);
        assert_eq!(TimeOrigin::Absolute.offset(Some(3.5)), 0.0);
    }
}
