//! Motion analysis for points clicked on video frames.
//!
//! Pixel clicks are calibrated into physical positions, differentiated into
//! velocities, optionally fitted with a linear or quadratic model and given
//! "nice" axis scales. Every step is a pure function of its inputs and is
//! simply re-run whenever points, calibration or axis choice change.

pub mod analysis;
pub mod calibration;
pub mod error;
pub mod kinematics;
pub mod math;
pub mod regression;
pub mod sample;
pub mod scale;
pub mod track;

pub use analysis::{Analysis, AnalysisConfig};
pub use calibration::CalibrationState;
pub use error::Error;
pub use regression::{FitKind, FitResult, FitSelection, Model};
pub use sample::{DataRow, PositionSample, Quantity, TimeOrigin, VelocitySample};
pub use scale::AxisScale;
pub use track::{Track, TrackedPoint};

use nalgebra as na;
use std::fmt;

/// Scalar the linear solver works with.
pub trait Float: num_traits::FromPrimitive + na::RealField + Copy + fmt::Debug + 'static {}

impl<T> Float for T where T: num_traits::FromPrimitive + na::RealField + Copy + fmt::Debug + 'static {}
