use nalgebra as na;
use serde_derive::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::Error;
use crate::math::{linear_ls, quadratic_ls};
use crate::sample::{DataRow, Quantity};
use crate::scale::AxisScale;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FitKind {
    Linear,
    Quadratic,
}

impl FitKind {
    /// Fewest points the model accepts.
    #[inline]
    pub fn min_points(&self) -> usize {
        match self {
            FitKind::Linear => 2,
            // strictly more points than coefficients
            FitKind::Quadratic => 4,
        }
    }
}

/// Curve fit model selector, `none` hides the trend line.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FitSelection {
    #[default]
    None,
    Linear,
    Quadratic,
}

impl FitSelection {
    #[inline]
    pub fn kind(&self) -> Option<FitKind> {
        match self {
            FitSelection::None => None,
            FitSelection::Linear => Some(FitKind::Linear),
            FitSelection::Quadratic => Some(FitKind::Quadratic),
        }
    }
}

impl fmt::Display for FitSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FitSelection::None => "none",
            FitSelection::Linear => "linear",
            FitSelection::Quadratic => "quadratic",
        })
    }
}

impl FromStr for FitSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(FitSelection::None),
            "linear" => Ok(FitSelection::Linear),
            "quadratic" => Ok(FitSelection::Quadratic),
            other => Err(Error::UnknownFitKind(other.to_string())),
        }
    }
}

/// A fitted polynomial.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Model {
    Linear { slope: f64, intercept: f64 },

    // y = a x² + b x + c
    Quadratic { a: f64, b: f64, c: f64 },
}

impl Model {
    #[inline]
    pub fn kind(&self) -> FitKind {
        match self {
            Model::Linear { .. } => FitKind::Linear,
            Model::Quadratic { .. } => FitKind::Quadratic,
        }
    }

    /// Evaluates the polynomial, valid outside the sampled range too.
    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        match *self {
            Model::Linear { slope, intercept } => slope * x + intercept,
            Model::Quadratic { a, b, c } => (a * x + b) * x + c,
        }
    }

    /// Named coefficients, highest power first.
    pub fn coefficients(&self) -> Vec<(&'static str, f64)> {
        match *self {
            Model::Linear { slope, intercept } => vec![("slope", slope), ("intercept", intercept)],
            Model::Quadratic { a, b, c } => vec![("A", a), ("B", b), ("C", c)],
        }
    }
}

fn write_term(f: &mut fmt::Formatter<'_>, value: f64, suffix: &str) -> fmt::Result {
    let sign = if value.is_sign_negative() { '-' } else { '+' };

    write!(f, " {} {:.4}{}", sign, value.abs(), suffix)
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Model::Linear { slope, intercept } => {
                write!(f, "y = {:.4}x", slope)?;
                write_term(f, intercept, "")
            }
            Model::Quadratic { a, b, c } => {
                write!(f, "y = {:.4}x²", a)?;
                write_term(f, b, "x")?;
                write_term(f, c, "")
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    pub model: Model,

    /// Coefficient of determination. May be negative; `NaN` when every `y` is equal.
    pub r2: f64,

    // points that took part in the fit
    pub count: usize,
}

impl FitResult {
    #[inline]
    pub fn kind(&self) -> FitKind {
        self.model.kind()
    }

    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.model.predict(x)
    }

    #[inline]
    pub fn coefficients(&self) -> Vec<(&'static str, f64)> {
        self.model.coefficients()
    }

    #[inline]
    pub fn has_defined_quality(&self) -> bool {
        self.r2.is_finite()
    }

    /// Samples the model across the whole x axis for drawing the trend line.
    pub fn trend_line(&self, x_scale: &AxisScale, segments: usize) -> Vec<(f64, f64)> {
        let segments = segments.max(1);
        let span = x_scale.max - x_scale.min;

        (0..=segments)
            .map(|i| {
                let x = x_scale.min + span * i as f64 / segments as f64;
                (x, self.predict(x))
            })
            .collect()
    }
}

/// Least squares fit of `kind` to `(x, y)` pairs.
///
/// Pairs with a non-finite component are ignored. `None` when too few pairs
/// remain or the system is degenerate.
pub fn fit(kind: FitKind, points: &[(f64, f64)]) -> Option<FitResult> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .unzip();

    let count = xs.len();
    if count < kind.min_points() {
        log::debug!("{:?} fit needs {} points, got {}", kind, kind.min_points(), count);
        return None;
    }

    let x = na::DVector::from_vec(xs);
    let y = na::DVector::from_vec(ys);

    let model = match kind {
        FitKind::Linear => {
            let (slope, intercept) = linear_ls(&x, &y)?;
            Model::Linear { slope, intercept }
        }
        FitKind::Quadratic => {
            let p = quadratic_ls(&x, &y)?;
            Model::Quadratic {
                a: p[0],
                b: p[1],
                c: p[2],
            }
        }
    };

    if !model.coefficients().iter().all(|(_, v)| v.is_finite()) {
        log::debug!("{:?} fit diverged", kind);
        return None;
    }

    Some(FitResult {
        model,
        r2: r_squared(&model, &x, &y),
        count,
    })
}

/// Fits the `y` quantity against the `x` quantity of table rows.
pub fn fit_rows(kind: FitKind, rows: &[DataRow], x: Quantity, y: Quantity) -> Option<FitResult> {
    let points: Vec<(f64, f64)> = rows.iter().map(|r| (r.get(x), r.get(y))).collect();
    let res = fit(kind, &points);

    if res.is_none() {
        log::debug!("no {:?} fit for {} against {}", kind, y, x);
    }

    res
}

fn r_squared(model: &Model, x: &na::DVector<f64>, y: &na::DVector<f64>) -> f64 {
    let mean = y.mean();

    let ss_tot: f64 = y.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(x, y)| (y - model.predict(*x)).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return f64::NAN;
    }

    1.0 - ss_res / ss_tot
}
