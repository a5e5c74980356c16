//! "Nice number" axis ranges.
//!
//! The chart and every exported graph share these functions so tick
//! positions are identical between the two.

use serde_derive::{Deserialize, Serialize};

/// Approximate number of intervals an axis is divided into.
pub const TARGET_TICKS: f64 = 6.0;

const PADDING: f64 = 0.05;

// upper bound on intervals, the step snapping never comes close
const MAX_INTERVALS: f64 = 64.0;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AxisScale {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub ticks: Vec<f64>,
}

impl Default for AxisScale {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 10.0,
            step: 10.0,
            ticks: vec![0.0, 10.0],
        }
    }
}

impl AxisScale {
    /// Scale covering every finite value of `values`.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I, lock_zero: bool) -> Self {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        nice_scale(min, max, lock_zero)
    }

    #[inline]
    pub fn decimals(&self) -> usize {
        tick_decimals(self.step)
    }

    #[inline]
    pub fn format(&self, value: f64) -> String {
        format_tick(value, self.step)
    }

    pub fn labels(&self) -> Vec<String> {
        self.ticks.iter().map(|&t| self.format(t)).collect()
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Padded axis bounds rounded outward to a 1/2/2.5/5/10 step.
///
/// With `lock_zero` a non-negative range starts exactly at zero. Ranges that
/// cannot be represented (overflowing or collapsing) get the default scale.
pub fn nice_scale(min: f64, max: f64, lock_zero: bool) -> AxisScale {
    if !min.is_finite() || !max.is_finite() || min == max {
        return AxisScale::default();
    }

    let (min, max) = if min < max { (min, max) } else { (max, min) };

    let range = max - min;
    let pad = if range == 0.0 { 1.0 } else { range * PADDING };

    let mut lo = min - pad;
    let hi = max + pad;
    if lock_zero && min >= 0.0 {
        lo = 0.0;
    }

    if !(hi - lo).is_finite() {
        return AxisScale::default();
    }

    let step = nice_step((hi - lo) / TARGET_TICKS);
    if !step.is_finite() || step <= 0.0 {
        return AxisScale::default();
    }

    let places = rounding_places(step);
    let first = (lo / step).floor();
    let last = (hi / step).ceil();
    let count = last - first;

    if !count.is_finite() || count < 1.0 || count > MAX_INTERVALS {
        return AxisScale::default();
    }

    let ticks: Vec<f64> = (0..=count as usize)
        .map(|i| round_to((first + i as f64) * step, places))
        .collect();

    let (lo, hi) = (ticks[0], ticks[ticks.len() - 1]);
    if !lo.is_finite() || !hi.is_finite() || hi <= lo {
        log::debug!("axis range [{}, {}] collapses, using default scale", min, max);
        return AxisScale::default();
    }

    AxisScale {
        min: lo,
        max: hi,
        step,
        ticks,
    }
}

// enough decimals to keep multiples of `step` apart, at least 4
#[inline]
fn rounding_places(step: f64) -> i32 {
    ((-step.log10()).ceil() as i32).saturating_add(1).max(4)
}

/// Snaps a raw step to `{1, 2, 2.5, 5, 10} × 10^n`.
pub fn nice_step(raw: f64) -> f64 {
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;

    let nice = if norm < 1.5 {
        1.0
    } else if norm < 2.25 {
        2.0
    } else if norm < 3.5 {
        2.5
    } else if norm < 7.5 {
        5.0
    } else {
        10.0
    };

    nice * mag
}

/// Decimal places needed to print multiples of `step` without float noise.
pub fn tick_decimals(step: f64) -> usize {
    if !step.is_finite() || step == 0.0 {
        return 0;
    }

    let clean = round_to(step.abs(), rounding_places(step.abs()).max(10));
    if clean.fract() == 0.0 {
        return 0;
    }

    let text = clean.to_string();
    match text.split_once('.') {
        Some((_, frac)) => frac.len(),
        None => 0,
    }
}

pub fn format_tick(value: f64, step: f64) -> String {
    let places = tick_decimals(step);
    let text = format!("{:.*}", places, value);

    // "-0.00" reads as noise on an axis
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

/// Rounds to `places` decimals, values too large or small to scale stay as they are.
#[inline]
fn round_to(value: f64, places: i32) -> f64 {
    let k = 10f64.powi(places);
    let scaled = value * k;

    if !scaled.is_finite() {
        return value;
    }

    scaled.round() / k
}
