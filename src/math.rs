use nalgebra as na;

use crate::Float;

/// Outcome of solving a dense linear system.
#[derive(Debug, Clone, PartialEq)]
pub enum Solution<F: Float> {
    Solved(na::DVector<F>),
    Singular,
}

impl<F: Float> Solution<F> {
    #[inline]
    pub fn ok(self) -> Option<na::DVector<F>> {
        match self {
            Solution::Solved(x) => Some(x),
            Solution::Singular => None,
        }
    }

    #[inline]
    pub fn is_singular(&self) -> bool {
        matches!(self, Solution::Singular)
    }
}

/// Solves `a * x = b` with Gaussian elimination and partial pivoting.
///
/// At each step the row with the largest absolute value in the pivot column
/// is swapped into place before eliminating below it. A pivot smaller than
/// `1e-10` in magnitude, during elimination or back-substitution, makes the
/// system singular.
pub fn gauss_solve<F: Float>(mut a: na::DMatrix<F>, mut b: na::DVector<F>) -> Solution<F> {
    let n = a.nrows();

    if n == 0 || a.ncols() != n || b.len() != n {
        return Solution::Singular;
    }

    let tiny: F = na::convert(1e-10_f64);

    for col in 0..n {
        let mut pivot = col;
        for row in col + 1..n {
            if a[(row, col)].abs() > a[(pivot, col)].abs() {
                pivot = row;
            }
        }

        if a[(pivot, col)].abs() < tiny {
            return Solution::Singular;
        }

        if pivot != col {
            a.swap_rows(pivot, col);
            b.swap_rows(pivot, col);
        }

        for row in col + 1..n {
            let factor = a[(row, col)] / a[(col, col)];
            for k in col..n {
                let v = a[(col, k)];
                a[(row, k)] -= factor * v;
            }
            let v = b[col];
            b[row] -= factor * v;
        }
    }

    let mut x = na::DVector::<F>::zeros(n);

    for row in (0..n).rev() {
        let diag = a[(row, row)];
        if diag.abs() < tiny {
            return Solution::Singular;
        }

        let mut acc = b[row];
        for k in row + 1..n {
            acc -= a[(row, k)] * x[k];
        }

        x[row] = acc / diag;
    }

    Solution::Solved(x)
}

/// Closed-form least squares line, returns `(slope, intercept)`.
///
/// `None` when the denominator `nΣx² − (Σx)²` is below `1e-9` in magnitude.
pub fn linear_ls<F: Float>(x: &na::DVector<F>, y: &na::DVector<F>) -> Option<(F, F)> {
    let n = F::from_usize(x.len())?;

    let s_x = x.sum();
    let s_y = y.sum();
    let s_x2 = x.map(|x| x * x).sum();
    let s_xy = x.zip_map(y, |x, y| x * y).sum();

    let denom = n * s_x2 - s_x * s_x;
    let eps: F = na::convert(1e-9_f64);
    if denom.abs() < eps {
        return None;
    }

    let slope = (n * s_xy - s_x * s_y) / denom;
    let intercept = (s_y - slope * s_x) / n;

    Some((slope, intercept))
}

/// Least squares parabola `y = a x² + b x + c`, returns `[a, b, c]`.
pub fn quadratic_ls<F: Float>(x: &na::DVector<F>, y: &na::DVector<F>) -> Option<na::DVector<F>> {
    let n = F::from_usize(x.len())?;

    let s_x1 = x.sum();
    let x2 = x.map(|x| x * x);
    let s_x2 = x2.sum();
    let x3 = x2.zip_map(x, |a, b| a * b);
    let s_x3 = x3.sum();
    let s_x4 = x3.zip_map(x, |a, b| a * b).sum();
    let s_x2y = x2.zip_map(y, |x, y| x * y).sum();
    let s_xy = x.zip_map(y, |x, y| x * y).sum();
    let s_y = y.sum();

    let a = na::DMatrix::from_row_slice(
        3,
        3,
        &[s_x4, s_x3, s_x2, s_x3, s_x2, s_x1, s_x2, s_x1, n],
    );
    let b = na::DVector::from_column_slice(&[s_x2y, s_xy, s_y]);

    gauss_solve(a, b).ok()
}
