//! Shared fixtures for integration tests.

use chrono::NaiveDate;
use eigenfactor::model::Result;
use eigenfactor::{
    DatedMatrix, EigenError, EigenSolver, InstrumentId, RawEigenpair, ReturnQuality,
    ReturnsInMatrixForm,
};
use ndarray::{Array2, ArrayViewMut2};

/// Cyclic Jacobi eigensolver for small symmetric matrices.
///
/// Returns eigenpairs largest eigenvalue first.
#[derive(Debug, Clone, Copy)]
pub(crate) struct JacobiEigenSolver {
    pub(crate) max_sweeps: usize,
    pub(crate) tolerance: f64,
}

impl Default for JacobiEigenSolver {
    fn default() -> Self {
        Self {
            max_sweeps: 50,
            tolerance: 1e-14,
        }
    }
}

impl EigenSolver for JacobiEigenSolver {
    fn solve(&self, matrix: &Array2<f64>) -> Result<Vec<RawEigenpair>> {
        let n = matrix.nrows();
        if n != matrix.ncols() {
            return Err(EigenError::DimensionMismatch {
                context: "square matrix".to_string(),
                expected: n,
                actual: matrix.ncols(),
            });
        }

        let mut a = matrix.clone();
        let mut v = Array2::<f64>::eye(n);

        for _ in 0..self.max_sweeps {
            if off_diagonal_norm(&a) < self.tolerance {
                break;
            }
            for p in 0..n {
                for q in (p + 1)..n {
                    if a[[p, q]].abs() < self.tolerance {
                        continue;
                    }
                    let (c, s) = rotation(a[[p, p]], a[[q, q]], a[[p, q]]);
                    // A <- G^T A G, V <- V G
                    rotate_columns(a.view_mut(), p, q, c, s);
                    rotate_columns(a.view_mut().reversed_axes(), p, q, c, s);
                    rotate_columns(v.view_mut(), p, q, c, s);
                }
            }
        }

        let mut pairs: Vec<RawEigenpair> = (0..n)
            .map(|i| RawEigenpair {
                eigenvalue: a[[i, i]],
                eigenvector: v.column(i).to_owned(),
            })
            .collect();
        pairs.sort_by(|x, y| y.eigenvalue.total_cmp(&x.eigenvalue));
        Ok(pairs)
    }
}

fn off_diagonal_norm(a: &Array2<f64>) -> f64 {
    a.indexed_iter()
        .filter(|((i, j), _)| i != j)
        .map(|(_, x)| x * x)
        .sum::<f64>()
        .sqrt()
}

/// (cos, sin) of the rotation that zeroes `a_pq`.
fn rotation(app: f64, aqq: f64, apq: f64) -> (f64, f64) {
    let theta = (aqq - app) / (2.0 * apq);
    let t = theta.signum() / (theta.abs() + theta.hypot(1.0));
    let c = 1.0 / t.hypot(1.0);
    (c, t * c)
}

fn rotate_columns(mut m: ArrayViewMut2<'_, f64>, p: usize, q: usize, c: f64, s: f64) {
    for mut row in m.rows_mut() {
        let (x, y) = (row[p], row[q]);
        row[p] = c * x - s * y;
        row[q] = s * x + c * y;
    }
}

pub(crate) const TICKERS: [&str; 5] = ["AAA", "BBB", "CCC", "XXX", "YYY"];

/// Eight daily returns for five instruments in two blocks.
///
/// AAA, BBB and CCC follow one factor, XXX and YYY an orthogonal one, each
/// with a little idiosyncratic noise. The correlation matrix has two large
/// eigenvalues (about 3 and 2) and three small ones.
pub(crate) fn two_block_returns() -> Array2<f64> {
    let f1 = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
    let f2 = [1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0];
    let noise: [[f64; 5]; 8] = [
        [0.7, -0.2, 0.4, -0.9, 0.3],
        [-0.5, 0.8, 0.1, 0.6, -0.4],
        [0.2, -0.6, -0.9, 0.3, 0.8],
        [-0.1, 0.3, 0.5, -0.7, -0.2],
        [0.9, 0.1, -0.3, 0.2, -0.6],
        [-0.4, -0.7, 0.6, -0.1, 0.5],
        [0.3, 0.5, -0.2, 0.8, -0.9],
        [-0.8, -0.1, -0.4, -0.5, 0.1],
    ];
    let betas = [1.0, 0.8, 1.2, 0.9, 1.1];

    Array2::from_shape_fn((8, 5), |(t, i)| {
        let factor = if i < 3 { f1[t] } else { f2[t] };
        0.01 * betas[i] * factor + 0.001 * noise[t][i]
    })
}

pub(crate) fn dates(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    (0..n as u64)
        .map(|i| start + chrono::Days::new(i))
        .collect()
}

pub(crate) fn keys() -> Vec<InstrumentId> {
    TICKERS.iter().map(|s| (*s).into()).collect()
}

/// [`two_block_returns`] with CCC's first return back-filled and YYY's
/// fourth gap-filled.
pub(crate) fn returns_with_quality() -> ReturnsInMatrixForm<InstrumentId> {
    let values = two_block_returns();
    let (rows, cols) = values.dim();
    let mut quality = Array2::from_elem((rows, cols), ReturnQuality::Actual);
    quality[[0, 2]] = ReturnQuality::BackFilled;
    quality[[3, 4]] = ReturnQuality::GapFilled;

    let returns = DatedMatrix::new(dates(rows), keys(), values).unwrap();
    let quality = DatedMatrix::new(dates(rows), keys(), quality).unwrap();
    ReturnsInMatrixForm::new(returns, quality).unwrap()
}

