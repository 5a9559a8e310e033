//! Test helpers shared by the test and bench targets of the workspace.
use nalgebra::{DMatrix, DVector};

/// Poor man's approx assertion for matrices
#[macro_export]
macro_rules! assert_approx_matrix_eq {
    ($x:expr, $y:expr, abstol = $tol:expr) => {{
        let diff = $x - $y;

        let max_absdiff = diff.abs().max();
        let approx_eq = max_absdiff <= $tol;

        if !approx_eq {
            println!("abstol: {:e}", $tol);
            println!("left: {}", $x);
            println!("right: {}", $y);
            println!("diff: {:e}", diff);
        }
        assert!(approx_eq);
    }};
}

/// Volume of the unit reference simplex of dimension `d`, `1 / d!`.
pub fn reference_simplex_volume(d: usize) -> f64 {
    1.0 / (1..=d).product::<usize>() as f64
}

/// Stacks vectors of equal length as the columns of a matrix.
///
/// Unlike `DMatrix::from_columns`, this also accepts an empty list and zero-length vectors,
/// given the number of rows.
pub fn columns(nrows: usize, columns: &[DVector<f64>]) -> DMatrix<f64> {
    DMatrix::from_fn(nrows, columns.len(), |i, j| columns[j][i])
}
