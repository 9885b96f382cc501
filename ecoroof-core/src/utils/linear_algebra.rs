//! Linear algebra utilities.

use nalgebra::{Matrix2, Vector2};

use crate::FloatValue;

/// Solve the 2x2 system $A x = b$ using LU decomposition.
///
/// Returns `None` when the matrix is singular or the solution is not finite.
///
/// # Example
/// ```
/// use ecoroof_core::utils::linear_algebra::solve_2x2;
///
/// // 2x + y = 5, x + 3y = 10
/// let x = solve_2x2([[2.0, 1.0], [1.0, 3.0]], [5.0, 10.0]).unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-10);
/// assert!((x[1] - 3.0).abs() < 1e-10);
/// ```
pub fn solve_2x2(
    matrix: [[FloatValue; 2]; 2],
    rhs: [FloatValue; 2],
) -> Option<[FloatValue; 2]> {
    let a = Matrix2::new(matrix[0][0], matrix[0][1], matrix[1][0], matrix[1][1]);
    let b = Vector2::new(rhs[0], rhs[1]);
    let x = a.lu().solve(&b)?;
    if x[0].is_finite() && x[1].is_finite() {
        Some([x[0], x[1]])
    } else {
        None
    }
}

/// Under-relaxed update: `weight` of the new estimate, the rest from the old.
pub fn relax(old: FloatValue, new: FloatValue, weight: FloatValue) -> FloatValue {
    (1.0 - weight) * old + weight * new
}
