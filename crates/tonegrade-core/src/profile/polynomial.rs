//! Least-squares polynomial fitting.
//!
//! Solves the normal equations `(AᵀA) c = Aᵀy` for the Vandermonde matrix
//! `A` with Gaussian elimination and partial pivoting. Everything runs in
//! `f64`; the systems are tiny (degree + 1 unknowns).

const PIVOT_EPSILON: f64 = 1e-12;

/// Fit a polynomial of `degree` through `(xs[i], ys[i])`.
///
/// Returns coefficients lowest power first, or `None` when the system is
/// singular (too few distinct samples for the degree).
pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> Option<Vec<f64>> {
    let n = degree + 1;
    if xs.len() != ys.len() || xs.len() < n {
        return None;
    }

    // Augmented normal matrix [AᵀA | Aᵀy]
    let mut m = vec![vec![0.0_f64; n + 1]; n];
    for (&x, &y) in xs.iter().zip(ys) {
        let powers: Vec<f64> = (0..2 * n).scan(1.0, |p, _| {
            let v = *p;
            *p *= x;
            Some(v)
        })
        .collect();
        for (row, r) in m.iter_mut().enumerate() {
            for (col, cell) in r.iter_mut().take(n).enumerate() {
                *cell += powers[row + col];
            }
            r[n] += powers[row] * y;
        }
    }

    solve(m)
}

/// Gaussian elimination with partial pivoting on an `n × (n + 1)` augmented matrix.
fn solve(mut m: Vec<Vec<f64>>) -> Option<Vec<f64>> {
    let n = m.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))?;
        if m[pivot][col].abs() < PIVOT_EPSILON {
            return None;
        }
        m.swap(col, pivot);

        for row in col + 1..n {
            let factor = m[row][col] / m[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..=n {
                m[row][k] -= factor * m[col][k];
            }
        }
    }

    let mut coeffs = vec![0.0_f64; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| m[row][k] * coeffs[k]).sum();
        coeffs[row] = (m[row][n] - tail) / m[row][row];
    }
    Some(coeffs)
}

/// Evaluate coefficients (lowest power first) at `x` with Horner's rule.
#[inline]
pub fn evaluate(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}
