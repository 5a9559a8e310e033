//! Gauss–Legendre rules for the interval `[-1, 1]`.
//!
//! These are the building blocks for the simplex rules of higher strength, which are formed
//! as collapsed products of Gauss rules.

use crate::Rule;
use std::f64::consts::PI;

/// Value and derivative of the Legendre polynomial $P_n$ at a point.
///
/// The derivative formula is singular at `|x| == 1`, so this is only suitable for the open
/// interval `(-1, 1)`, which is where the Gauss points live.
#[derive(Debug, Default)]
struct Legendre {
    n: usize,
    x: f64,
    // P_n(x)
    p_n: f64,
    // P_{n - 1}(x)
    p_prev: f64,
}

impl Legendre {
    fn evaluate(n: usize, x: f64) -> Self {
        // Bonnet's recursion:
        //  m P_m(x) = (2m - 1) x P_{m - 1}(x) - (m - 1) P_{m - 2}(x)
        let mut p_n = 1.0;
        let mut p_prev = 0.0;
        for m in 1..=n {
            let m = m as f64;
            let p_prev_prev = p_prev;
            p_prev = p_n;
            p_n = ((2.0 * m - 1.0) * x * p_prev - (m - 1.0) * p_prev_prev) / m;
        }
        Self { n, x, p_n, p_prev }
    }

    fn value(&self) -> f64 {
        self.p_n
    }

    fn derivative(&self) -> f64 {
        let n = self.n as f64;
        let x = self.x;
        n * (x * self.p_n - self.p_prev) / (x * x - 1.0)
    }
}

/// Gauss–Legendre quadrature with `num_points` points on `[-1, 1]`.
///
/// The rule integrates polynomials of degree up to `2 * num_points - 1` exactly.
/// Points are returned in ascending order.
///
/// # Panics
///
/// Panics if zero points are requested.
pub fn gauss(num_points: usize) -> Rule<1> {
    let n = num_points;
    assert!(n > 0, "number of points must be positive");

    // Roots are symmetric about the origin, so we only solve for the non-negative half
    let half = (n + 1) / 2;
    let mut roots = Vec::with_capacity(half);

    for i in 0..half {
        // Chebyshev-like initial guess, then Newton's method
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut legendre = Legendre::evaluate(n, x);
        for _ in 0..100 {
            let dx = -legendre.value() / legendre.derivative();
            x += dx;
            legendre = Legendre::evaluate(n, x);
            if dx.abs() <= 1e-15 {
                break;
            }
        }
        let dp = legendre.derivative();
        let w = 2.0 / ((1.0 - x * x) * dp * dp);
        roots.push((x, w));
    }

    // roots[i] is the (i + 1)-th largest root. For odd n the middle slot is written twice,
    // and the root found there is zero up to rounding.
    let mut weights = vec![0.0; n];
    let mut points = vec![[0.0]; n];
    for (i, &(x, w)) in roots.iter().enumerate() {
        points[i] = [-x];
        weights[i] = w;
        points[n - 1 - i] = [x];
        weights[n - 1 - i] = w;
    }

    (weights, points)
}

/// Gauss–Legendre quadrature with `num_points` points, mapped to `[0, 1]`.
pub fn gauss_unit_interval(num_points: usize) -> Rule<1> {
    let (weights, points) = gauss(num_points);
    let weights = weights.into_iter().map(|w| 0.5 * w).collect();
    let points = points.into_iter().map(|[x]| [0.5 * (x + 1.0)]).collect();
    (weights, points)
}
