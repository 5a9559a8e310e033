//! Quadrature rules for reference simplices.
//!
//! The main purpose of this crate is to supply quadrature tables to `simplex-fem`, but the
//! rules are plain `f64` data and may be used independently of it.
//!
//! All simplex rules are defined on the *unit* reference simplex
//! <div>$$
//!   \hat K_D = \{ \xi \in \mathbb{R}^D : \xi_i \geq 0, \, \textstyle\sum_i \xi_i \leq 1 \},
//! $$</div>
//! with vertices $0, e_1, \dots, e_D$. Consequently the weights of a $D$-dimensional rule sum
//! to the volume $1 / D!$ of the reference simplex.
//!
//! The *strength* of a rule is the highest total polynomial degree it integrates exactly.

pub mod simplex;
pub mod univariate;

/// A D-dimensional point.
pub type Point<const D: usize> = [f64; D];

/// A D-dimensional rule, stored as `(weights, points)`.
pub type Rule<const D: usize> = (Vec<f64>, Vec<Point<D>>);

/// Approximates the integral of `f` with the given rule.
pub fn integrate<const D: usize>(rule: &Rule<D>, f: impl Fn(&Point<D>) -> f64) -> f64 {
    let (weights, points) = rule;
    weights
        .iter()
        .zip(points)
        .map(|(w, p)| w * f(p))
        .sum()
}
