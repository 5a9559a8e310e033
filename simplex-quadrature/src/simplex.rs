//! Rules for the unit reference simplices of dimension 0 to 3.
//!
//! Low strengths use classical fully symmetric rules with few points. Higher strengths fall
//! back to collapsed (Duffy) products of Gauss–Legendre rules, so that a rule of any
//! strength is available.

use crate::univariate::gauss_unit_interval;
use crate::Rule;

/// The trivial rule on the reference point: one point without coordinates and weight one.
pub fn point() -> Rule<0> {
    (vec![1.0], vec![[]])
}

/// Number of Gauss points needed so that `2n - 1 >= degree`.
fn gauss_points_for_degree(degree: usize) -> usize {
    (degree + 2) / 2
}

/// A rule for the reference interval `[0, 1]` with the given strength.
pub fn interval(strength: usize) -> Rule<1> {
    gauss_unit_interval(gauss_points_for_degree(strength))
}

/// A rule for the reference triangle with vertices `(0, 0)`, `(1, 0)`, `(0, 1)`.
pub fn triangle(strength: usize) -> Rule<2> {
    match strength {
        0 | 1 => (vec![0.5], vec![[1.0 / 3.0, 1.0 / 3.0]]),
        2 => {
            let w = 1.0 / 6.0;
            let (a, b) = (1.0 / 6.0, 2.0 / 3.0);
            (vec![w, w, w], vec![[a, a], [b, a], [a, b]])
        }
        3 => {
            // Strang & Fix, contains a negative weight
            let w0 = -27.0 / 96.0;
            let w1 = 25.0 / 96.0;
            let c = 1.0 / 3.0;
            (
                vec![w0, w1, w1, w1],
                vec![[c, c], [0.6, 0.2], [0.2, 0.6], [0.2, 0.2]],
            )
        }
        4 => {
            // Dunavant, 6 points
            let mut rule = (Vec::new(), Vec::new());
            push_triangle_orbit(&mut rule, 0.445948490915965, 0.5 * 0.223381589678011);
            push_triangle_orbit(&mut rule, 0.091576213509771, 0.5 * 0.109951743655322);
            rule
        }
        5 => {
            // Dunavant, 7 points
            let c = 1.0 / 3.0;
            let mut rule = (vec![0.5 * 0.225], vec![[c, c]]);
            push_triangle_orbit(&mut rule, 0.470142064105115, 0.5 * 0.132394152788506);
            push_triangle_orbit(&mut rule, 0.101286507323456, 0.5 * 0.125939180544827);
            rule
        }
        _ => collapsed_triangle(strength),
    }
}

/// A rule for the reference tetrahedron with vertices `0`, `e_1`, `e_2`, `e_3`.
pub fn tetrahedron(strength: usize) -> Rule<3> {
    match strength {
        0 | 1 => (vec![1.0 / 6.0], vec![[0.25, 0.25, 0.25]]),
        2 => {
            let a = 0.1381966011250105;
            let b = 0.5854101966249685;
            let w = 1.0 / 24.0;
            (
                vec![w; 4],
                vec![[b, a, a], [a, b, a], [a, a, b], [a, a, a]],
            )
        }
        3 => {
            // Keast, contains a negative weight
            let w0 = -2.0 / 15.0;
            let w1 = 3.0 / 40.0;
            let (a, b) = (1.0 / 6.0, 0.5);
            (
                vec![w0, w1, w1, w1, w1],
                vec![[0.25, 0.25, 0.25], [b, a, a], [a, b, a], [a, a, b], [a, a, a]],
            )
        }
        _ => collapsed_tetrahedron(strength),
    }
}

/// Pushes the three points `(a, a)`, `(1 - 2a, a)`, `(a, 1 - 2a)` with the same weight.
fn push_triangle_orbit(rule: &mut Rule<2>, a: f64, weight: f64) {
    let b = 1.0 - 2.0 * a;
    for point in [[a, a], [b, a], [a, b]] {
        rule.0.push(weight);
        rule.1.push(point);
    }
}

/// Collapsed product rule for the triangle.
///
/// Uses the map $(u, v) \mapsto (u, v (1 - u))$ from the unit square, with Jacobian
/// $1 - u$. A polynomial of total degree $p$ pulls back to degree $p + 1$ in $u$.
fn collapsed_triangle(strength: usize) -> Rule<2> {
    let (wu, pu) = gauss_unit_interval(gauss_points_for_degree(strength + 1));
    let (wv, pv) = gauss_unit_interval(gauss_points_for_degree(strength));

    let mut weights = Vec::with_capacity(wu.len() * wv.len());
    let mut points = Vec::with_capacity(wu.len() * wv.len());
    for (&w_u, &[u]) in wu.iter().zip(&pu) {
        for (&w_v, &[v]) in wv.iter().zip(&pv) {
            weights.push(w_u * w_v * (1.0 - u));
            points.push([u, v * (1.0 - u)]);
        }
    }
    (weights, points)
}

/// Collapsed product rule for the tetrahedron.
///
/// Uses $(u, v, w) \mapsto (u, v (1 - u), w (1 - u) (1 - v))$ with Jacobian
/// $(1 - u)^2 (1 - v)$.
fn collapsed_tetrahedron(strength: usize) -> Rule<3> {
    let (wu, pu) = gauss_unit_interval(gauss_points_for_degree(strength + 2));
    let (wv, pv) = gauss_unit_interval(gauss_points_for_degree(strength + 1));
    let (ww, pw) = gauss_unit_interval(gauss_points_for_degree(strength));

    let n = wu.len() * wv.len() * ww.len();
    let mut weights = Vec::with_capacity(n);
    let mut points = Vec::with_capacity(n);
    for (&w_u, &[u]) in wu.iter().zip(&pu) {
        for (&w_v, &[v]) in wv.iter().zip(&pv) {
            for (&w_w, &[w]) in ww.iter().zip(&pw) {
                weights.push(w_u * w_v * w_w * (1.0 - u) * (1.0 - u) * (1.0 - v));
                points.push([u, v * (1.0 - u), w * (1.0 - u) * (1.0 - v)]);
            }
        }
    }
    (weights, points)
}
