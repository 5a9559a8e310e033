//! Quadrature rules on the reference simplices.
//!
//! The tables themselves live in the `simplex-quadrature` crate in `f64` precision. This module
//! converts them to the scalar type in use and stores them per dimension, as point matrices with
//! one column per quadrature point.
use crate::error::{FemError, Result};
use crate::Real;
use nalgebra::{convert, DMatrix, DVector, Scalar};
use simplex_quadrature::{simplex, Rule};

/// Converts a rule in `f64` precision to a `D x n_points` point matrix and a weight vector.
fn convert_rule<T: Real, const D: usize>((weights, points): Rule<D>) -> (DMatrix<T>, DVector<T>) {
    let n_points = weights.len();
    let points = DMatrix::from_fn(D, n_points, |i, j| convert(points[j][i]));
    let weights = DVector::from_iterator(n_points, weights.into_iter().map(convert));
    (points, weights)
}

/// Quadrature rules of a common strength on the reference simplices of dimension
/// `0..=dimension`.
///
/// The rule for dimension `d` integrates polynomials of total degree up to the strength exactly
/// on the unit `d`-simplex, whose volume is `1 / d!`. The point "rule" in dimension zero has a
/// single point without coordinates and unit weight.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureRule<T: Scalar> {
    strength: usize,
    points: Vec<DMatrix<T>>,
    weights: Vec<DVector<T>>,
}

impl<T: Real> QuadratureRule<T> {
    pub fn new(strength: usize, dimension: usize) -> Result<Self> {
        if dimension > crate::MAX_DIMENSION {
            return Err(FemError::invalid_dimension(dimension, "0, 1, 2 or 3"));
        }
        let mut points = Vec::with_capacity(dimension + 1);
        let mut weights = Vec::with_capacity(dimension + 1);
        for d in 0..=dimension {
            let (p, w) = match d {
                0 => convert_rule(simplex::point()),
                1 => convert_rule(simplex::interval(strength)),
                2 => convert_rule(simplex::triangle(strength)),
                _ => convert_rule(simplex::tetrahedron(strength)),
            };
            points.push(p);
            weights.push(w);
        }
        Ok(Self {
            strength,
            points,
            weights,
        })
    }

    /// The maximal polynomial degree integrated exactly.
    pub fn strength(&self) -> usize {
        self.strength
    }

    /// The largest dimension a rule is available for.
    pub fn dimension(&self) -> usize {
        self.points.len() - 1
    }

    /// The `d x n_points` quadrature points on the reference `d`-simplex.
    pub fn points(&self, d: usize) -> Result<&DMatrix<T>> {
        self.points.get(d).ok_or_else(|| self.dimension_error(d))
    }

    pub fn weights(&self, d: usize) -> Result<&DVector<T>> {
        self.weights.get(d).ok_or_else(|| self.dimension_error(d))
    }

    pub fn n_points(&self, d: usize) -> Result<usize> {
        self.weights(d).map(DVector::len)
    }

    fn dimension_error(&self, d: usize) -> FemError {
        FemError::invalid_dimension(d, format!("at most {}", self.dimension()))
    }
}
