//! Lagrange elements.
use crate::array::DenseArray;
use crate::element::{DimensionTable, ReferenceElement};
use crate::error::{FemError, Result};
use crate::Real;
use nalgebra::{DMatrix, DVector};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

/// Continuous, piecewise linear Lagrange element on simplices of dimension up to 3.
///
/// On the reference `d`-simplex with vertices `0, e_1, ..., e_d`, the basis functions are the
/// barycentric coordinates
///
/// ```text
/// phi_0(xi) = 1 - xi_1 - ... - xi_d,    phi_i(xi) = xi_i,    i = 1, ..., d,
/// ```
///
/// so that basis function `i` is associated with vertex `i` and carries exactly one degree of
/// freedom. The gradients are constant and the Hessians vanish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct P1 {
    dimension: usize,
    n_basis: DimensionTable<usize>,
    n_verts: DimensionTable<usize>,
    dof_tuple: DimensionTable<usize>,
}

impl P1 {
    /// Creates the element for cells of the given dimension, which must be at most 3.
    ///
    /// A zero-dimensional element (a single point) is allowed and is used for traces on the
    /// boundary of intervals.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension > crate::MAX_DIMENSION {
            return Err(FemError::invalid_dimension(dimension, "0, 1, 2 or 3"));
        }
        Ok(Self {
            dimension,
            n_basis: DimensionTable::from_fn(dimension, |d| d + 1),
            n_verts: DimensionTable::from_fn(dimension, |d| d + 1),
            dof_tuple: DimensionTable::from_fn(dimension, |d| usize::from(d == 0)),
        })
    }

    fn check_points<T: Real>(&self, points: &DMatrix<T>) -> Result<usize> {
        let d = points.nrows();
        if d > self.dimension {
            Err(FemError::invalid_dimension(d, format!("at most {}", self.dimension)))
        } else {
            Ok(d)
        }
    }
}

/// Writes the barycentric coordinates of `xi` into `basis_values`.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn populate_basis<T: Real>(basis_values: &mut [T], xi: &[T]) {
    debug_assert_eq!(basis_values.len(), xi.len() + 1);
    basis_values[0] = xi.iter().fold(1.0, |acc, &x| acc - x);
    basis_values[1..].copy_from_slice(xi);
}

/// Gradient of basis function `basis` on the reference `d`-simplex.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn basis_gradient<T: Real>(d: usize, basis: usize) -> DVector<T> {
    if basis == 0 {
        DVector::from_element(d, -1.0)
    } else {
        let mut gradient = DVector::zeros(d);
        gradient[basis - 1] = 1.0;
        gradient
    }
}

impl<T: Real> ReferenceElement<T> for P1 {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn order(&self) -> usize {
        1
    }

    fn n_basis(&self) -> &DimensionTable<usize> {
        &self.n_basis
    }

    fn n_verts(&self) -> &DimensionTable<usize> {
        &self.n_verts
    }

    fn dof_tuple(&self) -> &DimensionTable<usize> {
        &self.dof_tuple
    }

    fn eval_basis_values(&self, points: &DMatrix<T>) -> Result<DenseArray<T, 2>> {
        let d = self.check_points(points)?;
        let n_points = points.ncols();
        let mut values = DenseArray::from_fn([d + 1, n_points], |_| T::zero());
        let mut basis_values = vec![T::zero(); d + 1];
        for (p, xi) in points.column_iter().enumerate() {
            let xi: Vec<T> = xi.iter().copied().collect();
            populate_basis(&mut basis_values, &xi);
            for (b, &value) in basis_values.iter().enumerate() {
                values[[b, p]] = value;
            }
        }
        Ok(values)
    }

    fn eval_basis_gradients(&self, points: &DMatrix<T>) -> Result<DenseArray<DVector<T>, 2>> {
        let d = self.check_points(points)?;
        Ok(DenseArray::from_fn([d + 1, points.ncols()], |[b, _]| basis_gradient(d, b)))
    }

    fn eval_basis_hessians(&self, points: &DMatrix<T>) -> Result<DenseArray<DMatrix<T>, 2>> {
        let d = self.check_points(points)?;
        Ok(DenseArray::from_fn([d + 1, points.ncols()], |_| DMatrix::zeros(d, d)))
    }
}
