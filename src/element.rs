//! Reference finite elements on the unit simplex.
//!
//! A [`ReferenceElement`] knows nothing about meshes. It describes a family of basis functions on
//! the reference simplex of every dimension up to its own, and evaluates them (or their first
//! and second derivatives) at batches of reference points. Which reference simplex is meant is
//! always inferred from the number of rows of the point matrix.
use crate::array::DenseArray;
use crate::error::{FemError, Result};
use crate::Real;
use nalgebra::{DMatrix, DVector, Scalar};
use serde::{Deserialize, Serialize};
use std::ops::Index;

pub mod lagrange;

pub use lagrange::P1;

/// A table holding one value per topological dimension `0..=max_dimension`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionTable<V> {
    values: Vec<V>,
}

impl<V> DimensionTable<V> {
    pub fn from_fn(max_dimension: usize, f: impl FnMut(usize) -> V) -> Self {
        Self {
            values: (0..=max_dimension).map(f).collect(),
        }
    }

    pub fn max_dimension(&self) -> usize {
        self.values.len() - 1
    }

    pub fn get(&self, dimension: usize) -> Option<&V> {
        self.values.get(dimension)
    }

    pub fn as_slice(&self) -> &[V] {
        &self.values
    }
}

impl<V> Index<usize> for DimensionTable<V> {
    type Output = V;

    fn index(&self, dimension: usize) -> &V {
        &self.values[dimension]
    }
}

/// Basis evaluations for a single derivative order.
///
/// Every variant is indexed by `[basis function, point]`.
#[derive(Debug, Clone, PartialEq)]
pub enum BasisEvaluation<T: Scalar> {
    Values(DenseArray<T, 2>),
    /// Gradients with respect to the reference coordinates.
    Gradients(DenseArray<DVector<T>, 2>),
    /// Hessians with respect to the reference coordinates.
    Hessians(DenseArray<DMatrix<T>, 2>),
}

impl<T: Scalar> BasisEvaluation<T> {
    /// The derivative order of the evaluation.
    pub fn deriv(&self) -> usize {
        match self {
            Self::Values(_) => 0,
            Self::Gradients(_) => 1,
            Self::Hessians(_) => 2,
        }
    }

    /// The number of basis functions and points.
    pub fn shape(&self) -> [usize; 2] {
        match self {
            Self::Values(values) => values.shape(),
            Self::Gradients(gradients) => gradients.shape(),
            Self::Hessians(hessians) => hessians.shape(),
        }
    }

    pub fn into_values(self) -> Option<DenseArray<T, 2>> {
        match self {
            Self::Values(values) => Some(values),
            _ => None,
        }
    }

    pub fn into_gradients(self) -> Option<DenseArray<DVector<T>, 2>> {
        match self {
            Self::Gradients(gradients) => Some(gradients),
            _ => None,
        }
    }

    pub fn into_hessians(self) -> Option<DenseArray<DMatrix<T>, 2>> {
        match self {
            Self::Hessians(hessians) => Some(hessians),
            _ => None,
        }
    }
}

/// A finite element defined on the reference simplices of dimension `0..=dimension()`.
///
/// Implementors provide the per-dimension counts and the three evaluation routines. Every
/// evaluation takes a `d x n_points` matrix of reference points and returns one entry per
/// `[basis function, point]`, with `n_basis()[d]` basis functions. Points with more rows than
/// [`dimension`](Self::dimension) are rejected with [`FemError::InvalidDimension`].
pub trait ReferenceElement<T: Real> {
    /// The topological dimension of the cells the element is defined on.
    fn dimension(&self) -> usize;

    /// The polynomial order of the basis functions.
    fn order(&self) -> usize;

    /// The number of basis functions supported on a `d`-simplex.
    fn n_basis(&self) -> &DimensionTable<usize>;

    /// The number of vertices of a `d`-simplex.
    fn n_verts(&self) -> &DimensionTable<usize>;

    /// The number of degrees of freedom associated with the interior of a single `d`-entity.
    fn dof_tuple(&self) -> &DimensionTable<usize>;

    fn eval_basis_values(&self, points: &DMatrix<T>) -> Result<DenseArray<T, 2>>;

    fn eval_basis_gradients(&self, points: &DMatrix<T>) -> Result<DenseArray<DVector<T>, 2>>;

    fn eval_basis_hessians(&self, points: &DMatrix<T>) -> Result<DenseArray<DMatrix<T>, 2>>;

    /// Evaluates the basis functions (`deriv = 0`), their gradients (`deriv = 1`) or their
    /// Hessians (`deriv = 2`) at the given points.
    fn eval_basis(&self, points: &DMatrix<T>, deriv: usize) -> Result<BasisEvaluation<T>> {
        match deriv {
            0 => self.eval_basis_values(points).map(BasisEvaluation::Values),
            1 => self.eval_basis_gradients(points).map(BasisEvaluation::Gradients),
            2 => self.eval_basis_hessians(points).map(BasisEvaluation::Hessians),
            _ => Err(FemError::derivative_order(deriv, "0, 1 and 2")),
        }
    }

    /// The number of basis functions for points living on the simplex of dimension
    /// `points.nrows()`.
    fn n_basis_for(&self, points: &DMatrix<T>) -> Result<usize> {
        let d = points.nrows();
        self.n_basis()
            .get(d)
            .copied()
            .ok_or_else(|| FemError::invalid_dimension(d, format!("at most {}", self.dimension())))
    }
}

impl<T: Real, E: ReferenceElement<T> + ?Sized> ReferenceElement<T> for &E {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn order(&self) -> usize {
        (**self).order()
    }

    fn n_basis(&self) -> &DimensionTable<usize> {
        (**self).n_basis()
    }

    fn n_verts(&self) -> &DimensionTable<usize> {
        (**self).n_verts()
    }

    fn dof_tuple(&self) -> &DimensionTable<usize> {
        (**self).dof_tuple()
    }

    fn eval_basis_values(&self, points: &DMatrix<T>) -> Result<DenseArray<T, 2>> {
        (**self).eval_basis_values(points)
    }

    fn eval_basis_gradients(&self, points: &DMatrix<T>) -> Result<DenseArray<DVector<T>, 2>> {
        (**self).eval_basis_gradients(points)
    }

    fn eval_basis_hessians(&self, points: &DMatrix<T>) -> Result<DenseArray<DMatrix<T>, 2>> {
        (**self).eval_basis_hessians(points)
    }
}
