//! Affine maps from reference simplices onto mesh entities.
//!
//! For an entity with vertices `x_0, ..., x_d`, the reference map is
//!
//! ```text
//! F(xi) = sum_b phi_b(xi) x_b,
//! ```
//!
//! where `phi_b` are the linear Lagrange shape functions on the reference `d`-simplex. The map
//! is evaluated point by point even though it is affine, so every query returns one entry per
//! `[entity, point]`.
use crate::array::DenseArray;
use crate::element::{ReferenceElement, P1};
use crate::error::{FemError, Result};
use crate::mesh::topology::Entities;
use crate::mesh::Mesh;
use crate::Real;
use nalgebra::{DMatrix, DVector, Scalar};

/// A borrowed view of the reference maps of all entities of a [`Mesh`].
///
/// The entity dimension `d` is inferred from the number of rows of the point matrix.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceMap<'a, T: Scalar> {
    mesh: &'a Mesh<T>,
}

impl<'a, T: Real> ReferenceMap<'a, T> {
    pub fn new(mesh: &'a Mesh<T>) -> Self {
        Self { mesh }
    }

    pub fn mesh(&self) -> &'a Mesh<T> {
        self.mesh
    }

    fn entities_and_shape(&self, points: &DMatrix<T>) -> Result<(&'a Entities, P1)> {
        let d = points.nrows();
        let entities = self.mesh.topology().get_entities(d)?;
        Ok((entities, P1::new(d)?))
    }

    /// Physical coordinates of the points on every entity, indexed `[entity, point]`.
    pub fn eval(&self, points: &DMatrix<T>) -> Result<DenseArray<DVector<T>, 2>> {
        let (entities, shape) = self.entities_and_shape(points)?;
        let phi = shape.eval_basis_values(points)?;
        let nodes = self.mesh.nodes();
        let dim = self.mesh.dimension();
        Ok(DenseArray::from_fn([entities.len(), points.ncols()], |[e, p]| {
            let mut x = DVector::zeros(dim);
            for (b, &v) in entities[e].iter().enumerate() {
                x.axpy(phi[[b, p]], &nodes.row(v).transpose(), T::one());
            }
            x
        }))
    }

    /// The `D x d` Jacobians of the reference maps, indexed `[entity, point]`.
    pub fn jacobian(&self, points: &DMatrix<T>) -> Result<DenseArray<DMatrix<T>, 2>> {
        let (entities, shape) = self.entities_and_shape(points)?;
        let gradients = shape.eval_basis_gradients(points)?;
        let nodes = self.mesh.nodes();
        let dim = self.mesh.dimension();
        let d = points.nrows();
        Ok(DenseArray::from_fn([entities.len(), points.ncols()], |[e, p]| {
            let mut jacobian = DMatrix::zeros(dim, d);
            for (b, &v) in entities[e].iter().enumerate() {
                jacobian.ger(T::one(), &nodes.row(v).transpose(), &gradients[[b, p]], T::one());
            }
            jacobian
        }))
    }

    /// The `d x D` inverses of the Jacobians, indexed `[entity, point]`.
    ///
    /// For entities of lower dimension than the mesh, the Jacobian is not square and its left
    /// pseudo-inverse `(J^T J)^{-1} J^T` is returned instead.
    ///
    /// Fails with [`FemError::SingularJacobian`] for the first degenerate entity.
    pub fn jacobian_inverse(&self, points: &DMatrix<T>) -> Result<DenseArray<DMatrix<T>, 2>> {
        let jacobians = self.jacobian(points)?;
        let n_points = points.ncols();
        let inverses = jacobians
            .iter()
            .enumerate()
            .map(|(i, jacobian)| {
                invert_jacobian(jacobian).ok_or(FemError::SingularJacobian { entity: i / n_points })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(DenseArray::from_row_major_vec(jacobians.shape(), inverses))
    }

    /// Jacobian determinants, indexed `[entity, point]`.
    ///
    /// For cells this is the signed determinant, negative for cells with negative orientation.
    /// For lower-dimensional entities it is the non-negative Gram determinant `sqrt(det(J^T J))`,
    /// and for vertices it is one.
    pub fn jacobian_determinant(&self, points: &DMatrix<T>) -> Result<DenseArray<T, 2>> {
        Ok(self.jacobian(points)?.map(jacobian_determinant))
    }
}

fn jacobian_determinant<T: Real>(jacobian: &DMatrix<T>) -> T {
    let (dim, d) = jacobian.shape();
    if d == 0 {
        T::one()
    } else if d == dim {
        jacobian.determinant()
    } else {
        (jacobian.transpose() * jacobian)
            .determinant()
            .max(T::zero())
            .sqrt()
    }
}

fn invert_jacobian<T: Real>(jacobian: &DMatrix<T>) -> Option<DMatrix<T>> {
    let (dim, d) = jacobian.shape();
    if d == 0 {
        Some(DMatrix::zeros(0, dim))
    } else if d == dim {
        jacobian.clone().try_inverse()
    } else {
        let transpose = jacobian.transpose();
        (&transpose * jacobian)
            .try_inverse()
            .map(|gram_inverse| gram_inverse * transpose)
    }
}
