//! Finite element spaces.
//!
//! An [`FESpace`] ties a [`Mesh`] to a [`ReferenceElement`] and precomputes what every
//! evaluation needs: the global DOF numbering and a quadrature rule of strength `2 * order`.
//! Both the mesh and the element are borrowed, so the space cannot outlive them and the mesh
//! cannot be refined while the space exists.
use crate::array::DenseArray;
use crate::element::ReferenceElement;
use crate::error::{FemError, Result};
use crate::mesh::Mesh;
use crate::quadrature::QuadratureRule;
use crate::Real;
use log::debug;
use nalgebra::{DMatrix, DVector, Scalar};
use rayon::prelude::*;

pub mod dof;

use dof::DofManager;

/// Quadrature points, weights and Jacobian determinants for all entities of one dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureData<T: Scalar> {
    /// Reference points, `d x n_points`.
    pub points: DMatrix<T>,
    pub weights: DVector<T>,
    /// Absolute Jacobian determinants, `n_entities x n_points`. For vertices (`d = 0`) this is
    /// a single column of ones.
    pub jacobian_determinants: DMatrix<T>,
}

/// Basis function derivatives with respect to physical coordinates, indexed
/// `[entity, basis function, point]`.
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalDerivatives<T: Scalar> {
    Gradients(DenseArray<DVector<T>, 3>),
    Hessians(DenseArray<DMatrix<T>, 3>),
}

/// The result of evaluating a discrete field given by its DOF values.
#[derive(Debug, Clone, PartialEq)]
pub enum DofEvaluation<T: Scalar> {
    /// Values, `n_entities x n_points`.
    Values(DMatrix<T>),
    /// Gradients with respect to physical coordinates, indexed `[entity, point]`.
    Gradients(DenseArray<DVector<T>, 2>),
}

impl<T: Scalar> DofEvaluation<T> {
    pub fn into_values(self) -> Option<DMatrix<T>> {
        match self {
            Self::Values(values) => Some(values),
            Self::Gradients(_) => None,
        }
    }

    pub fn into_gradients(self) -> Option<DenseArray<DVector<T>, 2>> {
        match self {
            Self::Gradients(gradients) => Some(gradients),
            Self::Values(_) => None,
        }
    }
}

/// The coordinate system evaluation points are given in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PointCoordinates {
    /// Coordinates on the reference simplex, shared by all entities.
    #[default]
    Reference,
    /// Physical coordinates in the mesh domain.
    Physical,
}

#[derive(Debug, Clone)]
pub struct FESpace<'a, T: Scalar, E> {
    mesh: &'a Mesh<T>,
    element: &'a E,
    dof_manager: DofManager,
    quadrature_rule: QuadratureRule<T>,
}

impl<'a, T, E> FESpace<'a, T, E>
where
    T: Real,
    E: ReferenceElement<T>,
{
    pub fn new(mesh: &'a Mesh<T>, element: &'a E) -> Result<Self> {
        if element.dimension() != mesh.dimension() {
            return Err(FemError::invalid_dimension(
                element.dimension(),
                format!("{}, the dimension of the mesh", mesh.dimension()),
            ));
        }
        let dof_manager = DofManager::new(mesh, element)?;
        let quadrature_rule = QuadratureRule::new(2 * element.order(), element.dimension())?;
        debug!(
            "Created finite element space with {} DOFs and quadrature points per dimension {:?}",
            dof_manager.n_dof(),
            (0..=quadrature_rule.dimension())
                .map(|d| quadrature_rule.n_points(d))
                .collect::<Result<Vec<_>>>()?
        );
        Ok(Self {
            mesh,
            element,
            dof_manager,
            quadrature_rule,
        })
    }

    pub fn mesh(&self) -> &'a Mesh<T> {
        self.mesh
    }

    pub fn element(&self) -> &'a E {
        self.element
    }

    pub fn quadrature_rule(&self) -> &QuadratureRule<T> {
        &self.quadrature_rule
    }

    pub fn dof_manager(&self) -> &DofManager {
        &self.dof_manager
    }

    pub fn n_dof(&self) -> usize {
        self.dof_manager.n_dof()
    }

    pub fn dof_map(&self, d: usize) -> Result<&DMatrix<usize>> {
        self.dof_manager.dof_map(d)
    }

    /// Quadrature points and weights on the reference `d`-simplex, together with the absolute
    /// Jacobian determinants of all `d`-entities at those points.
    pub fn get_quadrature_data(&self, d: usize) -> Result<QuadratureData<T>> {
        let points = self.quadrature_rule.points(d)?.clone();
        let weights = self.quadrature_rule.weights(d)?.clone();
        let n_entities = self.mesh.n_entities(d);
        let jacobian_determinants = if points.is_empty() {
            DMatrix::from_element(n_entities, 1, T::one())
        } else {
            let determinants = self.mesh.reference_map().jacobian_determinant(&points)?;
            DMatrix::from_fn(n_entities, points.ncols(), |e, p| determinants[[e, p]].abs())
        };
        Ok(QuadratureData {
            points,
            weights,
            jacobian_determinants,
        })
    }

    /// Gradients of all basis functions with respect to physical coordinates, for every
    /// entity of dimension `points.nrows()`.
    pub fn eval_global_gradients(&self, points: &DMatrix<T>) -> Result<DenseArray<DVector<T>, 3>> {
        let local = self.element.eval_basis_gradients(points)?;
        let inverses = self.mesh.reference_map().jacobian_inverse(points)?;
        Ok(pull_back(&local, &inverses, pull_back_gradient))
    }

    /// Hessians of all basis functions with respect to physical coordinates, for every
    /// entity of dimension `points.nrows()`.
    pub fn eval_global_hessians(&self, points: &DMatrix<T>) -> Result<DenseArray<DMatrix<T>, 3>> {
        let local = self.element.eval_basis_hessians(points)?;
        let inverses = self.mesh.reference_map().jacobian_inverse(points)?;
        Ok(pull_back(&local, &inverses, pull_back_hessian))
    }

    /// First (`deriv = 1`) or second (`deriv = 2`) derivatives of all basis functions with
    /// respect to physical coordinates.
    pub fn eval_global_derivatives(&self, points: &DMatrix<T>, deriv: usize) -> Result<GlobalDerivatives<T>> {
        match deriv {
            1 => self
                .eval_global_gradients(points)
                .map(GlobalDerivatives::Gradients),
            2 => self
                .eval_global_hessians(points)
                .map(GlobalDerivatives::Hessians),
            _ => Err(FemError::derivative_order(deriv, "1 and 2")),
        }
    }

    /// Evaluates the discrete field with the given DOF values (`deriv = 0`) or its gradient
    /// (`deriv = 1`) at reference points on every entity of dimension `points.nrows()`.
    ///
    /// Only reference coordinates are supported, and gradients are only available on cells.
    pub fn eval_dofs(
        &self,
        dofs: &DVector<T>,
        points: &DMatrix<T>,
        deriv: usize,
        coordinates: PointCoordinates,
    ) -> Result<DofEvaluation<T>> {
        if coordinates == PointCoordinates::Physical {
            return Err(FemError::NotSupported(
                "evaluation at physical coordinates".to_string(),
            ));
        }
        let d = points.nrows();
        let dim = self.mesh.dimension();
        if d > dim {
            return Err(FemError::invalid_dimension(d, format!("at most {dim}")));
        }
        if d < dim && deriv > 0 {
            return Err(FemError::NotSupported(format!(
                "derivatives of order {deriv} on {d}-dimensional traces of a {dim}-dimensional mesh"
            )));
        }
        if deriv > 1 {
            return Err(FemError::derivative_order(deriv, "0 and 1"));
        }
        if dofs.len() != self.n_dof() {
            return Err(FemError::InvalidArgument(format!(
                "expected {} DOF values, got {}",
                self.n_dof(),
                dofs.len()
            )));
        }

        let dof_map = self.dof_map(d)?;
        let n_entities = dof_map.ncols();
        let n_points = points.ncols();
        let local_dofs = |e: usize| dof_map.column(e).map(|dof| dofs[dof]);

        if deriv == 0 {
            let basis = self.element.eval_basis_values(points)?;
            let mut values = DMatrix::zeros(n_entities, n_points);
            for e in 0..n_entities {
                let u = local_dofs(e);
                for p in 0..n_points {
                    values[(e, p)] = u
                        .iter()
                        .enumerate()
                        .fold(T::zero(), |acc, (b, &u_b)| acc + u_b * basis[[b, p]]);
                }
            }
            Ok(DofEvaluation::Values(values))
        } else {
            let gradients = self.eval_global_gradients(points)?;
            let mut result = Vec::with_capacity(n_entities * n_points);
            for e in 0..n_entities {
                let u = local_dofs(e);
                for p in 0..n_points {
                    let mut gradient = DVector::zeros(dim);
                    for (b, &u_b) in u.iter().enumerate() {
                        gradient.axpy(u_b, &gradients[[e, b, p]], T::one());
                    }
                    result.push(gradient);
                }
            }
            Ok(DofEvaluation::Gradients(DenseArray::from_row_major_vec(
                [n_entities, n_points],
                result,
            )))
        }
    }
}

/// Applies `pull_back_one` to every local derivative with the inverse Jacobian of each entity,
/// producing an `[entity, basis, point]` array. Entities are processed in parallel.
fn pull_back<T, L, G>(
    local: &DenseArray<L, 2>,
    inverses: &DenseArray<DMatrix<T>, 2>,
    pull_back_one: fn(&DMatrix<T>, &L) -> G,
) -> DenseArray<G, 3>
where
    T: Real,
    L: Sync,
    G: Send,
{
    let [n_basis, n_points] = local.shape();
    let [n_entities, _] = inverses.shape();
    let per_entity: Vec<Vec<G>> = (0..n_entities)
        .into_par_iter()
        .map(|e| {
            let mut derivatives = Vec::with_capacity(n_basis * n_points);
            for b in 0..n_basis {
                for p in 0..n_points {
                    derivatives.push(pull_back_one(&inverses[[e, p]], &local[[b, p]]));
                }
            }
            derivatives
        })
        .collect();
    let data = per_entity.into_iter().flatten().collect();
    DenseArray::from_row_major_vec([n_entities, n_basis, n_points], data)
}

/// `g_glob[m] = sum_k inv[k, m] g[k]`.
fn pull_back_gradient<T: Real>(inverse: &DMatrix<T>, gradient: &DVector<T>) -> DVector<T> {
    let (d, dim) = inverse.shape();
    DVector::from_fn(dim, |m, _| {
        (0..d).fold(T::zero(), |acc, k| acc + inverse[(k, m)] * gradient[k])
    })
}

/// `H_glob = inv^T H inv`, contracting the first index of `H` before the second.
fn pull_back_hessian<T: Real>(inverse: &DMatrix<T>, hessian: &DMatrix<T>) -> DMatrix<T> {
    let (d, dim) = inverse.shape();
    let partial = DMatrix::from_fn(dim, d, |i, l| {
        (0..d).fold(T::zero(), |acc, k| acc + inverse[(k, i)] * hessian[(k, l)])
    });
    DMatrix::from_fn(dim, dim, |i, m| {
        (0..d).fold(T::zero(), |acc, l| acc + partial[(i, l)] * inverse[(l, m)])
    })
}
