//! Simplicial meshes.
use crate::error::{FemError, Result};
use crate::Real;
use eyre::eyre;
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector, Scalar};
use serde::{Deserialize, Serialize};

pub mod geometry;
pub mod procedural;
pub mod reference_map;
pub mod refinement;
pub mod topology;

use geometry::MeshGeometry;
use reference_map::ReferenceMap;
use refinement::Refinement;
use topology::{Entities, MeshTopology};

/// A conforming simplicial mesh of intervals, triangles or tetrahedra.
///
/// The spatial dimension `D` always equals the topological dimension of the cells. Node
/// coordinates are stored as an `n_nodes x D` matrix and cells as `D + 1` node indices each.
/// Every refinement bumps the [generation](Self::generation) counter, so that data derived from
/// an earlier state of the mesh can be recognized as stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct Mesh<T: Scalar> {
    geometry: MeshGeometry<T>,
    topology: MeshTopology,
    generation: u64,
}

impl<T: Real> Mesh<T> {
    /// Constructs a mesh from an `n_nodes x D` coordinate matrix and an `n_cells x (D + 1)`
    /// connectivity matrix.
    ///
    /// Fails if `D` is not 1, 2 or 3, or if the connectivity does not describe valid simplices
    /// on the given nodes. Cell vertex order is preserved.
    pub fn from_nodes_and_cells(nodes: DMatrix<T>, cells: DMatrix<usize>) -> Result<Self> {
        let dim = nodes.ncols();
        if !(1..=crate::MAX_DIMENSION).contains(&dim) {
            return Err(FemError::invalid_dimension(dim, "1, 2 or 3"));
        }
        if cells.ncols() != dim + 1 {
            return Err(FemError::InvalidConnectivity(format!(
                "cells of a {dim}-dimensional mesh need {} vertices, got {}",
                dim + 1,
                cells.ncols()
            )));
        }
        // Row-major cell indices
        let flat_cells = cells.transpose().as_slice().to_vec();
        let topology = MeshTopology::from_cells(dim, nodes.nrows(), flat_cells)?;
        let mesh = Self {
            geometry: MeshGeometry::from_nodes(nodes),
            topology,
            generation: 0,
        };
        debug!(
            "Created {}-dimensional mesh with {} nodes and {} cells",
            dim,
            mesh.n_nodes(),
            mesh.cells().len()
        );
        Ok(mesh)
    }

    /// Constructs a mesh from a list of vertex positions and a list of cells.
    ///
    /// The dimension is taken from the first vertex, and all vertices must agree with it.
    pub fn from_vertices_and_cells(vertices: &[DVector<T>], cells: &[Vec<usize>]) -> Result<Self> {
        let dim = vertices.first().map(|v| v.len()).unwrap_or(0);
        if let Some(v) = vertices.iter().find(|v| v.len() != dim) {
            return Err(FemError::invalid_dimension(v.len(), format!("{dim}, like the first vertex")));
        }
        let nodes = DMatrix::from_fn(vertices.len(), dim, |i, j| vertices[i][j]);
        let k = dim + 1;
        if let Some(cell) = cells.iter().find(|cell| cell.len() != k) {
            return Err(FemError::InvalidConnectivity(format!(
                "cells of a {dim}-dimensional mesh need {k} vertices, got {cell:?}"
            )));
        }
        let cells = DMatrix::from_fn(cells.len(), k, |i, j| cells[i][j]);
        Self::from_nodes_and_cells(nodes, cells)
    }

    pub(crate) fn from_geometry_and_topology(geometry: MeshGeometry<T>, topology: MeshTopology) -> Self {
        Self {
            geometry,
            topology,
            generation: 0,
        }
    }

    /// The spatial (and topological) dimension of the mesh.
    pub fn dimension(&self) -> usize {
        self.topology.dimension()
    }

    /// The `n_nodes x D` node coordinates.
    pub fn nodes(&self) -> &DMatrix<T> {
        self.geometry.nodes()
    }

    pub fn n_nodes(&self) -> usize {
        self.geometry.n_nodes()
    }

    pub fn geometry(&self) -> &MeshGeometry<T> {
        &self.geometry
    }

    pub fn topology(&self) -> &MeshTopology {
        &self.topology
    }

    /// The number of refinements applied since construction.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cells(&self) -> &Entities {
        self.topology.cells()
    }

    pub fn n_cells(&self) -> usize {
        self.cells().len()
    }

    /// Entities of codimension one: faces in 3D, edges in 2D and vertices in 1D.
    pub fn facets(&self) -> &Entities {
        self.entities_unchecked(self.dimension() - 1)
    }

    /// Two-dimensional entities, only defined for meshes of dimension at least two.
    pub fn faces(&self) -> Result<&Entities> {
        if self.dimension() < 2 {
            return Err(FemError::invalid_dimension(
                self.dimension(),
                "at least 2 for a mesh with faces",
            ));
        }
        self.entities(2)
    }

    pub fn edges(&self) -> &Entities {
        self.entities_unchecked(1)
    }

    /// Entities of topological dimension `d`.
    pub fn entities(&self, d: usize) -> Result<&Entities> {
        self.topology.get_entities(d)
    }

    fn entities_unchecked(&self, d: usize) -> &Entities {
        self.topology
            .get_entities(d)
            .expect("Dimension is within the range of the mesh")
    }

    /// Number of entities of dimension `d`, zero if `d` exceeds the mesh dimension.
    pub fn n_entities(&self, d: usize) -> usize {
        self.topology.n_entities(d)
    }

    /// A borrowed view of the reference maps of the mesh entities.
    pub fn reference_map(&self) -> ReferenceMap<'_, T> {
        ReferenceMap::new(self)
    }

    /// Boolean mask over the facets, `true` for facets incident to exactly one cell.
    pub fn boundary(&self) -> Vec<bool> {
        self.topology
            .get_boundary(self.dimension() - 1)
            .expect("Facet dimension is within the range of the mesh")
    }

    /// Boundary mask for entities of any dimension `d`.
    ///
    /// See [`MeshTopology::get_boundary`].
    pub fn boundary_of_dimension(&self, d: usize) -> Result<Vec<bool>> {
        self.topology.get_boundary(d)
    }

    /// Boolean mask over the facets that are on the boundary and whose centroid satisfies the
    /// predicate.
    ///
    /// The predicate is first offered all boundary facet centroids at once, as the columns of a
    /// `D x n` matrix. If batch evaluation fails or returns the wrong number of results, the
    /// predicate is instead evaluated one centroid at a time.
    pub fn boundary_where<P>(&self, predicate: &P) -> Vec<bool>
    where
        P: BoundaryPredicate<T> + ?Sized,
    {
        let mut mask = self.boundary();
        let boundary_facets: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &on_boundary)| on_boundary.then_some(i))
            .collect();
        let centroids = self.centroids_of_facets(&boundary_facets);

        let selected = match predicate.evaluate_batch(&centroids) {
            Ok(selected) if selected.len() == centroids.ncols() => selected,
            Ok(selected) => {
                warn!(
                    "Boundary predicate returned {} values for {} points, evaluating point by point",
                    selected.len(),
                    centroids.ncols()
                );
                evaluate_pointwise(predicate, &centroids)
            }
            Err(err) => {
                debug!("Batch evaluation of boundary predicate failed ({err}), evaluating point by point");
                evaluate_pointwise(predicate, &centroids)
            }
        };

        for (&facet, keep) in boundary_facets.iter().zip(selected) {
            mask[facet] = keep;
        }
        mask
    }

    /// Centroids of the facets selected by `mask`, as the columns of a `D x n_selected` matrix.
    pub fn facet_centroids(&self, mask: &[bool]) -> Result<DMatrix<T>> {
        let n_facets = self.facets().len();
        if mask.len() != n_facets {
            return Err(FemError::InvalidArgument(format!(
                "facet mask has length {}, but the mesh has {n_facets} facets",
                mask.len()
            )));
        }
        let selected: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &selected)| selected.then_some(i))
            .collect();
        Ok(self.centroids_of_facets(&selected))
    }

    fn centroids_of_facets(&self, facets: &[usize]) -> DMatrix<T> {
        let entities = self.facets();
        let nodes = self.nodes();
        let weight = T::one() / nalgebra::convert::<f64, T>(entities.vertices_per_entity() as f64);
        let mut centroids = DMatrix::zeros(self.dimension(), facets.len());
        for (mut centroid, &facet) in centroids.column_iter_mut().zip(facets) {
            for &v in &entities[facet] {
                centroid.axpy(weight, &nodes.row(v).transpose(), T::one());
            }
        }
        centroids
    }

    /// Refines the mesh in place.
    ///
    /// Every round of refinement replaces geometry and topology and increments the
    /// [generation](Self::generation).
    pub fn refine(&mut self, refinement: Refinement) -> Result<()> {
        match refinement {
            Refinement::Uniform { times } => {
                for _ in 0..times {
                    let (geometry, topology) = refinement::refine_uniformly(&self.geometry, &self.topology)?;
                    self.geometry = geometry;
                    self.topology = topology;
                    self.generation += 1;
                    info!(
                        "Uniformly refined mesh (generation {}): {} nodes, {} cells",
                        self.generation,
                        self.n_nodes(),
                        self.n_cells()
                    );
                }
            }
        }
        Ok(())
    }
}

fn evaluate_pointwise<T, P>(predicate: &P, points: &DMatrix<T>) -> Vec<bool>
where
    T: Real,
    P: BoundaryPredicate<T> + ?Sized,
{
    points
        .column_iter()
        .map(|column| predicate.evaluate_point(&column.into_owned()))
        .collect()
}

/// A predicate selecting boundary facets by the position of their centroid.
///
/// Any closure `Fn(&DVector<T>) -> bool` is a point-wise predicate. Closures that operate on
/// all centroids at once can be wrapped in [`Vectorized`].
pub trait BoundaryPredicate<T: Scalar> {
    /// Evaluates the predicate for a batch of points, given as the columns of `points`.
    ///
    /// The default implementation reports that batch evaluation is unavailable, which makes
    /// callers fall back to [`evaluate_point`](Self::evaluate_point).
    fn evaluate_batch(&self, points: &DMatrix<T>) -> eyre::Result<Vec<bool>> {
        Err(eyre!(
            "predicate does not support batch evaluation of {} points",
            points.ncols()
        ))
    }

    fn evaluate_point(&self, point: &DVector<T>) -> bool;
}

impl<T, F> BoundaryPredicate<T> for F
where
    T: Scalar,
    F: Fn(&DVector<T>) -> bool,
{
    fn evaluate_point(&self, point: &DVector<T>) -> bool {
        self(point)
    }
}

/// Adapter for predicates that evaluate a whole `D x n` batch of points in one call.
#[derive(Debug, Clone, Copy)]
pub struct Vectorized<F>(pub F);

impl<T, F> BoundaryPredicate<T> for Vectorized<F>
where
    T: Scalar,
    F: Fn(&DMatrix<T>) -> eyre::Result<Vec<bool>>,
{
    fn evaluate_batch(&self, points: &DMatrix<T>) -> eyre::Result<Vec<bool>> {
        (self.0)(points)
    }

    fn evaluate_point(&self, point: &DVector<T>) -> bool {
        let column = DMatrix::from_column_slice(point.len(), 1, point.as_slice());
        matches!((self.0)(&column).as_deref(), Ok([true]))
    }
}
