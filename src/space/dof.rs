//! Global numbering of degrees of freedom.
//!
//! Degrees of freedom are attached to mesh entities according to the element's `dof_tuple`:
//! every `k`-entity carries `dof_tuple[k]` of them. Global indices are assigned block-wise, first
//! all DOFs on vertices, then on edges, and so on, and within each block entity by entity.
use crate::element::{DimensionTable, ReferenceElement};
use crate::error::{FemError, Result};
use crate::mesh::Mesh;
use crate::Real;
use log::debug;
use nalgebra::DMatrix;

/// Maps local basis functions on mesh entities to global degrees of freedom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DofManager {
    dof_tuple: DimensionTable<usize>,
    /// First global DOF of the block belonging to each dimension.
    offsets: Vec<usize>,
    n_dof: usize,
    /// DOF maps for every entity dimension, `n_basis[d] x n_entities(d)`.
    dof_maps: Vec<DMatrix<usize>>,
}

impl DofManager {
    pub fn new<T, E>(mesh: &Mesh<T>, element: &E) -> Result<Self>
    where
        T: Real,
        E: ReferenceElement<T> + ?Sized,
    {
        let dim = mesh.dimension();
        if element.dimension() != dim {
            return Err(FemError::invalid_dimension(
                element.dimension(),
                format!("{dim}, the dimension of the mesh"),
            ));
        }
        let topology = mesh.topology();
        let dof_tuple = element.dof_tuple().clone();

        let mut offsets = Vec::with_capacity(dim + 1);
        let mut n_dof = 0;
        for d in 0..=dim {
            offsets.push(n_dof);
            n_dof += topology.n_entities(d) * dof_tuple[d];
        }

        let mut dof_maps = Vec::with_capacity(dim + 1);
        for d in 0..=dim {
            let n_basis = element.n_basis()[d];
            let n_entities = topology.n_entities(d);
            let mut data = Vec::with_capacity(n_basis * n_entities);
            for entity in 0..n_entities {
                for k in 0..=d {
                    for sub_entity in topology.sub_entities(d, entity, k)? {
                        let first = offsets[k] + sub_entity * dof_tuple[k];
                        data.extend(first..first + dof_tuple[k]);
                    }
                }
            }
            if data.len() != n_basis * n_entities {
                return Err(FemError::InvalidArgument(format!(
                    "element has {n_basis} basis functions on a {d}-simplex, \
                     but its DOF tuple {:?} implies a different number",
                    dof_tuple.as_slice()
                )));
            }
            // Column-major: one column per entity
            dof_maps.push(DMatrix::from_vec(n_basis, n_entities, data));
        }

        debug!("Numbered {} degrees of freedom with DOF tuple {:?}", n_dof, dof_tuple.as_slice());
        Ok(Self {
            dof_tuple,
            offsets,
            n_dof,
            dof_maps,
        })
    }

    /// The total number of degrees of freedom.
    pub fn n_dof(&self) -> usize {
        self.n_dof
    }

    pub fn dof_tuple(&self) -> &DimensionTable<usize> {
        &self.dof_tuple
    }

    /// The first global DOF index of the block of `d`-entities.
    pub fn offset(&self, d: usize) -> Option<usize> {
        self.offsets.get(d).copied()
    }

    /// The `n_basis[d] x n_entities(d)` matrix whose column `e` lists the global DOFs of the
    /// local basis functions on the `d`-entity `e`.
    ///
    /// Within a column, DOFs are ordered by sub-entity dimension, and within each dimension by
    /// the local enumeration of sub-entities. For the P1 element this is simply the vertex order
    /// of the entity.
    pub fn dof_map(&self, d: usize) -> Result<&DMatrix<usize>> {
        self.dof_maps
            .get(d)
            .ok_or_else(|| FemError::invalid_dimension(d, format!("at most {}", self.dof_maps.len() - 1)))
    }

    /// Boolean mask over all DOFs, `true` for the DOFs of the `d`-entities selected by `mask`
    /// (including those on their sub-entities).
    pub fn extract_dofs(&self, d: usize, mask: &[bool]) -> Result<Vec<bool>> {
        let dof_map = self.dof_map(d)?;
        if mask.len() != dof_map.ncols() {
            return Err(FemError::InvalidArgument(format!(
                "entity mask has length {}, but there are {} entities of dimension {d}",
                mask.len(),
                dof_map.ncols()
            )));
        }
        let mut dofs = vec![false; self.n_dof];
        for (column, _) in dof_map
            .column_iter()
            .zip(mask)
            .filter(|&(_, &selected)| selected)
        {
            for &dof in column.iter() {
                dofs[dof] = true;
            }
        }
        Ok(dofs)
    }
}
