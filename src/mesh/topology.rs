//! Incidence bookkeeping for simplicial meshes.
//!
//! For a mesh of dimension `D`, the topology stores the entities of every topological dimension
//! `d = 0..=D` as tuples of `d + 1` vertex indices:
//!
//! - vertices (`d = 0`) are the nodes themselves, `[i]` for node `i`;
//! - cells (`d = D`) are kept exactly as given, including the vertex order (and therefore the
//!   orientation) chosen by the caller;
//! - every intermediate dimension holds the distinct sub-simplices of the cells, each with
//!   ascending vertex indices, sorted lexicographically.
//!
//! Sub-entities of an entity are always enumerated in the order of the lexicographic
//! combinations of the *positions* within the entity's vertex tuple. For a triangle `[a, b, c]`
//! the edges are `{a, b}`, `{a, c}`, `{b, c}`, in that order.
use crate::error::{FemError, Result};
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A table of entities of one topological dimension, each given by the same number of vertices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    vertices_per_entity: usize,
    indices: Vec<usize>,
}

impl Entities {
    /// Constructs an entity table from row-major vertex indices.
    ///
    /// # Panics
    ///
    /// Panics if `vertices_per_entity` is zero or does not divide the number of indices.
    pub fn from_flat_indices(vertices_per_entity: usize, indices: Vec<usize>) -> Self {
        assert!(vertices_per_entity > 0, "Entities must have at least one vertex");
        assert_eq!(
            indices.len() % vertices_per_entity,
            0,
            "Number of indices must be a multiple of the number of vertices per entity"
        );
        Self {
            vertices_per_entity,
            indices,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len() / self.vertices_per_entity
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertices_per_entity(&self) -> usize {
        self.vertices_per_entity
    }

    pub fn get(&self, index: usize) -> Option<&[usize]> {
        let k = self.vertices_per_entity;
        self.indices.get(k * index..k * (index + 1))
    }

    pub fn iter(&self) -> impl '_ + ExactSizeIterator<Item = &[usize]> {
        self.indices.chunks_exact(self.vertices_per_entity)
    }

    /// Row-major vertex indices of all entities.
    pub fn as_flat_slice(&self) -> &[usize] {
        &self.indices
    }

    /// The incidence as a `n_entities x vertices_per_entity` matrix.
    pub fn to_matrix(&self) -> nalgebra::DMatrix<usize> {
        nalgebra::DMatrix::from_row_slice(self.len(), self.vertices_per_entity, &self.indices)
    }
}

impl Index<usize> for Entities {
    type Output = [usize];

    fn index(&self, index: usize) -> &[usize] {
        self.get(index).expect("Entity index out of bounds")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshTopology {
    dimension: usize,
    /// Entities for each dimension `0..=dimension`.
    entities: Vec<Entities>,
    /// For each dimension `d`, the `d`-dimensional sub-entities of every cell, cell-major.
    cell_entities: Vec<Entities>,
    /// For each dimension `d`, the number of cells incident to every `d`-entity.
    entity_cell_counts: Vec<Vec<usize>>,
}

impl MeshTopology {
    /// Builds the topology of a mesh of the given dimension from row-major cell connectivity.
    ///
    /// Every cell must consist of `dimension + 1` distinct vertices with indices below
    /// `n_vertices`.
    pub fn from_cells(dimension: usize, n_vertices: usize, cells: Vec<usize>) -> Result<Self> {
        if !(1..=crate::MAX_DIMENSION).contains(&dimension) {
            return Err(FemError::invalid_dimension(dimension, "1, 2 or 3"));
        }
        let k = dimension + 1;
        if cells.len() % k != 0 {
            return Err(FemError::InvalidConnectivity(format!(
                "cells of a {dimension}-dimensional mesh must have {k} vertices each"
            )));
        }
        let cells = Entities::from_flat_indices(k, cells);
        for (cell_index, cell) in cells.iter().enumerate() {
            if let Some(&v) = cell.iter().find(|&&v| v >= n_vertices) {
                return Err(FemError::InvalidConnectivity(format!(
                    "cell {cell_index} references vertex {v}, but the mesh only has {n_vertices} vertices"
                )));
            }
            if !cell.iter().all_unique() {
                return Err(FemError::InvalidConnectivity(format!(
                    "cell {cell_index} has repeated vertices {cell:?}"
                )));
            }
        }

        let mut entities = Vec::with_capacity(k);
        entities.push(Entities::from_flat_indices(1, (0..n_vertices).collect()));
        for d in 1..dimension {
            let mut sub_entities: Vec<Vec<usize>> = cells
                .iter()
                .flat_map(|cell| {
                    cell.iter().copied().combinations(d + 1).map(|mut tuple| {
                        tuple.sort_unstable();
                        tuple
                    })
                })
                .collect();
            sub_entities.sort_unstable();
            sub_entities.dedup();
            entities.push(Entities::from_flat_indices(d + 1, sub_entities.concat()));
        }
        entities.push(cells);

        let mut topology = Self {
            dimension,
            entities,
            cell_entities: Vec::with_capacity(k),
            entity_cell_counts: Vec::with_capacity(k),
        };

        for d in 0..=dimension {
            let cell_entities = topology.compute_cell_entities(d);
            let mut counts = vec![0; topology.entities[d].len()];
            for &entity in cell_entities.as_flat_slice() {
                counts[entity] += 1;
            }
            topology.cell_entities.push(cell_entities);
            topology.entity_cell_counts.push(counts);
        }

        debug!(
            "Built topology of dimension {} with entity counts {:?}",
            dimension,
            (0..=dimension).map(|d| topology.n_entities(d)).collect::<Vec<_>>()
        );
        Ok(topology)
    }

    fn compute_cell_entities(&self, d: usize) -> Entities {
        let cells = &self.entities[self.dimension];
        if d == self.dimension {
            return Entities::from_flat_indices(1, (0..cells.len()).collect());
        }
        let mut indices = Vec::new();
        for cell in cells.iter() {
            for tuple in cell.iter().copied().combinations(d + 1) {
                let index = self
                    .find_entity(d, &tuple)
                    .expect("Every sub-simplex of a cell is an entity");
                indices.push(index);
            }
        }
        Entities::from_flat_indices(num_combinations(self.dimension + 1, d + 1), indices)
    }

    /// Finds the index of a `d`-entity from its vertices, given in any order.
    fn find_entity(&self, d: usize, vertices: &[usize]) -> Option<usize> {
        if d == 0 {
            return vertices
                .first()
                .copied()
                .filter(|&v| v < self.entities[0].len());
        }
        let mut sorted = vertices.to_vec();
        sorted.sort_unstable();
        let entities = &self.entities[d];
        if d == self.dimension {
            // Cells keep their input order, so they are not searchable
            entities.iter().position(|cell| {
                let mut cell = cell.to_vec();
                cell.sort_unstable();
                cell == sorted
            })
        } else {
            // Intermediate entities are sorted lexicographically
            let flat = entities.as_flat_slice();
            match d + 1 {
                2 => search_sorted::<2>(flat, &sorted),
                3 => search_sorted::<3>(flat, &sorted),
                _ => entities.iter().position(|entity| entity == sorted.as_slice()),
            }
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn check_dimension(&self, d: usize) -> Result<()> {
        if d > self.dimension {
            Err(FemError::invalid_dimension(d, format!("at most {}", self.dimension)))
        } else {
            Ok(())
        }
    }

    /// The entities of topological dimension `d`.
    pub fn get_entities(&self, d: usize) -> Result<&Entities> {
        self.check_dimension(d)?;
        Ok(&self.entities[d])
    }

    pub fn cells(&self) -> &Entities {
        &self.entities[self.dimension]
    }

    /// Number of entities of dimension `d`, zero if `d` exceeds the mesh dimension.
    pub fn n_entities(&self, d: usize) -> usize {
        self.entities.get(d).map(Entities::len).unwrap_or(0)
    }

    /// Index of the `d`-entity spanned by the given vertices, in any order.
    pub fn entity_index(&self, d: usize, vertices: &[usize]) -> Result<Option<usize>> {
        self.check_dimension(d)?;
        if vertices.len() != d + 1 {
            return Err(FemError::InvalidArgument(format!(
                "a {d}-dimensional entity has {} vertices, got {}",
                d + 1,
                vertices.len()
            )));
        }
        Ok(self.find_entity(d, vertices))
    }

    /// For every cell, the indices of its `d`-dimensional sub-entities.
    pub fn cell_entities(&self, d: usize) -> Result<&Entities> {
        self.check_dimension(d)?;
        Ok(&self.cell_entities[d])
    }

    /// Number of cells incident to each `d`-entity.
    pub fn entity_cell_counts(&self, d: usize) -> Result<&[usize]> {
        self.check_dimension(d)?;
        Ok(&self.entity_cell_counts[d])
    }

    /// The `k`-dimensional sub-entities of the `d`-entity with the given index.
    pub fn sub_entities(&self, d: usize, entity: usize, k: usize) -> Result<Vec<usize>> {
        self.check_dimension(d)?;
        if k > d {
            return Err(FemError::invalid_dimension(k, format!("at most {d}")));
        }
        let vertices = self.entities[d].get(entity).ok_or_else(|| {
            FemError::InvalidArgument(format!("no {d}-dimensional entity with index {entity}"))
        })?;
        if d == self.dimension {
            return Ok(self.cell_entities[k][entity].to_vec());
        }
        if k == d {
            return Ok(vec![entity]);
        }
        Ok(vertices
            .iter()
            .copied()
            .combinations(k + 1)
            .map(|tuple| {
                self.find_entity(k, &tuple)
                    .expect("Sub-simplices of an entity are entities")
            })
            .collect())
    }

    /// Boolean mask over the `d`-entities that lie on the boundary.
    ///
    /// A facet is on the boundary if it is incident to exactly one cell. Lower-dimensional
    /// entities are on the boundary if they belong to a boundary facet, and a cell is on the
    /// boundary if one of its facets is.
    pub fn get_boundary(&self, d: usize) -> Result<Vec<bool>> {
        self.check_dimension(d)?;
        let facet_dim = self.dimension - 1;
        let facet_mask: Vec<bool> = self.entity_cell_counts[facet_dim]
            .iter()
            .map(|&count| count == 1)
            .collect();

        if d == facet_dim {
            Ok(facet_mask)
        } else if d == self.dimension {
            Ok(self.cell_entities[facet_dim]
                .iter()
                .map(|facets| facets.iter().any(|&f| facet_mask[f]))
                .collect())
        } else {
            let mut mask = vec![false; self.n_entities(d)];
            let boundary_facets = facet_mask
                .iter()
                .enumerate()
                .filter_map(|(i, &on_boundary)| on_boundary.then_some(i));
            for facet in boundary_facets {
                for entity in self.sub_entities(facet_dim, facet, d)? {
                    mask[entity] = true;
                }
            }
            Ok(mask)
        }
    }
}

fn search_sorted<const K: usize>(flat: &[usize], vertices: &[usize]) -> Option<usize> {
    let (entities, _) = flat.as_chunks::<K>();
    entities
        .binary_search_by(|entity| entity.as_slice().cmp(vertices))
        .ok()
}

/// Binomial coefficient `n choose k`.
pub(crate) fn num_combinations(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}
