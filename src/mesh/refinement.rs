//! Uniform refinement of simplicial meshes.
//!
//! Every cell is split into `2^D` children by inserting the midpoint of each of its edges:
//! intervals split into two halves, triangles into four similar triangles and tetrahedra into
//! eight (four corner tetrahedra plus the inner octahedron cut along one of its diagonals).
//! Children have the same orientation as their parent.
//!
//! Existing nodes keep their indices. Midpoints are appended in order of first encounter, and
//! are shared between all cells containing the edge so that the refined mesh stays conforming.
use crate::error::{FemError, Result};
use crate::mesh::geometry::MeshGeometry;
use crate::mesh::topology::MeshTopology;
use crate::Real;
use nalgebra::DMatrix;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::{max, min};
use std::fmt;
use std::str::FromStr;

/// A mesh refinement method.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Refinement {
    /// Repeated uniform (red) refinement.
    Uniform { times: usize },
}

impl Default for Refinement {
    fn default() -> Self {
        Self::Uniform { times: 1 }
    }
}

impl fmt::Display for Refinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform { times } => write!(f, "uniform (x{times})"),
        }
    }
}

impl FromStr for Refinement {
    type Err = FemError;

    /// Parses a method name. Named methods refine once.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform { times: 1 }),
            other => Err(FemError::InvalidArgument(format!(
                "unknown refinement method '{other}', supported methods are 'uniform'"
            ))),
        }
    }
}

/// A vertex of the refined mesh, identified independently of its final index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
enum VertexLabel {
    Vertex(usize),
    EdgeMidpoint([usize; 2]),
}

fn midpoint(a: usize, b: usize) -> VertexLabel {
    VertexLabel::EdgeMidpoint([min(a, b), max(a, b)])
}

fn populate_children(cell: &[usize], children: &mut Vec<Vec<VertexLabel>>) {
    use VertexLabel::Vertex;
    match *cell {
        [a, b] => {
            let m = midpoint(a, b);
            children.push(vec![Vertex(a), m]);
            children.push(vec![m, Vertex(b)]);
        }
        [a, b, c] => {
            let (d, e, f) = (midpoint(a, b), midpoint(b, c), midpoint(c, a));
            children.push(vec![Vertex(a), d, f]);
            children.push(vec![d, Vertex(b), e]);
            children.push(vec![f, e, Vertex(c)]);
            children.push(vec![d, e, f]);
        }
        [a, b, c, d] => {
            let (ab, ac, ad) = (midpoint(a, b), midpoint(a, c), midpoint(a, d));
            let (bc, bd, cd) = (midpoint(b, c), midpoint(b, d), midpoint(c, d));
            children.push(vec![Vertex(a), ab, ac, ad]);
            children.push(vec![ab, Vertex(b), bc, bd]);
            children.push(vec![ac, bc, Vertex(c), cd]);
            children.push(vec![ad, bd, cd, Vertex(d)]);
            // Inner octahedron, split along the diagonal between the midpoints of ac and bd
            children.push(vec![ab, ac, ad, bd]);
            children.push(vec![ab, ac, bd, bc]);
            children.push(vec![ac, ad, bd, cd]);
            children.push(vec![ac, bc, cd, bd]);
        }
        _ => unreachable!("Topology only holds intervals, triangles and tetrahedra"),
    }
}

/// Performs one round of uniform refinement, returning the new geometry and topology.
pub fn refine_uniformly<T: Real>(
    geometry: &MeshGeometry<T>,
    topology: &MeshTopology,
) -> Result<(MeshGeometry<T>, MeshTopology)> {
    let dim = topology.dimension();
    let n_old = geometry.n_nodes();

    let mut midpoint_indices: FxHashMap<[usize; 2], usize> = FxHashMap::default();
    let mut midpoints = Vec::new();
    let mut new_cells = Vec::with_capacity(topology.cells().as_flat_slice().len() << dim);

    let mut children = Vec::new();
    for cell in topology.cells().iter() {
        children.clear();
        populate_children(cell, &mut children);
        for child in &children {
            for label in child {
                let index = match *label {
                    VertexLabel::Vertex(v) => v,
                    VertexLabel::EdgeMidpoint(edge) => *midpoint_indices.entry(edge).or_insert_with(|| {
                        midpoints.push(edge);
                        n_old + midpoints.len() - 1
                    }),
                };
                new_cells.push(index);
            }
        }
    }

    let old_nodes = geometry.nodes();
    let half: T = nalgebra::convert(0.5);
    let nodes = DMatrix::from_fn(n_old + midpoints.len(), dim, |i, j| {
        if i < n_old {
            old_nodes[(i, j)]
        } else {
            let [a, b] = midpoints[i - n_old];
            (old_nodes[(a, j)] + old_nodes[(b, j)]) * half
        }
    });

    let topology = MeshTopology::from_cells(dim, nodes.nrows(), new_cells)?;
    Ok((MeshGeometry::from_nodes(nodes), topology))
}
