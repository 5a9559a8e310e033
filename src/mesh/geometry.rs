use nalgebra::{DMatrix, DVector, Scalar};
use serde::{Deserialize, Serialize};

/// Node coordinates of a mesh, one row per node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct MeshGeometry<T: Scalar> {
    nodes: DMatrix<T>,
}

impl<T: Scalar> MeshGeometry<T> {
    pub fn from_nodes(nodes: DMatrix<T>) -> Self {
        Self { nodes }
    }

    /// The `n_nodes x dimension` coordinate matrix.
    pub fn nodes(&self) -> &DMatrix<T> {
        &self.nodes
    }

    pub fn dimension(&self) -> usize {
        self.nodes.ncols()
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.nrows()
    }

    /// Coordinates of the node with the given index, as a column vector.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn node(&self, index: usize) -> DVector<T> {
        self.nodes.row(index).transpose()
    }
}
