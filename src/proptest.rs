//! Proptest strategies for reference points and simple meshes.
use crate::mesh::Mesh;
use ::proptest::collection::vec;
use ::proptest::prelude::*;
use nalgebra::{DMatrix, DVector};

/// A point in the closed reference `d`-simplex `{xi >= 0, sum(xi) <= 1}`.
pub fn reference_point(d: usize) -> impl Strategy<Value = DVector<f64>> {
    // Normalized positive weights are barycentric coordinates; the last d of them are the
    // reference coordinates
    vec(0.01..1.0, d + 1).prop_map(move |weights| {
        let total: f64 = weights.iter().sum();
        DVector::from_iterator(d, weights[1..].iter().map(|w| w / total))
    })
}

/// Between one and `max_points` reference points, as the columns of a `d x n` matrix.
pub fn reference_points(d: usize, max_points: usize) -> impl Strategy<Value = DMatrix<f64>> {
    vec(reference_point(d), 1..=max_points.max(1))
        .prop_map(move |points| DMatrix::from_fn(d, points.len(), |i, j| points[j][i]))
}

/// A mesh consisting of a single `d`-simplex that is positively oriented and not too flat.
pub fn single_cell_mesh(d: usize) -> impl Strategy<Value = Mesh<f64>> {
    // Pick a reasonably small range to pick coordinates from, so that the Jacobian stays well
    // conditioned for the cells that pass the filter below
    vec(-10.0f64..10.0, (d + 1) * d)
        .prop_map(move |coords| DMatrix::from_row_slice(d + 1, d, &coords))
        .prop_filter_map("cell must be positively oriented and well shaped", move |mut nodes| {
            let edges = DMatrix::from_fn(d, d, |i, k| nodes[(k + 1, i)] - nodes[(0, i)]);
            let mut det = edges.determinant();
            if det < 0.0 {
                nodes.swap_rows(0, 1);
                det = -det;
            }
            let scale = edges.norm().powi(d as i32);
            if det < 1e-3 * scale.max(1.0) {
                return None;
            }
            let cell = DMatrix::from_row_slice(1, d + 1, &(0..=d).collect::<Vec<_>>());
            Mesh::from_nodes_and_cells(nodes, cell).ok()
        })
}
