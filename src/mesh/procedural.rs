//! Basic procedural mesh generation routines.
//!
//! All meshes produced here are conforming and positively oriented.
use crate::mesh::geometry::MeshGeometry;
use crate::mesh::topology::MeshTopology;
use crate::mesh::Mesh;
use crate::Real;
use itertools::iproduct;
use nalgebra::DMatrix;

fn build_mesh<T: Real>(dim: usize, nodes: DMatrix<T>, cells: Vec<usize>) -> Mesh<T> {
    let topology = MeshTopology::from_cells(dim, nodes.nrows(), cells)
        .expect("Procedurally generated connectivity must be valid");
    Mesh::from_geometry_and_topology(MeshGeometry::from_nodes(nodes), topology)
}

fn coordinate<T: Real>(i: usize, cells_per_dim: usize) -> T {
    nalgebra::convert(i as f64 / cells_per_dim as f64)
}

/// A uniform mesh of `[0, 1]` with the given number of intervals.
pub fn create_unit_interval_mesh<T: Real>(cells_per_dim: usize) -> Mesh<T> {
    if cells_per_dim == 0 {
        return build_mesh(1, DMatrix::zeros(0, 1), Vec::new());
    }
    let nodes = DMatrix::from_fn(cells_per_dim + 1, 1, |i, _| coordinate(i, cells_per_dim));
    let cells = (0..cells_per_dim).flat_map(|i| [i, i + 1]).collect();
    build_mesh(1, nodes, cells)
}

/// A uniform triangle mesh of `[0, 1]^2`, each of the `cells_per_dim^2` squares split into two
/// triangles along its diagonal from `(x0, y0)` to `(x1, y1)`.
pub fn create_unit_square_mesh<T: Real>(cells_per_dim: usize) -> Mesh<T> {
    if cells_per_dim == 0 {
        return build_mesh(2, DMatrix::zeros(0, 2), Vec::new());
    }
    let n = cells_per_dim;
    let vertex_index = |i: usize, j: usize| (n + 1) * j + i;
    let nodes = DMatrix::from_fn((n + 1) * (n + 1), 2, |v, axis| {
        let (i, j) = (v % (n + 1), v / (n + 1));
        coordinate([i, j][axis], n)
    });

    let mut cells = Vec::with_capacity(6 * n * n);
    for (j, i) in iproduct!(0..n, 0..n) {
        let v00 = vertex_index(i, j);
        let v10 = vertex_index(i + 1, j);
        let v01 = vertex_index(i, j + 1);
        let v11 = vertex_index(i + 1, j + 1);
        cells.extend_from_slice(&[v00, v10, v11]);
        cells.extend_from_slice(&[v00, v11, v01]);
    }
    build_mesh(2, nodes, cells)
}

/// A uniform tetrahedral mesh of `[0, 1]^3`.
///
/// Each of the `cells_per_dim^3` cubes is split into the six tetrahedra of its Kuhn
/// triangulation, all sharing the diagonal from `(x0, y0, z0)` to `(x1, y1, z1)`.
pub fn create_unit_cube_mesh<T: Real>(cells_per_dim: usize) -> Mesh<T> {
    if cells_per_dim == 0 {
        return build_mesh(3, DMatrix::zeros(0, 3), Vec::new());
    }
    let n = cells_per_dim;
    let vertex_index = |[i, j, k]: [usize; 3]| (n + 1) * (n + 1) * k + (n + 1) * j + i;
    let nodes = DMatrix::from_fn((n + 1).pow(3), 3, |v, axis| {
        let multi_index = [v % (n + 1), (v / (n + 1)) % (n + 1), v / ((n + 1) * (n + 1))];
        coordinate(multi_index[axis], n)
    });

    // Each path walks from the lower to the upper corner of a cube, one axis at a time
    const AXIS_ORDERS: [[usize; 3]; 6] = [[0, 1, 2], [1, 2, 0], [2, 0, 1], [0, 2, 1], [2, 1, 0], [1, 0, 2]];
    let mut cells = Vec::with_capacity(24 * n * n * n);
    for (k, j, i) in iproduct!(0..n, 0..n, 0..n) {
        for (path_index, axes) in AXIS_ORDERS.iter().enumerate() {
            let mut corner = [i, j, k];
            let mut tet = [vertex_index(corner), 0, 0, 0];
            for (step, &axis) in axes.iter().enumerate() {
                corner[axis] += 1;
                tet[step + 1] = vertex_index(corner);
            }
            // Odd permutations of the axes give negatively oriented paths
            if path_index >= 3 {
                tet.swap(2, 3);
            }
            cells.extend_from_slice(&tet);
        }
    }
    build_mesh(3, nodes, cells)
}
