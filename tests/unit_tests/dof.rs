use crate::two_triangle_square;
use nalgebra::{DMatrix, DVector};
use simplex_fem::array::DenseArray;
use simplex_fem::element::{DimensionTable, ReferenceElement, P1};
use simplex_fem::mesh::procedural::create_unit_interval_mesh;
use simplex_fem::space::dof::DofManager;
use simplex_fem::{FemError, Result};

/// An element that only describes how its DOFs are laid out.
struct LayoutOnly {
    dimension: usize,
    n_basis: DimensionTable<usize>,
    n_verts: DimensionTable<usize>,
    dof_tuple: DimensionTable<usize>,
}

impl LayoutOnly {
    fn new(n_basis: &[usize], dof_tuple: &[usize]) -> Self {
        let dimension = n_basis.len() - 1;
        Self {
            dimension,
            n_basis: DimensionTable::from_fn(dimension, |d| n_basis[d]),
            n_verts: DimensionTable::from_fn(dimension, |d| d + 1),
            dof_tuple: DimensionTable::from_fn(dimension, |d| dof_tuple[d]),
        }
    }
}

impl ReferenceElement<f64> for LayoutOnly {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn order(&self) -> usize {
        2
    }

    fn n_basis(&self) -> &DimensionTable<usize> {
        &self.n_basis
    }

    fn n_verts(&self) -> &DimensionTable<usize> {
        &self.n_verts
    }

    fn dof_tuple(&self) -> &DimensionTable<usize> {
        &self.dof_tuple
    }

    fn eval_basis_values(&self, _: &DMatrix<f64>) -> Result<DenseArray<f64, 2>> {
        Err(FemError::NotSupported("basis evaluation".to_string()))
    }

    fn eval_basis_gradients(&self, _: &DMatrix<f64>) -> Result<DenseArray<DVector<f64>, 2>> {
        Err(FemError::NotSupported("basis evaluation".to_string()))
    }

    fn eval_basis_hessians(&self, _: &DMatrix<f64>) -> Result<DenseArray<DMatrix<f64>, 2>> {
        Err(FemError::NotSupported("basis evaluation".to_string()))
    }
}

#[test]
fn p1_dofs_coincide_with_vertices() {
    let mesh = two_triangle_square();
    let dof_manager = DofManager::new(&mesh, &P1::new(2).unwrap()).unwrap();

    assert_eq!(dof_manager.n_dof(), 4);
    assert_eq!(dof_manager.offset(0), Some(0));
    assert_eq!(dof_manager.offset(1), Some(4));
    assert_eq!(dof_manager.offset(2), Some(4));
    assert_eq!(dof_manager.offset(3), None);

    let cell_map = dof_manager.dof_map(2).unwrap();
    assert_eq!(cell_map, &DMatrix::from_column_slice(3, 2, &[0, 1, 2, 1, 2, 3]));

    // One column per edge, in lexicographic edge order
    let edge_map = dof_manager.dof_map(1).unwrap();
    assert_eq!(edge_map, &mesh.edges().to_matrix().transpose());

    let vertex_map = dof_manager.dof_map(0).unwrap();
    assert_eq!(vertex_map, &DMatrix::from_row_slice(1, 4, &[0, 1, 2, 3]));

    assert!(matches!(dof_manager.dof_map(3), Err(FemError::InvalidDimension { .. })));
}

#[test]
fn p1_interval_dof_map() {
    let mesh = create_unit_interval_mesh::<f64>(3);
    let dof_manager = DofManager::new(&mesh, &P1::new(1).unwrap()).unwrap();
    assert_eq!(dof_manager.n_dof(), 4);
    assert_eq!(
        dof_manager.dof_map(1).unwrap(),
        &DMatrix::from_column_slice(2, 3, &[0, 1, 1, 2, 2, 3])
    );
}

#[test]
fn extract_dofs_of_boundary_facets() {
    let mesh = two_triangle_square();
    let dof_manager = DofManager::new(&mesh, &P1::new(2).unwrap()).unwrap();

    let left = mesh.boundary_where(&|x: &DVector<f64>| x[0] == 0.0);
    assert_eq!(left.iter().filter(|&&b| b).count(), 1);
    let dofs = dof_manager.extract_dofs(1, &left).unwrap();
    assert_eq!(dofs, vec![true, false, true, false]);

    let all = dof_manager.extract_dofs(1, &mesh.boundary()).unwrap();
    assert!(all.iter().all(|&b| b));

    let none = dof_manager.extract_dofs(2, &[false, false]).unwrap();
    assert!(none.iter().all(|&b| !b));

    assert!(matches!(
        dof_manager.extract_dofs(1, &[true, false]),
        Err(FemError::InvalidArgument(_))
    ));
}

#[test]
fn dofs_on_edges_are_numbered_after_vertex_dofs() {
    let mesh = two_triangle_square();
    // Quadratic-like layout: one DOF per vertex and one per edge
    let element = LayoutOnly::new(&[1, 3, 6], &[1, 1, 0]);
    let dof_manager = DofManager::new(&mesh, &element).unwrap();

    assert_eq!(dof_manager.n_dof(), 9);
    assert_eq!(dof_manager.dof_tuple().as_slice(), &[1, 1, 0]);

    // Edges: {0, 1}, {0, 2}, {1, 2}, {1, 3}, {2, 3}
    let cell_map = dof_manager.dof_map(2).unwrap();
    assert_eq!(cell_map.column(0).as_slice(), &[0, 1, 2, 4, 5, 6]);
    assert_eq!(cell_map.column(1).as_slice(), &[1, 2, 3, 6, 7, 8]);

    let edge_map = dof_manager.dof_map(1).unwrap();
    assert_eq!(edge_map.shape(), (3, 5));
    assert_eq!(edge_map.column(3).as_slice(), &[1, 3, 7]);

    // The top edge {2, 3} together with its vertices
    let mask = [false, false, false, false, true];
    let dofs = dof_manager.extract_dofs(1, &mask).unwrap();
    let selected: Vec<_> = (0..9).filter(|&i| dofs[i]).collect();
    assert_eq!(selected, vec![2, 3, 8]);
}

#[test]
fn interior_dofs_only() {
    let mesh = two_triangle_square();
    let element = LayoutOnly::new(&[0, 0, 1], &[0, 0, 1]);
    let dof_manager = DofManager::new(&mesh, &element).unwrap();
    assert_eq!(dof_manager.n_dof(), 2);
    assert_eq!(dof_manager.dof_map(0).unwrap().shape(), (0, 4));
    assert_eq!(dof_manager.dof_map(1).unwrap().shape(), (0, 5));
    assert_eq!(dof_manager.dof_map(2).unwrap(), &DMatrix::from_row_slice(1, 2, &[0, 1]));
}

#[test]
fn inconsistent_elements_are_rejected() {
    let mesh = two_triangle_square();

    let element = LayoutOnly::new(&[1, 2, 4], &[1, 0, 0]);
    assert!(matches!(
        DofManager::new(&mesh, &element),
        Err(FemError::InvalidArgument(_))
    ));

    assert!(matches!(
        DofManager::new(&mesh, &P1::new(3).unwrap()),
        Err(FemError::InvalidDimension { dimension: 3, .. })
    ));
}
