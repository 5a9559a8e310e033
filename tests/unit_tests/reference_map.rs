use crate::{single_cell_mesh, two_triangle_square};
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{DMatrix, DVector};
use proptest::prelude::*;
use simplex_fem::proptest::{reference_point, single_cell_mesh as arbitrary_cell};
use simplex_fem::FemError;
use util::assert_approx_matrix_eq;

fn scaled_triangle() -> simplex_fem::mesh::Mesh<f64> {
    single_cell_mesh(DMatrix::from_row_slice(3, 2, &[0.0, 0.0, 2.0, 0.0, 0.0, 3.0]))
}

#[test]
fn eval_maps_reference_points_to_physical_points() {
    let mesh = scaled_triangle();
    let points = DMatrix::from_column_slice(2, 3, &[0.0, 0.0, 0.5, 0.5, 1.0, 0.0]);
    let x = mesh.reference_map().eval(&points).unwrap();
    assert_eq!(x.shape(), [1, 3]);
    assert_matrix_eq!(x[[0, 0]], DVector::from_column_slice(&[0.0, 0.0]), comp = abs, tol = 1e-14);
    assert_matrix_eq!(x[[0, 1]], DVector::from_column_slice(&[1.0, 1.5]), comp = abs, tol = 1e-14);
    assert_matrix_eq!(x[[0, 2]], DVector::from_column_slice(&[2.0, 0.0]), comp = abs, tol = 1e-14);
}

#[test]
fn jacobian_inverse_and_determinant_of_scaled_triangle() {
    let mesh = scaled_triangle();
    let reference_map = mesh.reference_map();
    let points = DMatrix::from_column_slice(2, 2, &[0.25, 0.25, 0.1, 0.7]);

    let jacobians = reference_map.jacobian(&points).unwrap();
    let inverses = reference_map.jacobian_inverse(&points).unwrap();
    let determinants = reference_map.jacobian_determinant(&points).unwrap();

    let expected_jacobian = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 3.0]);
    let expected_inverse = DMatrix::from_row_slice(2, 2, &[0.5, 0.0, 0.0, 1.0 / 3.0]);
    for p in 0..2 {
        assert_matrix_eq!(jacobians[[0, p]], expected_jacobian, comp = abs, tol = 1e-14);
        assert_matrix_eq!(inverses[[0, p]], expected_inverse, comp = abs, tol = 1e-14);
        assert_scalar_eq!(determinants[[0, p]], 6.0, comp = abs, tol = 1e-14);
    }
}

#[test]
fn determinant_is_signed_for_cells() {
    let mesh = two_triangle_square();
    let centroid = DMatrix::from_element(2, 1, 1.0 / 3.0);
    let determinants = mesh.reference_map().jacobian_determinant(&centroid).unwrap();
    assert_scalar_eq!(determinants[[0, 0]], 1.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(determinants[[1, 0]], -1.0, comp = abs, tol = 1e-14);
}

#[test]
fn facet_quantities_use_the_gram_determinant() {
    let mesh = single_cell_mesh(DMatrix::from_row_slice(3, 2, &[0.0, 0.0, 3.0, 4.0, -4.0, 3.0]));
    let reference_map = mesh.reference_map();
    let midpoint = DMatrix::from_element(1, 1, 0.5);

    // Edges in lexicographic order: {0, 1}, {0, 2}, {1, 2}
    let determinants = reference_map.jacobian_determinant(&midpoint).unwrap();
    assert_eq!(determinants.shape(), [3, 1]);
    assert_scalar_eq!(determinants[[0, 0]], 5.0, comp = abs, tol = 1e-12);
    assert_scalar_eq!(determinants[[1, 0]], 5.0, comp = abs, tol = 1e-12);
    assert_scalar_eq!(determinants[[2, 0]], 50f64.sqrt(), comp = abs, tol = 1e-12);

    // The pseudo-inverse is a left inverse of the tangent
    let jacobians = reference_map.jacobian(&midpoint).unwrap();
    let inverses = reference_map.jacobian_inverse(&midpoint).unwrap();
    for e in 0..3 {
        let product = &inverses[[e, 0]] * &jacobians[[e, 0]];
        assert_approx_matrix_eq!(&product, &DMatrix::<f64>::identity(1, 1), abstol = 1e-12);
    }
}

#[test]
fn vertex_quantities() {
    let mesh = two_triangle_square();
    let reference_map = mesh.reference_map();
    let no_coordinates = DMatrix::<f64>::zeros(0, 1);

    let x = reference_map.eval(&no_coordinates).unwrap();
    assert_eq!(x.shape(), [4, 1]);
    assert_matrix_eq!(x[[3, 0]], DVector::from_column_slice(&[1.0, 1.0]), comp = abs, tol = 1e-14);

    let determinants = reference_map.jacobian_determinant(&no_coordinates).unwrap();
    assert!(determinants.iter().all(|&det| det == 1.0));
    let inverses = reference_map.jacobian_inverse(&no_coordinates).unwrap();
    assert_eq!(inverses[[0, 0]].shape(), (0, 2));
}

#[test]
fn singular_jacobian_is_reported_with_entity() {
    let nodes = DMatrix::from_row_slice(4, 2, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 2.0, 0.0]);
    // The second cell is degenerate: all three vertices lie on the x-axis
    let cells = DMatrix::from_row_slice(2, 3, &[0, 1, 2, 0, 1, 3]);
    let mesh = simplex_fem::mesh::Mesh::from_nodes_and_cells(nodes, cells).unwrap();
    let centroid = DMatrix::from_element(2, 1, 1.0 / 3.0);

    assert_eq!(
        mesh.reference_map().jacobian_inverse(&centroid),
        Err(FemError::SingularJacobian { entity: 1 })
    );
    let determinants = mesh.reference_map().jacobian_determinant(&centroid).unwrap();
    assert_eq!(determinants[[1, 0]], 0.0);
}

#[test]
fn points_of_too_high_dimension_are_rejected() {
    let mesh = two_triangle_square();
    let points = DMatrix::from_element(3, 1, 0.25);
    let reference_map = mesh.reference_map();
    assert!(matches!(reference_map.eval(&points), Err(FemError::InvalidDimension { .. })));
    assert!(matches!(reference_map.jacobian(&points), Err(FemError::InvalidDimension { .. })));
    assert!(matches!(
        reference_map.jacobian_determinant(&points),
        Err(FemError::InvalidDimension { .. })
    ));
}

fn mesh_and_point() -> impl Strategy<Value = (simplex_fem::mesh::Mesh<f64>, DVector<f64>)> {
    (1..=3usize).prop_flat_map(|d| (arbitrary_cell(d), reference_point(d)))
}

proptest! {
    #[test]
    fn jacobian_matches_finite_differences((mesh, xi) in mesh_and_point()) {
        let d = xi.len();
        let h = 1e-6;
        let reference_map = mesh.reference_map();

        let mut points = DMatrix::zeros(d, d + 1);
        for k in 0..=d {
            points.set_column(k, &xi);
        }
        for k in 0..d {
            points[(k, k + 1)] += h;
        }
        let x = reference_map.eval(&points).unwrap();
        let jacobians = reference_map.jacobian(&points).unwrap();
        let jacobian = &jacobians[[0, 0]];

        let mut fd_jacobian = DMatrix::zeros(d, d);
        for k in 0..d {
            fd_jacobian.set_column(k, &((&x[[0, k + 1]] - &x[[0, 0]]) / h));
        }
        assert_approx_matrix_eq!(jacobian, &fd_jacobian, abstol = 1e-6);
    }

    #[test]
    fn jacobian_inverse_is_inverse((mesh, xi) in mesh_and_point()) {
        let d = xi.len();
        let points = DMatrix::from_column_slice(d, 1, xi.as_slice());
        let reference_map = mesh.reference_map();
        let jacobians = reference_map.jacobian(&points).unwrap();
        let inverses = reference_map.jacobian_inverse(&points).unwrap();
        let (jacobian, inverse) = (&jacobians[[0, 0]], &inverses[[0, 0]]);
        assert_approx_matrix_eq!(&(inverse * jacobian), &DMatrix::<f64>::identity(d, d), abstol = 1e-8);

        let det = reference_map.jacobian_determinant(&points).unwrap()[[0, 0]];
        prop_assert!(det > 0.0);
        prop_assert!((det - jacobian.determinant()).abs() <= 1e-9 * det.abs().max(1.0));
    }
}
