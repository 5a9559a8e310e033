use matrixcompare::assert_scalar_eq;
use nalgebra::{DMatrix, DVector};
use proptest::prelude::*;
use simplex_fem::element::{BasisEvaluation, ReferenceElement, P1};
use simplex_fem::proptest::reference_points;
use simplex_fem::FemError;
use util::assert_approx_matrix_eq;

#[test]
fn p1_tables() {
    for dim in 0..=3 {
        let element = P1::new(dim).unwrap();
        assert_eq!(ReferenceElement::<f64>::dimension(&element), dim);
        assert_eq!(ReferenceElement::<f64>::order(&element), 1);

        let n_basis = ReferenceElement::<f64>::n_basis(&element);
        let n_verts = ReferenceElement::<f64>::n_verts(&element);
        let dof_tuple = ReferenceElement::<f64>::dof_tuple(&element);
        assert_eq!(n_basis.as_slice(), &[1, 2, 3, 4][..=dim]);
        assert_eq!(n_verts.as_slice(), &[1, 2, 3, 4][..=dim]);
        assert_eq!(dof_tuple.as_slice(), &[1, 0, 0, 0][..=dim]);
        assert_eq!(dof_tuple.max_dimension(), dim);
    }
}

#[test]
fn p1_basis_on_the_reference_triangle() {
    let element = P1::new(2).unwrap();
    let points = DMatrix::from_column_slice(2, 2, &[0.2, 0.3, 0.0, 1.0]);

    let values = element.eval_basis_values(&points).unwrap();
    assert_eq!(values.shape(), [3, 2]);
    assert_scalar_eq!(values[[0, 0]], 0.5, comp = abs, tol = 1e-15);
    assert_scalar_eq!(values[[1, 0]], 0.2, comp = abs, tol = 1e-15);
    assert_scalar_eq!(values[[2, 0]], 0.3, comp = abs, tol = 1e-15);
    assert_eq!([values[[0, 1]], values[[1, 1]], values[[2, 1]]], [0.0, 0.0, 1.0]);

    let gradients = element.eval_basis_gradients(&points).unwrap();
    for p in 0..2 {
        assert_eq!(gradients[[0, p]], DVector::from_column_slice(&[-1.0, -1.0]));
        assert_eq!(gradients[[1, p]], DVector::from_column_slice(&[1.0, 0.0]));
        assert_eq!(gradients[[2, p]], DVector::from_column_slice(&[0.0, 1.0]));
    }

    let hessians = element.eval_basis_hessians(&points).unwrap();
    assert_eq!(hessians.shape(), [3, 2]);
    assert!(hessians.iter().all(|h| h == &DMatrix::zeros(2, 2)));
}

#[test]
fn p1_restricted_to_lower_dimensions() {
    let element = P1::new(3).unwrap();

    // Points on the reference interval
    let points = DMatrix::from_row_slice(1, 3, &[0.0, 0.25, 1.0]);
    let values = element.eval_basis_values(&points).unwrap();
    assert_eq!(values.shape(), [2, 3]);
    assert_eq!(values.as_slice(), &[1.0, 0.75, 0.0, 0.0, 0.25, 1.0]);

    // The single point of the zero-dimensional simplex
    let vertex = DMatrix::<f64>::zeros(0, 1);
    let values = element.eval_basis_values(&vertex).unwrap();
    assert_eq!(values.as_slice(), &[1.0]);
    let gradients = element.eval_basis_gradients(&vertex).unwrap();
    assert_eq!(gradients[[0, 0]].len(), 0);
}

#[test]
fn eval_basis_dispatches_on_derivative_order() {
    let element = P1::new(2).unwrap();
    let points = DMatrix::from_element(2, 4, 0.25);

    let values = element.eval_basis(&points, 0).unwrap();
    assert_eq!(values.deriv(), 0);
    assert_eq!(values.shape(), [3, 4]);
    assert!(matches!(element.eval_basis(&points, 1), Ok(BasisEvaluation::Gradients(_))));
    let hessians = element.eval_basis(&points, 2).unwrap().into_hessians().unwrap();
    assert_eq!(hessians[[2, 3]].shape(), (2, 2));

    assert!(matches!(element.eval_basis(&points, 3), Err(FemError::InvalidArgument(_))));
}

#[test]
fn invalid_dimensions_are_rejected() {
    assert!(matches!(P1::new(4), Err(FemError::InvalidDimension { dimension: 4, .. })));

    let element = P1::new(1).unwrap();
    let points = DMatrix::<f64>::from_element(2, 1, 0.25);
    assert!(matches!(
        element.eval_basis_values(&points),
        Err(FemError::InvalidDimension { dimension: 2, .. })
    ));
    assert!(matches!(element.n_basis_for(&points), Err(FemError::InvalidDimension { .. })));
    assert_eq!(element.n_basis_for(&DMatrix::<f64>::zeros(1, 3)).unwrap(), 2);
}

macro_rules! partition_of_unity_test {
    ($test_name:ident, $dim:expr) => {
        proptest! {
            #[test]
            fn $test_name(points in reference_points($dim, 8)) {
                let element = P1::new($dim).unwrap();
                let values = element.eval_basis_values(&points).unwrap();
                for p in 0..points.ncols() {
                    let phi_sum: f64 = (0..=$dim).map(|b| values[[b, p]]).sum();
                    prop_assert!((phi_sum - 1.0f64).abs() <= 1e-12);
                }
            }
        }
    };
}

macro_rules! partition_of_unity_gradient_test {
    ($test_name:ident, $dim:expr) => {
        proptest! {
            #[test]
            fn $test_name(points in reference_points($dim, 8)) {
                // Since the sum of basis functions is 1, the sum of the gradients must be 0
                let element = P1::new($dim).unwrap();
                let gradients = element.eval_basis_gradients(&points).unwrap();
                for p in 0..points.ncols() {
                    let grad_sum = (0..=$dim)
                        .fold(DVector::zeros($dim), |acc, b| acc + &gradients[[b, p]]);
                    assert_approx_matrix_eq!(&grad_sum, &DVector::<f64>::zeros($dim), abstol = 1e-12);
                }
            }
        }
    };
}

partition_of_unity_test!(partition_of_unity_p1_interval, 1);
partition_of_unity_test!(partition_of_unity_p1_triangle, 2);
partition_of_unity_test!(partition_of_unity_p1_tetrahedron, 3);

partition_of_unity_gradient_test!(partition_of_unity_gradient_p1_interval, 1);
partition_of_unity_gradient_test!(partition_of_unity_gradient_p1_triangle, 2);
partition_of_unity_gradient_test!(partition_of_unity_gradient_p1_tetrahedron, 3);
