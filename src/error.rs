//! Error types.
use thiserror::Error;

/// Library-wide error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FemError {
    /// A spatial or topological dimension outside of the supported range.
    #[error("invalid dimension {dimension} (expected {expected})")]
    InvalidDimension { dimension: usize, expected: String },
    /// An argument with a value that the operation does not accept, such as an unsupported
    /// derivative order.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A request that is well-formed but not implemented.
    #[error("not supported: {0}")]
    NotSupported(String),
    /// Cell connectivity that is inconsistent with the mesh nodes or dimension.
    #[error("invalid connectivity: {0}")]
    InvalidConnectivity(String),
    /// The Jacobian of the reference map of an entity could not be inverted.
    #[error("singular Jacobian for entity {entity}")]
    SingularJacobian { entity: usize },
}

pub type Result<T, E = FemError> = std::result::Result<T, E>;

impl FemError {
    pub(crate) fn invalid_dimension(dimension: usize, expected: impl Into<String>) -> Self {
        Self::InvalidDimension {
            dimension,
            expected: expected.into(),
        }
    }

    /// Error for a derivative order outside of `supported`.
    pub(crate) fn derivative_order(deriv: usize, supported: &str) -> Self {
        Self::InvalidArgument(format!(
            "invalid derivative order {deriv}, supported orders are {supported}"
        ))
    }
}
