//! Finite element evaluation on simplicial meshes.
//!
//! The crate is organized around three collaborating pieces:
//!
//! - a [`Mesh`](mesh::Mesh), which owns the node coordinates and the topology of a simplicial
//!   mesh, and hands out a borrowed [`ReferenceMap`](mesh::reference_map::ReferenceMap) that
//!   maps the reference simplex onto each entity;
//! - a [`ReferenceElement`](element::ReferenceElement), which evaluates basis functions and their
//!   derivatives on the reference simplex, independently of any mesh;
//! - a [`FESpace`](space::FESpace), which couples the two through a
//!   [`DofManager`](space::dof::DofManager) and produces quadrature data, physical (pulled-back)
//!   basis derivatives, and evaluations of discrete fields.
//!
//! Point batches are always given as `d x n` matrices, one column per point, where `d` is the
//! dimension of the reference entity the points live on. All indices are zero-based.
use nalgebra::RealField;

pub mod array;
pub mod element;
pub mod error;
pub mod mesh;
pub mod quadrature;
pub mod space;

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate nalgebra;

pub use error::{FemError, Result};

/// Scalar type used throughout the crate.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

/// The largest spatial dimension supported by meshes and elements.
pub const MAX_DIMENSION: usize = 3;
