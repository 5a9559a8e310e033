//! Dense multi-index storage for batched evaluations.
//!
//! Batched operations in this crate produce one entry per combination of, say,
//! (cell, basis function, point). [`DenseArray`] stores such entries contiguously in row-major
//! order, so that iterating over [`DenseArray::as_slice`] visits the last index fastest and the
//! positional correspondence with the inputs is kept.
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenseArray<E, const RANK: usize> {
    #[serde(with = "shape_serde")]
    shape: [usize; RANK],
    data: Vec<E>,
}

impl<E, const RANK: usize> DenseArray<E, RANK> {
    /// Constructs an array from row-major data.
    ///
    /// # Panics
    ///
    /// Panics if the length of `data` does not equal the product of the extents in `shape`.
    pub fn from_row_major_vec(shape: [usize; RANK], data: Vec<E>) -> Self {
        assert_eq!(
            data.len(),
            shape.iter().product::<usize>(),
            "Data length must match the number of entries implied by the shape"
        );
        Self { shape, data }
    }

    /// Constructs an array by evaluating `f` at every multi-index, in row-major order.
    pub fn from_fn(shape: [usize; RANK], mut f: impl FnMut([usize; RANK]) -> E) -> Self {
        let len = shape.iter().product();
        let mut data = Vec::with_capacity(len);
        let mut index = [0; RANK];
        for _ in 0..len {
            data.push(f(index));
            // Odometer increment, last index fastest
            for axis in (0..RANK).rev() {
                index[axis] += 1;
                if index[axis] < shape[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }
        Self { shape, data }
    }

    pub fn shape(&self) -> [usize; RANK] {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[E] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<E> {
        self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.data.iter()
    }

    pub fn get(&self, index: [usize; RANK]) -> Option<&E> {
        self.linear_index(index).map(|i| &self.data[i])
    }

    pub fn get_mut(&mut self, index: [usize; RANK]) -> Option<&mut E> {
        self.linear_index(index).map(move |i| &mut self.data[i])
    }

    /// Applies `f` to every entry, keeping the shape.
    pub fn map<F, U>(&self, f: F) -> DenseArray<U, RANK>
    where
        F: FnMut(&E) -> U,
    {
        DenseArray {
            shape: self.shape,
            data: self.data.iter().map(f).collect(),
        }
    }

    fn linear_index(&self, index: [usize; RANK]) -> Option<usize> {
        let mut linear = 0;
        for (&i, &extent) in index.iter().zip(&self.shape) {
            if i >= extent {
                return None;
            }
            linear = linear * extent + i;
        }
        Some(linear)
    }
}

impl<E, const RANK: usize> Index<[usize; RANK]> for DenseArray<E, RANK> {
    type Output = E;

    fn index(&self, index: [usize; RANK]) -> &E {
        let shape = self.shape;
        self.get(index)
            .unwrap_or_else(|| panic!("Index {index:?} out of bounds for array of shape {shape:?}"))
    }
}

impl<E, const RANK: usize> IndexMut<[usize; RANK]> for DenseArray<E, RANK> {
    fn index_mut(&mut self, index: [usize; RANK]) -> &mut E {
        let shape = self.shape;
        self.get_mut(index)
            .unwrap_or_else(|| panic!("Index {index:?} out of bounds for array of shape {shape:?}"))
    }
}

impl<'a, E, const RANK: usize> IntoIterator for &'a DenseArray<E, RANK> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

// serde only implements (de)serialization for arrays of a fixed set of lengths,
// so the shape goes through a Vec
mod shape_serde {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer, const RANK: usize>(shape: &[usize; RANK], serializer: S) -> Result<S::Ok, S::Error> {
        shape.as_slice().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const RANK: usize>(deserializer: D) -> Result<[usize; RANK], D::Error> {
        let shape = Vec::<usize>::deserialize(deserializer)?;
        shape
            .try_into()
            .map_err(|v: Vec<usize>| D::Error::custom(format!("expected shape of rank {RANK}, got {}", v.len())))
    }
}
