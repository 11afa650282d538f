//! Small ndarray-like types used throughout the crate.
//!
//! `Array2` holds feature matrices and probability tables, `Array1` holds
//! label vectors. Both are row-major `Vec` wrappers with just enough API for
//! the relation writer, the vote parser and the metrics.
pub mod matrix;
pub mod vector;

pub use matrix::{Array2, ShapeError};
pub use vector::Array1;
