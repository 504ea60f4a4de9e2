//! Layout engine implementations
//!
//! Each engine implements [`LayoutAlgorithm`](crate::core::LayoutAlgorithm).

mod force;

pub use force::*;
