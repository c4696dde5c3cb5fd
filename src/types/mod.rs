//! Strongly-typed domain types for safer APIs.
//!
//! A Voronoi mesh has three horizontal index spaces: cells, edges and
//! vertices. All of them are plain `usize`
//! offsets into flat arrays, so the newtypes here exist to keep them
//! from being mixed up.
//!
//! # Example
//!
//! ```
//! use sia_rs::types::{CellIndex, EdgeIndex};
//!
//! let thickness = vec![100.0, 250.0, 0.0];
//! assert_eq!(thickness[CellIndex::new(1)], 250.0);
//!
//! let edges: Vec<_> = EdgeIndex::iter(3).rev().collect();
//! assert_eq!(edges[0].get(), 2);
//! ```

mod indices;

pub use indices::{CellIndex, EdgeIndex, VertexIndex};
