//! Discrete operators on the Voronoi mesh.
//!
//! This module provides:
//! - Cell → vertex reconstruction (barycentric and kite-area weighted)
//! - Normal and tangential edge differences
//! - Tangential-from-normal reconstruction of edge vector fields

mod reconstruction;

pub use reconstruction::{
    ReconstructionError, cells_to_vertices_barycentric, cells_to_vertices_kite_areas,
    normal_difference, tangent_difference, tangential_component, tangential_from_normal,
    vertex_value_barycentric, vertex_value_kite_areas,
};

#[cfg(feature = "parallel")]
pub use reconstruction::tangential_from_normal_parallel;
