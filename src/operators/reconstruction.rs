//! Cell → vertex reconstruction and edge difference operators.
//!
//! On a Voronoi mesh, scalar fields live at cell centers. Gradients along
//! edges need values at either side of the edge:
//!
//! - normal component: cell centers on either side (`cells_on_edge`)
//! - tangential component: vertices at either end (`vertices_on_edge`),
//!   which first requires reconstructing the field at vertices
//!
//! Two vertex reconstructions are provided:
//!
//! ```text
//! barycentric:  φ_v = Σ_i w_i φ(cell_i)
//! kite areas:   φ_v = Σ_i a_i φ(cell_i) / A_v
//! ```
//!
//! where `w_i` are barycentric weights of the vertex in the triangle of
//! cell centers, `a_i` the kite areas and `A_v` the dual triangle area.

use thiserror::Error;

use crate::mesh::VoronoiMesh;
use crate::types::{EdgeIndex, VertexIndex};

/// Error type for reconstruction operators.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReconstructionError {
    /// Input or output array has the wrong length.
    #[error("{operator}: array has length {actual}, expected {expected}")]
    LengthMismatch {
        operator: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A vertex has non-finite reconstruction weights.
    #[error("{operator}: vertex {vertex} has non-finite weights")]
    InvalidWeights {
        operator: &'static str,
        vertex: VertexIndex,
    },
}

impl ReconstructionError {
    /// Integer failure code reported to the caller.
    pub fn code(&self) -> i32 {
        match self {
            ReconstructionError::LengthMismatch { .. } => 1,
            ReconstructionError::InvalidWeights { .. } => 2,
        }
    }
}

fn check_len(operator: &'static str, actual: usize, expected: usize) -> Result<(), ReconstructionError> {
    if actual == expected {
        Ok(())
    } else {
        Err(ReconstructionError::LengthMismatch {
            operator,
            expected,
            actual,
        })
    }
}

/// Barycentric value of a cell field at one vertex.
#[inline]
pub fn vertex_value_barycentric(mesh: &VoronoiMesh, cell_values: &[f64], vertex: VertexIndex) -> f64 {
    mesh.cells_on_vertex(vertex)
        .iter()
        .zip(mesh.bary_weights_on_vertex(vertex))
        .map(|(&c, &w)| w * cell_values[c])
        .sum()
}

/// Kite-area-weighted value of a cell field at one vertex.
#[inline]
pub fn vertex_value_kite_areas(mesh: &VoronoiMesh, cell_values: &[f64], vertex: VertexIndex) -> f64 {
    let sum: f64 = mesh
        .cells_on_vertex(vertex)
        .iter()
        .zip(mesh.kite_areas_on_vertex(vertex))
        .map(|(&c, &a)| a * cell_values[c])
        .sum();
    sum / mesh.area_triangle[vertex]
}

/// Interpolate a cell field to every vertex with barycentric weights.
pub fn cells_to_vertices_barycentric(
    mesh: &VoronoiMesh,
    cell_values: &[f64],
    vertex_values: &mut [f64],
) -> Result<(), ReconstructionError> {
    const OP: &str = "cells_to_vertices_barycentric";
    check_len(OP, cell_values.len(), mesh.n_cells)?;
    check_len(OP, vertex_values.len(), mesh.n_vertices)?;

    for v in mesh.vertices() {
        if !mesh.bary_weights_on_vertex(v).iter().all(|w| w.is_finite()) {
            return Err(ReconstructionError::InvalidWeights {
                operator: OP,
                vertex: v,
            });
        }
        vertex_values[v] = vertex_value_barycentric(mesh, cell_values, v);
    }
    Ok(())
}

/// Interpolate a cell field to every vertex with kite-area weights.
pub fn cells_to_vertices_kite_areas(
    mesh: &VoronoiMesh,
    cell_values: &[f64],
    vertex_values: &mut [f64],
) -> Result<(), ReconstructionError> {
    const OP: &str = "cells_to_vertices_kite_areas";
    check_len(OP, cell_values.len(), mesh.n_cells)?;
    check_len(OP, vertex_values.len(), mesh.n_vertices)?;

    for v in mesh.vertices() {
        if !mesh.kite_areas_on_vertex(v).iter().all(|a| a.is_finite()) {
            return Err(ReconstructionError::InvalidWeights {
                operator: OP,
                vertex: v,
            });
        }
        vertex_values[v] = vertex_value_kite_areas(mesh, cell_values, v);
    }
    Ok(())
}

/// Normal derivative of a cell field at one edge: `(φ₂ - φ₁) / dc`.
#[inline]
pub fn normal_difference(mesh: &VoronoiMesh, cell_values: &[f64], edge: EdgeIndex) -> f64 {
    let [c1, c2] = mesh.cells_on_edge(edge);
    (cell_values[c2] - cell_values[c1]) / mesh.dc_edge[edge]
}

/// Tangential derivative of a vertex field at one edge: `(φ₂ - φ₁) / dv`.
#[inline]
pub fn tangent_difference(mesh: &VoronoiMesh, vertex_values: &[f64], edge: EdgeIndex) -> f64 {
    let [v1, v2] = mesh.vertices_on_edge(edge);
    (vertex_values[v2] - vertex_values[v1]) / mesh.dv_edge[edge]
}

/// Tangential component of an edge-normal vector field at one edge.
///
/// Uses the mesh's tangential reconstruction stencil:
/// `t_e = Σ_j w_ej n_j` over `edges_on_edge`.
#[inline]
pub fn tangential_component(mesh: &VoronoiMesh, normal: &[f64], edge: EdgeIndex) -> f64 {
    let (edges, weights) = mesh.tangent_stencil(edge);
    edges
        .iter()
        .zip(weights)
        .map(|(&e, &w)| w * normal[e])
        .sum()
}

/// Tangential components of an edge-normal vector field at every edge.
///
/// Edges whose stencil reaches into the outermost halo get incomplete
/// values; only edges at least one layer inside the halo are reliable.
pub fn tangential_from_normal(
    mesh: &VoronoiMesh,
    normal: &[f64],
    tangent: &mut [f64],
) -> Result<(), ReconstructionError> {
    const OP: &str = "tangential_from_normal";
    check_len(OP, normal.len(), mesh.n_edges)?;
    check_len(OP, tangent.len(), mesh.n_edges)?;

    for e in mesh.edges() {
        tangent[e] = tangential_component(mesh, normal, e);
    }
    Ok(())
}

/// Parallel version of [`tangential_from_normal`] over edges.
#[cfg(feature = "parallel")]
pub fn tangential_from_normal_parallel(
    mesh: &VoronoiMesh,
    normal: &[f64],
    tangent: &mut [f64],
) -> Result<(), ReconstructionError> {
    use rayon::prelude::*;

    const OP: &str = "tangential_from_normal";
    check_len(OP, normal.len(), mesh.n_edges)?;
    check_len(OP, tangent.len(), mesh.n_edges)?;

    tangent
        .par_iter_mut()
        .enumerate()
        .for_each(|(e, t)| *t = tangential_component(mesh, normal, EdgeIndex::new(e)));
    Ok(())
}
