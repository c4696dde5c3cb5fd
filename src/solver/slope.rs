//! Surface slope estimator.
//!
//! Computes, per edge:
//!
//! ```text
//! normal slope:   (s(c₂) - s(c₁)) / dc
//! tangent slope:  (s(v₂) - s(v₁)) / dv       vertex methods
//!                 Σ w_j · normal slope_j      from_normal_slope
//! slope:          √(normal² + tangent²)
//! ```
//!
//! The tangent slope is zero on non-dynamic edges. The magnitude is
//! computed on every edge; downstream consumers gate on the edge mask.
//!
//! Halo edges may end up with wrong values because their stencils are
//! incomplete. Results are only reliable on the solve set, which must lie at
//! least one connectivity layer inside the halo.

use super::config::SlopeMethod;
use super::error::SiaError;
use super::state::GeometryFields;
use crate::mesh::{IceMask, VoronoiMesh, is_dynamic_ice};
use crate::operators::{
    cells_to_vertices_barycentric, cells_to_vertices_kite_areas, normal_difference,
    tangent_difference, tangential_component, tangential_from_normal,
};
use crate::types::EdgeIndex;

/// Normal surface slope on every edge.
pub fn compute_normal_slope(mesh: &VoronoiMesh, upper_surface: &[f64], normal_slope: &mut [f64]) {
    for e in mesh.edges() {
        normal_slope[e] = normal_difference(mesh, upper_surface, e);
    }
}

/// Reconstruct the upper surface at vertices for the vertex-based methods.
///
/// Does nothing for [`SlopeMethod::FromNormalSlope`].
pub fn reconstruct_vertex_surface(
    mesh: &VoronoiMesh,
    method: SlopeMethod,
    upper_surface: &[f64],
    upper_surface_vertex: &mut [f64],
) -> Result<(), SiaError> {
    match method {
        SlopeMethod::FromVertexBarycentric => {
            cells_to_vertices_barycentric(mesh, upper_surface, upper_surface_vertex)?
        }
        SlopeMethod::FromVertexBarycentricKiteAreas => {
            cells_to_vertices_kite_areas(mesh, upper_surface, upper_surface_vertex)?
        }
        SlopeMethod::FromNormalSlope => {}
    }
    Ok(())
}

/// Tangent slope of one edge; zero unless the edge is dynamic.
#[inline]
fn tangent_slope_at(
    mesh: &VoronoiMesh,
    method: SlopeMethod,
    upper_surface_vertex: &[f64],
    normal_slope: &[f64],
    edge_mask: IceMask,
    edge: EdgeIndex,
) -> f64 {
    if !is_dynamic_ice(edge_mask) {
        return 0.0;
    }
    match method {
        SlopeMethod::FromVertexBarycentric | SlopeMethod::FromVertexBarycentricKiteAreas => {
            tangent_difference(mesh, upper_surface_vertex, edge)
        }
        SlopeMethod::FromNormalSlope => tangential_component(mesh, normal_slope, edge),
    }
}

/// Tangent slope on every edge, from already reconstructed inputs.
pub fn compute_tangent_slope(
    mesh: &VoronoiMesh,
    method: SlopeMethod,
    upper_surface_vertex: &[f64],
    normal_slope: &[f64],
    edge_mask: &[IceMask],
    tangent_slope: &mut [f64],
) -> Result<(), SiaError> {
    if !method.uses_vertex_surface() {
        tangential_from_normal(mesh, normal_slope, tangent_slope)?;
        for e in mesh.edges() {
            if !is_dynamic_ice(edge_mask[e]) {
                tangent_slope[e] = 0.0;
            }
        }
        return Ok(());
    }

    for e in mesh.edges() {
        tangent_slope[e] =
            tangent_slope_at(mesh, method, upper_surface_vertex, normal_slope, edge_mask[e], e);
    }
    Ok(())
}

/// Slope magnitude `√(normal² + tangent²)` on every edge.
pub fn compute_slope_magnitude(normal_slope: &[f64], tangent_slope: &[f64], slope: &mut [f64]) {
    for ((s, &n), &t) in slope.iter_mut().zip(normal_slope).zip(tangent_slope) {
        *s = n.hypot(t);
    }
}

/// Run the full slope estimator on a geometry bundle.
///
/// A failure of the vertex reconstruction does not stop the estimator: the
/// remaining steps run on whatever the reconstruction produced and the
/// failure is returned at the end, so the caller can fold it into the
/// aggregate status.
pub fn compute_surface_slopes(
    mesh: &VoronoiMesh,
    method: SlopeMethod,
    geometry: &mut GeometryFields,
) -> Result<(), SiaError> {
    compute_normal_slope(mesh, &geometry.upper_surface, &mut geometry.normal_slope_edge);

    let reconstruction = reconstruct_vertex_surface(
        mesh,
        method,
        &geometry.upper_surface,
        &mut geometry.upper_surface_vertex,
    );

    let tangent = compute_tangent_slope(
        mesh,
        method,
        &geometry.upper_surface_vertex,
        &geometry.normal_slope_edge,
        &geometry.edge_mask,
        &mut geometry.tangent_slope_edge,
    );

    compute_slope_magnitude(
        &geometry.normal_slope_edge,
        &geometry.tangent_slope_edge,
        &mut geometry.slope_edge,
    );

    let failures: Vec<SiaError> = [reconstruction, tangent]
        .into_iter()
        .filter_map(Result::err)
        .collect();
    match SiaError::aggregate(failures) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Parallel version of [`compute_surface_slopes`] over edges.
///
/// The vertex reconstruction runs serially; the per-edge slope stencils run
/// in parallel and write disjoint entries. Failures are reported exactly as
/// the serial version reports them.
#[cfg(feature = "parallel")]
pub fn compute_surface_slopes_parallel(
    mesh: &VoronoiMesh,
    method: SlopeMethod,
    geometry: &mut GeometryFields,
) -> Result<(), SiaError> {
    use crate::operators::tangential_from_normal_parallel;
    use rayon::prelude::*;

    let upper_surface = &geometry.upper_surface;
    geometry
        .normal_slope_edge
        .par_iter_mut()
        .enumerate()
        .for_each(|(e, n)| *n = normal_difference(mesh, upper_surface, EdgeIndex::new(e)));

    let reconstruction = reconstruct_vertex_surface(
        mesh,
        method,
        &geometry.upper_surface,
        &mut geometry.upper_surface_vertex,
    );

    let surface_vertex = &geometry.upper_surface_vertex;
    let normal_slope = &geometry.normal_slope_edge;
    let edge_mask = &geometry.edge_mask;
    let tangent = if !method.uses_vertex_surface() {
        let result = tangential_from_normal_parallel(
            mesh,
            normal_slope,
            &mut geometry.tangent_slope_edge,
        );
        if result.is_ok() {
            geometry
                .tangent_slope_edge
                .par_iter_mut()
                .zip(edge_mask.par_iter())
                .for_each(|(t, &mask)| {
                    if !is_dynamic_ice(mask) {
                        *t = 0.0;
                    }
                });
        }
        result.map_err(SiaError::from)
    } else {
        geometry
            .tangent_slope_edge
            .par_iter_mut()
            .enumerate()
            .for_each(|(e, t)| {
                let edge = EdgeIndex::new(e);
                *t = tangent_slope_at(mesh, method, surface_vertex, normal_slope, edge_mask[e], edge);
            });
        Ok(())
    };

    geometry
        .slope_edge
        .par_iter_mut()
        .zip(normal_slope.par_iter())
        .zip(geometry.tangent_slope_edge.par_iter())
        .for_each(|((s, &n), &t)| *s = n.hypot(t));

    let failures: Vec<SiaError> = [reconstruction, tangent]
        .into_iter()
        .filter_map(Result::err)
        .collect();
    match SiaError::aggregate(failures) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
