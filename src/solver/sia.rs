//! Shallow Ice Approximation velocity integrator.
//!
//! Under the SIA, the horizontal velocity at depth σ (fractional depth
//! below the surface) of a column with no basal sliding is
//!
//! ```text
//! u(σ) = u(σ') + P · L · ∫ A dσⁿ⁺¹
//! P = -2 (ρg)ⁿ / (n+1)                      position independent
//! L = |∇s|ⁿ⁻¹ (∂s/∂n) Hⁿ⁺¹                  level independent
//! ```
//!
//! With `A` constant inside each layer the integral is exact:
//!
//! ```text
//! u[bed] = 0
//! u[k]   = u[k+1] + P L Ā_k (σ[k+1]ⁿ⁺¹ - σ[k]ⁿ⁺¹)
//! ```
//!
//! where `Ā_k` is the average of the two cells' rate factor in layer `k`,
//! weighted by their dynamic indicators. The sum runs from the bed up to the
//! surface and must stay in that order within a column; distinct edges are
//! independent and write disjoint output columns.

use super::config::{SiaConfig, ThicknessEdgeMethod};
use super::state::{GeometryFields, VelocityFields};
use crate::mesh::{IceMask, VoronoiMesh, dynamic_ice_indicator, is_dynamic_ice};
use crate::types::EdgeIndex;
use crate::vertical::VerticalGrid;

/// Position-independent SIA factor `-2/(n+1) (ρg)ⁿ`.
///
/// The usual constant `-0.5 (ρg)ⁿ` is the n = 3 case of this formula; for
/// any other exponent the coefficient is `-2/(n+1)`, e.g. `-1` for n = 1.
#[inline]
pub fn position_independent_factor(flow_exponent: f64, rho_g: f64) -> f64 {
    -2.0 / (flow_exponent + 1.0) * rho_g.powf(flow_exponent)
}

/// Edge thickness for the velocity integral.
#[inline]
pub fn edge_thickness(
    method: ThicknessEdgeMethod,
    thickness_1: f64,
    thickness_2: f64,
    normal_slope: f64,
) -> f64 {
    match method {
        ThicknessEdgeMethod::Centered => 0.5 * (thickness_1 + thickness_2),
        // Ice flows down the surface gradient, so the up-slope cell is
        // cell 2 when the slope is positive.
        ThicknessEdgeMethod::Upwind => {
            if normal_slope >= 0.0 {
                thickness_2
            } else {
                thickness_1
            }
        }
    }
}

/// Borrowed inputs of the per-edge velocity integral.
///
/// All per-solve constants (`P`, `σⁿ⁺¹`) are evaluated once in
/// [`SiaVelocityKernel::new`].
pub struct SiaVelocityKernel<'a> {
    mesh: &'a VoronoiMesh,
    thickness: &'a [f64],
    normal_slope: &'a [f64],
    slope: &'a [f64],
    cell_mask: &'a [IceMask],
    edge_mask: &'a [IceMask],
    flow_param_a: &'a [f64],
    n_levels: usize,
    flow_exponent: f64,
    thickness_method: ThicknessEdgeMethod,
    position_factor: f64,
    sigma_pow: Vec<f64>,
}

impl<'a> SiaVelocityKernel<'a> {
    /// Bind the kernel to a mesh, vertical grid and field bundles.
    pub fn new(
        mesh: &'a VoronoiMesh,
        grid: &VerticalGrid,
        config: &SiaConfig,
        geometry: &'a GeometryFields,
        flow_param_a: &'a [f64],
    ) -> Self {
        let n = config.flow_exponent;
        Self {
            mesh,
            thickness: &geometry.thickness,
            normal_slope: &geometry.normal_slope_edge,
            slope: &geometry.slope_edge,
            cell_mask: &geometry.cell_mask,
            edge_mask: &geometry.edge_mask,
            flow_param_a,
            n_levels: grid.n_levels(),
            flow_exponent: n,
            thickness_method: config.thickness_edge_method,
            position_factor: position_independent_factor(n, config.rho_g()),
            sigma_pow: grid.interface_sigma_powers(n + 1.0),
        }
    }

    /// Interfaces per output column.
    #[inline]
    pub fn n_interfaces(&self) -> usize {
        self.n_levels + 1
    }

    /// The hoisted factor `P`.
    #[inline]
    pub fn position_factor(&self) -> f64 {
        self.position_factor
    }

    /// Level-independent factor `L = |∇s|ⁿ⁻¹ (∂s/∂n) Hⁿ⁺¹` of an edge.
    #[inline]
    pub fn level_factor(&self, edge: EdgeIndex) -> f64 {
        let [c1, c2] = self.mesh.cells_on_edge(edge);
        let n = self.flow_exponent;
        let normal_slope = self.normal_slope[edge];
        let h = edge_thickness(
            self.thickness_method,
            self.thickness[c1],
            self.thickness[c2],
            normal_slope,
        );
        self.slope[edge].powf(n - 1.0) * normal_slope * h.powf(n + 1.0)
    }

    /// Integrate one edge's column. `column` has `n_levels + 1` entries,
    /// surface first.
    pub fn fill_column(&self, edge: EdgeIndex, column: &mut [f64]) {
        debug_assert_eq!(column.len(), self.n_interfaces());

        if !is_dynamic_ice(self.edge_mask[edge]) {
            column.fill(0.0);
            return;
        }

        let [c1, c2] = self.mesh.cells_on_edge(edge);
        let w1 = dynamic_ice_indicator(self.cell_mask[c1]) as f64;
        let w2 = dynamic_ice_indicator(self.cell_mask[c2]) as f64;
        let w_sum = w1 + w2;

        // A dynamic edge always borders a dynamic cell when the masks come
        // from `compute_edge_masks`; externally supplied masks may not.
        debug_assert!(w_sum > 0.0, "dynamic edge {edge} has no dynamic cell");
        if w_sum <= 0.0 {
            column.fill(0.0);
            return;
        }

        let nl = self.n_levels;
        let a1 = &self.flow_param_a[c1.get() * nl..(c1.get() + 1) * nl];
        let a2 = &self.flow_param_a[c2.get() * nl..(c2.get() + 1) * nl];
        let factor = self.position_factor * self.level_factor(edge);

        column[nl] = 0.0;
        for k in (0..nl).rev() {
            let a_edge = (w1 * a1[k] + w2 * a2[k]) / w_sum;
            column[k] =
                column[k + 1] + factor * a_edge * (self.sigma_pow[k + 1] - self.sigma_pow[k]);
        }
    }
}

/// Normal velocity on every solve-set edge.
///
/// Halo edges (`n_edges_solve..n_edges`) are left untouched.
pub fn compute_sia_velocity(
    mesh: &VoronoiMesh,
    grid: &VerticalGrid,
    config: &SiaConfig,
    geometry: &GeometryFields,
    velocity: &mut VelocityFields,
) {
    let kernel = SiaVelocityKernel::new(mesh, grid, config, geometry, &velocity.flow_param_a);
    let n_int = kernel.n_interfaces();
    let owned = &mut velocity.normal_velocity[..mesh.n_edges_solve * n_int];

    for (e, column) in owned.chunks_mut(n_int).enumerate() {
        kernel.fill_column(EdgeIndex::new(e), column);
    }
}

/// Parallel version of [`compute_sia_velocity`] using Rayon.
///
/// Each task owns one edge's output column, so the result is identical to
/// the serial version.
#[cfg(feature = "parallel")]
pub fn compute_sia_velocity_parallel(
    mesh: &VoronoiMesh,
    grid: &VerticalGrid,
    config: &SiaConfig,
    geometry: &GeometryFields,
    velocity: &mut VelocityFields,
) {
    use rayon::prelude::*;

    let kernel = SiaVelocityKernel::new(mesh, grid, config, geometry, &velocity.flow_param_a);
    let n_int = kernel.n_interfaces();

    velocity.normal_velocity[..mesh.n_edges_solve * n_int]
        .par_chunks_mut(n_int)
        .enumerate()
        .for_each(|(e, column)| kernel.fill_column(EdgeIndex::new(e), column));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PlanarQuadMeshBuilder;
    use approx::assert_relative_eq;

    const RHO_G: f64 = 910.0 * 9.80616;

    #[test]
    fn test_position_factor() {
        assert_relative_eq!(
            position_independent_factor(3.0, RHO_G),
            -0.5 * RHO_G.powi(3),
            max_relative = 1e-14
        );
        // Coefficient -1 at n = 1, -1/3 at n = 5
        assert_relative_eq!(position_independent_factor(1.0, 2.0), -2.0);
        assert_relative_eq!(position_independent_factor(5.0, 2.0), -32.0 / 3.0, max_relative = 1e-14);
    }

    #[test]
    fn test_edge_thickness() {
        let c = ThicknessEdgeMethod::Centered;
        let u = ThicknessEdgeMethod::Upwind;
        assert_eq!(edge_thickness(c, 100.0, 300.0, 0.1), 200.0);
        assert_eq!(edge_thickness(u, 100.0, 300.0, 0.1), 300.0);
        assert_eq!(edge_thickness(u, 100.0, 300.0, -0.1), 100.0);
    }

    /// Uniform slab on an inclined bed; every edge dynamic.
    fn slab(n_levels: usize) -> (VoronoiMesh, VerticalGrid, GeometryFields, VelocityFields) {
        let mesh = PlanarQuadMeshBuilder::new(4, 4, 1000.0).build().unwrap();
        let grid = VerticalGrid::uniform(n_levels);
        let mut geom = GeometryFields::flat_bed(&mesh, vec![1000.0; mesh.n_cells]);
        geom.update_masks(&mesh, 100.0);
        geom.normal_slope_edge.fill(-0.01);
        geom.slope_edge.fill(0.01);
        let mut vel = VelocityFields::new(&mesh, &grid);
        vel.flow_param_a.fill(1.0e-24);
        (mesh, grid, geom, vel)
    }

    #[test]
    fn test_slab_profile_matches_closed_form() {
        let (mesh, grid, geom, mut vel) = slab(10);
        let config = SiaConfig::default();
        compute_sia_velocity(&mesh, &grid, &config, &geom, &mut vel);

        // u(σ) = 2A(ρg|∇s|)ⁿ Hⁿ⁺¹ (1 - σⁿ⁺¹)/(n+1), directed down-slope
        let u_surface = 2.0 * 1.0e-24 * (RHO_G * 0.01).powi(3) * 1000.0_f64.powi(4) / 4.0;
        for e in mesh.edges() {
            let col = vel.column(e);
            assert_eq!(col[10], 0.0);
            for (k, &s) in grid.interface_sigma().iter().enumerate() {
                assert_relative_eq!(col[k], u_surface * (1.0 - s.powi(4)), max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_single_level_value() {
        let (mesh, grid, geom, mut vel) = slab(1);
        let config = SiaConfig::default();
        compute_sia_velocity(&mesh, &grid, &config, &geom, &mut vel);

        let kernel = SiaVelocityKernel::new(&mesh, &grid, &config, &geom, &vel.flow_param_a);
        let e = EdgeIndex::new(5);
        let expected = kernel.position_factor() * kernel.level_factor(e) * 1.0e-24;
        assert_eq!(vel.column(e), &[expected, 0.0]);
        assert!(expected > 0.0);
    }

    #[test]
    fn test_dynamic_weighting_ignores_non_dynamic_cell() {
        let (mesh, grid, mut geom, mut vel) = slab(3);
        // Cell 0 becomes thin: its rate factor must not enter the average.
        geom.thickness[0] = 50.0;
        geom.update_masks(&mesh, 100.0);
        for a in &mut vel.flow_param_a[..3] {
            *a = 1.0e-10;
        }
        let config = SiaConfig::default().with_thickness_edge_method(ThicknessEdgeMethod::Upwind);
        compute_sia_velocity(&mesh, &grid, &config, &geom, &mut vel);

        // x-edge 1 lies between cell 0 (west) and cell 1; slope < 0 so the
        // upwind cell is cell 0 and H = 50 m.
        let e = EdgeIndex::new(1);
        let h: f64 = 50.0;
        let expected = 0.5 * RHO_G.powi(3) * 0.01f64.powi(3) * h.powi(4) * 1.0e-24;
        assert_relative_eq!(vel.surface_velocity(e), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_non_dynamic_edges_zeroed_and_halo_untouched() {
        let (mesh, grid, mut geom, mut vel) = slab(4);
        let mesh = mesh.with_solve_counts(16, 20, 16).unwrap();
        geom.update_masks(&mesh, 5000.0);
        vel.normal_velocity.fill(7.0);

        compute_sia_velocity(&mesh, &grid, &SiaConfig::default(), &geom, &mut vel);
        for e in mesh.edges() {
            let expected = if e.get() < 20 { 0.0 } else { 7.0 };
            assert!(vel.column(e).iter().all(|&u| u == expected));
        }
    }

    #[test]
    #[cfg(feature = "parallel")]
    fn test_parallel_matches_serial() {
        let (mesh, grid, mut geom, mut serial) = slab(6);
        for (i, h) in geom.thickness.iter_mut().enumerate() {
            *h = 80.0 + 37.0 * i as f64;
        }
        geom.update_masks(&mesh, 100.0);
        for (e, s) in geom.normal_slope_edge.iter_mut().enumerate() {
            *s = 0.001 * ((e % 7) as f64 - 3.0);
        }
        for (e, s) in geom.slope_edge.iter_mut().enumerate() {
            *s = geom.normal_slope_edge[e].abs() + 0.0005;
        }
        let mut parallel = serial.clone();

        let config = SiaConfig::default();
        compute_sia_velocity(&mesh, &grid, &config, &geom, &mut serial);
        compute_sia_velocity_parallel(&mesh, &grid, &config, &geom, &mut parallel);
        assert_eq!(serial.normal_velocity, parallel.normal_velocity);
    }
}
