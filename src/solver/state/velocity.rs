//! Velocity field bundle: flow-rate factor and edge-normal velocity.

use crate::mesh::VoronoiMesh;
use crate::types::EdgeIndex;
use crate::vertical::VerticalGrid;

/// Flow-rate factor and normal velocity.
///
/// # Layout
///
/// - `flow_param_a[cell * n_levels + level]`, one value per layer
/// - `normal_velocity[edge * n_interfaces + interface]`, one value per
///   layer interface, surface first
///
/// Each edge's velocity column is a contiguous chunk, so the solve can hand
/// out disjoint columns to parallel workers.
///
/// # Units
/// - `flow_param_a`: Pa⁻ⁿ s⁻¹
/// - `normal_velocity`: m s⁻¹, positive from cell 1 to cell 2
#[derive(Clone, Debug, PartialEq)]
pub struct VelocityFields {
    /// Flow-rate factor A per cell and layer
    pub flow_param_a: Vec<f64>,
    /// Normal velocity per edge and interface
    pub normal_velocity: Vec<f64>,
    /// Layers per column
    pub n_levels: usize,
}

impl VelocityFields {
    /// Zero fields sized for `mesh` and `grid`.
    pub fn new(mesh: &VoronoiMesh, grid: &VerticalGrid) -> Self {
        Self {
            flow_param_a: vec![0.0; mesh.n_cells * grid.n_levels()],
            normal_velocity: vec![0.0; mesh.n_edges * grid.n_interfaces()],
            n_levels: grid.n_levels(),
        }
    }

    /// Interfaces per velocity column.
    #[inline]
    pub fn n_interfaces(&self) -> usize {
        self.n_levels + 1
    }

    /// Velocity column of one edge, surface first.
    #[inline]
    pub fn column(&self, edge: EdgeIndex) -> &[f64] {
        let n = self.n_interfaces();
        let start = edge.get() * n;
        &self.normal_velocity[start..start + n]
    }

    /// Mutable velocity column of one edge.
    #[inline]
    pub fn column_mut(&mut self, edge: EdgeIndex) -> &mut [f64] {
        let n = self.n_interfaces();
        let start = edge.get() * n;
        &mut self.normal_velocity[start..start + n]
    }

    /// Velocity at the upper surface.
    #[inline]
    pub fn surface_velocity(&self, edge: EdgeIndex) -> f64 {
        self.column(edge)[0]
    }

    /// Velocity at the bed.
    #[inline]
    pub fn basal_velocity(&self, edge: EdgeIndex) -> f64 {
        self.column(edge)[self.n_levels]
    }

    /// Layer-midpoint velocity: mean of the two bounding interfaces.
    pub fn layer_normal_velocity(&self, edge: EdgeIndex, level: usize) -> f64 {
        let col = self.column(edge);
        0.5 * (col[level] + col[level + 1])
    }

    /// Column-mean velocity, trapezoidal in σ.
    pub fn column_mean_velocity(&self, edge: EdgeIndex, grid: &VerticalGrid) -> f64 {
        grid.thickness_fractions()
            .iter()
            .enumerate()
            .map(|(k, &f)| f * self.layer_normal_velocity(edge, k))
            .sum()
    }
}
