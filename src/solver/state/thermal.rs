//! Thermal field bundle.

use crate::mesh::VoronoiMesh;
use crate::types::CellIndex;
use crate::vertical::VerticalGrid;

/// Ice temperature per cell and layer, read-only to the velocity solve.
///
/// # Layout
///
/// Cell-major: `temperature[cell * n_levels + level]`, so each cell's
/// column is contiguous.
///
/// # Units
/// - Temperature: Kelvin
#[derive(Clone, Debug, PartialEq)]
pub struct ThermalFields {
    /// Temperature (K)
    pub temperature: Vec<f64>,
    /// Layers per column
    pub n_levels: usize,
}

impl ThermalFields {
    /// Isothermal ice at `temperature` Kelvin.
    pub fn uniform(mesh: &VoronoiMesh, grid: &VerticalGrid, temperature: f64) -> Self {
        Self {
            temperature: vec![temperature; mesh.n_cells * grid.n_levels()],
            n_levels: grid.n_levels(),
        }
    }

    /// Temperature from a profile function `f(cell, center_sigma)`.
    pub fn from_fn(
        mesh: &VoronoiMesh,
        grid: &VerticalGrid,
        f: impl Fn(CellIndex, f64) -> f64,
    ) -> Self {
        let temperature = mesh
            .cells()
            .flat_map(|c| grid.center_sigma().iter().map(move |&s| (c, s)))
            .map(|(c, s)| f(c, s))
            .collect();
        Self {
            temperature,
            n_levels: grid.n_levels(),
        }
    }

    /// Temperature column of one cell, surface layer first.
    #[inline]
    pub fn column(&self, cell: CellIndex) -> &[f64] {
        let start = cell.get() * self.n_levels;
        &self.temperature[start..start + self.n_levels]
    }
}
