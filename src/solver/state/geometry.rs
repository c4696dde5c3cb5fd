//! Geometry field bundle: thickness, surface, slopes and masks.

use crate::mesh::{IceMask, VoronoiMesh, compute_cell_masks, compute_edge_masks};

/// Ice geometry on the mesh.
///
/// Cell fields are indexed by [`CellIndex`](crate::types::CellIndex), edge
/// fields by [`EdgeIndex`](crate::types::EdgeIndex) and
/// `upper_surface_vertex` by [`VertexIndex`](crate::types::VertexIndex).
/// Slopes and masks are derived; they are rewritten by every solve and are
/// only consistent within one time step.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryFields {
    /// Ice thickness per cell (m)
    pub thickness: Vec<f64>,
    /// Upper-surface elevation per cell (m)
    pub upper_surface: Vec<f64>,
    /// Upper-surface elevation reconstructed at vertices (m)
    pub upper_surface_vertex: Vec<f64>,
    /// Surface slope along the edge normal (cell 1 → cell 2)
    pub normal_slope_edge: Vec<f64>,
    /// Surface slope along the edge tangent (vertex 1 → vertex 2)
    pub tangent_slope_edge: Vec<f64>,
    /// Surface slope magnitude per edge
    pub slope_edge: Vec<f64>,
    /// Ice classification per cell
    pub cell_mask: Vec<IceMask>,
    /// Ice classification per edge
    pub edge_mask: Vec<IceMask>,
}

impl GeometryFields {
    /// Ice-free geometry sized for `mesh`.
    pub fn new(mesh: &VoronoiMesh) -> Self {
        Self {
            thickness: vec![0.0; mesh.n_cells],
            upper_surface: vec![0.0; mesh.n_cells],
            upper_surface_vertex: vec![0.0; mesh.n_vertices],
            normal_slope_edge: vec![0.0; mesh.n_edges],
            tangent_slope_edge: vec![0.0; mesh.n_edges],
            slope_edge: vec![0.0; mesh.n_edges],
            cell_mask: vec![IceMask::NoIce; mesh.n_cells],
            edge_mask: vec![IceMask::NoIce; mesh.n_edges],
        }
    }

    /// Grounded ice resting on `bed_topography`: `s = b + H`.
    ///
    /// # Panics
    ///
    /// Panics if `thickness` or `bed_topography` is not sized `n_cells`.
    pub fn grounded(mesh: &VoronoiMesh, thickness: Vec<f64>, bed_topography: &[f64]) -> Self {
        assert_eq!(thickness.len(), mesh.n_cells, "thickness must be sized n_cells");
        assert_eq!(
            bed_topography.len(),
            mesh.n_cells,
            "bed topography must be sized n_cells"
        );

        let upper_surface = thickness
            .iter()
            .zip(bed_topography)
            .map(|(h, b)| b + h)
            .collect();

        Self {
            thickness,
            upper_surface,
            ..Self::new(mesh)
        }
    }

    /// Grounded ice on a flat bed at elevation zero.
    pub fn flat_bed(mesh: &VoronoiMesh, thickness: Vec<f64>) -> Self {
        let bed = vec![0.0; mesh.n_cells];
        Self::grounded(mesh, thickness, &bed)
    }

    /// Recompute the cell and edge masks from thickness.
    pub fn update_masks(&mut self, mesh: &VoronoiMesh, dynamic_thickness: f64) {
        compute_cell_masks(&self.thickness, dynamic_thickness, &mut self.cell_mask);
        compute_edge_masks(mesh, &self.cell_mask, &mut self.edge_mask);
    }

    /// Total ice volume over the owned cells (m³).
    pub fn ice_volume(&self, mesh: &VoronoiMesh) -> f64 {
        self.thickness[..mesh.n_cells_solve]
            .iter()
            .zip(&mesh.area_cell)
            .map(|(h, a)| h * a)
            .sum()
    }
}
