//! Diagnostics of a velocity solve.
//!
//! Provides:
//! - counts of dynamic cells and edges
//! - maximum surface and column-mean speed
//! - the advective CFL time step `min dc / |u|`
//!
//! # Example
//!
//! ```ignore
//! use sia_rs::solver::SiaDiagnostics;
//!
//! let diag = SiaDiagnostics::compute(&mesh, &grid, &geometry, &velocity);
//! log::info!("{}", diag.summary_line());
//! ```

use crate::mesh::{IceMaskStatistics, VoronoiMesh, is_dynamic_ice};
use crate::solver::state::{GeometryFields, VelocityFields};
use crate::types::EdgeIndex;
use crate::vertical::VerticalGrid;

/// Seconds per year, for reporting speeds in m/a.
const SECONDS_PER_YEAR: f64 = crate::rheology::SECONDS_PER_YEAR;

/// Summary quantities of a solved velocity field.
#[derive(Clone, Debug, PartialEq)]
pub struct SiaDiagnostics {
    /// Cell mask counts over the solve set
    pub cells: IceMaskStatistics,
    /// Number of dynamic edges in the solve set
    pub n_dynamic_edges: usize,
    /// Largest |u| at the upper surface (m/s)
    pub max_surface_speed: f64,
    /// Edge carrying `max_surface_speed`
    pub max_speed_edge: Option<EdgeIndex>,
    /// Largest |ū| (column mean, m/s)
    pub max_mean_speed: f64,
    /// Advective time step limit `min dc / |u_s|` (s); infinite at rest
    pub cfl_dt: f64,
    /// Ice volume over the owned cells (m³)
    pub ice_volume: f64,
}

impl SiaDiagnostics {
    /// Compute diagnostics over the solve set.
    pub fn compute(
        mesh: &VoronoiMesh,
        grid: &VerticalGrid,
        geometry: &GeometryFields,
        velocity: &VelocityFields,
    ) -> Self {
        let mut n_dynamic_edges = 0;
        let mut max_surface_speed = 0.0;
        let mut max_speed_edge = None;
        let mut max_mean_speed: f64 = 0.0;
        let mut cfl_dt = f64::INFINITY;

        for e in mesh.solve_edges() {
            if !is_dynamic_ice(geometry.edge_mask[e]) {
                continue;
            }
            n_dynamic_edges += 1;

            let u_s = velocity.surface_velocity(e).abs();
            if u_s > max_surface_speed {
                max_surface_speed = u_s;
                max_speed_edge = Some(e);
            }
            if u_s > 0.0 {
                cfl_dt = cfl_dt.min(mesh.dc_edge[e] / u_s);
            }
            max_mean_speed = max_mean_speed.max(velocity.column_mean_velocity(e, grid).abs());
        }

        Self {
            cells: IceMaskStatistics::from_masks(&geometry.cell_mask[..mesh.n_cells_solve]),
            n_dynamic_edges,
            max_surface_speed,
            max_speed_edge,
            max_mean_speed,
            cfl_dt,
            ice_volume: geometry.ice_volume(mesh),
        }
    }

    /// Whether any ice moves.
    pub fn is_at_rest(&self) -> bool {
        self.max_surface_speed == 0.0
    }

    /// Format diagnostics as a single-line summary (speeds in m/a).
    pub fn summary_line(&self) -> String {
        format!(
            "dyn_edges={} |u_s|_max={:.3} m/a |u_mean|_max={:.3} m/a dt_cfl={:.3e} s V={:.4e} m3",
            self.n_dynamic_edges,
            self.max_surface_speed * SECONDS_PER_YEAR,
            self.max_mean_speed * SECONDS_PER_YEAR,
            self.cfl_dt,
            self.ice_volume
        )
    }
}

impl std::fmt::Display for SiaDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cells: {}", self.cells)?;
        writeln!(f, "Dynamic edges: {}", self.n_dynamic_edges)?;
        match self.max_speed_edge {
            Some(e) => writeln!(
                f,
                "Max surface speed: {:.4} m/a at {e}",
                self.max_surface_speed * SECONDS_PER_YEAR
            )?,
            None => writeln!(f, "Max surface speed: 0 (at rest)")?,
        }
        write!(f, "CFL time step: {:.4e} s", self.cfl_dt)
    }
}
