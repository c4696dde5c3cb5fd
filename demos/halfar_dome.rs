//! SIA velocity of a Halfar dome.
//!
//! Solves the velocity of a Halfar dome at its initial shape with both edge
//! thickness estimates and compares the surface velocity with the analytic
//! solution.
//!
//! Run with: `cargo run --release --example halfar_dome`

use log::{LevelFilter, info};
use sia_rs::analysis::{ErrorMetrics, HalfarDome};
use sia_rs::mesh::{IceMask, PlanarQuadMeshBuilder};
use sia_rs::rheology::SECONDS_PER_YEAR;
use sia_rs::solver::{
    GeometryFields, SiaConfig, SiaSolver, ThermalFields, ThicknessEdgeMethod, VelocityFields,
};
use sia_rs::vertical::{BedRefinedLayers, VerticalGrid};
use simple_logger::SimpleLogger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new().with_level(LevelFilter::Info).init()?;

    let n = 40;
    let dc = 50.0e3;
    let mesh = PlanarQuadMeshBuilder::new(n, n, dc).build()?;
    let grid = VerticalGrid::new(10, BedRefinedLayers::default());
    let dome = HalfarDome::new(3000.0, 750.0e3).with_center(1.0e6, 1.0e6);
    let t0 = dome.characteristic_time();

    info!("Mesh: {} cells, {} edges, dc = {:.0} km", mesh.n_cells, mesh.n_edges, dc / 1e3);
    info!("Vertical grid: {}", grid.description());
    info!("Halfar t0 = {:.1} years", t0 / SECONDS_PER_YEAR);

    let exact = dome.edge_surface_velocity(&mesh, t0);
    let thermal = ThermalFields::uniform(&mesh, &grid, 263.15);

    for method in [ThicknessEdgeMethod::Centered, ThicknessEdgeMethod::Upwind] {
        let mut geometry = GeometryFields::flat_bed(&mesh, dome.cell_thickness(&mesh, t0));
        let mut velocity = VelocityFields::new(&mesh, &grid);
        let config = SiaConfig::default()
            .with_gravity(dome.gravity)
            .with_dynamic_thickness(1.0)
            .with_thickness_edge_method(method);

        let diag = SiaSolver::new(config)?.solve(
            &mesh,
            &grid,
            &mut geometry,
            &thermal,
            &mut velocity,
        )?;
        info!("{:?}: {}", method, diag.summary_line());

        let (model, reference): (Vec<f64>, Vec<f64>) = mesh
            .edges()
            .filter(|&e| geometry.edge_mask[e] == IceMask::Dynamic)
            .map(|e| (velocity.surface_velocity(e), exact[e]))
            .unzip();
        let metrics = ErrorMetrics::compute(&model, &reference);
        info!(
            "{:?}: surface velocity RMS error {:.3} m/a ({:.2}% of reference), max {:.3} m/a over {} edges",
            method,
            metrics.rms * SECONDS_PER_YEAR,
            100.0 * metrics.relative_rms(),
            metrics.max_error * SECONDS_PER_YEAR,
            metrics.n_points
        );
    }

    Ok(())
}
