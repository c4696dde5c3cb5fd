//! Validation of the SIA velocity against the Halfar similarity solution.
//!
//! A Halfar dome at its initial shape is sampled onto a 40 x 40 planar mesh
//! with 50 km spacing, and the surface velocity of every dynamic edge is
//! compared with the analytic surface velocity at the edge midpoint.
//!
//! With a 50 km grid the comparison is dominated by discretization error:
//! centered edge thickness is roughly second-order accurate while the upwind
//! estimate is first order, so the centered solve must be markedly closer
//! to the analytic field.

use sia_rs::analysis::{ErrorMetrics, HalfarDome};
use sia_rs::mesh::{IceMask, PlanarQuadMeshBuilder, VoronoiMesh};
use sia_rs::solver::{
    GeometryFields, SiaConfig, SiaSolver, ThermalFields, ThicknessEdgeMethod, VelocityFields,
};
use sia_rs::types::EdgeIndex;
use sia_rs::vertical::VerticalGrid;

const N: usize = 40;
const DC: f64 = 50.0e3;

fn halfar_dome() -> HalfarDome {
    HalfarDome::new(3000.0, 750.0e3).with_center(1.0e6, 1.0e6)
}

/// Solve the dome and return the mesh, the edge mask and the surface velocity.
fn solve_dome(method: ThicknessEdgeMethod) -> (VoronoiMesh, Vec<IceMask>, Vec<f64>) {
    let mesh = PlanarQuadMeshBuilder::new(N, N, DC).build().unwrap();
    let grid = VerticalGrid::uniform(10);
    let dome = halfar_dome();
    let t0 = dome.characteristic_time();

    let mut geometry = GeometryFields::flat_bed(&mesh, dome.cell_thickness(&mesh, t0));
    let thermal = ThermalFields::uniform(&mesh, &grid, 263.15);
    let mut velocity = VelocityFields::new(&mesh, &grid);

    let config = SiaConfig::default()
        .with_gravity(dome.gravity)
        .with_ice_density(dome.ice_density)
        .with_default_flow_param_a(dome.rate_factor)
        .with_dynamic_thickness(1.0)
        .with_thickness_edge_method(method);
    let diag = SiaSolver::new(config)
        .unwrap()
        .solve(&mesh, &grid, &mut geometry, &thermal, &mut velocity)
        .unwrap();
    assert!(diag.n_dynamic_edges > 1000);

    let surface = mesh.edges().map(|e| velocity.surface_velocity(e)).collect();
    (mesh, geometry.edge_mask, surface)
}

/// Error metrics over the dynamic edges accepted by `keep`.
fn compare(
    mesh: &VoronoiMesh,
    edge_mask: &[IceMask],
    surface: &[f64],
    keep: impl Fn(EdgeIndex) -> bool,
) -> ErrorMetrics {
    let dome = halfar_dome();
    let exact = dome.edge_surface_velocity(mesh, dome.characteristic_time());
    let (model, reference): (Vec<f64>, Vec<f64>) = mesh
        .edges()
        .filter(|&e| edge_mask[e] == IceMask::Dynamic && keep(e))
        .map(|e| (surface[e], exact[e]))
        .unzip();
    ErrorMetrics::compute(&model, &reference)
}

#[test]
fn test_halfar_surface_velocity_centered() {
    let dome = halfar_dome();
    let (mesh, mask, surface) = solve_dome(ThicknessEdgeMethod::Centered);

    let interior = compare(&mesh, &mask, &surface, |e| {
        dome.radius(mesh.x_edge[e], mesh.y_edge[e]) < 0.9 * dome.r0
    });
    assert!(interior.n_points > 1000);
    assert!(
        interior.relative_rms() < 0.05,
        "interior relative RMS {}",
        interior.relative_rms()
    );
}

#[test]
fn test_centered_thickness_beats_upwind() {
    let (mesh, mask, centered) = solve_dome(ThicknessEdgeMethod::Centered);
    let (_, upwind_mask, upwind) = solve_dome(ThicknessEdgeMethod::Upwind);
    assert_eq!(mask, upwind_mask);

    let centered = compare(&mesh, &mask, &centered, |_| true);
    let upwind = compare(&mesh, &mask, &upwind, |_| true);
    assert_eq!(centered.n_points, upwind.n_points);
    assert!(
        upwind.rms > 3.0 * centered.rms,
        "upwind {} vs centered {}",
        upwind.rms,
        centered.rms
    );
}

#[test]
fn test_halfar_flow_is_outward() {
    let dome = halfar_dome();
    let (mesh, mask, surface) = solve_dome(ThicknessEdgeMethod::Centered);

    for e in mesh.edges() {
        if mask[e] != IceMask::Dynamic {
            continue;
        }
        let [c1, c2] = mesh.cells_on_edge(e);
        let r1 = dome.radius(mesh.x_cell[c1], mesh.y_cell[c1]);
        let r2 = dome.radius(mesh.x_cell[c2], mesh.y_cell[c2]);
        // Positive velocity flows from c1 toward c2.
        if r2 > r1 + 1.0 {
            assert!(surface[e] >= 0.0, "edge {e} flows inward");
        } else if r1 > r2 + 1.0 {
            assert!(surface[e] <= 0.0, "edge {e} flows inward");
        }
    }
}
