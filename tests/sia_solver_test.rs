//! Integration tests for the SIA velocity solver.
//!
//! These tests exercise the public pipeline on small planar meshes and check
//! the properties every solve must satisfy:
//! 1. Non-dynamic edges have an all-zero velocity column
//! 2. Dynamic edges have zero velocity at the bed
//! 3. Slope magnitude is the Euclidean norm of its components
//! 4. Edge results do not depend on processing order
//! 5. Invalid configuration fails before any field is written

use approx::assert_relative_eq;
use sia_rs::analysis::HalfarDome;
use sia_rs::mesh::{IceMask, PlanarQuadMeshBuilder, VoronoiMesh, masks_from_codes};
use sia_rs::rheology::FlowParamAMethod;
use sia_rs::solver::{
    GeometryFields, SiaConfig, SiaError, SiaSolver, SiaVelocityKernel, SlopeMethod, SolveStage,
    ThermalFields, VelocityFields, position_independent_factor, status_code,
};
use sia_rs::types::EdgeIndex;
use sia_rs::vertical::{BedRefinedLayers, VerticalGrid};

/// Fields of one solve.
struct Case {
    mesh: VoronoiMesh,
    grid: VerticalGrid,
    geometry: GeometryFields,
    thermal: ThermalFields,
    velocity: VelocityFields,
}

/// A small dome on a thin apron, leaving ice-free, thin and dynamic cells
/// on the mesh.
fn dome_case(n_levels: usize) -> Case {
    let mesh = PlanarQuadMeshBuilder::new(16, 16, 10.0e3).build().unwrap();
    let grid = VerticalGrid::new(n_levels, BedRefinedLayers::default());
    let dome = HalfarDome::new(1000.0, 60.0e3).with_center(80.0e3, 80.0e3);
    let t0 = dome.characteristic_time();
    let thickness: Vec<f64> = mesh
        .cells()
        .map(|c| {
            let (x, y) = (mesh.x_cell[c], mesh.y_cell[c]);
            let apron = if dome.radius(x, y) < 75.0e3 { 50.0 } else { 0.0 };
            dome.thickness_at(x, y, t0) + apron
        })
        .collect();
    let bed: Vec<f64> = mesh.cells().map(|c| -100.0 + 1.0e-3 * mesh.x_cell[c]).collect();
    let geometry = GeometryFields::grounded(&mesh, thickness, &bed);
    let thermal = ThermalFields::from_fn(&mesh, &grid, |_, sigma| 243.15 + 20.0 * sigma);
    let velocity = VelocityFields::new(&mesh, &grid);
    Case {
        mesh,
        grid,
        geometry,
        thermal,
        velocity,
    }
}

fn solve(case: &mut Case, config: SiaConfig) -> Result<sia_rs::SiaDiagnostics, SiaError> {
    SiaSolver::new(config)?.solve(
        &case.mesh,
        &case.grid,
        &mut case.geometry,
        &case.thermal,
        &mut case.velocity,
    )
}

#[test]
fn test_dome_has_every_mask_class() {
    let mut case = dome_case(5);
    solve(&mut case, SiaConfig::default()).unwrap();
    for class in [IceMask::NoIce, IceMask::NonDynamic, IceMask::Dynamic] {
        assert!(case.geometry.cell_mask.contains(&class), "{class:?} missing");
    }
}

#[test]
fn test_non_dynamic_columns_are_zero() {
    let mut case = dome_case(8);
    solve(&mut case, SiaConfig::default()).unwrap();

    let mut n_non_dynamic = 0;
    for e in case.mesh.edges() {
        if case.geometry.edge_mask[e] != IceMask::Dynamic {
            n_non_dynamic += 1;
            assert!(case.velocity.column(e).iter().all(|&u| u == 0.0), "edge {e}");
        }
    }
    assert!(n_non_dynamic > 0);
}

#[test]
fn test_dynamic_edges_have_no_basal_velocity() {
    let mut case = dome_case(8);
    let diag = solve(&mut case, SiaConfig::default()).unwrap();
    assert!(diag.n_dynamic_edges > 0);

    for e in case.mesh.edges() {
        if case.geometry.edge_mask[e] == IceMask::Dynamic {
            assert_eq!(case.velocity.basal_velocity(e), 0.0);
        }
    }
    assert!(diag.max_surface_speed > 0.0);
}

#[test]
fn test_velocity_increases_toward_surface() {
    let mut case = dome_case(10);
    solve(&mut case, SiaConfig::default()).unwrap();

    for e in case.mesh.edges() {
        let col = case.velocity.column(e);
        for k in 0..10 {
            assert!(col[k].abs() >= col[k + 1].abs());
        }
    }
}

#[test]
fn test_slope_magnitude_identity_all_methods() {
    for method in [
        SlopeMethod::FromVertexBarycentric,
        SlopeMethod::FromVertexBarycentricKiteAreas,
        SlopeMethod::FromNormalSlope,
    ] {
        let mut case = dome_case(3);
        solve(&mut case, SiaConfig::default().with_slope_method(method)).unwrap();

        let g = &case.geometry;
        for e in case.mesh.edges() {
            let (n, t, s) = (g.normal_slope_edge[e], g.tangent_slope_edge[e], g.slope_edge[e]);
            assert!(s >= 0.0);
            assert_relative_eq!(s * s, n * n + t * t, max_relative = 1e-12, epsilon = 1e-20);
            if g.edge_mask[e] != IceMask::Dynamic {
                assert_eq!(t, 0.0);
            }
        }
    }
}

#[test]
fn test_reverse_edge_order_gives_identical_result() {
    let mut case = dome_case(6);
    let config = SiaConfig::default().with_flow_param_a_method(FlowParamAMethod::CuffeyPaterson2010);
    solve(&mut case, config.clone()).unwrap();

    let kernel = SiaVelocityKernel::new(
        &case.mesh,
        &case.grid,
        &config,
        &case.geometry,
        &case.velocity.flow_param_a,
    );
    let n_int = kernel.n_interfaces();
    let mut reversed = vec![f64::NAN; case.mesh.n_edges * n_int];
    for e in case.mesh.edges().rev() {
        let start = e.get() * n_int;
        kernel.fill_column(e, &mut reversed[start..start + n_int]);
    }
    assert_eq!(reversed, case.velocity.normal_velocity);
}

#[test]
fn test_unknown_slope_method_is_configuration_error() {
    let mut case = dome_case(4);
    let geometry_before = case.geometry.clone();
    let velocity_before = case.velocity.clone();

    let result = SiaConfig::from_names(Some("bogus_method"), None, None)
        .and_then(|config| solve(&mut case, config));

    let err = result.as_ref().unwrap_err();
    assert!(matches!(err, SiaError::Configuration(m) if m.contains("bogus_method")));
    assert_eq!(status_code(&result), 1);
    assert_eq!(case.geometry, geometry_before);
    assert_eq!(case.velocity, velocity_before);
}

#[test]
fn test_single_level_closed_form() {
    let mesh = PlanarQuadMeshBuilder::new(6, 6, 5.0e3).build().unwrap();
    let grid = VerticalGrid::uniform(1);
    assert_eq!(grid.n_interfaces(), 2);

    let thickness: Vec<f64> = mesh
        .cells()
        .map(|c| 800.0 + 20.0 * (c.get() % 6) as f64 + 7.0 * (c.get() / 6) as f64)
        .collect();
    let mut geometry = GeometryFields::flat_bed(&mesh, thickness);
    let thermal = ThermalFields::uniform(&mesh, &grid, 263.15);
    let mut velocity = VelocityFields::new(&mesh, &grid);
    let config = SiaConfig::default();
    SiaSolver::new(config.clone())
        .unwrap()
        .solve(&mesh, &grid, &mut geometry, &thermal, &mut velocity)
        .unwrap();

    let p = position_independent_factor(3.0, config.rho_g());
    let a = config.default_flow_param_a;
    let sigma = grid.interface_sigma();
    for e in mesh.edges() {
        let [c1, c2] = mesh.cells_on_edge(e);
        let h = 0.5 * (geometry.thickness[c1] + geometry.thickness[c2]);
        let l = geometry.slope_edge[e].powi(2) * geometry.normal_slope_edge[e] * h.powi(4);
        let expected = p * l * a * (sigma[1].powi(4) - sigma[0].powi(4));

        let col = velocity.column(e);
        assert_eq!(col.len(), 2);
        assert_eq!(col[1], 0.0);
        assert_relative_eq!(col[0], expected, max_relative = 1e-12);
        assert!(col[0] != 0.0);
    }
}

#[test]
fn test_halo_edges_untouched() {
    let mut case = dome_case(4);
    let n_solve = case.mesh.n_edges / 2;
    case.mesh = case
        .mesh
        .clone()
        .with_solve_counts(case.mesh.n_cells, n_solve, case.mesh.n_vertices)
        .unwrap();
    case.velocity.normal_velocity.fill(-1.0);

    solve(&mut case, SiaConfig::default()).unwrap();

    for e in case.mesh.edges() {
        let col = case.velocity.column(e);
        if e.get() >= n_solve {
            assert!(col.iter().all(|&u| u == -1.0));
        } else {
            assert!(col.iter().all(|&u| u != -1.0));
        }
    }
}

#[test]
fn test_kite_areas_match_barycentric_on_square_cells() {
    let mut bary = dome_case(5);
    let mut kite = dome_case(5);
    solve(&mut bary, SiaConfig::default()).unwrap();
    solve(
        &mut kite,
        SiaConfig::default().with_slope_method(SlopeMethod::FromVertexBarycentricKiteAreas),
    )
    .unwrap();

    for (u_b, u_k) in bary
        .velocity
        .normal_velocity
        .iter()
        .zip(&kite.velocity.normal_velocity)
    {
        assert_relative_eq!(*u_b, *u_k, max_relative = 1e-10, epsilon = 1e-25);
    }
}

#[test]
fn test_external_masks_from_codes() {
    let mut case = dome_case(3);
    let n_cells = case.mesh.n_cells;
    let n_edges = case.mesh.n_edges;

    // Only ice, no dynamic bit: nothing may move.
    case.geometry.cell_mask = masks_from_codes(&vec![IceMask::ICE_BIT; n_cells]).unwrap();
    case.geometry.edge_mask = masks_from_codes(&vec![IceMask::ICE_BIT; n_edges]).unwrap();

    let diag = solve(&mut case, SiaConfig::default().with_compute_masks(false)).unwrap();
    assert_eq!(diag.n_dynamic_edges, 0);
    assert!(case.velocity.normal_velocity.iter().all(|&u| u == 0.0));

    assert!(masks_from_codes(&[IceMask::DYNAMIC_BIT]).is_err());
}

#[test]
fn test_temperature_dependent_rheology_changes_velocity() {
    let mut constant = dome_case(5);
    let mut warm = dome_case(5);
    solve(&mut constant, SiaConfig::default()).unwrap();
    solve(
        &mut warm,
        SiaConfig::default().with_flow_param_a_method(FlowParamAMethod::PatersonBudd1982),
    )
    .unwrap();

    let e = (0..constant.mesh.n_edges)
        .map(EdgeIndex::new)
        .max_by(|&a, &b| {
            let speed = |e| constant.velocity.surface_velocity(e).abs();
            speed(a).total_cmp(&speed(b))
        })
        .unwrap();
    assert!(constant.velocity.surface_velocity(e) != warm.velocity.surface_velocity(e));
    // Same flow direction
    assert!(constant.velocity.surface_velocity(e) * warm.velocity.surface_velocity(e) > 0.0);
}

#[test]
#[cfg(feature = "parallel")]
fn test_parallel_matches_serial() {
    for method in [
        SlopeMethod::FromVertexBarycentric,
        SlopeMethod::FromNormalSlope,
    ] {
        let mut serial = dome_case(7);
        let mut parallel = dome_case(7);
        let config = SiaConfig::default()
            .with_slope_method(method)
            .with_flow_param_a_method(FlowParamAMethod::CuffeyPaterson2010);

        let s = SiaSolver::new(config.clone()).unwrap().with_parallel(false);
        let p = SiaSolver::new(config).unwrap().with_parallel(true);
        assert!(p.is_parallel());

        let d_s = s
            .solve(
                &serial.mesh,
                &serial.grid,
                &mut serial.geometry,
                &serial.thermal,
                &mut serial.velocity,
            )
            .unwrap();
        let d_p = p
            .solve(
                &parallel.mesh,
                &parallel.grid,
                &mut parallel.geometry,
                &parallel.thermal,
                &mut parallel.velocity,
            )
            .unwrap();

        assert_eq!(serial.geometry, parallel.geometry);
        assert_eq!(serial.velocity, parallel.velocity);
        assert_eq!(d_s, d_p);
    }
}

#[test]
#[cfg(feature = "parallel")]
fn test_parallel_matches_serial_when_rheology_fails() {
    let mut serial = dome_case(4);
    serial.thermal.temperature[0] = 0.0;
    let mut parallel = dome_case(4);
    parallel.thermal.temperature[0] = 0.0;

    let config =
        SiaConfig::default().with_flow_param_a_method(FlowParamAMethod::PatersonBudd1982);
    let s = SiaSolver::new(config.clone()).unwrap().with_parallel(false);
    let p = SiaSolver::new(config).unwrap().with_parallel(true);

    let r_s = s.solve(
        &serial.mesh,
        &serial.grid,
        &mut serial.geometry,
        &serial.thermal,
        &mut serial.velocity,
    );
    let r_p = p.solve(
        &parallel.mesh,
        &parallel.grid,
        &mut parallel.geometry,
        &parallel.thermal,
        &mut parallel.velocity,
    );

    assert_eq!(status_code(&r_s), SolveStage::Rheology.bit());
    assert_eq!(r_s, r_p);

    // Every other cell and layer still gets a rate factor
    let a = &serial.velocity.flow_param_a;
    assert_eq!(a[0], 0.0);
    assert!(a[1..].iter().all(|&v| v > 0.0));
    assert!(serial.velocity.normal_velocity.iter().any(|&u| u != 0.0));

    assert_eq!(serial.geometry, parallel.geometry);
    assert_eq!(serial.velocity, parallel.velocity);
}
