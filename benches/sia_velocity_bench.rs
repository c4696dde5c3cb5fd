//! Benchmarks for the SIA velocity solve.
//!
//! Run with: `cargo bench --bench sia_velocity_bench`
//!
//! Measures the slope estimator, the per-edge vertical integral and the
//! full solver pipeline on Halfar domes of increasing resolution.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sia_rs::analysis::HalfarDome;
use sia_rs::mesh::{PlanarQuadMeshBuilder, VoronoiMesh};
use sia_rs::rheology::FlowParamAMethod;
use sia_rs::solver::{
    GeometryFields, SiaConfig, SiaSolver, SlopeMethod, ThermalFields, VelocityFields,
    compute_sia_velocity, compute_surface_slopes,
};
use sia_rs::vertical::VerticalGrid;

const DOMAIN: f64 = 2.0e6;
const N_LEVELS: usize = 10;

/// Mesh, grid and fields for an `n x n` Halfar dome covering the domain.
fn setup(n: usize) -> (VoronoiMesh, VerticalGrid, GeometryFields, ThermalFields, VelocityFields) {
    let mesh = PlanarQuadMeshBuilder::new(n, n, DOMAIN / n as f64)
        .build()
        .unwrap();
    let grid = VerticalGrid::uniform(N_LEVELS);
    let dome = HalfarDome::new(3000.0, 750.0e3).with_center(0.5 * DOMAIN, 0.5 * DOMAIN);
    let t0 = dome.characteristic_time();

    let mut geometry = GeometryFields::flat_bed(&mesh, dome.cell_thickness(&mesh, t0));
    geometry.update_masks(&mesh, 1.0);
    let thermal = ThermalFields::from_fn(&mesh, &grid, |_, sigma| 243.15 + 25.0 * sigma);
    let velocity = VelocityFields::new(&mesh, &grid);
    (mesh, grid, geometry, thermal, velocity)
}

/// Benchmark the surface slope estimator for each slope method.
fn bench_surface_slopes(c: &mut Criterion) {
    let mut group = c.benchmark_group("surface_slopes");

    let (mesh, _, geometry, _, _) = setup(100);
    for method in [
        SlopeMethod::FromVertexBarycentric,
        SlopeMethod::FromVertexBarycentricKiteAreas,
        SlopeMethod::FromNormalSlope,
    ] {
        group.bench_with_input(BenchmarkId::new(method.name(), 100), &method, |b, &method| {
            let mut geometry = geometry.clone();
            b.iter(|| compute_surface_slopes(black_box(&mesh), method, &mut geometry));
        });
    }

    group.finish();
}

/// Benchmark the vertical integral alone across mesh sizes.
fn bench_velocity_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("sia_velocity");

    for n in [25, 50, 100, 200] {
        let (mesh, grid, mut geometry, _, mut velocity) = setup(n);
        let config = SiaConfig::default().with_dynamic_thickness(1.0);
        compute_surface_slopes(&mesh, config.slope_method, &mut geometry).unwrap();
        velocity.flow_param_a.fill(config.default_flow_param_a);

        group.bench_with_input(BenchmarkId::new("serial", mesh.n_edges), &n, |b, _| {
            b.iter(|| {
                compute_sia_velocity(
                    black_box(&mesh),
                    black_box(&grid),
                    &config,
                    black_box(&geometry),
                    &mut velocity,
                )
            });
        });

        #[cfg(feature = "parallel")]
        group.bench_with_input(BenchmarkId::new("parallel", mesh.n_edges), &n, |b, _| {
            b.iter(|| {
                sia_rs::solver::compute_sia_velocity_parallel(
                    black_box(&mesh),
                    black_box(&grid),
                    &config,
                    black_box(&geometry),
                    &mut velocity,
                )
            });
        });
    }

    group.finish();
}

/// Benchmark the full pipeline with each flow law.
fn bench_full_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_solve");

    let (mesh, grid, geometry, thermal, velocity) = setup(100);
    for method in [
        FlowParamAMethod::Constant,
        FlowParamAMethod::PatersonBudd1982,
        FlowParamAMethod::CuffeyPaterson2010,
    ] {
        let config = SiaConfig::default()
            .with_dynamic_thickness(1.0)
            .with_flow_param_a_method(method);
        let solver = SiaSolver::new(config).unwrap();

        group.bench_with_input(BenchmarkId::new(method.name(), 100), &method, |b, _| {
            let mut geometry = geometry.clone();
            let mut velocity = velocity.clone();
            b.iter(|| {
                solver
                    .solve(&mesh, &grid, &mut geometry, black_box(&thermal), &mut velocity)
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_surface_slopes,
    bench_velocity_kernel,
    bench_full_solve
);
criterion_main!(benches);
