//! # sia-rs
//!
//! A Shallow Ice Approximation (SIA) velocity solver for land ice on
//! unstructured Voronoi meshes.
//!
//! This crate provides the building blocks of the SIA velocity solve:
//! - Typed mesh indices and a Voronoi mesh arena with halo-aware solve sets
//! - Ice masks (dynamic / non-dynamic / ice free)
//! - A normalized vertical coordinate shared by all ice columns
//! - Cell → vertex reconstruction and edge difference operators
//! - Flow-rate factor laws (constant, Paterson-Budd, Cuffey-Paterson)
//! - Surface slope estimation and the analytic SIA vertical integral
//! - The Halfar similarity solution for validation
//!
//! # Example
//!
//! ```
//! use sia_rs::analysis::HalfarDome;
//! use sia_rs::mesh::PlanarQuadMeshBuilder;
//! use sia_rs::solver::{GeometryFields, SiaConfig, SiaSolver, ThermalFields, VelocityFields};
//! use sia_rs::vertical::VerticalGrid;
//!
//! let mesh = PlanarQuadMeshBuilder::new(20, 20, 50.0e3).build().unwrap();
//! let grid = VerticalGrid::uniform(10);
//! let dome = HalfarDome::new(3000.0, 400.0e3).with_center(500.0e3, 500.0e3);
//! let t0 = dome.characteristic_time();
//!
//! let mut geometry = GeometryFields::flat_bed(&mesh, dome.cell_thickness(&mesh, t0));
//! let thermal = ThermalFields::uniform(&mesh, &grid, 263.15);
//! let mut velocity = VelocityFields::new(&mesh, &grid);
//!
//! let solver = SiaSolver::new(SiaConfig::default().with_gravity(9.81)).unwrap();
//! let diag = solver
//!     .solve(&mesh, &grid, &mut geometry, &thermal, &mut velocity)
//!     .unwrap();
//! assert!(diag.n_dynamic_edges > 0);
//! ```

pub mod analysis;
pub mod mesh;
pub mod operators;
pub mod rheology;
pub mod solver;
pub mod types;
pub mod vertical;

// Re-export main types for convenience
pub use analysis::HalfarDome;
pub use mesh::{IceMask, MeshError, MeshParts, PlanarQuadMeshBuilder, VoronoiMesh};
pub use rheology::{ConstantFlowLaw, CuffeyPaterson2010, FlowLaw, PatersonBudd1982};
pub use solver::{
    GeometryFields, SiaConfig, SiaDiagnostics, SiaError, SiaSolver, SlopeMethod, ThermalFields,
    ThicknessEdgeMethod, VelocityFields, status_code,
};
pub use types::{CellIndex, EdgeIndex, VertexIndex};
pub use vertical::VerticalGrid;
