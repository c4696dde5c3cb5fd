//! Shallow Ice Approximation velocity solver.
//!
//! # Submodules
//!
//! - [`state`]: field bundles (geometry, thermal, velocity)
//! - [`diagnostics`]: solve diagnostics
//!
//! # Pipeline
//!
//! [`SiaSolver::solve`] runs, once per time step:
//!
//! 1. ice masks from thickness ([`GeometryFields::update_masks`])
//! 2. surface slopes ([`compute_surface_slopes`])
//! 3. flow-rate factor ([`crate::rheology::compute_flow_param_a`])
//! 4. velocity integral ([`compute_sia_velocity`])
//!
//! Each stage can also be called on its own. With the `parallel` feature,
//! `*_parallel` variants of the edge and cell loops run on Rayon and give
//! results identical to the serial ones.

mod config;
pub mod diagnostics;
mod error;
mod sia;
mod sia_solver;
mod slope;
pub mod state;

pub use config::{SiaConfig, SlopeMethod, ThicknessEdgeMethod};
pub use diagnostics::SiaDiagnostics;
pub use error::{SUCCESS, SiaError, SolveStage, status_code};
pub use sia::{
    SiaVelocityKernel, compute_sia_velocity, edge_thickness, position_independent_factor,
};
pub use sia_solver::SiaSolver;
pub use slope::{
    compute_normal_slope, compute_slope_magnitude, compute_surface_slopes, compute_tangent_slope,
    reconstruct_vertex_surface,
};
pub use state::{GeometryFields, ThermalFields, VelocityFields};

#[cfg(feature = "parallel")]
pub use sia::compute_sia_velocity_parallel;
#[cfg(feature = "parallel")]
pub use slope::compute_surface_slopes_parallel;
