//! Solve diagnostics.
//!
//! - [`SiaDiagnostics`]: dynamic edge count, peak speeds, CFL time step

mod diagnostics;

pub use diagnostics::SiaDiagnostics;
