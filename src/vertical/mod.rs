//! Vertical discretization of the ice column.
//!
//! Every column uses the same normalized coordinate σ ∈ [0, 1], measured
//! as fractional depth below the upper surface:
//!
//! - σ = 0 at the ice surface
//! - σ = 1 at the bed
//!
//! The physical depth below the surface is `d = σ H`. Because the SIA
//! velocity has a closed-form vertical profile in σ, the velocity solver
//! integrates it exactly layer by layer on this grid.
//!
//! # Example
//!
//! ```
//! use sia_rs::vertical::{BedRefinedLayers, VerticalGrid};
//!
//! let grid = VerticalGrid::new(10, BedRefinedLayers::default());
//! assert_eq!(grid.interface_sigma()[0], 0.0);
//! assert_eq!(grid.interface_sigma()[10], 1.0);
//!
//! // Or from explicit layer thickness fractions, surface layer first
//! let grid = VerticalGrid::from_thickness_fractions(&[0.4, 0.3, 0.2, 0.1]).unwrap();
//! assert_eq!(grid.n_levels(), 4);
//! ```

mod distribution;
mod grid;

pub use distribution::{BedRefinedLayers, LayerDistribution, UniformLayers};
pub use grid::{VerticalGrid, VerticalGridError};
