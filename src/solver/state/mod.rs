//! Field bundles exchanged with the velocity solve.
//!
//! - [`GeometryFields`]: thickness, surface, slopes, masks
//! - [`ThermalFields`]: ice temperature (input)
//! - [`VelocityFields`]: flow-rate factor and normal velocity (output)

mod geometry;
mod thermal;
mod velocity;

pub use geometry::GeometryFields;
pub use thermal::ThermalFields;
pub use velocity::VelocityFields;
