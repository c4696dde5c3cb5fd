//! Analytic reference solutions and validation metrics.
//!
//! - [`HalfarDome`]: similarity solution of a spreading SIA dome
//! - [`ErrorMetrics`], [`rms_error`]: model vs. reference comparison

mod halfar;
mod metrics;

pub use halfar::HalfarDome;
pub use metrics::{ErrorMetrics, rms_error};
