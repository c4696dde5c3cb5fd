//! Layer distributions for the normalized ice-column coordinate.
//!
//! A distribution decides where the layer interfaces sit between the ice
//! surface (σ = 0) and the bed (σ = 1).
//!
//! # Available Distributions
//!
//! - [`UniformLayers`]: equal layer thicknesses
//! - [`BedRefinedLayers`]: thinner layers towards the bed, where SIA shear
//!   is concentrated (the Glimmer/CISM sigma distribution)

/// Trait for vertical layer distributions.
///
/// # Implementation Notes
///
/// - `interface_sigma` must have length `n_levels + 1`
/// - values increase strictly from 0.0 (surface) to 1.0 (bed)
pub trait LayerDistribution: Send + Sync {
    /// Compute interface sigma values, surface first.
    fn interface_sigma(&self, n_levels: usize) -> Vec<f64>;

    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;

    /// Description of parameters (for diagnostics).
    fn description(&self) -> String {
        self.name().to_string()
    }
}

/// Equal spacing in sigma.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformLayers;

impl LayerDistribution for UniformLayers {
    fn interface_sigma(&self, n_levels: usize) -> Vec<f64> {
        (0..=n_levels)
            .map(|k| k as f64 / n_levels as f64)
            .collect()
    }

    fn name(&self) -> &'static str {
        "uniform"
    }
}

/// Bed-refined distribution
/// `σ(x) = (1 - (x + 1)^(-p)) / (1 - 2^(-p))` for uniform `x ∈ [0, 1]`.
///
/// `p = 2` gives the classic Glimmer layering. Larger `p` concentrates
/// more layers near the bed.
#[derive(Clone, Copy, Debug)]
pub struct BedRefinedLayers {
    /// Refinement power (> 0).
    pub power: f64,
}

impl Default for BedRefinedLayers {
    fn default() -> Self {
        Self { power: 2.0 }
    }
}

impl LayerDistribution for BedRefinedLayers {
    fn interface_sigma(&self, n_levels: usize) -> Vec<f64> {
        let p = self.power;
        let norm = 1.0 - 2f64.powf(-p);
        let mut sigma: Vec<f64> = (0..=n_levels)
            .map(|k| {
                let x = k as f64 / n_levels as f64;
                (1.0 - (x + 1.0).powf(-p)) / norm
            })
            .collect();
        // Pin the end points exactly.
        sigma[0] = 0.0;
        sigma[n_levels] = 1.0;
        sigma
    }

    fn name(&self) -> &'static str {
        "bed_refined"
    }

    fn description(&self) -> String {
        format!("bed_refined (power={:.1})", self.power)
    }
}
