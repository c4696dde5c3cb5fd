//! Vertical grid for the normalized ice-column coordinate.
//!
//! The coordinate σ is the fractional depth below the ice surface:
//!
//! ```text
//! σ = (s - z) / H
//! ```
//!
//! - σ = 0 at the upper surface (interface 0)
//! - σ = 1 at the bed (interface `n_levels`, the deepest interface)
//!
//! Layer `k` lies between interfaces `k` and `k + 1`. The same grid is
//! shared by every column of the mesh.
//!
//! # Example
//!
//! ```
//! use sia_rs::vertical::{VerticalGrid, UniformLayers};
//!
//! let grid = VerticalGrid::new(10, UniformLayers);
//! assert_eq!(grid.n_levels(), 10);
//! assert_eq!(grid.n_interfaces(), 11);
//!
//! // Depth below the surface of the middle of layer 0 in 1000 m of ice
//! let d = grid.depth_at_center(0, 1000.0);
//! assert!((d - 50.0).abs() < 1e-10);
//! ```

use log::warn;
use thiserror::Error;

use super::distribution::{LayerDistribution, UniformLayers};

/// Error type for vertical grid construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VerticalGridError {
    /// No layers were given.
    #[error("Vertical grid needs at least one layer")]
    NoLayers,

    /// A layer thickness fraction is not strictly positive.
    #[error("Layer {level} has non-positive thickness fraction {value}")]
    NonPositiveFraction { level: usize, value: f64 },
}

/// Relative tolerance on the sum of layer thickness fractions before they
/// are renormalized.
const FRACTION_SUM_TOL: f64 = 1e-10;

/// Vertical grid shared by all ice columns.
///
/// # Memory Layout
///
/// All arrays are contiguous `Vec<f64>` indexed surface-first.
#[derive(Clone)]
pub struct VerticalGrid {
    /// Number of layers.
    n_levels: usize,

    /// σ at layer interfaces, length = n_levels + 1.
    /// interface_sigma[0] = 0 (surface), interface_sigma[n_levels] = 1 (bed).
    interface_sigma: Vec<f64>,

    /// σ at layer midpoints, length = n_levels.
    center_sigma: Vec<f64>,

    /// Layer thickness fractions, length = n_levels, summing to one.
    thickness_fractions: Vec<f64>,

    /// Description of how the layers were generated.
    description: String,
}

impl VerticalGrid {
    /// Create a grid from a layer distribution.
    ///
    /// # Panics
    ///
    /// Panics if `n_levels == 0`.
    pub fn new(n_levels: usize, distribution: impl LayerDistribution) -> Self {
        assert!(n_levels > 0, "Vertical grid needs at least one layer");
        let interface_sigma = distribution.interface_sigma(n_levels);
        Self::from_interfaces(interface_sigma, distribution.description())
    }

    /// Create a uniform grid (convenience constructor).
    #[inline]
    pub fn uniform(n_levels: usize) -> Self {
        Self::new(n_levels, UniformLayers)
    }

    /// Create a grid from layer thickness fractions, surface layer first.
    ///
    /// Fractions that do not sum to one are renormalized with a warning.
    pub fn from_thickness_fractions(fractions: &[f64]) -> Result<Self, VerticalGridError> {
        if fractions.is_empty() {
            return Err(VerticalGridError::NoLayers);
        }
        if let Some(level) = fractions.iter().position(|&f| !(f > 0.0)) {
            return Err(VerticalGridError::NonPositiveFraction {
                level,
                value: fractions[level],
            });
        }

        let total: f64 = fractions.iter().sum();
        if (total - 1.0).abs() > FRACTION_SUM_TOL {
            warn!(
                "Layer thickness fractions sum to {:.12}; renormalizing {} layers",
                total,
                fractions.len()
            );
        }

        let mut interface_sigma = Vec::with_capacity(fractions.len() + 1);
        let mut acc = 0.0;
        interface_sigma.push(0.0);
        for &f in fractions {
            acc += f / total;
            interface_sigma.push(acc);
        }
        // Guard against round-off at the bed.
        if let Some(last) = interface_sigma.last_mut() {
            *last = 1.0;
        }

        Ok(Self::from_interfaces(
            interface_sigma,
            format!("fractions ({} layers)", fractions.len()),
        ))
    }

    fn from_interfaces(interface_sigma: Vec<f64>, description: String) -> Self {
        let n_levels = interface_sigma.len() - 1;
        let thickness_fractions: Vec<f64> = (0..n_levels)
            .map(|k| interface_sigma[k + 1] - interface_sigma[k])
            .collect();
        let center_sigma: Vec<f64> = (0..n_levels)
            .map(|k| 0.5 * (interface_sigma[k] + interface_sigma[k + 1]))
            .collect();

        Self {
            n_levels,
            interface_sigma,
            center_sigma,
            thickness_fractions,
            description,
        }
    }

    /// Number of layers.
    #[inline]
    pub fn n_levels(&self) -> usize {
        self.n_levels
    }

    /// Number of layer interfaces (`n_levels + 1`).
    #[inline]
    pub fn n_interfaces(&self) -> usize {
        self.n_levels + 1
    }

    /// Index of the deepest interface (the bed).
    #[inline]
    pub fn bed_interface(&self) -> usize {
        self.n_levels
    }

    /// σ at interfaces, surface first.
    #[inline]
    pub fn interface_sigma(&self) -> &[f64] {
        &self.interface_sigma
    }

    /// σ at layer midpoints.
    #[inline]
    pub fn center_sigma(&self) -> &[f64] {
        &self.center_sigma
    }

    /// Layer thickness fractions.
    #[inline]
    pub fn thickness_fractions(&self) -> &[f64] {
        &self.thickness_fractions
    }

    /// Description of the layer distribution.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// `σ^p` at every interface.
    ///
    /// The SIA integral needs `σ^(n+1)`; computing it once per solve keeps
    /// `powf` out of the per-edge loop.
    pub fn interface_sigma_powers(&self, p: f64) -> Vec<f64> {
        self.interface_sigma.iter().map(|s| s.powf(p)).collect()
    }

    /// Depth below the surface of the middle of layer `level`.
    #[inline]
    pub fn depth_at_center(&self, level: usize, thickness: f64) -> f64 {
        self.center_sigma[level] * thickness
    }

    /// Height above the bed of interface `k`, as a fraction of thickness.
    #[inline]
    pub fn height_fraction(&self, interface: usize) -> f64 {
        1.0 - self.interface_sigma[interface]
    }

    /// Find the layer containing a σ value; None outside [0, 1].
    pub fn find_level(&self, sigma: f64) -> Option<usize> {
        if !(0.0..=1.0).contains(&sigma) {
            return None;
        }
        let k = self.interface_sigma.partition_point(|&s| s <= sigma);
        Some(k.saturating_sub(1).min(self.n_levels - 1))
    }
}

impl std::fmt::Debug for VerticalGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerticalGrid")
            .field("n_levels", &self.n_levels)
            .field("layers", &self.description)
            .finish()
    }
}

impl std::fmt::Display for VerticalGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "VerticalGrid({} levels, {})",
            self.n_levels, self.description
        )
    }
}
