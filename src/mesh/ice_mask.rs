//! Ice masks for cells and edges.
//!
//! Every cell and edge is classified as one of:
//! - [`IceMask::NoIce`]: no ice at all;
//! - [`IceMask::NonDynamic`]: ice present but thinner than the dynamic
//!   thickness threshold, so it does not flow;
//! - [`IceMask::Dynamic`]: ice thick enough to take part in the velocity
//!   solve.
//!
//! Upstream mask producers exchange masks as integer bit fields. Those
//! codes are converted to [`IceMask`] once with [`IceMask::from_code`] and
//! never carried past that point.
//!
//! # Example
//!
//! ```
//! use sia_rs::mesh::{IceMask, is_dynamic_ice, dynamic_ice_indicator};
//!
//! let mask = IceMask::from_thickness(250.0, 100.0);
//! assert_eq!(mask, IceMask::Dynamic);
//! assert!(is_dynamic_ice(mask));
//! assert_eq!(dynamic_ice_indicator(IceMask::NonDynamic), 0);
//! ```

use super::voronoi::{MeshError, VoronoiMesh};

/// Classification of a cell or edge with respect to flowing ice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IceMask {
    /// Ice-free.
    #[default]
    NoIce,
    /// Ice present but below the dynamic thickness.
    NonDynamic,
    /// Ice that flows.
    Dynamic,
}

impl IceMask {
    /// Bit set in integer mask codes when ice is present.
    pub const ICE_BIT: i32 = 1 << 1;
    /// Bit set in integer mask codes when the ice is dynamic.
    pub const DYNAMIC_BIT: i32 = 1 << 2;

    /// Convert an integer mask code into a classification.
    ///
    /// Bits other than [`Self::ICE_BIT`] and [`Self::DYNAMIC_BIT`] are
    /// ignored. A code with the dynamic bit but without the ice bit, or a
    /// negative code, is rejected.
    pub fn from_code(code: i32) -> Result<Self, MeshError> {
        if code < 0 {
            return Err(MeshError::InvalidMaskCode(code));
        }
        let ice = code & Self::ICE_BIT != 0;
        let dynamic = code & Self::DYNAMIC_BIT != 0;
        match (ice, dynamic) {
            (false, false) => Ok(IceMask::NoIce),
            (true, false) => Ok(IceMask::NonDynamic),
            (true, true) => Ok(IceMask::Dynamic),
            (false, true) => Err(MeshError::InvalidMaskCode(code)),
        }
    }

    /// Integer code of this classification (inverse of [`Self::from_code`]).
    pub fn code(self) -> i32 {
        match self {
            IceMask::NoIce => 0,
            IceMask::NonDynamic => Self::ICE_BIT,
            IceMask::Dynamic => Self::ICE_BIT | Self::DYNAMIC_BIT,
        }
    }

    /// Classify a cell from its ice thickness.
    #[inline]
    pub fn from_thickness(thickness: f64, dynamic_thickness: f64) -> Self {
        if thickness > dynamic_thickness {
            IceMask::Dynamic
        } else if thickness > 0.0 {
            IceMask::NonDynamic
        } else {
            IceMask::NoIce
        }
    }

    /// Classification of an edge bounded by cells with masks `self` and
    /// `other`: the edge is as dynamic as its most dynamic cell.
    #[inline]
    pub fn combine(self, other: Self) -> Self {
        self.max(other)
    }

    /// True if any ice is present.
    #[inline]
    pub fn has_ice(self) -> bool {
        self != IceMask::NoIce
    }
}

/// True if the mask marks dynamic ice.
#[inline]
pub fn is_dynamic_ice(mask: IceMask) -> bool {
    mask == IceMask::Dynamic
}

/// 1 for dynamic ice, 0 otherwise; used as an arithmetic blending weight.
#[inline]
pub fn dynamic_ice_indicator(mask: IceMask) -> i32 {
    i32::from(is_dynamic_ice(mask))
}

/// Classify every cell from its thickness.
pub fn compute_cell_masks(thickness: &[f64], dynamic_thickness: f64, cell_mask: &mut [IceMask]) {
    debug_assert_eq!(thickness.len(), cell_mask.len());
    for (mask, &h) in cell_mask.iter_mut().zip(thickness) {
        *mask = IceMask::from_thickness(h, dynamic_thickness);
    }
}

/// Classify every edge from the masks of its two cells.
///
/// An edge is dynamic iff at least one bounding cell is dynamic.
pub fn compute_edge_masks(mesh: &VoronoiMesh, cell_mask: &[IceMask], edge_mask: &mut [IceMask]) {
    debug_assert_eq!(cell_mask.len(), mesh.n_cells);
    debug_assert_eq!(edge_mask.len(), mesh.n_edges);
    for (mask, cells) in edge_mask.iter_mut().zip(&mesh.cells_on_edge) {
        *mask = cell_mask[cells[0]].combine(cell_mask[cells[1]]);
    }
}

/// Convert raw integer codes into masks at the ingestion boundary.
pub fn masks_from_codes(codes: &[i32]) -> Result<Vec<IceMask>, MeshError> {
    codes.iter().map(|&c| IceMask::from_code(c)).collect()
}

/// Counts of each mask class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IceMaskStatistics {
    /// Number of classified elements
    pub total: usize,
    /// Elements with dynamic ice
    pub dynamic: usize,
    /// Elements with thin, non-dynamic ice
    pub non_dynamic: usize,
    /// Ice-free elements
    pub no_ice: usize,
}

impl IceMaskStatistics {
    /// Count the classes in a mask array.
    pub fn from_masks(masks: &[IceMask]) -> Self {
        masks.iter().fold(
            Self {
                total: masks.len(),
                ..Default::default()
            },
            |mut stats, mask| {
                match mask {
                    IceMask::Dynamic => stats.dynamic += 1,
                    IceMask::NonDynamic => stats.non_dynamic += 1,
                    IceMask::NoIce => stats.no_ice += 1,
                }
                stats
            },
        )
    }
}

impl std::fmt::Display for IceMaskStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pct = |n: usize| 100.0 * n as f64 / self.total.max(1) as f64;
        writeln!(f, "Ice Mask Statistics:")?;
        writeln!(f, "  Total: {}", self.total)?;
        writeln!(f, "  Dynamic: {} ({:.1}%)", self.dynamic, pct(self.dynamic))?;
        writeln!(
            f,
            "  Non-dynamic: {} ({:.1}%)",
            self.non_dynamic,
            pct(self.non_dynamic)
        )?;
        write!(f, "  No ice: {} ({:.1}%)", self.no_ice, pct(self.no_ice))
    }
}
