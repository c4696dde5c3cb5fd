//! Mesh representation.
//!
//! Provides the unstructured Voronoi mesh used by the ice dynamics:
//! - Flat, index-addressed connectivity and geometry arrays
//! - Solve-set (owned prefix) bookkeeping for partitioned meshes
//! - Doubly-periodic planar quad meshes for idealized experiments
//! - Dynamic-ice masks for cells and edges

mod ice_mask;
mod planar;
mod voronoi;

pub use ice_mask::{
    IceMask, IceMaskStatistics, compute_cell_masks, compute_edge_masks, dynamic_ice_indicator,
    is_dynamic_ice, masks_from_codes,
};
pub use planar::PlanarQuadMeshBuilder;
pub use voronoi::{MeshError, MeshParts, VoronoiMesh};
