//! Voronoi mesh arena for unstructured polygonal meshes.
//!
//! The mesh is stored as flat, index-addressed arrays in the layout used by
//! spherical and planar Voronoi (MPAS-style) meshes:
//!
//! - every edge separates two cells (`cells_on_edge`) and joins two
//!   vertices (`vertices_on_edge`);
//! - every vertex is surrounded by exactly `vertex_degree` cells;
//! - variable-length neighbor lists are stored at a fixed width together
//!   with a count.
//!
//! # Orientation
//!
//! The positive normal direction of an edge points from `cells_on_edge[0]`
//! to `cells_on_edge[1]`. The positive tangential direction is the normal
//! rotated 90° counter-clockwise (k × n) and points from
//! `vertices_on_edge[0]` to `vertices_on_edge[1]`.
//!
//! # Solve set
//!
//! A partitioned mesh stores owned elements first and halo elements after
//! them. `n_*_solve` gives the length of the owned prefix; for a serial mesh
//! it equals the total count.

use thiserror::Error;

use crate::types::{CellIndex, EdgeIndex, VertexIndex};

/// Error type for mesh ingestion.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// An array does not have the length implied by the mesh dimensions.
    #[error("Array '{name}' has length {actual}, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A connectivity entry points outside its index space.
    #[error("Array '{name}' entry {position} references index {index} (limit {limit})")]
    IndexOutOfRange {
        name: &'static str,
        position: usize,
        index: usize,
        limit: usize,
    },

    /// A solve-set count exceeds the total count.
    #[error("Solve count for {name} is {solve}, but only {total} exist")]
    InvalidSolveCount {
        name: &'static str,
        solve: usize,
        total: usize,
    },

    /// A geometric quantity is not strictly positive.
    #[error("Array '{name}' entry {position} must be positive, got {value}")]
    NonPositiveGeometry {
        name: &'static str,
        position: usize,
        value: f64,
    },

    /// A raw ice-mask code could not be classified.
    #[error("Invalid ice mask code: {0}")]
    InvalidMaskCode(i32),
}

/// Raw mesh arrays as handed over by the mesh framework.
///
/// Connectivity is given as raw zero-based `usize` indices; it is range
/// checked and converted to typed indices by [`VoronoiMesh::from_parts`].
#[derive(Clone, Debug, Default)]
pub struct MeshParts {
    /// Number of cells around each vertex (3 for hexagonal meshes).
    pub vertex_degree: usize,
    /// Fixed width of the `edges_on_edge` / `weights_on_edge` stencils.
    pub max_edges2: usize,

    /// Cell center coordinates.
    pub x_cell: Vec<f64>,
    pub y_cell: Vec<f64>,
    /// Cell areas.
    pub area_cell: Vec<f64>,

    /// Edge midpoint coordinates.
    pub x_edge: Vec<f64>,
    pub y_edge: Vec<f64>,
    /// Cells on either side of each edge.
    pub cells_on_edge: Vec<[usize; 2]>,
    /// Vertices at either end of each edge.
    pub vertices_on_edge: Vec<[usize; 2]>,
    /// Distance between the two cell centers of each edge.
    pub dc_edge: Vec<f64>,
    /// Length of each edge (distance between its two vertices).
    pub dv_edge: Vec<f64>,

    /// Number of entries used in each row of `edges_on_edge`.
    pub n_edges_on_edge: Vec<usize>,
    /// Tangential reconstruction stencil, `n_edges * max_edges2`.
    pub edges_on_edge: Vec<usize>,
    /// Tangential reconstruction weights, `n_edges * max_edges2`.
    pub weights_on_edge: Vec<f64>,

    /// Vertex coordinates.
    pub x_vertex: Vec<f64>,
    pub y_vertex: Vec<f64>,
    /// Cells around each vertex, `n_vertices * vertex_degree`.
    pub cells_on_vertex: Vec<usize>,
    /// Barycentric weights of the vertex location in the triangle of
    /// surrounding cell centers, `n_vertices * vertex_degree`.
    pub bary_weights_on_vertex: Vec<f64>,
    /// Kite areas (intersection of the dual triangle with each cell),
    /// `n_vertices * vertex_degree`.
    pub kite_areas_on_vertex: Vec<f64>,
    /// Dual triangle areas.
    pub area_triangle: Vec<f64>,

    /// Owned-prefix counts; `None` means everything is owned.
    pub n_cells_solve: Option<usize>,
    pub n_edges_solve: Option<usize>,
    pub n_vertices_solve: Option<usize>,
}

/// Unstructured Voronoi mesh with fixed-width connectivity.
///
/// Immutable once constructed.
#[derive(Clone)]
pub struct VoronoiMesh {
    /// Number of cells (owned + halo)
    pub n_cells: usize,
    /// Number of edges (owned + halo)
    pub n_edges: usize,
    /// Number of vertices (owned + halo)
    pub n_vertices: usize,

    /// Length of the owned cell prefix
    pub n_cells_solve: usize,
    /// Length of the owned edge prefix
    pub n_edges_solve: usize,
    /// Length of the owned vertex prefix
    pub n_vertices_solve: usize,

    /// Cells around each vertex
    pub vertex_degree: usize,
    /// Stencil width of `edges_on_edge`
    pub max_edges2: usize,

    pub x_cell: Vec<f64>,
    pub y_cell: Vec<f64>,
    pub area_cell: Vec<f64>,

    pub x_edge: Vec<f64>,
    pub y_edge: Vec<f64>,
    pub cells_on_edge: Vec<[CellIndex; 2]>,
    pub vertices_on_edge: Vec<[VertexIndex; 2]>,
    pub dc_edge: Vec<f64>,
    pub dv_edge: Vec<f64>,
    pub n_edges_on_edge: Vec<usize>,
    pub edges_on_edge: Vec<EdgeIndex>,
    pub weights_on_edge: Vec<f64>,

    pub x_vertex: Vec<f64>,
    pub y_vertex: Vec<f64>,
    pub cells_on_vertex: Vec<CellIndex>,
    pub bary_weights_on_vertex: Vec<f64>,
    pub kite_areas_on_vertex: Vec<f64>,
    pub area_triangle: Vec<f64>,
}

fn check_len(name: &'static str, actual: usize, expected: usize) -> Result<(), MeshError> {
    if actual == expected {
        Ok(())
    } else {
        Err(MeshError::LengthMismatch {
            name,
            expected,
            actual,
        })
    }
}

fn check_positive(name: &'static str, values: &[f64]) -> Result<(), MeshError> {
    match values.iter().position(|&v| !(v > 0.0)) {
        Some(position) => Err(MeshError::NonPositiveGeometry {
            name,
            position,
            value: values[position],
        }),
        None => Ok(()),
    }
}

fn convert_indices<I: From<usize>>(
    name: &'static str,
    raw: &[usize],
    limit: usize,
) -> Result<Vec<I>, MeshError> {
    raw.iter()
        .enumerate()
        .map(|(position, &index)| {
            if index < limit {
                Ok(I::from(index))
            } else {
                Err(MeshError::IndexOutOfRange {
                    name,
                    position,
                    index,
                    limit,
                })
            }
        })
        .collect()
}

fn convert_pairs<I: From<usize> + Copy>(
    name: &'static str,
    raw: &[[usize; 2]],
    limit: usize,
) -> Result<Vec<[I; 2]>, MeshError> {
    let flat: Vec<usize> = raw.iter().flatten().copied().collect();
    let typed: Vec<I> = convert_indices(name, &flat, limit)?;
    Ok(typed.chunks_exact(2).map(|p| [p[0], p[1]]).collect())
}

fn solve_count(name: &'static str, solve: Option<usize>, total: usize) -> Result<usize, MeshError> {
    match solve {
        None => Ok(total),
        Some(n) if n <= total => Ok(n),
        Some(n) => Err(MeshError::InvalidSolveCount {
            name,
            solve: n,
            total,
        }),
    }
}

impl VoronoiMesh {
    /// Ingest raw mesh arrays, checking shapes and index ranges.
    ///
    /// The element counts are taken from `x_cell`, `x_edge` and `x_vertex`;
    /// every other array must agree with them.
    pub fn from_parts(parts: MeshParts) -> Result<Self, MeshError> {
        let n_cells = parts.x_cell.len();
        let n_edges = parts.x_edge.len();
        let n_vertices = parts.x_vertex.len();
        let degree = parts.vertex_degree;
        let width = parts.max_edges2;

        check_len("y_cell", parts.y_cell.len(), n_cells)?;
        check_len("area_cell", parts.area_cell.len(), n_cells)?;

        check_len("y_edge", parts.y_edge.len(), n_edges)?;
        check_len("cells_on_edge", parts.cells_on_edge.len(), n_edges)?;
        check_len("vertices_on_edge", parts.vertices_on_edge.len(), n_edges)?;
        check_len("dc_edge", parts.dc_edge.len(), n_edges)?;
        check_len("dv_edge", parts.dv_edge.len(), n_edges)?;
        check_len("n_edges_on_edge", parts.n_edges_on_edge.len(), n_edges)?;
        check_len("edges_on_edge", parts.edges_on_edge.len(), n_edges * width)?;
        check_len("weights_on_edge", parts.weights_on_edge.len(), n_edges * width)?;

        check_len("y_vertex", parts.y_vertex.len(), n_vertices)?;
        check_len("cells_on_vertex", parts.cells_on_vertex.len(), n_vertices * degree)?;
        check_len(
            "bary_weights_on_vertex",
            parts.bary_weights_on_vertex.len(),
            n_vertices * degree,
        )?;
        check_len(
            "kite_areas_on_vertex",
            parts.kite_areas_on_vertex.len(),
            n_vertices * degree,
        )?;
        check_len("area_triangle", parts.area_triangle.len(), n_vertices)?;

        check_positive("dc_edge", &parts.dc_edge)?;
        check_positive("dv_edge", &parts.dv_edge)?;
        check_positive("area_triangle", &parts.area_triangle)?;

        if let Some(position) = parts.n_edges_on_edge.iter().position(|&n| n > width) {
            return Err(MeshError::IndexOutOfRange {
                name: "n_edges_on_edge",
                position,
                index: parts.n_edges_on_edge[position],
                limit: width + 1,
            });
        }

        let cells_on_edge = convert_pairs("cells_on_edge", &parts.cells_on_edge, n_cells)?;
        let vertices_on_edge =
            convert_pairs("vertices_on_edge", &parts.vertices_on_edge, n_vertices)?;
        let edges_on_edge = convert_indices("edges_on_edge", &parts.edges_on_edge, n_edges)?;
        let cells_on_vertex = convert_indices("cells_on_vertex", &parts.cells_on_vertex, n_cells)?;

        Ok(Self {
            n_cells,
            n_edges,
            n_vertices,
            n_cells_solve: solve_count("cells", parts.n_cells_solve, n_cells)?,
            n_edges_solve: solve_count("edges", parts.n_edges_solve, n_edges)?,
            n_vertices_solve: solve_count("vertices", parts.n_vertices_solve, n_vertices)?,
            vertex_degree: degree,
            max_edges2: width,
            x_cell: parts.x_cell,
            y_cell: parts.y_cell,
            area_cell: parts.area_cell,
            x_edge: parts.x_edge,
            y_edge: parts.y_edge,
            cells_on_edge,
            vertices_on_edge,
            dc_edge: parts.dc_edge,
            dv_edge: parts.dv_edge,
            n_edges_on_edge: parts.n_edges_on_edge,
            edges_on_edge,
            weights_on_edge: parts.weights_on_edge,
            x_vertex: parts.x_vertex,
            y_vertex: parts.y_vertex,
            cells_on_vertex,
            bary_weights_on_vertex: parts.bary_weights_on_vertex,
            kite_areas_on_vertex: parts.kite_areas_on_vertex,
            area_triangle: parts.area_triangle,
        })
    }

    /// Restrict the solve set to owned prefixes of a partitioned mesh.
    pub fn with_solve_counts(
        mut self,
        n_cells_solve: usize,
        n_edges_solve: usize,
        n_vertices_solve: usize,
    ) -> Result<Self, MeshError> {
        self.n_cells_solve = solve_count("cells", Some(n_cells_solve), self.n_cells)?;
        self.n_edges_solve = solve_count("edges", Some(n_edges_solve), self.n_edges)?;
        self.n_vertices_solve =
            solve_count("vertices", Some(n_vertices_solve), self.n_vertices)?;
        Ok(self)
    }

    /// The two cells separated by an edge, `[cell1, cell2]`.
    #[inline]
    pub fn cells_on_edge(&self, edge: EdgeIndex) -> [CellIndex; 2] {
        self.cells_on_edge[edge]
    }

    /// The two vertices joined by an edge, `[vertex1, vertex2]`.
    #[inline]
    pub fn vertices_on_edge(&self, edge: EdgeIndex) -> [VertexIndex; 2] {
        self.vertices_on_edge[edge]
    }

    /// Cells around a vertex (`vertex_degree` entries).
    #[inline]
    pub fn cells_on_vertex(&self, vertex: VertexIndex) -> &[CellIndex] {
        let start = vertex.get() * self.vertex_degree;
        &self.cells_on_vertex[start..start + self.vertex_degree]
    }

    /// Barycentric weights matching [`Self::cells_on_vertex`].
    #[inline]
    pub fn bary_weights_on_vertex(&self, vertex: VertexIndex) -> &[f64] {
        let start = vertex.get() * self.vertex_degree;
        &self.bary_weights_on_vertex[start..start + self.vertex_degree]
    }

    /// Kite areas matching [`Self::cells_on_vertex`].
    #[inline]
    pub fn kite_areas_on_vertex(&self, vertex: VertexIndex) -> &[f64] {
        let start = vertex.get() * self.vertex_degree;
        &self.kite_areas_on_vertex[start..start + self.vertex_degree]
    }

    /// Tangential reconstruction stencil of an edge as (edges, weights).
    #[inline]
    pub fn tangent_stencil(&self, edge: EdgeIndex) -> (&[EdgeIndex], &[f64]) {
        let start = edge.get() * self.max_edges2;
        let end = start + self.n_edges_on_edge[edge];
        (&self.edges_on_edge[start..end], &self.weights_on_edge[start..end])
    }

    /// Iterator over all edges, owned and halo.
    pub fn edges(&self) -> impl ExactSizeIterator<Item = EdgeIndex> + DoubleEndedIterator {
        EdgeIndex::iter(self.n_edges)
    }

    /// Iterator over the owned edges.
    pub fn solve_edges(&self) -> impl ExactSizeIterator<Item = EdgeIndex> + DoubleEndedIterator {
        EdgeIndex::iter(self.n_edges_solve)
    }

    /// Iterator over all cells.
    pub fn cells(&self) -> impl ExactSizeIterator<Item = CellIndex> + DoubleEndedIterator {
        CellIndex::iter(self.n_cells)
    }

    /// Iterator over all vertices.
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = VertexIndex> + DoubleEndedIterator {
        VertexIndex::iter(self.n_vertices)
    }

    /// Smallest cell-center spacing, used for CFL estimates.
    pub fn min_dc_edge(&self) -> f64 {
        self.dc_edge.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Total area of the owned cells.
    pub fn total_area(&self) -> f64 {
        self.area_cell[..self.n_cells_solve].iter().sum()
    }
}

impl std::fmt::Debug for VoronoiMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoronoiMesh")
            .field("n_cells", &self.n_cells)
            .field("n_edges", &self.n_edges)
            .field("n_vertices", &self.n_vertices)
            .field("n_edges_solve", &self.n_edges_solve)
            .field("vertex_degree", &self.vertex_degree)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two square cells sharing one edge, closed periodically in x.
    fn two_cell_parts() -> MeshParts {
        MeshParts {
            vertex_degree: 2,
            max_edges2: 1,
            x_cell: vec![0.5, 1.5],
            y_cell: vec![0.5, 0.5],
            area_cell: vec![1.0, 1.0],
            x_edge: vec![1.0, 0.0],
            y_edge: vec![0.5, 0.5],
            cells_on_edge: vec![[0, 1], [1, 0]],
            vertices_on_edge: vec![[0, 1], [2, 3]],
            dc_edge: vec![1.0, 1.0],
            dv_edge: vec![1.0, 1.0],
            n_edges_on_edge: vec![0, 0],
            edges_on_edge: vec![0, 0],
            weights_on_edge: vec![0.0, 0.0],
            x_vertex: vec![1.0, 1.0, 0.0, 0.0],
            y_vertex: vec![0.0, 1.0, 1.0, 0.0],
            cells_on_vertex: vec![0, 1, 0, 1, 1, 0, 1, 0],
            bary_weights_on_vertex: vec![0.5; 8],
            kite_areas_on_vertex: vec![0.25; 8],
            area_triangle: vec![0.5; 4],
            ..Default::default()
        }
    }

    #[test]
    fn test_from_parts_converts_connectivity() {
        let mesh = VoronoiMesh::from_parts(two_cell_parts()).unwrap();
        assert_eq!(mesh.n_cells, 2);
        assert_eq!(mesh.n_edges, 2);
        assert_eq!(mesh.n_vertices, 4);
        assert_eq!(mesh.n_edges_solve, 2);
        assert_eq!(
            mesh.cells_on_edge(EdgeIndex::new(1)),
            [CellIndex::new(1), CellIndex::new(0)]
        );
        assert_eq!(mesh.cells_on_vertex(VertexIndex::new(2)).len(), 2);
        assert!((mesh.total_area() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_parts_rejects_bad_index() {
        let mut parts = two_cell_parts();
        parts.cells_on_edge[1] = [1, 7];
        let err = VoronoiMesh::from_parts(parts).unwrap_err();
        assert!(matches!(
            err,
            MeshError::IndexOutOfRange {
                name: "cells_on_edge",
                index: 7,
                ..
            }
        ));
    }

    #[test]
    fn test_from_parts_rejects_length_mismatch() {
        let mut parts = two_cell_parts();
        parts.dv_edge.pop();
        let err = VoronoiMesh::from_parts(parts).unwrap_err();
        assert_eq!(
            err,
            MeshError::LengthMismatch {
                name: "dv_edge",
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_from_parts_rejects_zero_edge_length() {
        let mut parts = two_cell_parts();
        parts.dc_edge[0] = 0.0;
        assert!(matches!(
            VoronoiMesh::from_parts(parts),
            Err(MeshError::NonPositiveGeometry { name: "dc_edge", .. })
        ));
    }

    #[test]
    fn test_solve_counts() {
        let mesh = VoronoiMesh::from_parts(two_cell_parts()).unwrap();
        let mesh = mesh.with_solve_counts(1, 1, 2).unwrap();
        assert_eq!(mesh.solve_edges().len(), 1);
        assert_eq!(mesh.edges().len(), 2);

        let mesh = VoronoiMesh::from_parts(two_cell_parts()).unwrap();
        assert!(mesh.with_solve_counts(3, 1, 1).is_err());
    }
}
