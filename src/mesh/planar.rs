//! Builder for doubly-periodic planar quadrilateral Voronoi meshes.
//!
//! A regular grid of square cells is the simplest Voronoi mesh: every
//! vertex is shared by four cells (`vertex_degree = 4`) and sits at the
//! centroid of its four cell centers, so the barycentric weights and kite
//! areas are all equal. These meshes are used for idealized experiments
//! (Halfar dome, slab tests) and for testing.
//!
//! # Example
//!
//! ```
//! use sia_rs::mesh::PlanarQuadMeshBuilder;
//!
//! let mesh = PlanarQuadMeshBuilder::new(20, 10, 1000.0)
//!     .with_origin(-10_000.0, -5_000.0)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(mesh.n_cells, 200);
//! assert_eq!(mesh.n_edges, 400);
//! assert_eq!(mesh.vertex_degree, 4);
//! ```
//!
//! # Numbering
//!
//! With `c(i, j) = j * nx + i`:
//! - cell `c(i, j)` is centered at `((i + ½) dc, (j + ½) dc)`;
//! - vertex `c(i, j)` sits at `(i dc, j dc)`;
//! - edges `0 .. nx*ny` are x-normal edges at `x = i dc` between cells
//!   `(i-1, j)` and `(i, j)`;
//! - edges `nx*ny .. 2*nx*ny` are y-normal edges at `y = j dc` between
//!   cells `(i, j-1)` and `(i, j)`.

use super::voronoi::{MeshError, MeshParts, VoronoiMesh};

/// Builder for a doubly-periodic grid of square cells.
#[derive(Clone, Debug)]
pub struct PlanarQuadMeshBuilder {
    nx: usize,
    ny: usize,
    dc: f64,
    x0: f64,
    y0: f64,
}

impl PlanarQuadMeshBuilder {
    /// Create a builder for `nx × ny` cells of side `dc` (meters).
    ///
    /// # Panics
    ///
    /// Panics if `nx < 2`, `ny < 2` or `dc <= 0`: a periodic direction needs
    /// at least two cells so that no edge separates a cell from itself.
    pub fn new(nx: usize, ny: usize, dc: f64) -> Self {
        assert!(
            nx >= 2 && ny >= 2,
            "Need at least two cells in each periodic direction"
        );
        assert!(dc > 0.0, "Cell spacing must be positive");

        Self {
            nx,
            ny,
            dc,
            x0: 0.0,
            y0: 0.0,
        }
    }

    /// Place the lower-left mesh corner at `(x0, y0)`.
    pub fn with_origin(mut self, x0: f64, y0: f64) -> Self {
        self.x0 = x0;
        self.y0 = y0;
        self
    }

    /// Assemble the mesh arrays and ingest them.
    pub fn build(&self) -> Result<VoronoiMesh, MeshError> {
        let (nx, ny, dc) = (self.nx, self.ny, self.dc);
        let n = nx * ny;
        let id = |i: usize, j: usize| (j % ny) * nx + (i % nx);
        let west = |i: usize| (i + nx - 1) % nx;
        let south = |j: usize| (j + ny - 1) % ny;

        let mut parts = MeshParts {
            vertex_degree: 4,
            max_edges2: 4,
            ..Default::default()
        };

        for j in 0..ny {
            for i in 0..nx {
                parts.x_cell.push(self.x0 + (i as f64 + 0.5) * dc);
                parts.y_cell.push(self.y0 + (j as f64 + 0.5) * dc);
                parts.area_cell.push(dc * dc);

                // Vertex at the south-west corner of cell (i, j); cells
                // listed counter-clockwise starting south-west.
                parts.x_vertex.push(self.x0 + i as f64 * dc);
                parts.y_vertex.push(self.y0 + j as f64 * dc);
                parts.cells_on_vertex.extend_from_slice(&[
                    id(west(i), south(j)),
                    id(i, south(j)),
                    id(i, j),
                    id(west(i), j),
                ]);
                parts.bary_weights_on_vertex.extend_from_slice(&[0.25; 4]);
                parts
                    .kite_areas_on_vertex
                    .extend_from_slice(&[0.25 * dc * dc; 4]);
                parts.area_triangle.push(dc * dc);
            }
        }

        // x-normal edges: tangent (k × x̂) points north.
        for j in 0..ny {
            for i in 0..nx {
                parts.x_edge.push(self.x0 + i as f64 * dc);
                parts.y_edge.push(self.y0 + (j as f64 + 0.5) * dc);
                parts.cells_on_edge.push([id(west(i), j), id(i, j)]);
                parts.vertices_on_edge.push([id(i, j), id(i, j + 1)]);
                parts.dc_edge.push(dc);
                parts.dv_edge.push(dc);
                parts.n_edges_on_edge.push(4);
                parts.edges_on_edge.extend_from_slice(&[
                    n + id(west(i), j),
                    n + id(i, j),
                    n + id(west(i), j + 1),
                    n + id(i, j + 1),
                ]);
                parts.weights_on_edge.extend_from_slice(&[0.25; 4]);
            }
        }

        // y-normal edges: tangent (k × ŷ) points west.
        for j in 0..ny {
            for i in 0..nx {
                parts.x_edge.push(self.x0 + (i as f64 + 0.5) * dc);
                parts.y_edge.push(self.y0 + j as f64 * dc);
                parts.cells_on_edge.push([id(i, south(j)), id(i, j)]);
                parts.vertices_on_edge.push([id(i + 1, j), id(i, j)]);
                parts.dc_edge.push(dc);
                parts.dv_edge.push(dc);
                parts.n_edges_on_edge.push(4);
                parts.edges_on_edge.extend_from_slice(&[
                    id(i, south(j)),
                    id(i + 1, south(j)),
                    id(i, j),
                    id(i + 1, j),
                ]);
                parts.weights_on_edge.extend_from_slice(&[-0.25; 4]);
            }
        }

        VoronoiMesh::from_parts(parts)
    }
}
