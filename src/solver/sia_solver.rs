//! SIA solve orchestration.
//!
//! One call to [`SiaSolver::solve`] runs the pipeline
//!
//! ```text
//! masks → surface slopes → flow-rate factor → velocity → diagnostics
//! ```
//!
//! Configuration and shape errors are detected before any field is
//! touched. Failures of the collaborator stages (vertex reconstruction,
//! rheology) do not stop the pipeline: every stage runs, and the failures
//! are returned together with their status bits ORed.

use log::{debug, info, warn};

use super::config::SiaConfig;
use super::diagnostics::SiaDiagnostics;
use super::error::SiaError;
use super::slope::compute_surface_slopes;
use super::state::{GeometryFields, ThermalFields, VelocityFields};
use super::sia::compute_sia_velocity;
use crate::mesh::VoronoiMesh;
use crate::rheology::{FlowLaw, compute_flow_param_a};
use crate::vertical::VerticalGrid;

#[cfg(feature = "parallel")]
use super::sia::compute_sia_velocity_parallel;
#[cfg(feature = "parallel")]
use super::slope::compute_surface_slopes_parallel;
#[cfg(feature = "parallel")]
use crate::rheology::compute_flow_param_a_parallel;

/// Shallow Ice Approximation velocity solver.
///
/// # Example
///
/// ```
/// use sia_rs::mesh::PlanarQuadMeshBuilder;
/// use sia_rs::solver::{GeometryFields, SiaConfig, SiaSolver, ThermalFields, VelocityFields};
/// use sia_rs::vertical::VerticalGrid;
///
/// let mesh = PlanarQuadMeshBuilder::new(8, 8, 1000.0).build().unwrap();
/// let grid = VerticalGrid::uniform(5);
/// let thickness = (0..64).map(|c| if c % 8 < 4 { 500.0 } else { 800.0 }).collect();
/// let mut geometry = GeometryFields::flat_bed(&mesh, thickness);
/// let thermal = ThermalFields::uniform(&mesh, &grid, 263.15);
/// let mut velocity = VelocityFields::new(&mesh, &grid);
///
/// let solver = SiaSolver::new(SiaConfig::default()).unwrap();
/// let diag = solver
///     .solve(&mesh, &grid, &mut geometry, &thermal, &mut velocity)
///     .unwrap();
/// assert!(diag.max_surface_speed > 0.0);
/// ```
pub struct SiaSolver {
    config: SiaConfig,
    flow_law: Box<dyn FlowLaw>,
    parallel: bool,
}

impl SiaSolver {
    /// Validate `config` and build the solver with its flow law.
    pub fn new(config: SiaConfig) -> Result<Self, SiaError> {
        config.validate()?;
        let flow_law = config
            .flow_param_a_method
            .build(config.default_flow_param_a, config.enhancement_factor);

        info!(
            "SIA solver: slope method {}, edge thickness {}, flow law {}, n = {}",
            config.slope_method.name(),
            config.thickness_edge_method.name(),
            flow_law.name(),
            config.flow_exponent
        );

        Ok(Self {
            config,
            flow_law,
            parallel: cfg!(feature = "parallel"),
        })
    }

    /// Replace the flow law chosen by the configuration.
    pub fn with_flow_law(mut self, flow_law: Box<dyn FlowLaw>) -> Self {
        info!("SIA solver: flow law replaced by {}", flow_law.name());
        self.flow_law = flow_law;
        self
    }

    /// Run the kernels serially even when the `parallel` feature is on.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel && cfg!(feature = "parallel");
        self
    }

    /// The immutable configuration.
    pub fn config(&self) -> &SiaConfig {
        &self.config
    }

    /// The flow law in use.
    pub fn flow_law(&self) -> &dyn FlowLaw {
        self.flow_law.as_ref()
    }

    /// Whether the kernels run on the Rayon pool.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Check every field bundle against the mesh and vertical grid.
    pub fn check_dimensions(
        mesh: &VoronoiMesh,
        grid: &VerticalGrid,
        geometry: &GeometryFields,
        thermal: &ThermalFields,
        velocity: &VelocityFields,
    ) -> Result<(), SiaError> {
        let nl = grid.n_levels();
        let checks = [
            ("thickness", geometry.thickness.len(), mesh.n_cells),
            ("upper_surface", geometry.upper_surface.len(), mesh.n_cells),
            (
                "upper_surface_vertex",
                geometry.upper_surface_vertex.len(),
                mesh.n_vertices,
            ),
            ("normal_slope_edge", geometry.normal_slope_edge.len(), mesh.n_edges),
            ("tangent_slope_edge", geometry.tangent_slope_edge.len(), mesh.n_edges),
            ("slope_edge", geometry.slope_edge.len(), mesh.n_edges),
            ("cell_mask", geometry.cell_mask.len(), mesh.n_cells),
            ("edge_mask", geometry.edge_mask.len(), mesh.n_edges),
            ("temperature", thermal.temperature.len(), mesh.n_cells * nl),
            ("flow_param_a", velocity.flow_param_a.len(), mesh.n_cells * nl),
            (
                "normal_velocity",
                velocity.normal_velocity.len(),
                mesh.n_edges * grid.n_interfaces(),
            ),
        ];
        for (field, actual, expected) in checks {
            if actual != expected {
                return Err(SiaError::dimension_mismatch(field, expected, actual));
            }
        }
        if thermal.n_levels != nl {
            return Err(SiaError::dimension_mismatch("thermal.n_levels", nl, thermal.n_levels));
        }
        if velocity.n_levels != nl {
            return Err(SiaError::dimension_mismatch(
                "velocity.n_levels",
                nl,
                velocity.n_levels,
            ));
        }
        Ok(())
    }

    /// Run one velocity solve.
    ///
    /// On success the geometry bundle holds fresh masks and slopes, the
    /// velocity bundle fresh `flow_param_a` and normal velocity on the solve
    /// set, and the returned diagnostics summarize the result.
    pub fn solve(
        &self,
        mesh: &VoronoiMesh,
        grid: &VerticalGrid,
        geometry: &mut GeometryFields,
        thermal: &ThermalFields,
        velocity: &mut VelocityFields,
    ) -> Result<SiaDiagnostics, SiaError> {
        Self::check_dimensions(mesh, grid, geometry, thermal, velocity)?;
        let config = &self.config;
        let mut failures = Vec::new();

        if config.compute_masks {
            geometry.update_masks(mesh, config.dynamic_thickness);
        }

        if let Err(err) = self.surface_slopes(mesh, geometry) {
            warn!("SIA solve: {err}");
            failures.push(err);
        }

        if let Err(err) = self.flow_param_a(grid, geometry, thermal, velocity) {
            warn!("SIA solve: {err}");
            failures.push(err);
        }

        self.velocity(mesh, grid, geometry, velocity);

        let diagnostics = SiaDiagnostics::compute(mesh, grid, geometry, velocity);
        debug!("SIA solve: {}", diagnostics.summary_line());

        match SiaError::aggregate(failures) {
            Some(err) => Err(err),
            None => Ok(diagnostics),
        }
    }

    fn surface_slopes(
        &self,
        mesh: &VoronoiMesh,
        geometry: &mut GeometryFields,
    ) -> Result<(), SiaError> {
        let method = self.config.slope_method;
        #[cfg(feature = "parallel")]
        if self.parallel {
            return compute_surface_slopes_parallel(mesh, method, geometry);
        }
        compute_surface_slopes(mesh, method, geometry)
    }

    fn flow_param_a(
        &self,
        grid: &VerticalGrid,
        geometry: &GeometryFields,
        thermal: &ThermalFields,
        velocity: &mut VelocityFields,
    ) -> Result<(), SiaError> {
        let law = self.flow_law.as_ref();
        let rho_g = self.config.rho_g();
        #[cfg(feature = "parallel")]
        if self.parallel {
            return Ok(compute_flow_param_a_parallel(
                law,
                &thermal.temperature,
                &geometry.thickness,
                grid,
                rho_g,
                &mut velocity.flow_param_a,
            )?);
        }
        Ok(compute_flow_param_a(
            law,
            &thermal.temperature,
            &geometry.thickness,
            grid,
            rho_g,
            &mut velocity.flow_param_a,
        )?)
    }

    fn velocity(
        &self,
        mesh: &VoronoiMesh,
        grid: &VerticalGrid,
        geometry: &GeometryFields,
        velocity: &mut VelocityFields,
    ) {
        #[cfg(feature = "parallel")]
        if self.parallel {
            compute_sia_velocity_parallel(mesh, grid, &self.config, geometry, velocity);
            return;
        }
        compute_sia_velocity(mesh, grid, &self.config, geometry, velocity);
    }
}

impl std::fmt::Debug for SiaSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiaSolver")
            .field("config", &self.config)
            .field("flow_law", &self.flow_law.name())
            .field("parallel", &self.parallel)
            .finish()
    }
}
