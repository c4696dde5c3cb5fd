//! Halfar similarity solution for a radially symmetric ice dome.
//!
//! For n = 3, a flat bed and no accumulation, the SIA thickness evolution
//! has the closed-form solution (Halfar, 1983; Bueler et al., 2005):
//!
//! ```text
//! H(r, t) = H₀ α [1 - (β r / R₀)^(4/3)]^(3/7)
//! α = (t₀/t)^(1/9),  β = (t₀/t)^(1/18)
//! t₀ = (1 / 18Γ) (7/4)³ R₀⁴ / H₀⁷,  Γ = 2A(ρg)³ / 5
//! ```
//!
//! At `t = t₀` the dome has its initial shape, with central thickness `H₀`
//! and margin radius `R₀`.
//!
//! The SIA surface velocity along a unit direction `n` follows from the
//! thickness gradient:
//!
//! ```text
//! u_s · n = -½ (ρg)³ A |∇H|² (∇H · n) H⁴
//! ```
//!
//! # Example
//!
//! ```
//! use sia_rs::analysis::HalfarDome;
//!
//! let dome = HalfarDome::new(3000.0, 750.0e3);
//! let t0 = dome.characteristic_time();
//! assert!((dome.thickness(0.0, t0) - 3000.0).abs() < 1e-9);
//! assert_eq!(dome.thickness(800.0e3, t0), 0.0);
//! ```

use crate::mesh::VoronoiMesh;
use crate::rheology::SECONDS_PER_YEAR;

/// Halfar dome parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HalfarDome {
    /// Central thickness at t₀ (m)
    pub h0: f64,
    /// Margin radius at t₀ (m)
    pub r0: f64,
    /// Dome center
    pub center: (f64, f64),
    /// Rate factor (Pa⁻³ s⁻¹)
    pub rate_factor: f64,
    /// Ice density (kg/m³)
    pub ice_density: f64,
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
}

impl HalfarDome {
    /// Glen exponent of the similarity solution.
    pub const FLOW_EXPONENT: f64 = 3.0;

    /// Dome centered at the origin with A = 1e-16 Pa⁻³ a⁻¹, ρ = 910, g = 9.81.
    pub fn new(h0: f64, r0: f64) -> Self {
        Self {
            h0,
            r0,
            center: (0.0, 0.0),
            rate_factor: 1.0e-16 / SECONDS_PER_YEAR,
            ice_density: 910.0,
            gravity: 9.81,
        }
    }

    pub fn with_center(mut self, x: f64, y: f64) -> Self {
        self.center = (x, y);
        self
    }

    pub fn with_rate_factor(mut self, a: f64) -> Self {
        self.rate_factor = a;
        self
    }

    pub fn with_physics(mut self, ice_density: f64, gravity: f64) -> Self {
        self.ice_density = ice_density;
        self.gravity = gravity;
        self
    }

    /// Γ = 2A(ρg)³ / 5.
    pub fn gamma(&self) -> f64 {
        2.0 * self.rate_factor * (self.ice_density * self.gravity).powi(3) / 5.0
    }

    /// Time t₀ at which the dome has its initial shape (s).
    pub fn characteristic_time(&self) -> f64 {
        (1.0 / (18.0 * self.gamma())) * (7.0_f64 / 4.0).powi(3) * self.r0.powi(4)
            / self.h0.powi(7)
    }

    /// Similarity factors (α, β) at time `t`.
    fn scales(&self, t: f64) -> (f64, f64) {
        let ratio = self.characteristic_time() / t;
        (ratio.powf(1.0 / 9.0), ratio.powf(1.0 / 18.0))
    }

    /// Margin radius at time `t`.
    pub fn margin_radius(&self, t: f64) -> f64 {
        self.r0 / self.scales(t).1
    }

    /// Thickness at radius `r` and time `t`.
    pub fn thickness(&self, r: f64, t: f64) -> f64 {
        let (alpha, beta) = self.scales(t);
        let q = 1.0 - (beta * r / self.r0).powf(4.0 / 3.0);
        if q > 0.0 {
            self.h0 * alpha * q.powf(3.0 / 7.0)
        } else {
            0.0
        }
    }

    /// Radial derivative dH/dr; zero at the center and outside the margin.
    pub fn thickness_gradient(&self, r: f64, t: f64) -> f64 {
        let (alpha, beta) = self.scales(t);
        let q = 1.0 - (beta * r / self.r0).powf(4.0 / 3.0);
        if q <= 0.0 || r <= 0.0 {
            return 0.0;
        }
        let dq_dr = -(4.0 / 3.0) * (beta / self.r0).powf(4.0 / 3.0) * r.powf(1.0 / 3.0);
        self.h0 * alpha * (3.0 / 7.0) * q.powf(-4.0 / 7.0) * dq_dr
    }

    /// Distance from the dome center.
    #[inline]
    pub fn radius(&self, x: f64, y: f64) -> f64 {
        (x - self.center.0).hypot(y - self.center.1)
    }

    /// Thickness at a point.
    pub fn thickness_at(&self, x: f64, y: f64, t: f64) -> f64 {
        self.thickness(self.radius(x, y), t)
    }

    /// Surface velocity at `(x, y)` projected onto the unit direction
    /// `(nx, ny)` (m/s).
    pub fn surface_velocity(&self, x: f64, y: f64, nx: f64, ny: f64, t: f64) -> f64 {
        let r = self.radius(x, y);
        if r <= 0.0 {
            return 0.0;
        }
        let dh_dr = self.thickness_gradient(r, t);
        let (gx, gy) = (dh_dr * (x - self.center.0) / r, dh_dr * (y - self.center.1) / r);
        let h = self.thickness(r, t);
        let p = -0.5 * (self.ice_density * self.gravity).powi(3);
        p * self.rate_factor * (gx * gx + gy * gy) * (gx * nx + gy * ny) * h.powi(4)
    }

    /// Dome thickness at every cell center.
    pub fn cell_thickness(&self, mesh: &VoronoiMesh, t: f64) -> Vec<f64> {
        mesh.cells()
            .map(|c| self.thickness_at(mesh.x_cell[c], mesh.y_cell[c], t))
            .collect()
    }

    /// Analytic surface velocity along each edge normal, at the edge
    /// midpoint.
    ///
    /// The normal of an edge is recovered from its two cell centers, so the
    /// mesh must not wrap periodically across the dome.
    pub fn edge_surface_velocity(&self, mesh: &VoronoiMesh, t: f64) -> Vec<f64> {
        mesh.edges()
            .map(|e| {
                let [c1, c2] = mesh.cells_on_edge(e);
                let (dx, dy) = (
                    mesh.x_cell[c2] - mesh.x_cell[c1],
                    mesh.y_cell[c2] - mesh.y_cell[c1],
                );
                let len = dx.hypot(dy);
                self.surface_velocity(mesh.x_edge[e], mesh.y_edge[e], dx / len, dy / len, t)
            })
            .collect()
    }
}
