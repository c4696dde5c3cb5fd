//! Flow-rate factor laws for Glen's flow law.
//!
//! Glen's law relates effective strain rate and effective stress:
//!
//! ```text
//! ε̇ = A(T*) τⁿ
//! ```
//!
//! The rate factor `A` depends on the pressure-corrected (homologous)
//! temperature
//!
//! ```text
//! T* = T + β p,     capped at the melting point
//! ```
//!
//! where `p = ρ g d` is the overburden pressure at depth `d`.
//!
//! # References
//!
//! - Paterson & Budd (1982): Flow parameters for ice sheet modeling.
//!   Cold Regions Sci. Technol. 6, 175-177.
//! - Cuffey & Paterson (2010): The Physics of Glaciers, 4th ed., Table 3.4.
//!
//! # Units
//!
//! - Temperature: K
//! - Pressure: Pa
//! - Rate factor: Pa⁻ⁿ s⁻¹

use thiserror::Error;

use crate::types::CellIndex;
use crate::vertical::VerticalGrid;

/// Universal gas constant (J mol⁻¹ K⁻¹).
pub const GAS_CONSTANT: f64 = 8.314;

/// Melting point of ice at atmospheric pressure (K).
pub const MELTING_POINT: f64 = 273.15;

/// Clausius-Clapeyron slope of the pressure melting point (K Pa⁻¹).
pub const MELTING_POINT_PRESSURE_SLOPE: f64 = 7.9e-8;

/// Seconds per (365-day) year.
pub const SECONDS_PER_YEAR: f64 = 365.0 * 86400.0;

/// Temperature separating the cold and warm Arrhenius branches (K).
const ARRHENIUS_SPLIT: f64 = 263.15;

/// Error type for rate factor evaluation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RheologyError {
    /// Input or output array has the wrong length.
    #[error("Field '{field}' has length {actual}, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Absolute temperature must be positive for an Arrhenius law.
    #[error("Non-positive temperature {value} K in cell {cell}, layer {level}")]
    InvalidTemperature {
        cell: CellIndex,
        level: usize,
        value: f64,
    },
}

impl RheologyError {
    /// Integer failure code reported to the caller.
    pub fn code(&self) -> i32 {
        match self {
            RheologyError::LengthMismatch { .. } => 1,
            RheologyError::InvalidTemperature { .. } => 2,
        }
    }
}

/// Rate factor law `A(T, p)`.
///
/// Implementations must be thread-safe; the rate factor is evaluated
/// independently per cell and layer.
pub trait FlowLaw: Send + Sync {
    /// Rate factor at temperature `temperature` (K) and overburden
    /// pressure `pressure` (Pa).
    fn rate_factor(&self, temperature: f64, pressure: f64) -> f64;

    /// Whether the law depends on temperature at all.
    fn uses_temperature(&self) -> bool {
        true
    }

    /// Short name, matching the configuration key.
    fn name(&self) -> &'static str;
}

/// Pressure-corrected temperature `T + β p`, capped at the melting point.
#[inline]
pub fn homologous_temperature(temperature: f64, pressure: f64) -> f64 {
    (temperature + MELTING_POINT_PRESSURE_SLOPE * pressure).min(MELTING_POINT)
}

/// Temperature-independent rate factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantFlowLaw {
    /// Rate factor (Pa⁻ⁿ s⁻¹)
    pub value: f64,
}

impl ConstantFlowLaw {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    /// Construct from a value given per year (Pa⁻ⁿ a⁻¹).
    pub fn per_year(value: f64) -> Self {
        Self::new(value / SECONDS_PER_YEAR)
    }
}

impl Default for ConstantFlowLaw {
    /// 1e-16 Pa⁻³ a⁻¹, the usual value for the Halfar test.
    fn default() -> Self {
        Self::per_year(1.0e-16)
    }
}

impl FlowLaw for ConstantFlowLaw {
    fn rate_factor(&self, _temperature: f64, _pressure: f64) -> f64 {
        self.value
    }

    fn uses_temperature(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "constant"
    }
}

/// Paterson & Budd (1982) Arrhenius law with two branches.
///
/// ```text
/// A = E a exp(-Q / (R T*))
/// T* < 263.15 K:  a = 3.615e-13 Pa⁻³ s⁻¹,  Q = 60 kJ/mol
/// T* ≥ 263.15 K:  a = 1.733e3  Pa⁻³ s⁻¹,  Q = 139 kJ/mol
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatersonBudd1982 {
    /// Flow enhancement factor E
    pub enhancement: f64,
}

impl PatersonBudd1982 {
    pub fn new(enhancement: f64) -> Self {
        Self { enhancement }
    }
}

impl Default for PatersonBudd1982 {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl FlowLaw for PatersonBudd1982 {
    fn rate_factor(&self, temperature: f64, pressure: f64) -> f64 {
        let t_star = homologous_temperature(temperature, pressure);
        let (a, q) = if t_star < ARRHENIUS_SPLIT {
            (3.615e-13, 6.0e4)
        } else {
            (1.733e3, 13.9e4)
        };
        self.enhancement * a * (-q / (GAS_CONSTANT * t_star)).exp()
    }

    fn name(&self) -> &'static str {
        "PB1982"
    }
}

/// Cuffey & Paterson (2010) law referenced to -10 °C.
///
/// ```text
/// A = E A* exp(-Q/R (1/T* - 1/T_ref))
/// A* = 3.5e-25 Pa⁻³ s⁻¹,  T_ref = 263.15 K
/// Q = 60 kJ/mol below T_ref, 115 kJ/mol above
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CuffeyPaterson2010 {
    /// Flow enhancement factor E
    pub enhancement: f64,
}

impl CuffeyPaterson2010 {
    /// Rate factor at the reference temperature (Pa⁻³ s⁻¹).
    pub const REFERENCE_RATE_FACTOR: f64 = 3.5e-25;

    pub fn new(enhancement: f64) -> Self {
        Self { enhancement }
    }
}

impl Default for CuffeyPaterson2010 {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl FlowLaw for CuffeyPaterson2010 {
    fn rate_factor(&self, temperature: f64, pressure: f64) -> f64 {
        let t_star = homologous_temperature(temperature, pressure);
        let q = if t_star < ARRHENIUS_SPLIT { 6.0e4 } else { 11.5e4 };
        let arg = -q / GAS_CONSTANT * (1.0 / t_star - 1.0 / ARRHENIUS_SPLIT);
        self.enhancement * Self::REFERENCE_RATE_FACTOR * arg.exp()
    }

    fn name(&self) -> &'static str {
        "CP2010"
    }
}

/// Flow-rate factor selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlowParamAMethod {
    /// Configured constant value
    #[default]
    Constant,
    /// Paterson & Budd (1982)
    PatersonBudd1982,
    /// Cuffey & Paterson (2010)
    CuffeyPaterson2010,
}

impl FlowParamAMethod {
    /// Configuration key of the method.
    pub fn name(self) -> &'static str {
        match self {
            FlowParamAMethod::Constant => "constant",
            FlowParamAMethod::PatersonBudd1982 => "PB1982",
            FlowParamAMethod::CuffeyPaterson2010 => "CP2010",
        }
    }

    /// Build the law. `constant_value` is only used by `Constant`,
    /// `enhancement` only by the temperature-dependent laws.
    pub fn build(self, constant_value: f64, enhancement: f64) -> Box<dyn FlowLaw> {
        match self {
            FlowParamAMethod::Constant => Box::new(ConstantFlowLaw::new(constant_value)),
            FlowParamAMethod::PatersonBudd1982 => Box::new(PatersonBudd1982::new(enhancement)),
            FlowParamAMethod::CuffeyPaterson2010 => {
                Box::new(CuffeyPaterson2010::new(enhancement))
            }
        }
    }
}

fn check_len(field: &'static str, actual: usize, expected: usize) -> Result<(), RheologyError> {
    if actual == expected {
        Ok(())
    } else {
        Err(RheologyError::LengthMismatch {
            field,
            expected,
            actual,
        })
    }
}

/// Fill one cell's rate factor column.
///
/// Every layer is written. A layer with a non-positive temperature gets a
/// zero rate factor, and the first such layer is reported.
fn fill_column(
    law: &dyn FlowLaw,
    cell: CellIndex,
    temperature: &[f64],
    thickness: f64,
    grid: &VerticalGrid,
    rho_g: f64,
    out: &mut [f64],
) -> Result<(), RheologyError> {
    let check = law.uses_temperature();
    let mut failure = None;
    for (level, (a, &t)) in out.iter_mut().zip(temperature).enumerate() {
        if check && t <= 0.0 {
            *a = 0.0;
            failure.get_or_insert(RheologyError::InvalidTemperature {
                cell,
                level,
                value: t,
            });
            continue;
        }
        let pressure = rho_g * grid.depth_at_center(level, thickness);
        *a = law.rate_factor(t, pressure);
    }
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Evaluate the rate factor for every cell and layer.
///
/// `temperature` and `flow_param_a` are cell-major (`cell * n_levels +
/// level`). The overburden pressure at a layer center is
/// `rho_g * σ_center * H`.
///
/// Every cell is evaluated even when some fail; the failure of the
/// lowest-indexed failing cell is returned after the loop.
pub fn compute_flow_param_a(
    law: &dyn FlowLaw,
    temperature: &[f64],
    thickness: &[f64],
    grid: &VerticalGrid,
    rho_g: f64,
    flow_param_a: &mut [f64],
) -> Result<(), RheologyError> {
    let n_levels = grid.n_levels();
    let n_cells = thickness.len();
    check_len("temperature", temperature.len(), n_cells * n_levels)?;
    check_len("flow_param_a", flow_param_a.len(), n_cells * n_levels)?;

    let mut failure = None;
    for (c, (out, t_col)) in flow_param_a
        .chunks_mut(n_levels)
        .zip(temperature.chunks(n_levels))
        .enumerate()
    {
        if let Err(err) = fill_column(law, CellIndex::new(c), t_col, thickness[c], grid, rho_g, out)
        {
            failure.get_or_insert(err);
        }
    }
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Parallel version of [`compute_flow_param_a`] over cells.
///
/// Reports the failure of the lowest-indexed failing cell, like the
/// serial version.
#[cfg(feature = "parallel")]
pub fn compute_flow_param_a_parallel(
    law: &dyn FlowLaw,
    temperature: &[f64],
    thickness: &[f64],
    grid: &VerticalGrid,
    rho_g: f64,
    flow_param_a: &mut [f64],
) -> Result<(), RheologyError> {
    use rayon::prelude::*;

    let n_levels = grid.n_levels();
    let n_cells = thickness.len();
    check_len("temperature", temperature.len(), n_cells * n_levels)?;
    check_len("flow_param_a", flow_param_a.len(), n_cells * n_levels)?;

    let failures: Vec<RheologyError> = flow_param_a
        .par_chunks_mut(n_levels)
        .zip(temperature.par_chunks(n_levels))
        .enumerate()
        .filter_map(|(c, (out, t_col))| {
            fill_column(law, CellIndex::new(c), t_col, thickness[c], grid, rho_g, out).err()
        })
        .collect();

    match failures.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
