//! Error types for the SIA velocity solve.
//!
//! Every error maps to a nonzero integer code through [`SiaError::code`].
//! Codes are single bits so failures from several stages can be ORed into
//! one status value; `0` is reserved for success.

use thiserror::Error;

use crate::mesh::MeshError;
use crate::operators::ReconstructionError;
use crate::rheology::RheologyError;
use crate::vertical::VerticalGridError;

/// Status code of a successful solve.
pub const SUCCESS: i32 = 0;

/// Pipeline stage that produced an upstream failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SolveStage {
    /// Cell → vertex interpolation of the upper surface
    VertexInterpolation,
    /// Tangential-from-normal slope reconstruction
    TangentialReconstruction,
    /// Flow-rate factor evaluation
    Rheology,
}

impl SolveStage {
    /// Status bit of this stage.
    pub fn bit(self) -> i32 {
        match self {
            SolveStage::VertexInterpolation => 1 << 3,
            SolveStage::Rheology => 1 << 4,
            SolveStage::TangentialReconstruction => 1 << 6,
        }
    }
}

impl std::fmt::Display for SolveStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SolveStage::VertexInterpolation => "vertex interpolation",
            SolveStage::TangentialReconstruction => "tangential reconstruction",
            SolveStage::Rheology => "rheology",
        };
        write!(f, "{name}")
    }
}

/// Errors returned by the SIA solver.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SiaError {
    /// Invalid configuration, detected before any field is touched.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A field bundle does not match the mesh or vertical grid.
    #[error("Field '{field}' has length {actual}, expected {expected}")]
    DimensionMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Mesh ingestion failed.
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// Vertical grid construction failed.
    #[error("Vertical grid error: {0}")]
    VerticalGrid(#[from] VerticalGridError),

    /// A collaborator procedure reported a failure.
    #[error("{stage} failed with code {code}: {message}")]
    Upstream {
        stage: SolveStage,
        code: i32,
        message: String,
    },

    /// More than one stage failed.
    #[error("{} stages failed (status {code})", failures.len())]
    Aggregate { code: i32, failures: Vec<SiaError> },
}

impl SiaError {
    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(field: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            field,
            expected,
            actual,
        }
    }

    /// Integer status code; never zero.
    pub fn code(&self) -> i32 {
        match self {
            SiaError::Configuration(_) => 1,
            SiaError::DimensionMismatch { .. } => 1 << 1,
            SiaError::Mesh(_) => 1 << 2,
            SiaError::VerticalGrid(_) => 1 << 5,
            SiaError::Upstream { stage, .. } => stage.bit(),
            SiaError::Aggregate { code, .. } => *code,
        }
    }

    /// Whether the error was raised before any field was mutated.
    pub fn is_fatal_before_mutation(&self) -> bool {
        matches!(
            self,
            SiaError::Configuration(_) | SiaError::DimensionMismatch { .. }
        )
    }

    /// Fold collected stage failures into one error.
    ///
    /// Returns `None` when nothing failed, the error itself when exactly one
    /// stage failed, and an [`SiaError::Aggregate`] with ORed codes otherwise.
    pub fn aggregate(mut failures: Vec<SiaError>) -> Option<SiaError> {
        match failures.len() {
            0 => None,
            1 => failures.pop(),
            _ => {
                let code = failures.iter().fold(SUCCESS, |acc, e| acc | e.code());
                Some(SiaError::Aggregate { code, failures })
            }
        }
    }
}

impl From<ReconstructionError> for SiaError {
    fn from(err: ReconstructionError) -> Self {
        let stage = match err {
            ReconstructionError::LengthMismatch {
                operator: "tangential_from_normal",
                ..
            } => SolveStage::TangentialReconstruction,
            _ => SolveStage::VertexInterpolation,
        };
        SiaError::Upstream {
            stage,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl From<RheologyError> for SiaError {
    fn from(err: RheologyError) -> Self {
        SiaError::Upstream {
            stage: SolveStage::Rheology,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Integer status of a solve result: `0` on success.
pub fn status_code<T>(result: &Result<T, SiaError>) -> i32 {
    match result {
        Ok(_) => SUCCESS,
        Err(err) => err.code(),
    }
}
