use faraday_circuit::CircuitError;
use thiserror::Error;

use crate::export::ExportParseError;

/// Failure surfaced by the external simulation engine.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SolverError {
    pub message: String,
}

impl SolverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SweepError {
    /// Sweep-fatal: the path does not resolve to a component/model property.
    #[error("parameter '{path}' not found: {reason}")]
    ParameterNotFound { path: String, reason: String },

    /// Sweep-fatal: the path resolves to something that cannot hold a scalar.
    #[error("parameter '{path}' is not sweepable: {reason}")]
    ParameterNotMutable { path: String, reason: String },

    /// Point-level: a swept value cannot be coerced to a number.
    #[error("swept value '{value}' is not numeric")]
    ParameterTypeMismatch { value: String },

    /// Point-level: the engine rejected the settings or failed to converge.
    #[error("analysis execution failed: {message}")]
    AnalysisExecution { message: String },

    /// Point-level: a frequency/time axis disagrees with the first point's.
    #[error("axis mismatch: {detail}")]
    AxisMismatch { detail: String },
}

impl SweepError {
    /// Fatal errors abort the sweep before any point runs; everything else
    /// is recorded per point and the loop continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SweepError::ParameterNotFound { .. } | SweepError::ParameterNotMutable { .. }
        )
    }
}

impl From<SolverError> for SweepError {
    fn from(err: SolverError) -> Self {
        SweepError::AnalysisExecution {
            message: err.message,
        }
    }
}

/// Validation errors raised at the transport boundary, before the core runs.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Circuit(#[from] CircuitError),

    #[error(transparent)]
    InvalidExport(#[from] ExportParseError),

    #[error("sweep value list is empty")]
    EmptyValues,

    #[error("no export expressions given")]
    NoExports,

    #[error("unknown analysis kind '{name}'")]
    UnknownAnalysisKind { name: String },

    #[error("unknown component kind '{name}'")]
    UnknownComponentKind { name: String },

    #[error("analysis failed: {0}")]
    Analysis(#[from] SolverError),
}
