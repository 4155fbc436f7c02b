use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use faraday_circuit::Circuit;
use serde::Serialize;

use crate::{
    aggregate,
    analysis::{AnalysisSpec, SimulationEngine, run_analysis},
    error::SweepError,
    export::ExportExpr,
    report::{PointError, SweepReport, SweepStatus},
    resolve::ResolvedTarget,
};

/// One input sweep value: already numeric, or text to be coerced. Text that
/// does not parse as a number fails that point with a type mismatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SweptValue {
    Number(f64),
    Text(String),
}

impl SweptValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SweptValue::Number(v) => Some(*v),
            SweptValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for SweptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweptValue::Number(v) => write!(f, "{v}"),
            SweptValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for SweptValue {
    fn from(v: f64) -> Self {
        SweptValue::Number(v)
    }
}

impl From<&str> for SweptValue {
    fn from(s: &str) -> Self {
        SweptValue::Text(s.to_string())
    }
}

/// Everything one sweep invocation needs besides the circuit and engine.
#[derive(Debug, Clone)]
pub struct SweepRequest {
    /// `<name>.<property>` target path.
    pub path: String,
    pub values: Vec<SweptValue>,
    pub spec: AnalysisSpec,
    pub exports: Vec<ExportExpr>,
}

/// Cooperative cancellation flag, checked between points (the engine call is
/// an uninterruptible unit).
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Restores the swept target on every exit path, including cancellation and
/// engine panics.
struct RestoreGuard<'a> {
    circuit: &'a mut Circuit,
    target: &'a ResolvedTarget,
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        // The owner was present at resolve time; restoration can only fail
        // if the caller deleted it mid-sweep, which the contract forbids.
        let _ = self.target.restore(self.circuit);
    }
}

pub fn run_sweep(
    circuit: &mut Circuit,
    engine: &dyn SimulationEngine,
    request: &SweepRequest,
) -> SweepReport {
    run_sweep_cancellable(circuit, engine, request, &CancelToken::new())
}

/// Drive the per-point loop: resolve once, then for each value mutate,
/// analyze, and aggregate; a failing point is recorded and the loop
/// continues. The target is restored unconditionally at the end.
pub fn run_sweep_cancellable(
    circuit: &mut Circuit,
    engine: &dyn SimulationEngine,
    request: &SweepRequest,
    cancel: &CancelToken,
) -> SweepReport {
    let started = Instant::now();
    let mut report = SweepReport::new(
        &request.path,
        request.values.clone(),
        request.spec.kind(),
        &request.exports,
    );

    // Resolution failure aborts before any point runs; nothing to roll back.
    let target = match ResolvedTarget::resolve(circuit, &request.path) {
        Ok(target) => target,
        Err(err) => {
            report.status = SweepStatus::Failed;
            report.fatal_error = Some(err.to_string());
            report.elapsed_seconds = started.elapsed().as_secs_f64();
            return report;
        }
    };

    let mut cancelled = false;
    {
        let mut guard = RestoreGuard { circuit, target: &target };

        for (index, value) in request.values.iter().enumerate() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let point = (|| -> Result<(), SweepError> {
                let numeric =
                    value
                        .as_number()
                        .ok_or_else(|| SweepError::ParameterTypeMismatch {
                            value: value.to_string(),
                        })?;
                target.apply(&mut *guard.circuit, numeric)?;
                let outcome =
                    run_analysis(engine, &*guard.circuit, &request.spec, &request.exports)?;
                aggregate::fold(&mut report, &request.exports, outcome)
            })();

            if let Err(err) = point {
                aggregate::record_failure(&mut report, &request.exports);
                report.errors.push(PointError {
                    index,
                    value: value.to_string(),
                    message: err.to_string(),
                });
            }
        }
    } // guard drops here: pre-sweep value restored

    report.status = if cancelled {
        SweepStatus::Cancelled
    } else if report.errors.is_empty() {
        SweepStatus::Success
    } else if report.errors.len() == request.values.len() {
        SweepStatus::Failed
    } else {
        SweepStatus::PartialSuccess
    };
    report.elapsed_seconds = started.elapsed().as_secs_f64();
    report
}
