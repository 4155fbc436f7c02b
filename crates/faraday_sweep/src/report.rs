use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    analysis::AnalysisKind,
    export::{ExportExpr, SignalUnit},
    sweep::SweptValue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SweepStatus {
    /// Every point succeeded.
    Success,
    /// Some points failed, some succeeded.
    PartialSuccess,
    /// Resolution failed, or every point failed.
    Failed,
    /// The sweep was cancelled between points.
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointError {
    pub index: usize,
    pub value: String,
    pub message: String,
}

/// Full-resolution per-point data, shaped per analysis kind. Curve lists hold
/// one entry per sweep point in input order; `None` marks a failed point.
#[derive(Debug, Clone, Serialize)]
pub enum SweepCurves {
    /// OperatingPoint / DcSweep: the reduced series is the whole story.
    Scalar,
    /// AC: magnitude curves over the shared frequency axis.
    Frequency {
        axis: Option<Vec<f64>>,
        magnitudes: BTreeMap<String, Vec<Option<Vec<f64>>>>,
    },
    /// Transient: time-series curves over the shared time axis.
    Time {
        axis: Option<Vec<f64>>,
        samples: BTreeMap<String, Vec<Option<Vec<f64>>>>,
    },
}

/// Everything one sweep invocation produced. Created fresh per invocation
/// and handed to the results cache; not persisted beyond that.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    /// The `<name>.<property>` path that was swept.
    pub path: String,
    /// The values applied, in input order, duplicates allowed.
    pub values: Vec<SweptValue>,
    pub kind: AnalysisKind,
    /// Export name -> one reduced scalar per sweep point. Failed points hold
    /// NaN so indices stay aligned with `values`.
    pub reduced: BTreeMap<String, Vec<f64>>,
    pub curves: SweepCurves,
    pub units: BTreeMap<String, SignalUnit>,
    pub elapsed_seconds: f64,
    pub status: SweepStatus,
    pub errors: Vec<PointError>,
    /// Set when resolution failed before any point ran.
    pub fatal_error: Option<String>,
}

impl SweepReport {
    pub(crate) fn new(
        path: &str,
        values: Vec<SweptValue>,
        kind: AnalysisKind,
        exports: &[ExportExpr],
    ) -> Self {
        let mut reduced = BTreeMap::new();
        let mut units = BTreeMap::new();
        let mut per_export = BTreeMap::new();
        for export in exports {
            reduced.insert(export.name(), Vec::new());
            units.insert(export.name(), export.unit());
            per_export.insert(export.name(), Vec::new());
        }

        let curves = match kind {
            AnalysisKind::OperatingPoint | AnalysisKind::DcSweep => SweepCurves::Scalar,
            AnalysisKind::Ac => SweepCurves::Frequency {
                axis: None,
                magnitudes: per_export,
            },
            AnalysisKind::Transient => SweepCurves::Time {
                axis: None,
                samples: per_export,
            },
        };

        Self {
            path: path.to_string(),
            values,
            kind,
            reduced,
            curves,
            units,
            elapsed_seconds: 0.0,
            status: SweepStatus::Success,
            errors: Vec::new(),
            fatal_error: None,
        }
    }
}
