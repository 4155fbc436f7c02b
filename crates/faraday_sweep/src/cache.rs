use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{
    analysis::{AnalysisKind, AnalysisOutcome},
    report::SweepReport,
};

/// The most recent output computed for a circuit: a single analysis or a
/// whole sweep. The cache is not sweep-aware; it stores whatever the caller
/// last computed.
#[derive(Debug, Clone)]
pub enum CachedResult {
    Analysis {
        /// Export names aligned with the outcome's series.
        exports: Vec<String>,
        outcome: AnalysisOutcome,
    },
    Sweep(SweepReport),
}

/// Read-side view for the renderer: named signals over one x axis.
#[derive(Debug, Clone, Serialize)]
pub struct PlotView {
    pub analysis: AnalysisKind,
    pub x_axis: Vec<f64>,
    pub signals: BTreeMap<String, Vec<f64>>,
}

impl CachedResult {
    pub fn plot_view(&self) -> PlotView {
        match self {
            CachedResult::Analysis { exports, outcome } => match outcome {
                AnalysisOutcome::OperatingPoint { values } => PlotView {
                    analysis: AnalysisKind::OperatingPoint,
                    x_axis: Vec::new(),
                    signals: exports
                        .iter()
                        .zip(values)
                        .map(|(name, v)| (name.clone(), vec![*v]))
                        .collect(),
                },
                AnalysisOutcome::DcSweep { axis, series } => PlotView {
                    analysis: AnalysisKind::DcSweep,
                    x_axis: axis.to_vec(),
                    signals: exports
                        .iter()
                        .zip(series)
                        .map(|(name, s)| (name.clone(), s.to_vec()))
                        .collect(),
                },
                AnalysisOutcome::Ac {
                    frequencies,
                    series,
                } => PlotView {
                    analysis: AnalysisKind::Ac,
                    x_axis: frequencies.to_vec(),
                    signals: exports
                        .iter()
                        .zip(series)
                        .map(|(name, (re, im))| {
                            let magnitude = re
                                .iter()
                                .zip(im.iter())
                                .map(|(r, i)| (r * r + i * i).sqrt())
                                .collect();
                            (name.clone(), magnitude)
                        })
                        .collect(),
                },
                AnalysisOutcome::Transient { times, series } => PlotView {
                    analysis: AnalysisKind::Transient,
                    x_axis: times.to_vec(),
                    signals: exports
                        .iter()
                        .zip(series)
                        .map(|(name, s)| (name.clone(), s.to_vec()))
                        .collect(),
                },
            },
            CachedResult::Sweep(report) => PlotView {
                analysis: report.kind,
                // the swept values are the natural x axis of a reduced view
                x_axis: report
                    .values
                    .iter()
                    .map(|v| v.as_number().unwrap_or(f64::NAN))
                    .collect(),
                signals: report.reduced.clone(),
            },
        }
    }
}

/// Most recent result per circuit id; `store` overwrites unconditionally.
#[derive(Debug, Default)]
pub struct ResultsCache {
    entries: HashMap<String, CachedResult>,
}

impl ResultsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, circuit_id: impl Into<String>, result: CachedResult) {
        self.entries.insert(circuit_id.into(), result);
    }

    pub fn get(&self, circuit_id: &str) -> Option<&CachedResult> {
        self.entries.get(circuit_id)
    }

    pub fn clear(&mut self, circuit_id: &str) -> Option<CachedResult> {
        self.entries.remove(circuit_id)
    }
}
