use faraday_circuit::Circuit;
use ndarray::Array1;
use serde::Serialize;

use crate::{error::SolverError, export::ExportExpr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalysisKind {
    OperatingPoint,
    DcSweep,
    Ac,
    Transient,
}

impl AnalysisKind {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "op" | "operating_point" => Some(Self::OperatingPoint),
            "dc" | "dc_sweep" => Some(Self::DcSweep),
            "ac" => Some(Self::Ac),
            "tran" | "transient" => Some(Self::Transient),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OperatingPoint => "op",
            Self::DcSweep => "dc",
            Self::Ac => "ac",
            Self::Transient => "tran",
        }
    }
}

/// DC transfer sweep over an internal source.
#[derive(Debug, Clone, Serialize)]
pub struct DcSettings {
    pub source: String,
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl DcSettings {
    fn validate(&self) -> Result<(), SolverError> {
        if self.step == 0.0 {
            return Err(SolverError::new("dc: step must be non-zero"));
        }
        if (self.stop - self.start) / self.step < 0.0 {
            return Err(SolverError::new(
                "dc: step direction does not reach stop from start",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AcScale {
    Dec,
    Oct,
    Lin,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcSettings {
    pub fstart: f64,
    pub fstop: f64,
    /// Points per decade/octave, or total points for a linear scale.
    pub points: usize,
    pub scale: AcScale,
}

impl AcSettings {
    /// Build the frequency grid, rejecting settings the engine could not run.
    pub fn frequencies(&self) -> Result<Vec<f64>, SolverError> {
        if self.fstop <= self.fstart {
            return Err(SolverError::new(format!(
                "ac: fstop {} must be > fstart {}",
                self.fstop, self.fstart
            )));
        }
        if self.points < 1 {
            return Err(SolverError::new("ac: point count must be >= 1"));
        }

        const EPS: f64 = 1e-12;
        match self.scale {
            AcScale::Dec | AcScale::Oct => {
                if self.fstart <= 0.0 {
                    return Err(SolverError::new("ac: fstart must be > 0 on a log scale"));
                }
                let base: f64 = if self.scale == AcScale::Dec { 10.0 } else { 2.0 };
                let r = base.powf(1.0 / self.points as f64);
                let mut f = self.fstart;
                let mut out = Vec::new();
                while f <= self.fstop * (1.0 + EPS) {
                    out.push(f);
                    f *= r;
                }
                Ok(out)
            }
            AcScale::Lin => {
                if self.points == 1 {
                    return Ok(vec![self.fstart]);
                }
                let step = (self.fstop - self.fstart) / ((self.points - 1) as f64);
                Ok((0..self.points)
                    .map(|k| self.fstart + k as f64 * step)
                    .collect())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TranSettings {
    /// Step size (seconds).
    pub step: f64,
    /// End time (seconds).
    pub stop: f64,
}

impl TranSettings {
    fn validate(&self) -> Result<(), SolverError> {
        if self.step <= 0.0 || self.stop <= 0.0 {
            return Err(SolverError::new("tran: step and stop must be > 0"));
        }
        if self.step > self.stop {
            return Err(SolverError::new("tran: step must not exceed stop"));
        }
        Ok(())
    }
}

/// Kind-tagged analysis settings.
#[derive(Debug, Clone, Serialize)]
pub enum AnalysisSpec {
    OperatingPoint,
    DcSweep(DcSettings),
    Ac(AcSettings),
    Transient(TranSettings),
}

impl AnalysisSpec {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisSpec::OperatingPoint => AnalysisKind::OperatingPoint,
            AnalysisSpec::DcSweep(_) => AnalysisKind::DcSweep,
            AnalysisSpec::Ac(_) => AnalysisKind::Ac,
            AnalysisSpec::Transient(_) => AnalysisKind::Transient,
        }
    }

    fn validate(&self) -> Result<(), SolverError> {
        match self {
            AnalysisSpec::OperatingPoint => Ok(()),
            AnalysisSpec::DcSweep(s) => s.validate(),
            AnalysisSpec::Ac(s) => s.frequencies().map(|_| ()),
            AnalysisSpec::Transient(s) => s.validate(),
        }
    }
}

/// Raw per-export samples as the engine hands them back.
#[derive(Debug, Clone)]
pub enum RawSeries {
    Real(Array1<f64>),
    Complex { re: Array1<f64>, im: Array1<f64> },
}

/// Untyped engine output: an optional axis plus one series per export,
/// in export order.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    pub axis: Option<Array1<f64>>,
    pub series: Vec<RawSeries>,
}

/// The consumed contract of the external numerical solver. The core treats
/// `solve` as opaque and synchronous; a per-call timeout is the engine's
/// concern and surfaces as a `SolverError`.
pub trait SimulationEngine {
    fn solve(
        &self,
        circuit: &Circuit,
        spec: &AnalysisSpec,
        exports: &[ExportExpr],
    ) -> Result<EngineOutput, SolverError>;
}

/// Kind-tagged, shape-checked analysis result. Series are aligned with the
/// export list that produced them.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// One scalar per export.
    OperatingPoint { values: Vec<f64> },
    /// One real array per export, aligned to the internal sweep axis.
    DcSweep {
        axis: Array1<f64>,
        series: Vec<Array1<f64>>,
    },
    /// One (re, im) array pair per export, aligned to the frequency axis.
    Ac {
        frequencies: Array1<f64>,
        series: Vec<(Array1<f64>, Array1<f64>)>,
    },
    /// One real array per export, aligned to the time axis.
    Transient {
        times: Array1<f64>,
        series: Vec<Array1<f64>>,
    },
}

impl AnalysisOutcome {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisOutcome::OperatingPoint { .. } => AnalysisKind::OperatingPoint,
            AnalysisOutcome::DcSweep { .. } => AnalysisKind::DcSweep,
            AnalysisOutcome::Ac { .. } => AnalysisKind::Ac,
            AnalysisOutcome::Transient { .. } => AnalysisKind::Transient,
        }
    }
}

/// Run one analysis through the engine and normalize its output into the
/// kind-appropriate outcome shape. No retry: a solver failure propagates to
/// the caller, which owns retry policy.
pub fn run_analysis(
    engine: &dyn SimulationEngine,
    circuit: &Circuit,
    spec: &AnalysisSpec,
    exports: &[ExportExpr],
) -> Result<AnalysisOutcome, SolverError> {
    spec.validate()?;
    if exports.is_empty() {
        return Err(SolverError::new("no export expressions"));
    }
    let output = engine.solve(circuit, spec, exports)?;
    normalize(spec.kind(), output, exports.len())
}

fn expect_real(series: RawSeries) -> Result<Array1<f64>, SolverError> {
    match series {
        RawSeries::Real(a) => Ok(a),
        RawSeries::Complex { .. } => Err(SolverError::new(
            "engine returned complex samples for a real-valued analysis",
        )),
    }
}

fn expect_complex(series: RawSeries) -> Result<(Array1<f64>, Array1<f64>), SolverError> {
    match series {
        RawSeries::Complex { re, im } => {
            if re.len() != im.len() {
                return Err(SolverError::new(format!(
                    "engine returned mismatched re/im lengths ({} vs {})",
                    re.len(),
                    im.len()
                )));
            }
            Ok((re, im))
        }
        RawSeries::Real(_) => Err(SolverError::new(
            "engine returned real samples for a complex-valued analysis",
        )),
    }
}

fn check_axis_len(axis: &Array1<f64>, len: usize, index: usize) -> Result<(), SolverError> {
    if len != axis.len() {
        return Err(SolverError::new(format!(
            "engine series {} has {} samples but the axis has {}",
            index,
            len,
            axis.len()
        )));
    }
    Ok(())
}

fn normalize(
    kind: AnalysisKind,
    output: EngineOutput,
    export_count: usize,
) -> Result<AnalysisOutcome, SolverError> {
    if output.series.len() != export_count {
        return Err(SolverError::new(format!(
            "engine returned {} series for {} exports",
            output.series.len(),
            export_count
        )));
    }

    match kind {
        AnalysisKind::OperatingPoint => {
            let mut values = Vec::with_capacity(export_count);
            for series in output.series {
                let a = expect_real(series)?;
                let Some(last) = a.last() else {
                    return Err(SolverError::new("engine returned an empty series"));
                };
                values.push(*last);
            }
            Ok(AnalysisOutcome::OperatingPoint { values })
        }
        AnalysisKind::DcSweep => {
            let axis = output
                .axis
                .ok_or_else(|| SolverError::new("dc: engine returned no sweep axis"))?;
            if axis.is_empty() {
                return Err(SolverError::new("dc: engine returned an empty sweep axis"));
            }
            let mut series = Vec::with_capacity(export_count);
            for (i, raw) in output.series.into_iter().enumerate() {
                let a = expect_real(raw)?;
                check_axis_len(&axis, a.len(), i)?;
                series.push(a);
            }
            Ok(AnalysisOutcome::DcSweep { axis, series })
        }
        AnalysisKind::Ac => {
            let frequencies = output
                .axis
                .ok_or_else(|| SolverError::new("ac: engine returned no frequency axis"))?;
            if frequencies.is_empty() {
                return Err(SolverError::new(
                    "ac: engine returned an empty frequency axis",
                ));
            }
            let mut series = Vec::with_capacity(export_count);
            for (i, raw) in output.series.into_iter().enumerate() {
                let (re, im) = expect_complex(raw)?;
                check_axis_len(&frequencies, re.len(), i)?;
                series.push((re, im));
            }
            Ok(AnalysisOutcome::Ac {
                frequencies,
                series,
            })
        }
        AnalysisKind::Transient => {
            let times = output
                .axis
                .ok_or_else(|| SolverError::new("tran: engine returned no time axis"))?;
            if times.is_empty() {
                return Err(SolverError::new("tran: engine returned an empty time axis"));
            }
            let mut series = Vec::with_capacity(export_count);
            for (i, raw) in output.series.into_iter().enumerate() {
                let a = expect_real(raw)?;
                check_axis_len(&times, a.len(), i)?;
                series.push(a);
            }
            Ok(AnalysisOutcome::Transient { times, series })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rstest::rstest;

    struct FixedEngine {
        output: EngineOutput,
    }

    impl SimulationEngine for FixedEngine {
        fn solve(
            &self,
            _circuit: &Circuit,
            _spec: &AnalysisSpec,
            _exports: &[ExportExpr],
        ) -> Result<EngineOutput, SolverError> {
            Ok(self.output.clone())
        }
    }

    fn exports_one() -> Vec<ExportExpr> {
        vec![ExportExpr::parse("v(out)").unwrap()]
    }

    #[rstest]
    #[case(AcScale::Lin, 1.0, 5.0, 5, vec![1.0, 2.0, 3.0, 4.0, 5.0])]
    #[case(AcScale::Lin, 10.0, 1000.0, 1, vec![10.0])]
    fn linear_frequency_grids(
        #[case] scale: AcScale,
        #[case] fstart: f64,
        #[case] fstop: f64,
        #[case] points: usize,
        #[case] expected: Vec<f64>,
    ) {
        let settings = AcSettings {
            fstart,
            fstop,
            points,
            scale,
        };
        let freqs = settings.frequencies().unwrap();
        assert_eq!(freqs.len(), expected.len());
        for (got, want) in freqs.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn decade_grid_spans_decades() {
        let settings = AcSettings {
            fstart: 10.0,
            fstop: 10_000.0,
            points: 1,
            scale: AcScale::Dec,
        };
        let freqs = settings.frequencies().unwrap();
        assert_eq!(freqs.len(), 4); // 10, 100, 1k, 10k
        assert!((freqs[3] - 10_000.0).abs() / 10_000.0 < 1e-9);
    }

    #[rstest]
    #[case(AcSettings { fstart: 100.0, fstop: 10.0, points: 5, scale: AcScale::Lin })]
    #[case(AcSettings { fstart: 0.0, fstop: 10.0, points: 5, scale: AcScale::Dec })]
    #[case(AcSettings { fstart: 1.0, fstop: 10.0, points: 0, scale: AcScale::Lin })]
    fn invalid_ac_settings_rejected(#[case] settings: AcSettings) {
        assert!(settings.frequencies().is_err());
    }

    #[test]
    fn dc_step_direction_validated() {
        let bad = AnalysisSpec::DcSweep(DcSettings {
            source: "V1".into(),
            start: 0.0,
            stop: 5.0,
            step: -0.5,
        });
        let engine = FixedEngine {
            output: EngineOutput {
                axis: None,
                series: vec![],
            },
        };
        let circuit = Circuit::new("c", "");
        let err = run_analysis(&engine, &circuit, &bad, &exports_one()).unwrap_err();
        assert!(err.message.contains("step direction"));
    }

    #[test]
    fn series_count_must_match_exports() {
        let engine = FixedEngine {
            output: EngineOutput {
                axis: None,
                series: vec![
                    RawSeries::Real(array![1.0]),
                    RawSeries::Real(array![2.0]),
                ],
            },
        };
        let circuit = Circuit::new("c", "");
        let err = run_analysis(
            &engine,
            &circuit,
            &AnalysisSpec::OperatingPoint,
            &exports_one(),
        )
        .unwrap_err();
        assert!(err.message.contains("2 series for 1 exports"));
    }

    #[test]
    fn transient_samples_must_match_axis() {
        let engine = FixedEngine {
            output: EngineOutput {
                axis: Some(array![0.0, 1e-3, 2e-3]),
                series: vec![RawSeries::Real(array![1.0, 2.0])],
            },
        };
        let circuit = Circuit::new("c", "");
        let spec = AnalysisSpec::Transient(TranSettings {
            step: 1e-3,
            stop: 2e-3,
        });
        let err = run_analysis(&engine, &circuit, &spec, &exports_one()).unwrap_err();
        assert!(err.message.contains("2 samples but the axis has 3"));
    }

    #[test]
    fn ac_requires_complex_series() {
        let engine = FixedEngine {
            output: EngineOutput {
                axis: Some(array![10.0, 100.0]),
                series: vec![RawSeries::Real(array![1.0, 0.5])],
            },
        };
        let circuit = Circuit::new("c", "");
        let spec = AnalysisSpec::Ac(AcSettings {
            fstart: 10.0,
            fstop: 100.0,
            points: 2,
            scale: AcScale::Lin,
        });
        let err = run_analysis(&engine, &circuit, &spec, &exports_one()).unwrap_err();
        assert!(err.message.contains("real samples"));
    }

    #[test]
    fn operating_point_reduces_to_scalars() {
        let engine = FixedEngine {
            output: EngineOutput {
                axis: None,
                series: vec![RawSeries::Real(array![3.3])],
            },
        };
        let circuit = Circuit::new("c", "");
        let outcome = run_analysis(
            &engine,
            &circuit,
            &AnalysisSpec::OperatingPoint,
            &exports_one(),
        )
        .unwrap();
        match outcome {
            AnalysisOutcome::OperatingPoint { values } => assert_eq!(values, vec![3.3]),
            other => panic!("unexpected outcome kind {:?}", other.kind()),
        }
    }
}
