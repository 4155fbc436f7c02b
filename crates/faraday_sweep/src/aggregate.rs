//! Folds raw per-point analysis outcomes into the sweep report.
//!
//! Reduction rules: the reduced scalar for a point is the last element of the
//! raw array (OP/DC), the magnitude at the last frequency (AC), or the final
//! time sample (transient). AC and transient additionally retain the full
//! per-point curve and a shared axis recorded at the first successful point.

use ndarray::Array1;

use crate::{
    analysis::AnalysisOutcome,
    error::SweepError,
    export::ExportExpr,
    report::{SweepCurves, SweepReport},
};

fn magnitudes(re: &Array1<f64>, im: &Array1<f64>) -> Vec<f64> {
    re.iter()
        .zip(im.iter())
        .map(|(r, i)| (r * r + i * i).sqrt())
        .collect()
}

/// Check a point's axis against the shared axis, recording it if this is the
/// first successful point.
fn record_axis(shared: &mut Option<Vec<f64>>, axis: Vec<f64>, label: &str) -> Result<(), SweepError> {
    match shared {
        None => {
            *shared = Some(axis);
            Ok(())
        }
        Some(expected) if *expected == axis => Ok(()),
        Some(expected) => Err(SweepError::AxisMismatch {
            detail: if expected.len() != axis.len() {
                format!(
                    "{label} axis has {} points, the first point's axis has {}",
                    axis.len(),
                    expected.len()
                )
            } else {
                format!("{label} axis values diverge from the first point's axis")
            },
        }),
    }
}

/// Fold one successful analysis outcome into the report, appending one
/// reduced scalar (and, for curve kinds, one curve) per export. All checks
/// run before anything is committed, so a failing fold leaves the report
/// untouched and the caller records the point as failed.
pub(crate) fn fold(
    report: &mut SweepReport,
    exports: &[ExportExpr],
    outcome: AnalysisOutcome,
) -> Result<(), SweepError> {
    match (&mut report.curves, outcome) {
        (SweepCurves::Scalar, AnalysisOutcome::OperatingPoint { values }) => {
            for (export, value) in exports.iter().zip(values) {
                report
                    .reduced
                    .get_mut(&export.name())
                    .expect("report initialized from the same export list")
                    .push(value);
            }
            Ok(())
        }
        (SweepCurves::Scalar, AnalysisOutcome::DcSweep { series, .. }) => {
            // The internal source axis collapses to its terminal value.
            for (export, samples) in exports.iter().zip(series) {
                let last = *samples.last().expect("dispatcher rejects empty series");
                report
                    .reduced
                    .get_mut(&export.name())
                    .expect("report initialized from the same export list")
                    .push(last);
            }
            Ok(())
        }
        (
            SweepCurves::Frequency { axis, magnitudes: curves },
            AnalysisOutcome::Ac {
                frequencies,
                series,
            },
        ) => {
            record_axis(axis, frequencies.to_vec(), "frequency")?;
            let mags: Vec<Vec<f64>> = series
                .iter()
                .map(|(re, im)| magnitudes(re, im))
                .collect();
            for (export, mag) in exports.iter().zip(mags) {
                let last = *mag.last().expect("dispatcher rejects empty axes");
                report
                    .reduced
                    .get_mut(&export.name())
                    .expect("report initialized from the same export list")
                    .push(last);
                curves
                    .get_mut(&export.name())
                    .expect("report initialized from the same export list")
                    .push(Some(mag));
            }
            Ok(())
        }
        (
            SweepCurves::Time { axis, samples: curves },
            AnalysisOutcome::Transient { times, series },
        ) => {
            record_axis(axis, times.to_vec(), "time")?;
            for (export, samples) in exports.iter().zip(series) {
                let curve = samples.to_vec();
                let last = *curve.last().expect("dispatcher rejects empty axes");
                report
                    .reduced
                    .get_mut(&export.name())
                    .expect("report initialized from the same export list")
                    .push(last);
                curves
                    .get_mut(&export.name())
                    .expect("report initialized from the same export list")
                    .push(Some(curve));
            }
            Ok(())
        }
        (_, outcome) => Err(SweepError::AnalysisExecution {
            message: format!(
                "engine produced a {} outcome for a {} sweep",
                outcome.kind().name(),
                report.kind.name()
            ),
        }),
    }
}

/// Append failure placeholders for one point so indices stay aligned with
/// the input value list.
pub(crate) fn record_failure(report: &mut SweepReport, exports: &[ExportExpr]) {
    for export in exports {
        if let Some(series) = report.reduced.get_mut(&export.name()) {
            series.push(f64::NAN);
        }
        match &mut report.curves {
            SweepCurves::Scalar => {}
            SweepCurves::Frequency { magnitudes, .. } => {
                if let Some(list) = magnitudes.get_mut(&export.name()) {
                    list.push(None);
                }
            }
            SweepCurves::Time { samples, .. } => {
                if let Some(list) = samples.get_mut(&export.name()) {
                    list.push(None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisKind;
    use crate::sweep::SweptValue;
    use ndarray::array;

    fn exports() -> Vec<ExportExpr> {
        vec![ExportExpr::parse("i(R1)").unwrap()]
    }

    fn report_for(kind: AnalysisKind) -> SweepReport {
        SweepReport::new(
            "R1.value",
            vec![SweptValue::Number(100.0), SweptValue::Number(200.0)],
            kind,
            &exports(),
        )
    }

    #[test]
    fn dc_reduction_takes_last_element() {
        let mut report = report_for(AnalysisKind::DcSweep);
        let ex = exports();

        fold(
            &mut report,
            &ex,
            AnalysisOutcome::DcSweep {
                axis: array![0.0, 1.0, 2.0],
                series: vec![array![0.01, 0.02, 0.03]],
            },
        )
        .unwrap();
        fold(
            &mut report,
            &ex,
            AnalysisOutcome::DcSweep {
                axis: array![0.0, 1.0],
                series: vec![array![0.04, 0.05]],
            },
        )
        .unwrap();

        assert_eq!(report.reduced["i(R1)"], vec![0.03, 0.05]);
    }

    #[test]
    fn ac_reduction_takes_magnitude_at_last_frequency() {
        let ex = vec![ExportExpr::parse("v(out)").unwrap()];
        let mut report = SweepReport::new(
            "R1.value",
            vec![SweptValue::Number(1.0), SweptValue::Number(2.0)],
            AnalysisKind::Ac,
            &ex,
        );

        fold(
            &mut report,
            &ex,
            AnalysisOutcome::Ac {
                frequencies: array![10.0, 1000.0],
                series: vec![(array![1.0, 0.5], array![0.0, 0.0])],
            },
        )
        .unwrap();
        fold(
            &mut report,
            &ex,
            AnalysisOutcome::Ac {
                frequencies: array![10.0, 1000.0],
                series: vec![(array![0.9, 0.1], array![0.0, 0.0])],
            },
        )
        .unwrap();

        assert_eq!(report.reduced["v(out)"], vec![0.5, 0.1]);
        match &report.curves {
            SweepCurves::Frequency { axis, magnitudes } => {
                assert_eq!(axis.as_deref(), Some(&[10.0, 1000.0][..]));
                let curves = &magnitudes["v(out)"];
                assert_eq!(curves[0].as_deref(), Some(&[1.0, 0.5][..]));
                assert_eq!(curves[1].as_deref(), Some(&[0.9, 0.1][..]));
            }
            other => panic!("wrong curve storage: {other:?}"),
        }
    }

    #[test]
    fn diverging_axis_is_rejected_without_partial_commit() {
        let ex = vec![ExportExpr::parse("v(out)").unwrap()];
        let mut report = SweepReport::new(
            "R1.value",
            vec![SweptValue::Number(1.0), SweptValue::Number(2.0)],
            AnalysisKind::Ac,
            &ex,
        );

        fold(
            &mut report,
            &ex,
            AnalysisOutcome::Ac {
                frequencies: array![10.0, 1000.0],
                series: vec![(array![1.0, 0.5], array![0.0, 0.0])],
            },
        )
        .unwrap();

        let err = fold(
            &mut report,
            &ex,
            AnalysisOutcome::Ac {
                frequencies: array![10.0, 2000.0],
                series: vec![(array![0.9, 0.1], array![0.0, 0.0])],
            },
        )
        .unwrap_err();
        assert!(matches!(err, SweepError::AxisMismatch { .. }));

        // the failed point committed nothing
        assert_eq!(report.reduced["v(out)"].len(), 1);
    }

    #[test]
    fn failure_placeholders_keep_indices_aligned() {
        let mut report = report_for(AnalysisKind::DcSweep);
        let ex = exports();

        record_failure(&mut report, &ex);
        fold(
            &mut report,
            &ex,
            AnalysisOutcome::DcSweep {
                axis: array![0.0],
                series: vec![array![0.07]],
            },
        )
        .unwrap();

        let series = &report.reduced["i(R1)"];
        assert!(series[0].is_nan());
        assert_eq!(series[1], 0.07);
    }

    #[test]
    fn units_derive_from_export_kind() {
        let ex = vec![
            ExportExpr::parse("v(out)").unwrap(),
            ExportExpr::parse("i(R1)").unwrap(),
        ];
        let report = SweepReport::new("R1.value", vec![], AnalysisKind::OperatingPoint, &ex);
        assert_eq!(report.units["v(out)"].symbol(), "V");
        assert_eq!(report.units["i(R1)"].symbol(), "A");
    }
}
