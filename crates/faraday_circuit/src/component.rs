use std::collections::HashMap;

use serde::Serialize;

/// Closed set of component kinds a circuit can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComponentKind {
    Resistor,
    Capacitor,
    Inductor,
    Diode,
    Bjt,
    Mosfet,
    Jfet,
    VoltageSource,
    CurrentSource,
    /// Voltage-controlled voltage source (E).
    Vcvs,
    /// Voltage-controlled current source (G).
    Vccs,
    /// Current-controlled voltage source (H).
    Ccvs,
    /// Current-controlled current source (F).
    Cccs,
    BehavioralSource,
    Switch,
    Subcircuit,
}

impl ComponentKind {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "resistor" => Some(Self::Resistor),
            "capacitor" => Some(Self::Capacitor),
            "inductor" => Some(Self::Inductor),
            "diode" => Some(Self::Diode),
            "bjt" => Some(Self::Bjt),
            "mosfet" => Some(Self::Mosfet),
            "jfet" => Some(Self::Jfet),
            "vsource" | "voltage_source" => Some(Self::VoltageSource),
            "isource" | "current_source" => Some(Self::CurrentSource),
            "vcvs" => Some(Self::Vcvs),
            "vccs" => Some(Self::Vccs),
            "ccvs" => Some(Self::Ccvs),
            "cccs" => Some(Self::Cccs),
            "behavioral" | "behavioral_source" => Some(Self::BehavioralSource),
            "switch" => Some(Self::Switch),
            "subcircuit" => Some(Self::Subcircuit),
            _ => None,
        }
    }
}

/// Time-domain shape attached to an independent source for transient runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Waveform {
    Pulse {
        /// initial level (volts, amps)
        initial: f64,
        /// pulsed level (volts, amps)
        pulsed: f64,
        /// TD (seconds)
        delay: f64,
        /// TR (seconds)
        rise: f64,
        /// TF (seconds)
        fall: f64,
        /// PW (seconds)
        width: f64,
        /// PER (seconds)
        period: f64,
    },
    Sinusoidal {
        /// VO (volts, amps)
        offset: f64,
        /// VA (volts, amps)
        amplitude: f64,
        /// FREQ (Hz)
        frequency: f64,
        /// TD (seconds)
        delay: f64,
        /// THETA (1/second)
        damping: f64,
    },
    Exponential {
        initial: f64,
        pulsed: f64,
        /// TD1 (seconds)
        rise_delay: f64,
        /// TAU1 (seconds)
        rise_tau: f64,
        /// TD2 (seconds)
        fall_delay: f64,
        /// TAU2 (seconds)
        fall_tau: f64,
    },
    /// Piecewise-linear (time, level) corners, time strictly increasing.
    Pwl { points: Vec<(f64, f64)> },
}

impl Waveform {
    /// Evaluate the source level at time `t`. Engines drive this during
    /// transient stepping; outside the defined range the shape holds its
    /// boundary level.
    pub fn level_at(&self, t: f64) -> f64 {
        match self {
            Waveform::Pulse {
                initial,
                pulsed,
                delay,
                rise,
                fall,
                width,
                period,
            } => {
                if t < *delay {
                    return *initial;
                }
                let per = if *period > 0.0 { *period } else { f64::MAX };
                let tp = (t - delay) % per;
                if tp < *rise {
                    let frac = if *rise > 0.0 { tp / rise } else { 1.0 };
                    initial + (pulsed - initial) * frac
                } else if tp < rise + width {
                    *pulsed
                } else if tp < rise + width + fall {
                    let frac = if *fall > 0.0 {
                        (tp - rise - width) / fall
                    } else {
                        1.0
                    };
                    pulsed + (initial - pulsed) * frac
                } else {
                    *initial
                }
            }
            Waveform::Sinusoidal {
                offset,
                amplitude,
                frequency,
                delay,
                damping,
            } => {
                if t < *delay {
                    return *offset;
                }
                let dt = t - delay;
                let envelope = (-damping * dt).exp();
                offset
                    + amplitude * envelope * (2.0 * std::f64::consts::PI * frequency * dt).sin()
            }
            Waveform::Exponential {
                initial,
                pulsed,
                rise_delay,
                rise_tau,
                fall_delay,
                fall_tau,
            } => {
                let mut v = *initial;
                if t >= *rise_delay && *rise_tau > 0.0 {
                    v += (pulsed - initial) * (1.0 - (-(t - rise_delay) / rise_tau).exp());
                }
                if t >= *fall_delay && *fall_tau > 0.0 {
                    v += (initial - pulsed) * (1.0 - (-(t - fall_delay) / fall_tau).exp());
                }
                v
            }
            Waveform::Pwl { points } => {
                let Some(first) = points.first() else {
                    return 0.0;
                };
                if t <= first.0 {
                    return first.1;
                }
                for pair in points.windows(2) {
                    let (t0, v0) = pair[0];
                    let (t1, v1) = pair[1];
                    if t <= t1 {
                        let frac = if t1 > t0 { (t - t0) / (t1 - t0) } else { 1.0 };
                        return v0 + (v1 - v0) * frac;
                    }
                }
                points.last().map(|p| p.1).unwrap_or(0.0)
            }
        }
    }
}

/// A secondary component parameter: either a plain scalar or structured
/// waveform data used for AC/transient source shaping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParamValue {
    Scalar(f64),
    Waveform(Waveform),
}

impl ParamValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            ParamValue::Scalar(v) => Some(*v),
            ParamValue::Waveform(_) => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Scalar(v)
    }
}

impl From<Waveform> for ParamValue {
    fn from(w: Waveform) -> Self {
        ParamValue::Waveform(w)
    }
}

/// One circuit element. Node order is significant: it determines the pin
/// mapping the engine sees.
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    pub kind: ComponentKind,
    pub name: String,
    pub nodes: Vec<String>,
    /// Primary scalar (resistance, capacitance, source level, ...).
    pub value: Option<f64>,
    /// Weak reference to a model owned by the same circuit.
    pub model: Option<String>,
    /// Secondary parameters keyed by name (e.g. "ac_mag", "ic", waveforms).
    pub params: HashMap<String, ParamValue>,
}

impl Component {
    pub fn new(kind: ComponentKind, name: impl Into<String>, nodes: Vec<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            nodes,
            value: None,
            model: None,
            params: HashMap::new(),
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Case-insensitive secondary-parameter lookup, returning the stored key.
    pub fn param_entry(&self, key: &str) -> Option<(&str, &ParamValue)> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(1.0e-3, 1.0)] // on the plateau
    #[case(2.6e-3, 0.0)] // back at the initial level
    fn pulse_levels(#[case] t: f64, #[case] expected: f64) {
        let w = Waveform::Pulse {
            initial: 0.0,
            pulsed: 1.0,
            delay: 0.5e-3,
            rise: 0.1e-3,
            fall: 0.1e-3,
            width: 1.0e-3,
            period: 0.0,
        };
        assert!((w.level_at(t) - expected).abs() < 1e-12);
    }

    #[test]
    fn sinusoid_starts_at_offset() {
        let w = Waveform::Sinusoidal {
            offset: 2.5,
            amplitude: 1.0,
            frequency: 50.0,
            delay: 0.0,
            damping: 0.0,
        };
        assert!((w.level_at(0.0) - 2.5).abs() < 1e-12);
        // quarter period: offset + amplitude
        assert!((w.level_at(1.0 / 200.0) - 3.5).abs() < 1e-9);
    }

    #[test]
    fn pwl_interpolates_and_clamps() {
        let w = Waveform::Pwl {
            points: vec![(0.0, 0.0), (1.0, 10.0)],
        };
        assert!((w.level_at(0.5) - 5.0).abs() < 1e-12);
        assert!((w.level_at(2.0) - 10.0).abs() < 1e-12);
        assert!((w.level_at(-1.0) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn param_lookup_is_case_insensitive() {
        let c = Component::new(
            ComponentKind::VoltageSource,
            "V1",
            vec!["in".into(), "0".into()],
        )
        .with_param("AC_mag", 1.0);

        let (key, value) = c.param_entry("ac_MAG").expect("param should resolve");
        assert_eq!(key, "AC_mag");
        assert_eq!(value.as_scalar(), Some(1.0));
        assert!(c.param_entry("phase").is_none());
    }
}
