use faraday_circuit::{Circuit, ParamValue};

use crate::error::SweepError;

/// Which owning object the path matched. Holds the owner's stored name so
/// the handle stays valid across the sweep without borrowing the circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TargetOwner {
    Component(String),
    Model(String),
}

/// Which field on the owner is being mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TargetSlot {
    /// The component's primary scalar value.
    PrimaryValue,
    /// A scalar secondary parameter, by its stored key.
    Parameter(String),
    /// A model coefficient, by its stored key.
    Coefficient(String),
}

/// A resolved `<name>.<property>` sweep target: owner, slot, and the value
/// read before any mutation, for restoration. Lives for one sweep.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    owner: TargetOwner,
    slot: TargetSlot,
    original: f64,
    path: String,
}

impl ResolvedTarget {
    /// Resolve a path against the circuit. Components are searched first,
    /// case-insensitively; models second. The matched property must hold a
    /// scalar.
    pub fn resolve(circuit: &Circuit, path: &str) -> Result<Self, SweepError> {
        let not_found = |reason: String| SweepError::ParameterNotFound {
            path: path.to_string(),
            reason,
        };

        let Some((name, property)) = path.split_once('.') else {
            return Err(not_found("expected '<name>.<property>'".to_string()));
        };
        if name.is_empty() || property.is_empty() {
            return Err(not_found("expected '<name>.<property>'".to_string()));
        }

        if let Some(component) = circuit.component(name) {
            if property.eq_ignore_ascii_case("value") {
                let Some(value) = component.value else {
                    return Err(SweepError::ParameterNotMutable {
                        path: path.to_string(),
                        reason: format!("component '{}' has no primary value", component.name),
                    });
                };
                return Ok(Self {
                    owner: TargetOwner::Component(component.name.clone()),
                    slot: TargetSlot::PrimaryValue,
                    original: value,
                    path: path.to_string(),
                });
            }
            if let Some((key, param)) = component.param_entry(property) {
                return match param.as_scalar() {
                    Some(value) => Ok(Self {
                        owner: TargetOwner::Component(component.name.clone()),
                        slot: TargetSlot::Parameter(key.to_string()),
                        original: value,
                        path: path.to_string(),
                    }),
                    None => Err(SweepError::ParameterNotMutable {
                        path: path.to_string(),
                        reason: format!("parameter '{key}' holds waveform data, not a scalar"),
                    }),
                };
            }
            return Err(not_found(format!(
                "component '{}' has no property '{}'",
                component.name, property
            )));
        }

        if let Some(model) = circuit.model(name) {
            if let Some((key, value)) = model.param_entry(property) {
                return Ok(Self {
                    owner: TargetOwner::Model(model.name.clone()),
                    slot: TargetSlot::Coefficient(key.to_string()),
                    original: value,
                    path: path.to_string(),
                });
            }
            return Err(not_found(format!(
                "model '{}' has no parameter '{}'",
                model.name, property
            )));
        }

        Err(not_found(format!("no component or model named '{name}'")))
    }

    /// The value captured at resolve time.
    pub fn original(&self) -> f64 {
        self.original
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Read the target's current value.
    pub fn read(&self, circuit: &Circuit) -> Result<f64, SweepError> {
        let missing = || SweepError::ParameterNotFound {
            path: self.path.clone(),
            reason: "target disappeared mid-sweep".to_string(),
        };
        match (&self.owner, &self.slot) {
            (TargetOwner::Component(name), TargetSlot::PrimaryValue) => circuit
                .component(name)
                .and_then(|c| c.value)
                .ok_or_else(missing),
            (TargetOwner::Component(name), TargetSlot::Parameter(key)) => circuit
                .component(name)
                .and_then(|c| c.params.get(key))
                .and_then(ParamValue::as_scalar)
                .ok_or_else(missing),
            (TargetOwner::Model(name), TargetSlot::Coefficient(key)) => circuit
                .model(name)
                .and_then(|m| m.params.get(key).copied())
                .ok_or_else(missing),
            _ => Err(missing()),
        }
    }

    /// Write a new value into the bound field.
    pub fn apply(&self, circuit: &mut Circuit, value: f64) -> Result<(), SweepError> {
        let missing = || SweepError::ParameterNotFound {
            path: self.path.clone(),
            reason: "target disappeared mid-sweep".to_string(),
        };
        match (&self.owner, &self.slot) {
            (TargetOwner::Component(name), TargetSlot::PrimaryValue) => {
                let component = circuit.component_mut(name).ok_or_else(missing)?;
                component.value = Some(value);
                Ok(())
            }
            (TargetOwner::Component(name), TargetSlot::Parameter(key)) => {
                let component = circuit.component_mut(name).ok_or_else(missing)?;
                component
                    .params
                    .insert(key.clone(), ParamValue::Scalar(value));
                Ok(())
            }
            (TargetOwner::Model(name), TargetSlot::Coefficient(key)) => {
                let model = circuit.model_mut(name).ok_or_else(missing)?;
                model.params.insert(key.clone(), value);
                Ok(())
            }
            _ => Err(missing()),
        }
    }

    /// Write back the value captured at resolve time.
    pub fn restore(&self, circuit: &mut Circuit) -> Result<(), SweepError> {
        self.apply(circuit, self.original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faraday_circuit::{Component, ComponentKind, Model, ModelKind, Waveform};
    use rstest::rstest;

    fn fixture() -> Circuit {
        let mut circuit = Circuit::new("fix", "resolver fixture");
        circuit
            .add_component(
                Component::new(
                    ComponentKind::Resistor,
                    "R1",
                    vec!["in".into(), "out".into()],
                )
                .with_value(1e3),
            )
            .unwrap();
        circuit
            .add_component(
                Component::new(
                    ComponentKind::VoltageSource,
                    "V1",
                    vec!["in".into(), "0".into()],
                )
                .with_value(5.0)
                .with_param("ac_mag", 1.0)
                .with_param(
                    "shape",
                    Waveform::Sinusoidal {
                        offset: 0.0,
                        amplitude: 1.0,
                        frequency: 1e3,
                        delay: 0.0,
                        damping: 0.0,
                    },
                ),
            )
            .unwrap();
        circuit
            .add_model(
                Model::new(ModelKind::Diode, "D1N4148")
                    .with_param("is", 2.52e-9)
                    .unwrap(),
            )
            .unwrap();
        circuit
            .add_component(
                Component::new(ComponentKind::Diode, "D1", vec!["out".into(), "0".into()])
                    .with_model("D1N4148"),
            )
            .unwrap();
        circuit
    }

    #[rstest]
    #[case("R1.value", 1e3)]
    #[case("r1.VALUE", 1e3)]
    #[case("V1.ac_mag", 1.0)]
    #[case("D1N4148.is", 2.52e-9)]
    #[case("d1n4148.IS", 2.52e-9)]
    fn resolves_and_captures_original(#[case] path: &str, #[case] expected: f64) {
        let circuit = fixture();
        let target = ResolvedTarget::resolve(&circuit, path).unwrap();
        assert_eq!(target.original(), expected);
        assert_eq!(target.read(&circuit).unwrap(), expected);
    }

    #[rstest]
    #[case("R9.value")]
    #[case("R1.tolerance")]
    #[case("D1N4148.bf")]
    #[case("R1")]
    #[case(".value")]
    fn missing_paths_fail(#[case] path: &str) {
        let circuit = fixture();
        let err = ResolvedTarget::resolve(&circuit, path).unwrap_err();
        assert!(matches!(err, SweepError::ParameterNotFound { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn waveform_parameter_is_not_mutable() {
        let circuit = fixture();
        let err = ResolvedTarget::resolve(&circuit, "V1.shape").unwrap_err();
        assert!(matches!(err, SweepError::ParameterNotMutable { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn component_shadows_model_of_same_lookup_order() {
        // components are searched before models
        let mut circuit = fixture();
        circuit
            .add_model(
                Model::new(ModelKind::VoltageSwitch, "R1")
                    .with_param("ron", 10.0)
                    .unwrap(),
            )
            .unwrap();
        let err = ResolvedTarget::resolve(&circuit, "R1.ron").unwrap_err();
        assert!(matches!(err, SweepError::ParameterNotFound { .. }));
    }

    #[test]
    fn apply_and_restore_round_trip() {
        let mut circuit = fixture();
        let target = ResolvedTarget::resolve(&circuit, "D1N4148.is").unwrap();

        target.apply(&mut circuit, 1e-12).unwrap();
        assert_eq!(target.read(&circuit).unwrap(), 1e-12);

        target.restore(&mut circuit).unwrap();
        assert_eq!(target.read(&circuit).unwrap(), 2.52e-9);
    }
}
