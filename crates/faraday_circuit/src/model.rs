use std::collections::HashMap;

use serde::Serialize;

use crate::error::CircuitError;

/// Closed set of semiconductor/switch model kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModelKind {
    Diode,
    BjtNpn,
    BjtPnp,
    MosfetN,
    MosfetP,
    JfetN,
    JfetP,
    VoltageSwitch,
    CurrentSwitch,
}

impl ModelKind {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "D" | "DIODE" => Some(Self::Diode),
            "NPN" => Some(Self::BjtNpn),
            "PNP" => Some(Self::BjtPnp),
            "NMOS" => Some(Self::MosfetN),
            "PMOS" => Some(Self::MosfetP),
            "NJF" => Some(Self::JfetN),
            "PJF" => Some(Self::JfetP),
            "SW" => Some(Self::VoltageSwitch),
            "CSW" => Some(Self::CurrentSwitch),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Diode => "D",
            Self::BjtNpn => "NPN",
            Self::BjtPnp => "PNP",
            Self::MosfetN => "NMOS",
            Self::MosfetP => "PMOS",
            Self::JfetN => "NJF",
            Self::JfetP => "PJF",
            Self::VoltageSwitch => "SW",
            Self::CurrentSwitch => "CSW",
        }
    }

    /// Coefficients a model of this kind may carry.
    pub fn known_params(&self) -> &'static [&'static str] {
        match self {
            Self::Diode => &["is", "n", "rs", "cjo", "tt", "bv", "ibv"],
            Self::BjtNpn | Self::BjtPnp => &["is", "bf", "br", "nf", "nr", "vaf", "var"],
            Self::MosfetN | Self::MosfetP => &["vto", "kp", "gamma", "phi", "lambda"],
            Self::JfetN | Self::JfetP => &["vto", "beta", "lambda", "is"],
            Self::VoltageSwitch => &["ron", "roff", "vt", "vh"],
            Self::CurrentSwitch => &["ron", "roff", "it", "ih"],
        }
    }
}

/// A device model: named coefficient set referenced by components.
#[derive(Debug, Clone, Serialize)]
pub struct Model {
    pub kind: ModelKind,
    pub name: String,
    pub params: HashMap<String, f64>,
}

impl Model {
    pub fn new(kind: ModelKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            params: HashMap::new(),
        }
    }

    /// Set a coefficient, rejecting names the model kind does not define.
    pub fn set_param(&mut self, key: &str, value: f64) -> Result<(), CircuitError> {
        let canonical = key.to_lowercase();
        if !self.kind.known_params().contains(&canonical.as_str()) {
            return Err(CircuitError::UnknownModelParameter {
                model: self.name.clone(),
                kind: self.kind.name().to_string(),
                param: key.to_string(),
            });
        }
        self.params.insert(canonical, value);
        Ok(())
    }

    pub fn with_param(mut self, key: &str, value: f64) -> Result<Self, CircuitError> {
        self.set_param(key, value)?;
        Ok(self)
    }

    /// Case-insensitive coefficient lookup, returning the stored key.
    pub fn param_entry(&self, key: &str) -> Option<(&str, f64)> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("d", Some(ModelKind::Diode))]
    #[case("NPN", Some(ModelKind::BjtNpn))]
    #[case("nmos", Some(ModelKind::MosfetN))]
    #[case("csw", Some(ModelKind::CurrentSwitch))]
    #[case("triode", None)]
    fn kind_from_name(#[case] input: &str, #[case] expected: Option<ModelKind>) {
        assert_eq!(ModelKind::from_name(input), expected);
    }

    #[test]
    fn set_param_validates_against_kind() {
        let mut model = Model::new(ModelKind::Diode, "D1N4148");
        model.set_param("IS", 2.52e-9).unwrap();
        model.set_param("n", 1.752).unwrap();

        let err = model.set_param("bf", 100.0).unwrap_err();
        assert!(matches!(
            err,
            CircuitError::UnknownModelParameter { ref param, .. } if param == "bf"
        ));

        // stored keys are canonical lowercase, lookup ignores case
        assert_eq!(model.param_entry("is"), Some(("is", 2.52e-9)));
        assert_eq!(model.param_entry("N"), Some(("n", 1.752)));
    }
}
