use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid export expression '{expr}' (expected v(node) or i(component))")]
pub struct ExportParseError {
    pub expr: String,
}

/// The physical unit of an exported signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalUnit {
    Volts,
    Amperes,
}

impl SignalUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            SignalUnit::Volts => "V",
            SignalUnit::Amperes => "A",
        }
    }
}

/// A signal to read out of an analysis: `v(node)` or `i(component)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ExportExpr {
    Voltage { node: String },
    Current { component: String },
}

impl ExportExpr {
    pub fn parse(expr: &str) -> Result<Self, ExportParseError> {
        let trimmed = expr.trim();
        let invalid = || ExportParseError {
            expr: expr.to_string(),
        };

        let Some((head, rest)) = trimmed.split_once('(') else {
            return Err(invalid());
        };
        let Some(inner) = rest.strip_suffix(')') else {
            return Err(invalid());
        };
        let inner = inner.trim();
        if inner.is_empty() || inner.contains('(') {
            return Err(invalid());
        }

        match head.trim().to_lowercase().as_str() {
            "v" => Ok(ExportExpr::Voltage {
                node: inner.to_string(),
            }),
            "i" => Ok(ExportExpr::Current {
                component: inner.to_string(),
            }),
            _ => Err(invalid()),
        }
    }

    /// Canonical name used as the report key, e.g. `v(out)`.
    pub fn name(&self) -> String {
        match self {
            ExportExpr::Voltage { node } => format!("v({node})"),
            ExportExpr::Current { component } => format!("i({component})"),
        }
    }

    pub fn unit(&self) -> SignalUnit {
        match self {
            ExportExpr::Voltage { .. } => SignalUnit::Volts,
            ExportExpr::Current { .. } => SignalUnit::Amperes,
        }
    }
}

impl fmt::Display for ExportExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
