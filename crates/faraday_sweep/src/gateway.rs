//! Entry points handed to the transport layer. Input validation happens
//! here, before the core is invoked; JSON-RPC framing stays outside.

use faraday_circuit::{CircuitError, CircuitStore, CircuitSummary, Component, ComponentKind};

use crate::{
    analysis::{AnalysisKind, AnalysisSpec, SimulationEngine, run_analysis},
    cache::{CachedResult, PlotView, ResultsCache},
    error::GatewayError,
    export::ExportExpr,
    report::SweepReport,
    sweep::{CancelToken, SweepRequest, SweptValue, run_sweep_cancellable},
};

/// Wire-shaped sweep parameters: raw export strings, parsed at this boundary.
#[derive(Debug, Clone)]
pub struct SweepParams {
    pub circuit_id: String,
    pub path: String,
    pub values: Vec<SweptValue>,
    pub spec: AnalysisSpec,
    pub exports: Vec<String>,
}

/// Wire-shaped component description: the kind arrives as a name.
#[derive(Debug, Clone)]
pub struct ComponentParams {
    pub kind: String,
    pub name: String,
    pub nodes: Vec<String>,
    pub value: Option<f64>,
    pub model: Option<String>,
}

/// Resolve an analysis-kind name from the wire.
pub fn parse_analysis_kind(name: &str) -> Result<AnalysisKind, GatewayError> {
    AnalysisKind::from_name(name).ok_or_else(|| GatewayError::UnknownAnalysisKind {
        name: name.to_string(),
    })
}

/// Known circuit ids, sorted for a stable wire listing.
pub fn list_circuits(store: &CircuitStore) -> Vec<&str> {
    let mut ids = store.ids();
    ids.sort_unstable();
    ids
}

/// Read-side circuit introspection: counts, node list, ground presence.
pub fn circuit_summary(store: &CircuitStore, circuit_id: &str) -> Result<CircuitSummary, GatewayError> {
    let circuit = store
        .get(circuit_id)
        .ok_or_else(|| CircuitError::UnknownCircuit {
            id: circuit_id.to_string(),
        })?;
    Ok(circuit.summary())
}

/// Add a component described in wire shape to the named circuit.
pub fn add_component(
    store: &mut CircuitStore,
    circuit_id: &str,
    params: ComponentParams,
) -> Result<(), GatewayError> {
    let kind = ComponentKind::from_name(&params.kind).ok_or_else(|| {
        GatewayError::UnknownComponentKind {
            name: params.kind.clone(),
        }
    })?;
    let circuit = store
        .get_mut(circuit_id)
        .ok_or_else(|| CircuitError::UnknownCircuit {
            id: circuit_id.to_string(),
        })?;

    let mut component = Component::new(kind, params.name, params.nodes);
    if let Some(value) = params.value {
        component = component.with_value(value);
    }
    if let Some(model) = params.model {
        component = component.with_model(model);
    }
    circuit.add_component(component)?;
    Ok(())
}

fn parse_exports(raw: &[String]) -> Result<Vec<ExportExpr>, GatewayError> {
    if raw.is_empty() {
        return Err(GatewayError::NoExports);
    }
    raw.iter()
        .map(|e| ExportExpr::parse(e).map_err(GatewayError::from))
        .collect()
}

pub fn run_parameter_sweep(
    store: &mut CircuitStore,
    cache: &mut ResultsCache,
    engine: &dyn SimulationEngine,
    params: SweepParams,
) -> Result<SweepReport, GatewayError> {
    run_parameter_sweep_cancellable(store, cache, engine, params, &CancelToken::new())
}

/// Validate, run the sweep against the named circuit, and publish the report
/// to the results cache. Point-level failures live inside the returned
/// report; only boundary validation errors surface as `Err`.
pub fn run_parameter_sweep_cancellable(
    store: &mut CircuitStore,
    cache: &mut ResultsCache,
    engine: &dyn SimulationEngine,
    params: SweepParams,
    cancel: &CancelToken,
) -> Result<SweepReport, GatewayError> {
    if params.values.is_empty() {
        return Err(GatewayError::EmptyValues);
    }
    let exports = parse_exports(&params.exports)?;
    let circuit = store
        .get_mut(&params.circuit_id)
        .ok_or_else(|| CircuitError::UnknownCircuit {
            id: params.circuit_id.clone(),
        })?;

    let request = SweepRequest {
        path: params.path,
        values: params.values,
        spec: params.spec,
        exports,
    };
    let report = run_sweep_cancellable(circuit, engine, &request, cancel);
    cache.store(&params.circuit_id, CachedResult::Sweep(report.clone()));
    Ok(report)
}

/// Run one analysis (no sweep) and publish the outcome to the cache.
pub fn run_single_analysis(
    store: &CircuitStore,
    cache: &mut ResultsCache,
    engine: &dyn SimulationEngine,
    circuit_id: &str,
    spec: AnalysisSpec,
    exports: &[String],
) -> Result<PlotView, GatewayError> {
    let exports = parse_exports(exports)?;
    let circuit = store
        .get(circuit_id)
        .ok_or_else(|| CircuitError::UnknownCircuit {
            id: circuit_id.to_string(),
        })?;

    let outcome = run_analysis(engine, circuit, &spec, &exports)?;
    let cached = CachedResult::Analysis {
        exports: exports.iter().map(ExportExpr::name).collect(),
        outcome,
    };
    let view = cached.plot_view();
    cache.store(circuit_id, cached);
    Ok(view)
}

/// Read-only renderer contract: the most recent result for a circuit.
pub fn cached_result(cache: &ResultsCache, circuit_id: &str) -> Option<PlotView> {
    cache.get(circuit_id).map(CachedResult::plot_view)
}
