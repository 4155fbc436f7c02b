mod aggregate;
pub mod analysis;
pub mod cache;
pub mod error;
pub mod export;
pub mod gateway;
pub mod report;
pub mod resolve;
pub mod sweep;

pub use analysis::{
    AcScale, AcSettings, AnalysisKind, AnalysisOutcome, AnalysisSpec, DcSettings, EngineOutput,
    RawSeries, SimulationEngine, TranSettings, run_analysis,
};
pub use cache::{CachedResult, PlotView, ResultsCache};
pub use error::{GatewayError, SolverError, SweepError};
pub use export::{ExportExpr, SignalUnit};
pub use report::{PointError, SweepCurves, SweepReport, SweepStatus};
pub use resolve::ResolvedTarget;
pub use sweep::{CancelToken, SweepRequest, SweptValue, run_sweep, run_sweep_cancellable};
