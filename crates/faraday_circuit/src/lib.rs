pub mod circuit;
pub mod component;
pub mod error;
pub mod model;

pub use circuit::{Circuit, CircuitStore, CircuitSummary, GROUND_NODE};
pub use component::{Component, ComponentKind, ParamValue, Waveform};
pub use error::CircuitError;
pub use model::{Model, ModelKind};
