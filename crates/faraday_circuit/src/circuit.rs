use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{component::Component, error::CircuitError, model::Model};

pub const GROUND_NODE: &str = "0";

/// A named circuit owning its components and models.
///
/// Component and model names are unique within the circuit,
/// case-insensitively; the tables are keyed by the lowercased name while the
/// owned objects keep their original spelling.
#[derive(Debug, Clone, Serialize)]
pub struct Circuit {
    pub id: String,
    pub description: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    components: HashMap<String, Component>,
    models: HashMap<String, Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CircuitSummary {
    pub id: String,
    pub description: String,
    pub component_count: usize,
    pub model_count: usize,
    pub nodes: Vec<String>,
    pub has_ground: bool,
}

impl Circuit {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            description: description.into(),
            created: now,
            modified: now,
            components: HashMap::new(),
            models: HashMap::new(),
        }
    }

    fn touch(&mut self) {
        self.modified = Utc::now();
    }

    pub fn add_component(&mut self, component: Component) -> Result<(), CircuitError> {
        let key = component.name.to_lowercase();
        if self.components.contains_key(&key) {
            return Err(CircuitError::DuplicateComponent {
                name: component.name,
            });
        }
        self.components.insert(key, component);
        self.touch();
        Ok(())
    }

    pub fn remove_component(&mut self, name: &str) -> Result<Component, CircuitError> {
        let removed = self
            .components
            .remove(&name.to_lowercase())
            .ok_or_else(|| CircuitError::UnknownComponent {
                name: name.to_string(),
            })?;
        self.touch();
        Ok(removed)
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.get(&name.to_lowercase())
    }

    pub fn component_mut(&mut self, name: &str) -> Option<&mut Component> {
        let key = name.to_lowercase();
        if self.components.contains_key(&key) {
            self.touch();
        }
        self.components.get_mut(&key)
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn add_model(&mut self, model: Model) -> Result<(), CircuitError> {
        let key = model.name.to_lowercase();
        if self.models.contains_key(&key) {
            return Err(CircuitError::DuplicateModel { name: model.name });
        }
        self.models.insert(key, model);
        self.touch();
        Ok(())
    }

    /// Remove a model. Deleting a model while a component still references it
    /// is a caller error, not silently repaired.
    pub fn remove_model(&mut self, name: &str) -> Result<Model, CircuitError> {
        let key = name.to_lowercase();
        if !self.models.contains_key(&key) {
            return Err(CircuitError::UnknownModel {
                name: name.to_string(),
            });
        }
        if let Some(user) = self.components.values().find(|c| {
            c.model
                .as_deref()
                .is_some_and(|m| m.eq_ignore_ascii_case(name))
        }) {
            return Err(CircuitError::ModelInUse {
                name: name.to_string(),
                referenced_by: user.name.clone(),
            });
        }
        let removed = self.models.remove(&key).expect("presence checked above");
        self.touch();
        Ok(removed)
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.get(&name.to_lowercase())
    }

    pub fn model_mut(&mut self, name: &str) -> Option<&mut Model> {
        let key = name.to_lowercase();
        if self.models.contains_key(&key) {
            self.touch();
        }
        self.models.get_mut(&key)
    }

    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    /// The set of nodes referenced by any component, sorted.
    pub fn nodes(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .components
            .values()
            .flat_map(|c| c.nodes.iter().map(String::as_str))
            .collect();
        set.into_iter().map(String::from).collect()
    }

    /// A circuit has ground iff some component connects to the literal
    /// node "0".
    pub fn has_ground(&self) -> bool {
        self.components
            .values()
            .any(|c| c.nodes.iter().any(|n| n == GROUND_NODE))
    }

    pub fn summary(&self) -> CircuitSummary {
        CircuitSummary {
            id: self.id.clone(),
            description: self.description.clone(),
            component_count: self.components.len(),
            model_count: self.models.len(),
            nodes: self.nodes(),
            has_ground: self.has_ground(),
        }
    }
}

/// Owns all circuits, keyed by id.
#[derive(Debug, Default)]
pub struct CircuitStore {
    circuits: HashMap<String, Circuit>,
}

impl CircuitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        id: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<&mut Circuit, CircuitError> {
        let id = id.into();
        if self.circuits.contains_key(&id) {
            return Err(CircuitError::DuplicateCircuit { id });
        }
        let circuit = Circuit::new(id.clone(), description);
        Ok(self.circuits.entry(id).or_insert(circuit))
    }

    pub fn get(&self, id: &str) -> Option<&Circuit> {
        self.circuits.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Circuit> {
        self.circuits.get_mut(id)
    }

    /// Explicit deletion; removes the circuit and everything it owns.
    pub fn remove(&mut self, id: &str) -> Result<Circuit, CircuitError> {
        self.circuits
            .remove(id)
            .ok_or_else(|| CircuitError::UnknownCircuit { id: id.to_string() })
    }

    pub fn ids(&self) -> Vec<&str> {
        self.circuits.keys().map(String::as_str).collect()
    }
}
