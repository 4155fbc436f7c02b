use thiserror::Error;

#[derive(Debug, Error)]
pub enum CircuitError {
    #[error("circuit '{id}' already exists")]
    DuplicateCircuit { id: String },

    #[error("circuit '{id}' not found")]
    UnknownCircuit { id: String },

    #[error("component '{name}' already exists in circuit")]
    DuplicateComponent { name: String },

    #[error("component '{name}' not found in circuit")]
    UnknownComponent { name: String },

    #[error("model '{name}' already exists in circuit")]
    DuplicateModel { name: String },

    #[error("model '{name}' not found in circuit")]
    UnknownModel { name: String },

    #[error("model '{name}' is still referenced by component '{referenced_by}'")]
    ModelInUse { name: String, referenced_by: String },

    #[error("model '{model}' ({kind}) has no parameter '{param}'")]
    UnknownModelParameter {
        model: String,
        kind: String,
        param: String,
    },
}
