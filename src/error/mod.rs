//! Error taxonomy shared by the selection engine and the calculator

use thiserror::Error;

/// Reference or constant source could not be loaded. Fatal at startup.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column: {0:?}")]
    MissingColumn(String),

    #[error("row {row}: invalid value {value:?} in column {column:?}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("malformed power constants: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Input the calculator cannot work with. The offending change is not applied.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidArgument {
    #[error("cannot bracket a target in an empty set of values")]
    EmptyBracket,

    #[error("tool diameter is not defined")]
    DiameterUndefined,

    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f64 },

    #[error("tooth count must be at least 1")]
    ZeroTeeth,
}

/// No power constant for the requested material and hardness.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("no power constants for material {0:?}")]
    UnknownMaterial(String),

    #[error("no hardness bracket covers {hardness} HB for {material:?}")]
    NoHardnessBracket { material: String, hardness: f64 },

    #[error("material family is not set")]
    MaterialUnset,

    #[error("no power constant table loaded")]
    NoTable,
}

/// The filter pipeline did not narrow the table to one or two rows.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    #[error("no matching rows")]
    NoMatch,

    #[error("ambiguous result: {rows} rows remain")]
    Ambiguous { rows: usize },
}

/// Failure of one recomputation pass. Never fatal for the session.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Unresolved(#[from] Unresolved),

    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}
