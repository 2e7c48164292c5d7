//! Error types for treebench.

use thiserror::Error;

/// Diagnostic returned by a tree engine mutation, commit or version save.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("ordered insert out of order: key {key} sorts below previous key {previous}")]
    OutOfOrder { previous: String, key: String },

    #[error("empty value for key {0}")]
    EmptyValue(String),

    #[error("store error: {0}")]
    Store(String),
}

impl EngineError {
    pub fn out_of_order(previous: &[u8], key: &[u8]) -> Self {
        Self::OutOfOrder {
            previous: hex::encode(previous),
            key: hex::encode(key),
        }
    }

    pub fn empty_value(key: &[u8]) -> Self {
        Self::EmptyValue(hex::encode(key))
    }
}

/// Error surfaced by a benchmark run.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("scenario {scenario} ({params}) aborted: {source}")]
    Engine {
        scenario: String,
        params: String,
        #[source]
        source: EngineError,
    },

    #[error("scenario {scenario}: key count changed from {before} to {after} during edits")]
    KeyCountChanged {
        scenario: String,
        before: usize,
        after: usize,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no scenario matches filter {0:?}")]
    NoScenario(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for treebench operations.
pub type Result<T> = std::result::Result<T, BenchError>;
