use crate::blob::{BlobDesc, DataType};
use thiserror::Error;

/// Graph-construction failures reported by a layer's `reshape`.
///
/// Each variant names the layer and the specific constraint that was
/// violated. None of them are recoverable without changing the graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchitectureError {
    #[error("{layer}: bad inputs count (expected {expected}, got {got})")]
    InputCount {
        layer: String,
        expected: usize,
        got: usize,
    },

    #[error("{layer}: bad weights blob type {got} (expected float)")]
    WeightsType { layer: String, got: DataType },

    #[error("{layer}: bad indexes blob type {got} (expected float)")]
    IndexesType { layer: String, got: DataType },

    #[error(
        "{layer}: weights samples count {weights} differs from index samples count {indexes}"
    )]
    BatchWidthMismatch {
        layer: String,
        weights: usize,
        indexes: usize,
    },

    #[error("{layer}: bad weights ListSize {got}")]
    WeightsListSize { layer: String, got: usize },

    #[error("{layer}: bad indexes ListSize {got}")]
    IndexesListSize { layer: String, got: usize },

    #[error("{layer}: bad indexes object size {got}")]
    IndexesObjectSize { layer: String, got: usize },
}

/// Invariant violations detected while a layer runs forward or backward.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    #[error(transparent)]
    Architecture(#[from] ArchitectureError),

    #[error("{layer}: layer was run before a successful reshape")]
    NotReshaped { layer: String },

    #[error("{layer}: expected {expected} {role} blobs, got {got}")]
    BlobCount {
        layer: String,
        role: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{layer}: output diff is missing in backward pass")]
    MissingOutputDiff { layer: String },

    #[error("{layer}: {role} blob has shape {got}, expected {expected}")]
    ShapeMismatch {
        layer: String,
        role: &'static str,
        expected: BlobDesc,
        got: BlobDesc,
    },
}

/// Failures while reading or writing graph configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    Write(#[from] toml::ser::Error),

    #[error("unknown layer kind '{0}'")]
    UnknownLayerKind(String),

    #[error("duplicate layer name '{0}'")]
    DuplicateLayerName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_layer() {
        let err = ArchitectureError::BatchWidthMismatch {
            layer: "gathering".to_string(),
            weights: 2,
            indexes: 3,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("gathering:"));
        assert!(msg.contains("differs"));
    }

    #[test]
    fn test_architecture_converts_into_layer_error() {
        let err: LayerError = ArchitectureError::IndexesObjectSize {
            layer: "g".to_string(),
            got: 4,
        }
        .into();
        assert!(matches!(err, LayerError::Architecture(_)));
    }
}
