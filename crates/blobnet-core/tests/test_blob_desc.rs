//! Tests for BlobDesc layout arithmetic and graph configuration parsing

use blobnet_core::blob::{BlobDesc, BlobDim, DataType};
use blobnet_core::config::{GraphConfig, LayerConfig};
use blobnet_core::error::ConfigError;

/// Replacing BatchLength keeps every other axis, as the gather output shape does
#[test]
fn test_replace_batch_length() {
    let weights = BlobDesc::data(DataType::Float, 3, 2, 4).with_dim(BlobDim::Height, 5);
    let mut output = weights;
    output.set_dim_size(BlobDim::BatchLength, 7);

    assert_eq!(output.batch_length(), 7);
    assert_eq!(output.batch_width(), 2);
    assert_eq!(output.object_size(), weights.object_size());
    assert_eq!(output.object_count(), 14);
}

#[test]
fn test_list_size_counts_objects() {
    let desc = BlobDesc::data(DataType::Float, 2, 3, 1).with_dim(BlobDim::ListSize, 4);
    assert_eq!(desc.object_count(), 24, "ListSize multiplies the object count");
    assert_eq!(desc.object_size(), 1);
}

#[test]
fn test_all_dims_in_order() {
    let indices: Vec<usize> = BlobDim::ALL.iter().map(|d| d.index()).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_graph_config_multiple_layers() {
    let config = GraphConfig::from_toml_str(
        r#"
        [[layer]]
        name = "plain"
        kind = "Gather"

        [[layer]]
        name = "padded"
        kind = "Gather"
        paddings = true
        "#,
    )
    .unwrap();

    assert_eq!(config.layers.len(), 2);
    assert!(!config.layer("plain").unwrap().paddings);
    assert!(config.layer("padded").unwrap().paddings);
    assert!(config.layer("missing").is_none());
}

#[test]
fn test_graph_config_bad_toml() {
    let result = GraphConfig::from_toml_str("[[layer]]\nname = 3\n");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_graph_config_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = GraphConfig::from_file(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_layer_config_builder_defaults() {
    let layer = LayerConfig::new("g", "Gather");
    assert_eq!(layer.learning_rate_multiplier, 1.0);
    assert!(!layer.paddings);
}
