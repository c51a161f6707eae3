//! Shared helpers for blobnet-layers integration tests

#![allow(dead_code)]

use blobnet_core::blob::{BlobDesc, DataType};
use blobnet_kernels::{Blob, MathEngine};
use blobnet_layers::{GatherLayer, Layer};

pub const TOLERANCE: f32 = 1e-6;

/// Float blob of shape `(batch_length, batch_width, 1, 1, 1, 1, channels)`.
pub fn float_blob<E: MathEngine>(
    engine: &E,
    batch_length: usize,
    batch_width: usize,
    channels: usize,
    data: &[f32],
) -> Blob<E> {
    let desc = BlobDesc::data(DataType::Float, batch_length, batch_width, channels);
    Blob::from_slice(engine, desc, data).expect("test data matches its shape")
}

/// Reshape `layer` for the given inputs and run one forward pass.
pub fn forward<E: MathEngine>(
    engine: &E,
    layer: &mut GatherLayer,
    weights: &Blob<E>,
    indexes: &Blob<E>,
) -> anyhow::Result<Blob<E>> {
    let output_desc = Layer::<E>::reshape(layer, &[*weights.desc(), *indexes.desc()])?[0];
    let mut outputs = [Blob::zeros(engine, output_desc)];
    layer.run_once(engine, &[weights, indexes], &mut outputs)?;
    let [output] = outputs;
    Ok(output)
}

/// One backward pass into a fresh zero weights diff.
pub fn backward<E: MathEngine>(
    engine: &E,
    layer: &GatherLayer,
    weights: &Blob<E>,
    indexes: &Blob<E>,
    output_diff: &Blob<E>,
) -> anyhow::Result<Blob<E>> {
    let mut input_diffs = [Blob::zeros(engine, *weights.desc())];
    layer.backward_once(engine, &[weights, indexes], &[output_diff], &mut input_diffs)?;
    let [weights_diff] = input_diffs;
    Ok(weights_diff)
}

pub fn assert_close(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len(), "length differs");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= TOLERANCE,
            "element {i}: got {a}, expected {e}"
        );
    }
}
