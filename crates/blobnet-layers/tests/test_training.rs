//! One SGD step through a Gather layer: only addressed objects move

mod utils;

use blobnet_core::backend::{init_cpu_device, CpuBackend};
use blobnet_kernels::{Blob, BurnEngine, CpuEngine, LookupDimension, MathEngine};
use blobnet_layers::GatherLayer;
use utils::{backward, float_blob, forward};

const OBJECT_SIZE: usize = 2;
const LEARNING_RATE: f32 = 1.0;

/// Four 2-float embeddings stacked along BatchLength, one column.
fn embeddings<E: MathEngine>(engine: &E) -> Blob<E> {
    float_blob(
        engine,
        4,
        1,
        OBJECT_SIZE,
        &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8],
    )
}

/// Forward, squared-error gradient against `target`, backward, then one
/// plain SGD update. Returns the embeddings after the step.
fn sgd_step<E: MathEngine>(
    engine: &E,
    layer: &mut GatherLayer,
    weights: &Blob<E>,
    indexes: &Blob<E>,
    target: &[f32],
) -> anyhow::Result<Vec<f32>> {
    let output = forward(engine, layer, weights, indexes)?;

    // d(0.5 * |output - target|^2) / d(output)
    let gradient: Vec<f32> = output
        .to_vec(engine)
        .iter()
        .zip(target)
        .map(|(o, t)| o - t)
        .collect();
    let output_diff = Blob::from_slice(engine, *output.desc(), &gradient)?;

    let weights_diff = backward(engine, layer, weights, indexes, &output_diff)?;

    let updated = weights
        .to_vec(engine)
        .iter()
        .zip(weights_diff.to_vec(engine))
        .map(|(w, d)| w - LEARNING_RATE * d)
        .collect();
    Ok(updated)
}

fn object(data: &[f32], index: usize) -> &[f32] {
    &data[index * OBJECT_SIZE..(index + 1) * OBJECT_SIZE]
}

fn check_boundary_objects_unchanged<E: MathEngine>(engine: &E, paddings: bool) {
    let weights = embeddings(engine);
    let before = weights.to_vec(engine);

    // Interior objects only; the padded run mixes in sentinels
    let (indexes, target) = if paddings {
        (
            float_blob(engine, 4, 1, 1, &[1.0, -1.0, 2.0, -1.0]),
            vec![0.0; 4 * OBJECT_SIZE],
        )
    } else {
        (
            float_blob(engine, 2, 1, 1, &[1.0, 2.0]),
            vec![0.0; 2 * OBJECT_SIZE],
        )
    };
    let mut layer = GatherLayer::new("embeddings").with_paddings(paddings);

    let after = sgd_step(engine, &mut layer, &weights, &indexes, &target).unwrap();

    assert_eq!(object(&after, 0), object(&before, 0));
    assert_eq!(object(&after, 3), object(&before, 3));
    assert_ne!(object(&after, 1), object(&before, 1));
    assert_ne!(object(&after, 2), object(&before, 2));

    // With a zero target each addressed object steps to zero
    for a in object(&after, 1).iter().chain(object(&after, 2)) {
        assert!(a.abs() < 1e-6, "addressed object should reach zero, got {a}");
    }
}

#[test]
fn test_boundary_objects_unchanged_cpu() {
    let engine = CpuEngine::new();
    check_boundary_objects_unchanged(&engine, false);
    check_boundary_objects_unchanged(&engine, true);
}

#[test]
fn test_boundary_objects_unchanged_burn() {
    let engine = BurnEngine::<CpuBackend>::new(init_cpu_device());
    check_boundary_objects_unchanged(&engine, false);
    check_boundary_objects_unchanged(&engine, true);
}

#[test]
fn test_all_padded_step_leaves_weights() {
    let engine = CpuEngine::new();
    let weights = embeddings(&engine);
    let indexes = float_blob(&engine, 2, 1, 1, &[-1.0, -1.0]);
    let mut layer = GatherLayer::new("embeddings").with_paddings(true);

    // Padded outputs are zero, so a non-zero target yields a non-zero
    // output gradient that must still not reach the weights
    let after = sgd_step(&engine, &mut layer, &weights, &indexes, &[5.0; 4]).unwrap();
    assert_eq!(after, weights.to_vec(&engine));
}

/// Trainable scalar embeddings feeding the gather layer through a lookup.
///
/// Produces a `(2, 2)` blob whose element `(t, c)` is embedding
/// `lookup[t][c]`, and routes the blob gradient back the same way.
struct EmbeddingLookup<E: MathEngine> {
    table: Blob<E>,
    lookup: E::Buffer,
}

impl<E: MathEngine> EmbeddingLookup<E> {
    fn new(engine: &E, embeddings: &[f32], lookup: &[f32]) -> Self {
        Self {
            table: float_blob(engine, embeddings.len(), 1, 1, embeddings),
            lookup: engine.upload(lookup),
        }
    }

    fn dims(&self) -> LookupDimension {
        LookupDimension::new(self.table.desc().object_count(), 1)
    }

    fn forward(&self, engine: &E) -> Blob<E> {
        let mut blob = float_blob(engine, 2, 2, 1, &[0.0; 4]);
        engine.lookup_and_copy(&self.lookup, self.table.data(), self.dims(), blob.data_mut());
        blob
    }

    /// Plain SGD on the embeddings from the gradient of the looked-up blob.
    fn step(&mut self, engine: &E, blob_diff: &Blob<E>) {
        let dims = self.dims();
        engine.lookup_and_add_to_table(
            &self.lookup,
            self.table.data_mut(),
            dims,
            -LEARNING_RATE,
            blob_diff.data(),
        );
    }
}

fn check_lookup_then_gather<E: MathEngine>(engine: &E, paddings: bool) {
    let embeddings = [1.0, 2.0, 3.0, 4.0];
    // Looked-up blob is [[1, 3], [2, 4]]
    let mut lookup = EmbeddingLookup::new(engine, &embeddings, &[0.0, 2.0, 1.0, 3.0]);
    let weights = lookup.forward(engine);
    assert_eq!(weights.to_vec(engine), vec![1.0, 3.0, 2.0, 4.0]);

    let (indexes, expected_output) = if paddings {
        (
            float_blob(engine, 2, 2, 1, &[1.0, -1.0, -1.0, 0.0]),
            vec![2.0, 0.0, 0.0, 3.0],
        )
    } else {
        (float_blob(engine, 1, 2, 1, &[1.0, 0.0]), vec![2.0, 3.0])
    };
    let mut layer = GatherLayer::new("gathering").with_paddings(paddings);
    let output = forward(engine, &mut layer, &weights, &indexes).unwrap();
    assert_eq!(output.to_vec(engine), expected_output);

    // Zero target: the output gradient is the output itself
    let weights_diff = backward(engine, &layer, &weights, &indexes, &output).unwrap();
    assert_eq!(weights_diff.to_vec(engine), vec![0.0, 3.0, 2.0, 0.0]);

    lookup.step(engine, &weights_diff);
    let after = lookup.table.to_vec(engine);

    assert_eq!(after[0], embeddings[0]);
    assert_eq!(after[3], embeddings[3]);
    assert_ne!(after[1], embeddings[1]);
    assert_ne!(after[2], embeddings[2]);
    assert_eq!(after, vec![1.0, 0.0, 0.0, 4.0]);
}

#[test]
fn test_lookup_then_gather_cpu() {
    let engine = CpuEngine::new();
    check_lookup_then_gather(&engine, false);
    check_lookup_then_gather(&engine, true);
}

#[test]
fn test_lookup_then_gather_burn() {
    let engine = BurnEngine::<CpuBackend>::new(init_cpu_device());
    check_lookup_then_gather(&engine, false);
    check_lookup_then_gather(&engine, true);
}
