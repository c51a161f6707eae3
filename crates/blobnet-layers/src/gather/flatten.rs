//! Conversion of per-sample index values into flat table addresses.
//!
//! An index blob holds, at `(t, c)`, the time step `v` of the weight object
//! to pick in the same column `c`. Weight objects are stored time-major with
//! columns varying fastest, so that object sits at flat position
//! `v * BatchWidth + c`.

use blobnet_kernels::{Blob, MathEngine};

/// Compute `index(t, c) * BatchWidth + c` for every index position.
///
/// The result has the element count of `indexes` and feeds the engine's
/// lookup primitives directly.
pub(crate) fn flatten_indexes<E: MathEngine>(engine: &E, indexes: &Blob<E>) -> E::Buffer {
    let batch_width = indexes.desc().batch_width();
    let size = indexes.data_size();

    let mut result = engine.alloc(size);
    if size == 0 {
        return result;
    }
    assert_eq!(
        size % batch_width,
        0,
        "index blob size {} is not a multiple of batch width {}",
        size,
        batch_width
    );

    // Scale to the start of the time step's row
    engine.vector_multiply(indexes.data(), &mut result, batch_width as f32);

    // Add each position's own column number
    let ramp: Vec<f32> = (0..batch_width).map(|c| c as f32).collect();
    let ramp = engine.upload(&ramp);
    engine.add_vector_to_matrix_rows(&mut result, &ramp, size / batch_width, batch_width);

    debug_assert_eq!(engine.buffer_len(&result), size);
    result
}
