//! Backward scatter-add: route output gradients to the gathered objects.

use super::flatten::flatten_indexes;
use super::padding::{index_view, pad_table, strip_table};
use blobnet_kernels::{Blob, LookupDimension, MathEngine};

/// `weights_diff[indexes[t][c]][c] += scale * output_diff[t][c]`.
///
/// Positions addressing the same object accumulate. With `paddings` set the
/// sums go through a padded accumulator whose padding time step is dropped
/// afterwards, so gradient at `-1` positions never reaches `weights_diff`.
pub(crate) fn gather_backward<E: MathEngine>(
    engine: &E,
    paddings: bool,
    indexes: &Blob<E>,
    output_diff: &Blob<E>,
    weights_diff: &mut Blob<E>,
    scale: f32,
) {
    let indexes = index_view(engine, paddings, indexes);
    let addresses = flatten_indexes(engine, &indexes);

    if paddings {
        let mut accumulator = pad_table(engine, weights_diff);
        scatter_add(engine, &addresses, &mut accumulator, output_diff, scale);
        strip_table(engine, &accumulator, weights_diff);
    } else {
        scatter_add(engine, &addresses, weights_diff, output_diff, scale);
    }
}

fn scatter_add<E: MathEngine>(
    engine: &E,
    addresses: &E::Buffer,
    table: &mut Blob<E>,
    source: &Blob<E>,
    scale: f32,
) {
    let dims = LookupDimension::new(table.desc().object_count(), table.desc().object_size());
    log::trace!(
        "gather backward: {} addresses into {}x{} table, scale {}",
        engine.buffer_len(addresses),
        dims.count,
        dims.size,
        scale
    );
    engine.lookup_and_add_to_table(addresses, table.data_mut(), dims, scale, source.data());
}
