//! Forward gather: copy the addressed weight objects into the output.

use super::flatten::flatten_indexes;
use super::padding::{index_view, table_view};
use blobnet_kernels::{Blob, LookupDimension, MathEngine};

/// `output[t][c] = weights[indexes[t][c]][c]`, with `-1` selecting a zero
/// object when `paddings` is set.
///
/// Reads `weights` and `indexes` only; the padded views are call-scoped
/// copies.
pub(crate) fn gather_forward<E: MathEngine>(
    engine: &E,
    paddings: bool,
    weights: &Blob<E>,
    indexes: &Blob<E>,
    output: &mut Blob<E>,
) {
    let table = table_view(engine, paddings, weights);
    let indexes = index_view(engine, paddings, indexes);

    let addresses = flatten_indexes(engine, &indexes);

    let dims = LookupDimension::new(table.desc().object_count(), table.desc().object_size());
    log::trace!(
        "gather forward: {} addresses into {}x{} table",
        indexes.data_size(),
        dims.count,
        dims.size
    );
    engine.lookup_and_copy(&addresses, table.data(), dims, output.data_mut());
}
