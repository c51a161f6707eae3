//! Padding adapter for the `-1` sentinel.
//!
//! With paddings enabled, the layer works on derived blobs instead of the
//! caller's:
//!
//! - the table gets one zero time step prepended, i.e. `BatchWidth` zero
//!   objects, one per column
//! - every index value is shifted by `+1`
//!
//! A sentinel `-1` in column `c` then addresses the zero object of that
//! column, and a genuine index `k` addresses the same logical object as
//! before, one time step further in. The derived blobs are fresh buffers
//! that live for one call only.

use blobnet_core::blob::{BlobDesc, BlobDim};
use blobnet_kernels::{Blob, MathEngine};
use std::borrow::Cow;

/// Shape of a padded table: one more time step than `desc`.
pub(crate) fn padded_desc(desc: &BlobDesc) -> BlobDesc {
    desc.with_dim(BlobDim::BatchLength, desc.batch_length() + 1)
}

/// Number of leading elements occupied by the padding time step.
pub(crate) fn padding_len(desc: &BlobDesc) -> usize {
    desc.batch_width() * desc.list_size() * desc.object_size()
}

/// Fresh table with a zero time step prepended to `table`.
pub(crate) fn pad_table<E: MathEngine>(engine: &E, table: &Blob<E>) -> Blob<E> {
    let desc = padded_desc(table.desc());
    let offset = padding_len(table.desc());

    let mut padded = Blob::zeros(engine, desc);
    engine.vector_fill(padded.data_mut(), 0, offset, 0.0);
    engine.vector_copy(padded.data_mut(), offset, table.data(), 0, table.data_size());
    padded
}

/// Copy the un-padded region of `padded` into `table`, dropping the padding
/// time step.
pub(crate) fn strip_table<E: MathEngine>(engine: &E, padded: &Blob<E>, table: &mut Blob<E>) {
    debug_assert_eq!(*padded.desc(), padded_desc(table.desc()));
    let offset = padding_len(table.desc());
    let size = table.data_size();
    engine.vector_copy(table.data_mut(), 0, padded.data(), offset, size);
}

/// Fresh index blob with every value shifted by one.
pub(crate) fn shift_indexes<E: MathEngine>(engine: &E, indexes: &Blob<E>) -> Blob<E> {
    let mut shifted = Blob::zeros(engine, *indexes.desc());
    engine.vector_add_value(indexes.data(), shifted.data_mut(), 1.0);
    shifted
}

/// Table view used for lookups: the caller's blob, or its padded copy.
pub(crate) fn table_view<'a, E: MathEngine>(
    engine: &E,
    enabled: bool,
    table: &'a Blob<E>,
) -> Cow<'a, Blob<E>> {
    if enabled {
        Cow::Owned(pad_table(engine, table))
    } else {
        Cow::Borrowed(table)
    }
}

/// Index view used for addressing: the caller's blob, or its shifted copy.
pub(crate) fn index_view<'a, E: MathEngine>(
    engine: &E,
    enabled: bool,
    indexes: &'a Blob<E>,
) -> Cow<'a, Blob<E>> {
    if enabled {
        Cow::Owned(shift_indexes(engine, indexes))
    } else {
        Cow::Borrowed(indexes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobnet_core::blob::DataType;
    use blobnet_kernels::CpuEngine;

    fn weights(engine: &CpuEngine) -> Blob<CpuEngine> {
        Blob::from_slice(
            engine,
            BlobDesc::data(DataType::Float, 3, 2, 1),
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .unwrap()
    }

    #[test]
    fn test_pad_table_prepends_zero_row() {
        let engine = CpuEngine::new();
        let table = weights(&engine);
        let padded = pad_table(&engine, &table);

        assert_eq!(padded.desc().batch_length(), 4);
        assert_eq!(padded.desc().batch_width(), 2);
        assert_eq!(
            padded.to_vec(&engine),
            vec![0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
        // The caller's table is untouched
        assert_eq!(table.to_vec(&engine), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_strip_table_drops_padding() {
        let engine = CpuEngine::new();
        let mut table = Blob::zeros(&engine, BlobDesc::data(DataType::Float, 2, 2, 1));
        let padded = Blob::from_slice(
            &engine,
            padded_desc(table.desc()),
            &[9.0, 9.0, 1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();

        strip_table(&engine, &padded, &mut table);
        assert_eq!(table.to_vec(&engine), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_shift_maps_sentinel_to_zero() {
        let engine = CpuEngine::new();
        let indexes = Blob::from_slice(
            &engine,
            BlobDesc::data(DataType::Float, 2, 2, 1),
            &[0.0, 1.0, -1.0, 0.0],
        )
        .unwrap();

        let shifted = shift_indexes(&engine, &indexes);
        assert_eq!(shifted.to_vec(&engine), vec![1.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn test_views_borrow_when_disabled() {
        let engine = CpuEngine::new();
        let table = weights(&engine);
        assert!(matches!(table_view(&engine, false, &table), Cow::Borrowed(_)));
        assert!(matches!(table_view(&engine, true, &table), Cow::Owned(_)));
    }

    #[test]
    fn test_padding_len_counts_object_size() {
        let desc = BlobDesc::data(DataType::Float, 3, 2, 5);
        assert_eq!(padding_len(&desc), 10);
    }
}
