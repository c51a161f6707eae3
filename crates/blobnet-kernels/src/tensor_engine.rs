//! [`MathEngine`] on burn tensors.
//!
//! Buffers are rank-1 `Tensor<B, 1>` values. Lookup tables are reshaped to
//! `[count, size]` and addressed along dimension 0:
//!
//! - lookup-and-copy is `select`
//! - lookup-and-add is `select_assign`, which sums on repeated indices
//!
//! Burn tensors are immutable values, so "in place" primitives replace the
//! destination handle with the updated tensor.

use crate::{checked_row, LookupDimension, MathEngine};
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};

/// Burn-backed implementation of [`MathEngine`].
#[derive(Debug, Clone)]
pub struct BurnEngine<B: Backend> {
    device: B::Device,
}

impl<B: Backend> BurnEngine<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    fn rows_of(&self, addresses: &Tensor<B, 1>, dims: LookupDimension) -> Tensor<B, 1, Int> {
        // Host-side range check; release builds leave it to the backend
        if cfg!(debug_assertions) {
            for address in self.download(addresses) {
                checked_row(address, dims.count);
            }
        }
        log::trace!(
            "burn lookup: {} rows of {}x{} table",
            self.buffer_len(addresses),
            dims.count,
            dims.size
        );
        addresses.clone().int()
    }
}

impl<B: Backend> MathEngine for BurnEngine<B> {
    type Buffer = Tensor<B, 1>;

    fn name(&self) -> &'static str {
        "burn"
    }

    fn alloc(&self, len: usize) -> Tensor<B, 1> {
        Tensor::zeros([len], &self.device)
    }

    fn upload(&self, data: &[f32]) -> Tensor<B, 1> {
        Tensor::from_data(data, &self.device)
    }

    fn download(&self, buffer: &Tensor<B, 1>) -> Vec<f32> {
        buffer.clone().into_data().iter::<f32>().collect()
    }

    fn buffer_len(&self, buffer: &Tensor<B, 1>) -> usize {
        buffer.dims()[0]
    }

    fn vector_fill(&self, dst: &mut Tensor<B, 1>, offset: usize, count: usize, value: f32) {
        if count == 0 {
            return;
        }
        let values = Tensor::full([count], value, &self.device);
        *dst = dst.clone().slice_assign([offset..offset + count], values);
    }

    fn vector_copy(
        &self,
        dst: &mut Tensor<B, 1>,
        dst_offset: usize,
        src: &Tensor<B, 1>,
        src_offset: usize,
        count: usize,
    ) {
        if count == 0 {
            return;
        }
        let values = src.clone().slice([src_offset..src_offset + count]);
        *dst = dst
            .clone()
            .slice_assign([dst_offset..dst_offset + count], values);
    }

    fn vector_add_value(&self, src: &Tensor<B, 1>, dst: &mut Tensor<B, 1>, value: f32) {
        assert_eq!(
            self.buffer_len(src),
            self.buffer_len(dst),
            "vector_add_value length mismatch"
        );
        *dst = src.clone().add_scalar(value);
    }

    fn vector_multiply(&self, src: &Tensor<B, 1>, dst: &mut Tensor<B, 1>, value: f32) {
        assert_eq!(
            self.buffer_len(src),
            self.buffer_len(dst),
            "vector_multiply length mismatch"
        );
        *dst = src.clone().mul_scalar(value);
    }

    fn add_vector_to_matrix_rows(
        &self,
        matrix: &mut Tensor<B, 1>,
        vector: &Tensor<B, 1>,
        rows: usize,
        cols: usize,
    ) {
        assert_eq!(
            self.buffer_len(matrix),
            rows * cols,
            "matrix is not {}x{}",
            rows,
            cols
        );
        assert_eq!(self.buffer_len(vector), cols, "row vector length mismatch");
        if rows * cols == 0 {
            return;
        }
        let broadcast: Tensor<B, 2> = vector.clone().reshape([1, cols]).repeat_dim(0, rows);
        let sum = matrix.clone().reshape([rows, cols]) + broadcast;
        *matrix = sum.reshape([rows * cols]);
    }

    fn lookup_and_copy(
        &self,
        addresses: &Tensor<B, 1>,
        table: &Tensor<B, 1>,
        dims: LookupDimension,
        output: &mut Tensor<B, 1>,
    ) {
        let n = self.buffer_len(addresses);
        assert_eq!(
            self.buffer_len(table),
            dims.table_len(),
            "lookup table size mismatch"
        );
        assert_eq!(
            self.buffer_len(output),
            n * dims.size,
            "lookup output size mismatch"
        );
        if n * dims.size == 0 {
            return;
        }

        let rows = self.rows_of(addresses, dims);
        let gathered = table
            .clone()
            .reshape([dims.count, dims.size])
            .select(0, rows);
        *output = gathered.reshape([n * dims.size]);
    }

    fn lookup_and_add_to_table(
        &self,
        addresses: &Tensor<B, 1>,
        table: &mut Tensor<B, 1>,
        dims: LookupDimension,
        scale: f32,
        source: &Tensor<B, 1>,
    ) {
        let n = self.buffer_len(addresses);
        assert_eq!(
            self.buffer_len(table),
            dims.table_len(),
            "lookup table size mismatch"
        );
        assert_eq!(
            self.buffer_len(source),
            n * dims.size,
            "lookup source size mismatch"
        );
        if n * dims.size == 0 {
            return;
        }

        let rows = self.rows_of(addresses, dims);
        let values = source.clone().reshape([n, dims.size]).mul_scalar(scale);
        let updated = table
            .clone()
            .reshape([dims.count, dims.size])
            .select_assign(0, rows, values);
        *table = updated.reshape([dims.table_len()]);
    }
}
