//! Reference engine over host `Vec<f32>` buffers.
//!
//! Single-threaded and allocation-light; used as the default engine and as
//! the oracle the tensor engine is checked against.

use crate::{checked_row, LookupDimension, MathEngine};

/// Reference CPU implementation of [`MathEngine`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuEngine;

impl CpuEngine {
    pub fn new() -> Self {
        CpuEngine
    }
}

impl MathEngine for CpuEngine {
    type Buffer = Vec<f32>;

    fn name(&self) -> &'static str {
        "cpu-reference"
    }

    fn alloc(&self, len: usize) -> Vec<f32> {
        vec![0.0; len]
    }

    fn upload(&self, data: &[f32]) -> Vec<f32> {
        data.to_vec()
    }

    fn download(&self, buffer: &Vec<f32>) -> Vec<f32> {
        buffer.clone()
    }

    fn buffer_len(&self, buffer: &Vec<f32>) -> usize {
        buffer.len()
    }

    fn vector_fill(&self, dst: &mut Vec<f32>, offset: usize, count: usize, value: f32) {
        dst[offset..offset + count].fill(value);
    }

    fn vector_copy(
        &self,
        dst: &mut Vec<f32>,
        dst_offset: usize,
        src: &Vec<f32>,
        src_offset: usize,
        count: usize,
    ) {
        dst[dst_offset..dst_offset + count].copy_from_slice(&src[src_offset..src_offset + count]);
    }

    fn vector_add_value(&self, src: &Vec<f32>, dst: &mut Vec<f32>, value: f32) {
        assert_eq!(src.len(), dst.len(), "vector_add_value length mismatch");
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s + value;
        }
    }

    fn vector_multiply(&self, src: &Vec<f32>, dst: &mut Vec<f32>, value: f32) {
        assert_eq!(src.len(), dst.len(), "vector_multiply length mismatch");
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s * value;
        }
    }

    fn add_vector_to_matrix_rows(
        &self,
        matrix: &mut Vec<f32>,
        vector: &Vec<f32>,
        rows: usize,
        cols: usize,
    ) {
        assert_eq!(matrix.len(), rows * cols, "matrix is not {}x{}", rows, cols);
        assert_eq!(vector.len(), cols, "row vector length mismatch");
        if cols == 0 {
            return;
        }
        for row in matrix.chunks_exact_mut(cols) {
            for (m, v) in row.iter_mut().zip(vector) {
                *m += v;
            }
        }
    }

    fn lookup_and_copy(
        &self,
        addresses: &Vec<f32>,
        table: &Vec<f32>,
        dims: LookupDimension,
        output: &mut Vec<f32>,
    ) {
        assert_eq!(table.len(), dims.table_len(), "lookup table size mismatch");
        assert_eq!(
            output.len(),
            addresses.len() * dims.size,
            "lookup output size mismatch"
        );
        if dims.size == 0 {
            return;
        }
        for (&address, out) in addresses.iter().zip(output.chunks_exact_mut(dims.size)) {
            let row = checked_row(address, dims.count);
            out.copy_from_slice(&table[row * dims.size..(row + 1) * dims.size]);
        }
    }

    fn lookup_and_add_to_table(
        &self,
        addresses: &Vec<f32>,
        table: &mut Vec<f32>,
        dims: LookupDimension,
        scale: f32,
        source: &Vec<f32>,
    ) {
        assert_eq!(table.len(), dims.table_len(), "lookup table size mismatch");
        assert_eq!(
            source.len(),
            addresses.len() * dims.size,
            "lookup source size mismatch"
        );
        if dims.size == 0 {
            return;
        }
        for (&address, src) in addresses.iter().zip(source.chunks_exact(dims.size)) {
            let row = checked_row(address, dims.count);
            for (t, s) in table[row * dims.size..(row + 1) * dims.size]
                .iter_mut()
                .zip(src)
            {
                *t += scale * s;
            }
        }
    }
}
