//! # blobnet-kernels
//!
//! Vector math primitives that layers issue against a [`MathEngine`].
//!
//! Layers never touch element data directly: every step of a forward or
//! backward pass is one primitive call on engine-owned buffers. Two engines
//! are provided:
//!
//! - [`CpuEngine`] - reference implementation over plain `Vec<f32>` buffers
//! - [`BurnEngine`] - the same primitives on burn tensors, generic over any
//!   burn `Backend` (ndarray on CPU, WGPU with the `gpu` feature)
//!
//! ## Architecture
//!
//! 1. [`MathEngine`] fixes the primitive contract and the buffer handle type
//! 2. Each engine implements it for its own buffer representation
//! 3. [`Blob`] pairs a buffer with its [`BlobDesc`](blobnet_core::BlobDesc)
//!
//! ## Lookup tables
//!
//! The two lookup primitives treat a buffer as a flat table of
//! [`LookupDimension::count`] rows of [`LookupDimension::size`] floats and
//! take a buffer of float-encoded row addresses:
//!
//! ```text
//! lookup_and_copy:          output[i]          = table[address[i]]
//! lookup_and_add_to_table:  table[address[i]] += scale * source[i]
//! ```

pub mod blob;
pub mod reference;
pub mod tensor_engine;

pub use blob::{Blob, BlobError};
pub use reference::CpuEngine;
pub use tensor_engine::BurnEngine;

use std::fmt::Debug;

// ============================================================================
// Engine Trait
// ============================================================================

/// Shape of a lookup table: `count` rows of `size` elements each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupDimension {
    pub count: usize,
    pub size: usize,
}

impl LookupDimension {
    pub fn new(count: usize, size: usize) -> Self {
        Self { count, size }
    }

    pub fn table_len(&self) -> usize {
        self.count * self.size
    }
}

/// Vector math backend consumed by layers.
///
/// Every primitive is blocking from the caller's point of view: when it
/// returns, the destination buffer is ready to be read by the next call.
/// Implementations may parallelize or offload internally.
///
/// # Fatal conditions
///
/// Length mismatches between arguments and lookup addresses outside
/// `[0, dims.count)` are caller bugs, not recoverable errors; engines panic
/// on them.
pub trait MathEngine {
    /// Engine-resident float buffer.
    type Buffer: Clone + Debug;

    /// Short engine identifier for logs.
    fn name(&self) -> &'static str;

    /// Allocate a zero-filled buffer of `len` floats.
    fn alloc(&self, len: usize) -> Self::Buffer;

    /// Transfer host data into a new engine buffer.
    fn upload(&self, data: &[f32]) -> Self::Buffer;

    /// Transfer an engine buffer back to the host.
    fn download(&self, buffer: &Self::Buffer) -> Vec<f32>;

    fn buffer_len(&self, buffer: &Self::Buffer) -> usize;

    /// `dst[offset..offset + count] = value`
    fn vector_fill(&self, dst: &mut Self::Buffer, offset: usize, count: usize, value: f32);

    /// `dst[dst_offset..][..count] = src[src_offset..][..count]`
    fn vector_copy(
        &self,
        dst: &mut Self::Buffer,
        dst_offset: usize,
        src: &Self::Buffer,
        src_offset: usize,
        count: usize,
    );

    /// `dst = src + value`, elementwise. Both buffers have the same length.
    fn vector_add_value(&self, src: &Self::Buffer, dst: &mut Self::Buffer, value: f32);

    /// `dst = src * value`, elementwise. Both buffers have the same length.
    fn vector_multiply(&self, src: &Self::Buffer, dst: &mut Self::Buffer, value: f32);

    /// Add `vector` (length `cols`) to every row of the `rows x cols` `matrix`.
    fn add_vector_to_matrix_rows(
        &self,
        matrix: &mut Self::Buffer,
        vector: &Self::Buffer,
        rows: usize,
        cols: usize,
    );

    /// Gather the addressed table rows into `output`, in address order.
    ///
    /// `output` has `len(addresses) * dims.size` elements.
    fn lookup_and_copy(
        &self,
        addresses: &Self::Buffer,
        table: &Self::Buffer,
        dims: LookupDimension,
        output: &mut Self::Buffer,
    );

    /// Scatter-add `scale * source[i]` into the addressed table rows.
    ///
    /// Repeated addresses accumulate. `source` has
    /// `len(addresses) * dims.size` elements.
    fn lookup_and_add_to_table(
        &self,
        addresses: &Self::Buffer,
        table: &mut Self::Buffer,
        dims: LookupDimension,
        scale: f32,
        source: &Self::Buffer,
    );
}

/// Convert a float-encoded address into a row index, panicking when it does
/// not name a row of a `count`-row table.
pub(crate) fn checked_row(address: f32, count: usize) -> usize {
    assert!(
        address.is_finite() && address >= 0.0 && address.fract() == 0.0,
        "lookup address {} is not a valid row index",
        address
    );
    let row = address as usize;
    assert!(
        row < count,
        "lookup address {} is outside of table with {} rows",
        row,
        count
    );
    row
}
