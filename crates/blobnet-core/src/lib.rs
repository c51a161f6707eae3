//! # blobnet-core
//!
//! Core types shared by the blobnet crates:
//!
//! - [`BlobDesc`]: shape and element type of a batched blob
//! - [`BlobDim`]: the seven named blob axes (BatchLength, BatchWidth, ListSize, object axes)
//! - [`ArchitectureError`] / [`LayerError`]: graph-construction and run-time failures
//! - [`GraphConfig`]: TOML description of the layers a host builds
//!
//! ## Blob layout
//!
//! A blob is a flat float buffer. Objects are stored time-major with the
//! sample axis varying fastest, so the object at time `t`, column `c` of a
//! blob with `ListSize == 1` has flat object index `t * BatchWidth + c`.
//!
//! ## Tensor backends
//!
//! [`backend`] provides aliases for the burn backends the engines run on:
//! `CpuBackend` (ndarray) always, `WgpuBackend` with the `gpu` feature.

pub mod backend;
pub mod blob;
pub mod config;
pub mod error;

pub use backend::*;
pub use blob::*;
pub use config::*;
pub use error::*;
