//! # blobnet-layers
//!
//! Differentiable layers for blobnet graphs.
//!
//! - [`Layer`]: lifecycle a graph host drives (reshape, forward, backward, archive)
//! - [`GatherLayer`]: index-driven selection of weight objects, with optional
//!   `-1` paddings
//! - [`LayerRegistry`]: class-name constructors for config-built graphs and
//!   archived layers
//!
//! ## Usage
//!
//! ```ignore
//! use blobnet_core::backend::{init_cpu_device, CpuBackend};
//! use blobnet_kernels::BurnEngine;
//! use blobnet_layers::{GatherLayer, Layer};
//!
//! let engine = BurnEngine::<CpuBackend>::new(init_cpu_device());
//! let mut layer = GatherLayer::new("lookup");
//! let output_desc = layer.reshape(&[*weights.desc(), *indexes.desc()])?[0];
//! let mut output = Blob::zeros(&engine, output_desc);
//! layer.run_once(&engine, &[&weights, &indexes], std::slice::from_mut(&mut output))?;
//! ```

pub mod archive;
pub mod gather;
pub mod layer;
pub mod registry;

pub use archive::{ArchiveError, ArchiveReader, ArchiveWriter};
pub use gather::{gather, GatherLayer, GATHER_CLASS_NAME, GATHER_LAYER_VERSION};
pub use layer::{Layer, LayerBase};
pub use registry::{LayerFactory, LayerRegistry};
