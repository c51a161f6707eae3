//! Gather layer: picks objects from a weight blob by per-sample indexes.
//!
//! # Inputs
//!
//! | # | blob | shape |
//! |---|------|-------|
//! | 0 | weights to select from (float) | `(BatchLength, BatchWidth, 1, *)` |
//! | 1 | float-encoded indexes | `(BatchLength', BatchWidth, 1, 1, 1, 1, 1)` |
//!
//! The single output has the weights' shape with `BatchLength'` time steps:
//! `output[t][c] = weights[indexes[t][c]][c]`.
//!
//! # Paddings
//!
//! Sequences of different lengths can be padded with index `-1` once
//! [`GatherLayer::enable_paddings`] is set. A padded position outputs a zero
//! object and receives no gradient. Paddings cost an extra table copy per
//! call.
//!
//! # Example
//!
//! ```ignore
//! use blobnet_layers::{GatherLayer, Layer};
//!
//! let mut gather = GatherLayer::new("gathering").with_paddings(true);
//! let output_desc = gather.reshape(&[weights_desc, indexes_desc])?[0];
//! gather.run_once(&engine, &[&weights, &indexes], &mut [output])?;
//! ```

mod backward;
mod flatten;
mod forward;
mod padding;

use crate::archive::{ArchiveError, ArchiveReader, ArchiveWriter};
use crate::layer::{Layer, LayerBase};
use blobnet_core::blob::{BlobDesc, BlobDim, DataType};
use blobnet_core::config::LayerConfig;
use blobnet_core::error::{ArchitectureError, LayerError};
use blobnet_kernels::{Blob, MathEngine};

/// Registry key of [`GatherLayer`].
pub const GATHER_CLASS_NAME: &str = "Gather";

/// Current archive version of [`GatherLayer`].
pub const GATHER_LAYER_VERSION: u32 = 0;

const WEIGHTS: usize = 0;
const INDEXES: usize = 1;
const INPUT_COUNT: usize = 2;

#[derive(Debug, Clone)]
pub struct GatherLayer {
    base: LayerBase,
    paddings: bool,
    // Set by a successful reshape: [weights, indexes] and output
    input_descs: Option<[BlobDesc; INPUT_COUNT]>,
    output_desc: Option<BlobDesc>,
}

impl GatherLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: LayerBase::new(name),
            paddings: false,
            input_descs: None,
            output_desc: None,
        }
    }

    pub fn from_config(config: &LayerConfig) -> Self {
        Self {
            base: LayerBase::from_config(config),
            paddings: config.paddings,
            input_descs: None,
            output_desc: None,
        }
    }

    pub fn with_paddings(mut self, enable: bool) -> Self {
        self.enable_paddings(enable);
        self
    }

    /// Treat index value `-1` as "no selection".
    ///
    /// Meant to be set between runs, not between a forward pass and its
    /// backward pass.
    pub fn enable_paddings(&mut self, enable: bool) {
        self.paddings = enable;
    }

    pub fn are_paddings_enabled(&self) -> bool {
        self.paddings
    }

    /// Output shape for the given inputs, without touching layer state.
    pub fn infer_output_desc(&self, inputs: &[BlobDesc]) -> Result<BlobDesc, ArchitectureError> {
        let layer = || self.base.name.clone();

        if inputs.len() != INPUT_COUNT {
            return Err(ArchitectureError::InputCount {
                layer: layer(),
                expected: INPUT_COUNT,
                got: inputs.len(),
            });
        }
        let weights = &inputs[WEIGHTS];
        let indexes = &inputs[INDEXES];

        if weights.data_type() != DataType::Float {
            return Err(ArchitectureError::WeightsType {
                layer: layer(),
                got: weights.data_type(),
            });
        }
        if indexes.data_type() != DataType::Float {
            return Err(ArchitectureError::IndexesType {
                layer: layer(),
                got: indexes.data_type(),
            });
        }
        if weights.batch_width() != indexes.batch_width() {
            return Err(ArchitectureError::BatchWidthMismatch {
                layer: layer(),
                weights: weights.batch_width(),
                indexes: indexes.batch_width(),
            });
        }
        if weights.list_size() != 1 {
            return Err(ArchitectureError::WeightsListSize {
                layer: layer(),
                got: weights.list_size(),
            });
        }
        if indexes.list_size() != 1 {
            return Err(ArchitectureError::IndexesListSize {
                layer: layer(),
                got: indexes.list_size(),
            });
        }
        if indexes.object_size() != 1 {
            return Err(ArchitectureError::IndexesObjectSize {
                layer: layer(),
                got: indexes.object_size(),
            });
        }

        Ok(weights.with_dim(BlobDim::BatchLength, indexes.batch_length()))
    }

    fn reshaped_descs(&self) -> Result<([BlobDesc; INPUT_COUNT], BlobDesc), LayerError> {
        match (self.input_descs, self.output_desc) {
            (Some(inputs), Some(output)) => Ok((inputs, output)),
            _ => Err(LayerError::NotReshaped {
                layer: self.base.name.clone(),
            }),
        }
    }

    fn check_count(&self, role: &'static str, expected: usize, got: usize) -> Result<(), LayerError> {
        if expected != got {
            return Err(LayerError::BlobCount {
                layer: self.base.name.clone(),
                role,
                expected,
                got,
            });
        }
        Ok(())
    }

    fn check_shape(
        &self,
        role: &'static str,
        expected: &BlobDesc,
        got: &BlobDesc,
    ) -> Result<(), LayerError> {
        if expected != got {
            return Err(LayerError::ShapeMismatch {
                layer: self.base.name.clone(),
                role,
                expected: *expected,
                got: *got,
            });
        }
        Ok(())
    }
}

/// Boxed [`GatherLayer`] with default settings, ready for a layer graph.
pub fn gather<E: MathEngine + 'static>(name: impl Into<String>) -> Box<dyn Layer<E>> {
    Box::new(GatherLayer::new(name))
}

pub(crate) fn gather_factory<E: MathEngine + 'static>(config: &LayerConfig) -> Box<dyn Layer<E>> {
    Box::new(GatherLayer::from_config(config))
}

impl<E: MathEngine> Layer<E> for GatherLayer {
    fn class_name(&self) -> &'static str {
        GATHER_CLASS_NAME
    }

    fn base(&self) -> &LayerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LayerBase {
        &mut self.base
    }

    fn reshape(&mut self, inputs: &[BlobDesc]) -> Result<Vec<BlobDesc>, ArchitectureError> {
        self.input_descs = None;
        self.output_desc = None;

        let output = self.infer_output_desc(inputs).map_err(|err| {
            log::warn!("{}", err);
            err
        })?;

        log::debug!(
            "{}: reshape weights {} indexes {} -> output {}",
            self.base.name,
            inputs[WEIGHTS],
            inputs[INDEXES],
            output
        );
        self.input_descs = Some([inputs[WEIGHTS], inputs[INDEXES]]);
        self.output_desc = Some(output);
        Ok(vec![output])
    }

    fn run_once(
        &self,
        engine: &E,
        inputs: &[&Blob<E>],
        outputs: &mut [Blob<E>],
    ) -> Result<(), LayerError> {
        let (input_descs, output_desc) = self.reshaped_descs()?;
        self.check_count("input", INPUT_COUNT, inputs.len())?;
        self.check_count("output", 1, outputs.len())?;
        self.check_shape("weights", &input_descs[WEIGHTS], inputs[WEIGHTS].desc())?;
        self.check_shape("indexes", &input_descs[INDEXES], inputs[INDEXES].desc())?;
        self.check_shape("output", &output_desc, outputs[0].desc())?;

        log::debug!(
            "{}: forward on {} (paddings: {})",
            self.base.name,
            engine.name(),
            self.paddings
        );
        forward::gather_forward(
            engine,
            self.paddings,
            inputs[WEIGHTS],
            inputs[INDEXES],
            &mut outputs[0],
        );
        Ok(())
    }

    fn backward_once(
        &self,
        engine: &E,
        inputs: &[&Blob<E>],
        output_diffs: &[&Blob<E>],
        input_diffs: &mut [Blob<E>],
    ) -> Result<(), LayerError> {
        let (input_descs, output_desc) = self.reshaped_descs()?;
        self.check_count("input", INPUT_COUNT, inputs.len())?;
        let output_diff = output_diffs
            .first()
            .copied()
            .ok_or_else(|| LayerError::MissingOutputDiff {
                layer: self.base.name.clone(),
            })?;
        self.check_count("output diff", 1, output_diffs.len())?;
        // Indexes are not differentiable; only the weights diff is passed
        self.check_count("input diff", 1, input_diffs.len())?;
        let weights_diff = &mut input_diffs[0];

        self.check_shape("weights", &input_descs[WEIGHTS], inputs[WEIGHTS].desc())?;
        self.check_shape("indexes", &input_descs[INDEXES], inputs[INDEXES].desc())?;
        self.check_shape("output diff", &output_desc, output_diff.desc())?;
        self.check_shape("weights diff", &input_descs[WEIGHTS], weights_diff.desc())?;

        log::debug!(
            "{}: backward on {} (paddings: {}, lr multiplier: {})",
            self.base.name,
            engine.name(),
            self.paddings,
            self.base.learning_rate_multiplier
        );
        backward::gather_backward(
            engine,
            self.paddings,
            inputs[INDEXES],
            output_diff,
            weights_diff,
            self.base.learning_rate_multiplier,
        );
        Ok(())
    }

    fn save(&self, archive: &mut ArchiveWriter<'_>) -> Result<(), ArchiveError> {
        archive.write_version(GATHER_LAYER_VERSION)?;
        self.base.save(archive)?;
        archive.write(&self.paddings)
    }

    fn load(&mut self, archive: &mut ArchiveReader<'_>) -> Result<(), ArchiveError> {
        // Only version 0 exists so far
        let _version = archive.read_version(GATHER_LAYER_VERSION)?;
        self.base.load(archive)?;
        self.paddings = archive.read()?;
        self.input_descs = None;
        self.output_desc = None;
        Ok(())
    }
}
