use crate::archive::{ArchiveError, ArchiveReader, ArchiveWriter};
use blobnet_core::blob::BlobDesc;
use blobnet_core::config::LayerConfig;
use blobnet_core::error::{ArchitectureError, LayerError};
use blobnet_kernels::{Blob, MathEngine};

/// Metadata every layer carries, owned and persisted by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerBase {
    pub name: String,
    /// Scale applied to this layer's gradient contributions, before any
    /// optimizer-level learning rate.
    pub learning_rate_multiplier: f32,
}

impl LayerBase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            learning_rate_multiplier: 1.0,
        }
    }

    pub fn from_config(config: &LayerConfig) -> Self {
        Self {
            name: config.name.clone(),
            learning_rate_multiplier: config.learning_rate_multiplier,
        }
    }

    pub fn save(&self, archive: &mut ArchiveWriter<'_>) -> Result<(), ArchiveError> {
        archive.write(&self.name)?;
        archive.write(&self.learning_rate_multiplier)
    }

    pub fn load(&mut self, archive: &mut ArchiveReader<'_>) -> Result<(), ArchiveError> {
        self.name = archive.read()?;
        self.learning_rate_multiplier = archive.read()?;
        Ok(())
    }
}

/// Lifecycle interface a layer-graph host drives.
///
/// The host calls [`reshape`](Layer::reshape) whenever input shapes change,
/// then [`run_once`](Layer::run_once) any number of times, and
/// [`backward_once`](Layer::backward_once) once per forward pass when
/// training. All blobs are owned by the host and only borrowed for the
/// duration of a call; a layer never keeps a blob between calls.
pub trait Layer<E: MathEngine> {
    /// Registry key of the layer class.
    fn class_name(&self) -> &'static str;

    fn base(&self) -> &LayerBase;

    fn base_mut(&mut self) -> &mut LayerBase;

    fn name(&self) -> &str {
        &self.base().name
    }

    /// Validate input shapes and derive output shapes.
    ///
    /// Must succeed before the layer runs; a failure leaves the layer
    /// unreshaped.
    fn reshape(&mut self, inputs: &[BlobDesc]) -> Result<Vec<BlobDesc>, ArchitectureError>;

    /// Forward pass: fill `outputs` from `inputs`.
    fn run_once(
        &self,
        engine: &E,
        inputs: &[&Blob<E>],
        outputs: &mut [Blob<E>],
    ) -> Result<(), LayerError>;

    /// Backward pass: accumulate input gradients from output gradients.
    fn backward_once(
        &self,
        engine: &E,
        inputs: &[&Blob<E>],
        output_diffs: &[&Blob<E>],
        input_diffs: &mut [Blob<E>],
    ) -> Result<(), LayerError>;

    /// Write the layer configuration, including the base metadata.
    fn save(&self, archive: &mut ArchiveWriter<'_>) -> Result<(), ArchiveError>;

    /// Read a configuration previously written by [`save`](Layer::save).
    fn load(&mut self, archive: &mut ArchiveReader<'_>) -> Result<(), ArchiveError>;
}
