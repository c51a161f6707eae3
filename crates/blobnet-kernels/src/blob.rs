use crate::MathEngine;
use blobnet_core::blob::BlobDesc;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    #[error("blob {desc} holds {expected} elements, got {got}")]
    SizeMismatch {
        desc: BlobDesc,
        expected: usize,
        got: usize,
    },
}

/// A batched blob: descriptor plus an engine-resident buffer.
///
/// Blobs are owned by the host; layers borrow them for the duration of a
/// single call.
pub struct Blob<E: MathEngine> {
    desc: BlobDesc,
    data: E::Buffer,
}

impl<E: MathEngine> Blob<E> {
    /// Zero-filled blob with the given shape.
    pub fn zeros(engine: &E, desc: BlobDesc) -> Self {
        Self {
            desc,
            data: engine.alloc(desc.data_size()),
        }
    }

    /// Blob initialized from host data.
    pub fn from_slice(engine: &E, desc: BlobDesc, data: &[f32]) -> Result<Self, BlobError> {
        if data.len() != desc.data_size() {
            return Err(BlobError::SizeMismatch {
                desc,
                expected: desc.data_size(),
                got: data.len(),
            });
        }
        Ok(Self {
            desc,
            data: engine.upload(data),
        })
    }

    pub fn desc(&self) -> &BlobDesc {
        &self.desc
    }

    pub fn data(&self) -> &E::Buffer {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut E::Buffer {
        &mut self.data
    }

    pub fn data_size(&self) -> usize {
        self.desc.data_size()
    }

    /// Element offset of object `index` in the flat buffer.
    pub fn object_offset(&self, index: usize) -> usize {
        index * self.desc.object_size()
    }

    /// Copy the blob contents to the host.
    pub fn to_vec(&self, engine: &E) -> Vec<f32> {
        engine.download(&self.data)
    }
}

impl<E: MathEngine> Clone for Blob<E> {
    fn clone(&self) -> Self {
        Self {
            desc: self.desc,
            data: self.data.clone(),
        }
    }
}

impl<E: MathEngine> fmt::Debug for Blob<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("desc", &self.desc)
            .field("data", &self.data)
            .finish()
    }
}
