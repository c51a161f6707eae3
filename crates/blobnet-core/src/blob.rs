use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of named axes in a blob.
pub const BLOB_DIM_COUNT: usize = 7;

/// Named blob axes, outermost first.
///
/// The first three axes (`BatchLength`, `BatchWidth`, `ListSize`) enumerate
/// objects; the remaining four describe a single object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlobDim {
    /// Time / sequence axis
    BatchLength,
    /// Sample / column axis
    BatchWidth,
    ListSize,
    Height,
    Width,
    Depth,
    Channels,
}

impl BlobDim {
    pub const ALL: [BlobDim; BLOB_DIM_COUNT] = [
        BlobDim::BatchLength,
        BlobDim::BatchWidth,
        BlobDim::ListSize,
        BlobDim::Height,
        BlobDim::Width,
        BlobDim::Depth,
        BlobDim::Channels,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Element type of a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Float,
    Int,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Float => write!(f, "float"),
            DataType::Int => write!(f, "int"),
        }
    }
}

/// Shape and element type of a batched blob.
///
/// Objects are laid out time-major with the sample axis varying fastest:
/// the object at time `t`, column `c` has flat object index
/// `t * batch_width + c` (for `list_size == 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobDesc {
    dims: [usize; BLOB_DIM_COUNT],
    data_type: DataType,
}

impl BlobDesc {
    /// Descriptor with every axis set to 1.
    pub fn new(data_type: DataType) -> Self {
        Self {
            dims: [1; BLOB_DIM_COUNT],
            data_type,
        }
    }

    /// Descriptor of a `(batch_length, batch_width, channels)` data blob.
    pub fn data(
        data_type: DataType,
        batch_length: usize,
        batch_width: usize,
        channels: usize,
    ) -> Self {
        Self::new(data_type)
            .with_dim(BlobDim::BatchLength, batch_length)
            .with_dim(BlobDim::BatchWidth, batch_width)
            .with_dim(BlobDim::Channels, channels)
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn dim_size(&self, dim: BlobDim) -> usize {
        self.dims[dim.index()]
    }

    pub fn set_dim_size(&mut self, dim: BlobDim, size: usize) {
        self.dims[dim.index()] = size;
    }

    /// Builder-style variant of [`BlobDesc::set_dim_size`].
    pub fn with_dim(mut self, dim: BlobDim, size: usize) -> Self {
        self.set_dim_size(dim, size);
        self
    }

    pub fn dims(&self) -> &[usize; BLOB_DIM_COUNT] {
        &self.dims
    }

    pub fn batch_length(&self) -> usize {
        self.dim_size(BlobDim::BatchLength)
    }

    pub fn batch_width(&self) -> usize {
        self.dim_size(BlobDim::BatchWidth)
    }

    pub fn list_size(&self) -> usize {
        self.dim_size(BlobDim::ListSize)
    }

    /// Number of addressable objects: `BatchLength * BatchWidth * ListSize`.
    pub fn object_count(&self) -> usize {
        self.dims[..3].iter().product()
    }

    /// Number of elements in one object.
    pub fn object_size(&self) -> usize {
        self.dims[3..].iter().product()
    }

    pub fn data_size(&self) -> usize {
        self.object_count() * self.object_size()
    }

    /// True when both descriptors have the same axis sizes, ignoring data type.
    pub fn has_equal_dimensions(&self, other: &BlobDesc) -> bool {
        self.dims == other.dims
    }
}

impl fmt::Display for BlobDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.data_type, self.dims)
    }
}
