//! Binary layer archives.
//!
//! Values are encoded with bincode's standard configuration, one after
//! another, so a layer reads fields back in exactly the order it wrote them.
//! Every layer starts its section with a version tag.

use bincode::config;
use bincode::error::{DecodeError, EncodeError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("archive encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("archive decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("archive version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("unknown layer class '{0}' in archive")]
    UnknownClass(String),
}

/// Write half of a layer archive.
pub struct ArchiveWriter<'a> {
    out: &'a mut dyn Write,
}

impl<'a> ArchiveWriter<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self { out }
    }

    pub fn write<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ArchiveError> {
        bincode::serde::encode_into_std_write(value, &mut self.out, config::standard())?;
        Ok(())
    }

    /// Write the version tag of the section that follows.
    pub fn write_version(&mut self, version: u32) -> Result<(), ArchiveError> {
        self.write(&version)
    }
}

/// Read half of a layer archive.
pub struct ArchiveReader<'a> {
    input: &'a mut dyn Read,
}

impl<'a> ArchiveReader<'a> {
    pub fn new(input: &'a mut dyn Read) -> Self {
        Self { input }
    }

    pub fn read<T: DeserializeOwned>(&mut self) -> Result<T, ArchiveError> {
        Ok(bincode::serde::decode_from_std_read(
            &mut self.input,
            config::standard(),
        )?)
    }

    /// Read a version tag, rejecting versions newer than `supported`.
    pub fn read_version(&mut self, supported: u32) -> Result<u32, ArchiveError> {
        let found: u32 = self.read()?;
        if found > supported {
            return Err(ArchiveError::UnsupportedVersion { found, supported });
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_read_back_in_order() {
        let mut bytes = Vec::new();
        {
            let mut writer = ArchiveWriter::new(&mut bytes);
            writer.write_version(0).unwrap();
            writer.write("gathering").unwrap();
            writer.write(&true).unwrap();
        }

        let mut input = bytes.as_slice();
        let mut reader = ArchiveReader::new(&mut input);
        assert_eq!(reader.read_version(0).unwrap(), 0);
        assert_eq!(reader.read::<String>().unwrap(), "gathering");
        assert!(reader.read::<bool>().unwrap());
    }

    #[test]
    fn test_newer_version_rejected() {
        let mut bytes = Vec::new();
        ArchiveWriter::new(&mut bytes).write_version(3).unwrap();

        let mut input = bytes.as_slice();
        let result = ArchiveReader::new(&mut input).read_version(0);
        assert!(matches!(
            result,
            Err(ArchiveError::UnsupportedVersion {
                found: 3,
                supported: 0
            })
        ));
    }

    #[test]
    fn test_truncated_archive_is_decode_error() {
        let mut input: &[u8] = &[];
        let result = ArchiveReader::new(&mut input).read::<bool>();
        assert!(matches!(result, Err(ArchiveError::Decode(_))));
    }
}
