// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the container format every Lever snapshot is stored in.
//!
//! A snapshot file is a fixed-size [`SnapshotHeader`] followed by a
//! variable-length payload. The header records which encoding the payload
//! uses, so a reader never has to guess from the file name.

use crate::codec::SnapshotEncoding;
use crate::error::{PersistError, PersistResult};

/// A unique byte sequence identifying Lever snapshot files ("LEVERSNP").
pub const HEADER_MAGIC_BYTES: [u8; 8] = *b"LEVERSNP";

/// The current version of the header layout.
pub const FORMAT_VERSION: u8 = 1;

/// The fixed-size header at the beginning of every snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    /// The version of the header format itself.
    pub format_version: u8,
    /// The encoding of the payload that follows.
    pub encoding: SnapshotEncoding,
    /// The length of the payload, in bytes.
    pub payload_length: u64,
}

// The header is a fixed byte layout and is read without serde.
impl SnapshotHeader {
    /// The total size of the header in bytes.
    pub const SIZE: usize = 8 + 1 + 1 + 8;

    /// Parses a header from the beginning of a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> PersistResult<Self> {
        let Some(header) = bytes.get(..Self::SIZE) else {
            return Err(PersistError::InvalidHeader(
                "not enough bytes to form a valid header",
            ));
        };

        if header[0..8] != HEADER_MAGIC_BYTES {
            return Err(PersistError::InvalidHeader(
                "invalid magic bytes; not a Lever snapshot",
            ));
        }

        let format_version = header[8];
        if format_version != FORMAT_VERSION {
            return Err(PersistError::InvalidHeader("unsupported format version"));
        }

        let encoding = SnapshotEncoding::from_tag(header[9])
            .ok_or(PersistError::InvalidHeader("unknown payload encoding"))?;

        let mut length = [0u8; 8];
        length.copy_from_slice(&header[10..Self::SIZE]);

        Ok(Self {
            format_version,
            encoding,
            payload_length: u64::from_le_bytes(length),
        })
    }

    /// Serializes the header into its fixed byte layout.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..8].copy_from_slice(&HEADER_MAGIC_BYTES);
        bytes[8] = self.format_version;
        bytes[9] = self.encoding.tag();
        bytes[10..].copy_from_slice(&self.payload_length.to_le_bytes());
        bytes
    }
}

/// A full snapshot file in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    /// The parsed header.
    pub header: SnapshotHeader,
    /// The raw payload.
    pub payload: Vec<u8>,
}

impl SnapshotFile {
    /// Wraps an encoded payload with a header.
    pub fn new(encoding: SnapshotEncoding, payload: Vec<u8>) -> Self {
        Self {
            header: SnapshotHeader {
                format_version: FORMAT_VERSION,
                encoding,
                payload_length: payload.len() as u64,
            },
            payload,
        }
    }

    /// Parses a complete file, rejecting truncated payloads.
    pub fn from_bytes(bytes: &[u8]) -> PersistResult<Self> {
        let header = SnapshotHeader::from_bytes(bytes)?;
        let body = &bytes[SnapshotHeader::SIZE..];
        let length = usize::try_from(header.payload_length)
            .map_err(|_| PersistError::InvalidHeader("payload length does not fit in memory"))?;
        let payload = body
            .get(..length)
            .ok_or(PersistError::InvalidHeader("payload is truncated"))?;

        Ok(Self {
            header,
            payload: payload.to_vec(),
        })
    }

    /// Serializes the header followed by the payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(SnapshotHeader::SIZE + self.payload.len());
        bytes.extend_from_slice(&self.header.to_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let file = SnapshotFile::new(SnapshotEncoding::Bincode, vec![7, 7, 7]);
        let bytes = file.to_bytes();

        assert_eq!(&bytes[0..8], b"LEVERSNP");
        assert_eq!(bytes[8], FORMAT_VERSION);
        assert_eq!(bytes[9], SnapshotEncoding::Bincode.tag());
        assert_eq!(&bytes[10..18], &3u64.to_le_bytes());
        assert_eq!(SnapshotFile::from_bytes(&bytes).unwrap(), file);
    }

    #[test]
    fn test_rejects_foreign_files() {
        let err = SnapshotFile::from_bytes(b"NOTLEVER and some more bytes").unwrap_err();
        assert!(matches!(err, PersistError::InvalidHeader(_)));

        let err = SnapshotFile::from_bytes(b"LEVER").unwrap_err();
        assert!(matches!(err, PersistError::InvalidHeader(_)));
    }

    #[test]
    fn test_rejects_truncated_payload() {
        let mut bytes = SnapshotFile::new(SnapshotEncoding::Ron, b"()".to_vec()).to_bytes();
        bytes.pop();

        let err = SnapshotFile::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, PersistError::InvalidHeader("payload is truncated")));
    }

    #[test]
    fn test_rejects_unknown_version_and_encoding() {
        let mut bytes = SnapshotFile::new(SnapshotEncoding::Ron, Vec::new()).to_bytes();
        bytes[8] = FORMAT_VERSION + 1;
        assert!(SnapshotFile::from_bytes(&bytes).is_err());

        bytes[8] = FORMAT_VERSION;
        bytes[9] = 0xff;
        assert!(matches!(
            SnapshotFile::from_bytes(&bytes),
            Err(PersistError::InvalidHeader("unknown payload encoding"))
        ));
    }
}
