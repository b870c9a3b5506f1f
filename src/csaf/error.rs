//! Error types for CSAF archives.
use thiserror::Error;

/// Errors raised while decoding a CSAF archive.
#[derive(Debug, Error)]
pub enum CsafError {
    /// The file does not start with the `CSAF` signature.
    #[error("File format mismatch: expected CSAF signature, found {0:02X?}")]
    FormatMismatch(Vec<u8>),

    /// The `ArchiveEnable` flag is not set.
    #[error("The archive is disabled (flags: {0:#010x})")]
    ArchiveDisabled(u32),

    /// The catalog cannot be decoded.
    #[error("Catalog is corrupt: {0}")]
    CatalogCorrupt(String),

    /// The catalog does not match the checksum stored in the header.
    #[error("Catalog checksum mismatch: header has {expected:02x?}, computed {actual:02x?}")]
    ChecksumMismatch {
        /// Checksum stored in the header
        expected: [u8; 16],
        /// Checksum of the decoded catalog
        actual: [u8; 16],
    },

    /// Cipher input is not a whole number of AES blocks.
    #[error("Encrypted data length {0} is not a multiple of the AES block size")]
    UnalignedCipherText(usize),

    /// A single entry could not be extracted.
    #[error("resource {name} extract failed, because {reason}")]
    EntryExtractionFailed {
        /// Entry name as stored in the archive
        name: String,
        /// Cause of the failure
        reason: String,
    },
}

impl CsafError {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        CsafError::CatalogCorrupt(msg.into())
    }

    pub(crate) fn entry(name: &str, reason: impl std::fmt::Display) -> Self {
        CsafError::EntryExtractionFailed {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}
