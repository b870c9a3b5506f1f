//! CSAF archive header.
use super::error::CsafError;
use crate::ext::io::*;
use anyhow::Result;
use std::io::Read;

/// File signature.
pub const CSAF_MAGIC: &[u8; 4] = b"CSAF";

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 0x20;

/// Size of one info section record.
pub const INFO_RECORD_SIZE: usize = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Archive flag bitmask.
pub struct CsafFlags(pub u32);

impl CsafFlags {
    /// The archive may be used.
    pub const ARCHIVE_ENABLE: u32 = 0x1;
    /// Payload and name section are encrypted.
    pub const DATA_ENCRYPT: u32 = 0x2;

    pub fn is_enabled(&self) -> bool {
        self.0 & Self::ARCHIVE_ENABLE != 0
    }

    pub fn is_encrypted(&self) -> bool {
        self.0 & Self::DATA_ENCRYPT != 0
    }
}

#[derive(Clone, Debug)]
/// Fixed 32-byte header at the start of every archive.
pub struct CsafHeader {
    pub flags: CsafFlags,
    pub entry_count: u32,
    /// Byte size of the name section.
    pub catalog_size: u32,
    /// MD5 of the info section and the plaintext name section.
    pub checksum: [u8; 16],
}

impl CsafHeader {
    /// Reads and validates the header.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = Vec::with_capacity(CSAF_MAGIC.len());
        reader
            .by_ref()
            .take(CSAF_MAGIC.len() as u64)
            .read_to_end(&mut magic)?;
        if magic.as_slice() != CSAF_MAGIC {
            return Err(CsafError::FormatMismatch(magic).into());
        }
        let flags = CsafFlags(reader.read_u32()?);
        if !flags.is_enabled() {
            return Err(CsafError::ArchiveDisabled(flags.0).into());
        }
        let entry_count = reader.read_u32()?;
        let catalog_size = reader.read_u32()?;
        let checksum = reader.read_bytes()?;
        Ok(CsafHeader {
            flags,
            entry_count,
            catalog_size,
            checksum,
        })
    }

    /// Size of the info section for this header's entry count.
    pub fn info_section_size(&self) -> u64 {
        info_section_size(self.entry_count)
    }
}

/// Size of the info section for `entry_count` entries.
///
/// The low 12 bits are masked off before 0xFE0 is added, so the header plus
/// the info section always ends on a 4096-byte boundary.
pub fn info_section_size(entry_count: u32) -> u64 {
    ((entry_count as u64 * INFO_RECORD_SIZE as u64 + 0x1F) & !0xFFF) + 0xFE0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(flags: u32, count: u32, catalog_size: u32) -> Vec<u8> {
        let mut data = CSAF_MAGIC.to_vec();
        data.extend_from_slice(&flags.to_le_bytes());
        data.extend_from_slice(&count.to_le_bytes());
        data.extend_from_slice(&catalog_size.to_le_bytes());
        data.extend_from_slice(&[0xAA; 16]);
        data
    }

    #[test]
    fn test_info_section_size() {
        assert_eq!(info_section_size(0), 0xFE0);
        assert_eq!(info_section_size(2), 0xFE0);
        assert_eq!(info_section_size(169), 0xFE0);
        assert_eq!(info_section_size(170), 0x1FE0);
        for count in [0u32, 1, 100, 170, 1000, 65535] {
            let size = info_section_size(count);
            assert_eq!((HEADER_SIZE as u64 + size) % 0x1000, 0);
            assert!(size >= count as u64 * INFO_RECORD_SIZE as u64);
        }
    }

    #[test]
    fn test_read_header() {
        let data = header_bytes(3, 7, 0x120);
        let header = CsafHeader::read(&mut data.as_slice()).unwrap();
        assert!(header.flags.is_enabled());
        assert!(header.flags.is_encrypted());
        assert_eq!(header.entry_count, 7);
        assert_eq!(header.catalog_size, 0x120);
        assert_eq!(header.checksum, [0xAA; 16]);
        assert_eq!(header.info_section_size(), 0xFE0);
    }

    #[test]
    fn test_bad_magic() {
        let mut data = header_bytes(1, 0, 0);
        data[0] = b'X';
        let err = CsafHeader::read(&mut data.as_slice()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CsafError>(),
            Some(CsafError::FormatMismatch(_))
        ));
        let err = CsafHeader::read(&mut &b"CS"[..]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CsafError>(),
            Some(CsafError::FormatMismatch(_))
        ));
    }

    #[test]
    fn test_disabled_archive() {
        let data = header_bytes(CsafFlags::DATA_ENCRYPT, 1, 0);
        let err = CsafHeader::read(&mut data.as_slice()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CsafError>(),
            Some(CsafError::ArchiveDisabled(2))
        ));
    }
}
