//! CSAF catalog: info records and entry names.
use super::crypto::{CHUNK_SIZE, decrypt_block};
use super::error::CsafError;
use super::header::*;
use crate::ext::io::*;
use crate::types::ExtraConfig;
use crate::utils::md5::Md5;
use anyhow::Result;
use std::io::{Read, Seek};

/// Bytes skipped at the start of every info record.
const INFO_RECORD_PREFIX: usize = 16;

/// Bytes each name occupies after its text. The UTF-16 terminator is the
/// first code unit of this trailer.
pub const NAME_TRAILER_SIZE: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
/// A file stored in the archive.
pub struct CsafEntry {
    /// Position in the catalog.
    pub index: usize,
    /// Relative output path as stored in the archive.
    pub name: String,
    /// Absolute chunk index of the first payload byte.
    pub start_chunk: u32,
    /// Exact plaintext length.
    pub size: u32,
}

impl CsafEntry {
    /// File offset of the entry's payload.
    pub fn offset(&self) -> u64 {
        self.start_chunk as u64 * CHUNK_SIZE as u64
    }

    /// Stored length, rounded up to whole chunks.
    pub fn padded_size(&self) -> usize {
        (self.size as usize).div_ceil(CHUNK_SIZE) * CHUNK_SIZE
    }
}

#[derive(Debug)]
/// A parsed archive catalog.
pub struct CsafArchive {
    pub header: CsafHeader,
    pub entries: Vec<CsafEntry>,
}

impl CsafArchive {
    /// Reads the header and the catalog from the start of `reader`.
    ///
    /// On return the stream is positioned right after the catalog.
    pub fn read<R: Read + Seek>(reader: &mut R, config: &ExtraConfig) -> Result<Self> {
        let header = CsafHeader::read(reader)?;
        let info_size = header.info_section_size();
        let catalog_len = info_size + header.catalog_size as u64;
        let position = reader.stream_position()?;
        let available = stream_length(reader)?.saturating_sub(position);
        if catalog_len > available {
            return Err(CsafError::corrupt(format!(
                "catalog needs {} bytes but only {} remain",
                catalog_len, available
            ))
            .into());
        }
        let mut catalog = reader.read_exact_vec(catalog_len as usize)?;
        let (info, names) = catalog.split_at_mut(info_size as usize);
        if header.flags.is_encrypted() {
            decrypt_block(names, 0).map_err(|e| CsafError::corrupt(format!("name section: {}", e)))?;
        }
        if config.verify_checksum {
            verify_checksum(&header, info, names)?;
        }
        let entries = parse_entries(info, names, header.entry_count as usize)?;
        tracing::debug!(
            "CSAF catalog: {} entries, flags {:#x}, info section {:#x}, name section {:#x}",
            entries.len(),
            header.flags.0,
            info_size,
            header.catalog_size
        );
        Ok(CsafArchive { header, entries })
    }

    pub fn is_encrypted(&self) -> bool {
        self.header.flags.is_encrypted()
    }
}

fn verify_checksum(header: &CsafHeader, info: &[u8], names: &[u8]) -> Result<(), CsafError> {
    let mut md5 = Md5::new();
    md5.update(info);
    md5.update(names);
    let actual = md5.finish();
    if actual != header.checksum {
        return Err(CsafError::ChecksumMismatch {
            expected: header.checksum,
            actual,
        });
    }
    Ok(())
}

/// Decodes `count` entries from the info section and the plaintext name section.
pub fn parse_entries(info: &[u8], names: &[u8], count: usize) -> Result<Vec<CsafEntry>> {
    let mut records = info;
    let mut name_offset = 0usize;
    let mut entries = Vec::with_capacity(count.min(info.len() / INFO_RECORD_SIZE));
    for index in 0..count {
        let truncated = |_| CsafError::corrupt(format!("info record {} is truncated", index));
        records.skip(INFO_RECORD_PREFIX).map_err(truncated)?;
        let start_chunk = records.read_i32().map_err(truncated)?;
        let size = records.read_i32().map_err(truncated)?;
        let (Ok(start_chunk), Ok(size)) = (u32::try_from(start_chunk), u32::try_from(size)) else {
            return Err(CsafError::corrupt(format!(
                "entry {} has negative chunk index {} or size {}",
                index, start_chunk, size
            ))
            .into());
        };
        let (name, len) = read_utf16_name(names, name_offset)
            .ok_or_else(|| CsafError::corrupt(format!("name of entry {} is not terminated", index)))?;
        name_offset += len + NAME_TRAILER_SIZE;
        entries.push(CsafEntry {
            index,
            name,
            start_chunk,
            size,
        });
    }
    Ok(entries)
}

/// Decodes the null-terminated UTF-16LE string at `offset`.
///
/// Returns the string and its length in bytes, terminator excluded.
fn read_utf16_name(buf: &[u8], offset: usize) -> Option<(String, usize)> {
    let units: Vec<u16> = buf
        .get(offset..)?
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .take_while(|&u| u != 0)
        .collect();
    let len = units.len() * 2;
    // Running into the end of the buffer means no terminator was found.
    if offset + len + 2 > buf.len() {
        return None;
    }
    Some((String::from_utf16_lossy(&units), len))
}
