//! Builds small CSAF archives for tests.
use super::catalog::NAME_TRAILER_SIZE;
use super::crypto::{AES_BLOCK_SIZE, CHUNK_SIZE, encrypt_block};
use super::header::*;
use crate::utils::md5::Md5;

/// Fill byte for chunk padding, so truncation bugs show up as wrong content.
pub const PAD_BYTE: u8 = 0xEE;

/// Lays out `files` the way the game's packer does: header, info section,
/// name section, then every payload starting on its own chunk.
pub fn build_archive(files: &[(&str, Vec<u8>)], encrypted: bool) -> Vec<u8> {
    let info_size = info_section_size(files.len() as u32) as usize;
    let mut names = Vec::new();
    for (name, _) in files {
        names.extend(name.encode_utf16().flat_map(|u| u.to_le_bytes()));
        names.extend_from_slice(&[0, 0]);
        names.extend(std::iter::repeat_n(0x5A, NAME_TRAILER_SIZE - 2));
    }
    names.resize(names.len().next_multiple_of(AES_BLOCK_SIZE), 0);

    let mut next_chunk = (HEADER_SIZE + info_size + names.len()).div_ceil(CHUNK_SIZE);
    let mut info = Vec::with_capacity(info_size);
    let mut payload = Vec::new();
    for (_, data) in files {
        info.extend_from_slice(&[0x11; 16]);
        info.extend_from_slice(&(next_chunk as i32).to_le_bytes());
        info.extend_from_slice(&(data.len() as i32).to_le_bytes());
        let mut chunks = data.clone();
        chunks.resize(data.len().next_multiple_of(CHUNK_SIZE), PAD_BYTE);
        if encrypted {
            for (i, chunk) in chunks.chunks_mut(CHUNK_SIZE).enumerate() {
                encrypt_block(chunk, (next_chunk + i) as u32);
            }
        }
        next_chunk += chunks.len() / CHUNK_SIZE;
        payload.extend_from_slice(&chunks);
    }
    info.resize(info_size, 0);

    let mut md5 = Md5::new();
    md5.update(&info);
    md5.update(&names);
    let checksum = md5.finish();
    if encrypted {
        encrypt_block(&mut names, 0);
    }

    let mut flags = CsafFlags::ARCHIVE_ENABLE;
    if encrypted {
        flags |= CsafFlags::DATA_ENCRYPT;
    }
    let mut data = CSAF_MAGIC.to_vec();
    data.extend_from_slice(&flags.to_le_bytes());
    data.extend_from_slice(&(files.len() as u32).to_le_bytes());
    data.extend_from_slice(&(names.len() as u32).to_le_bytes());
    data.extend_from_slice(&checksum);
    data.extend_from_slice(&info);
    data.extend_from_slice(&names);
    data.resize(data.len().next_multiple_of(CHUNK_SIZE), 0);
    data.extend_from_slice(&payload);
    data
}

/// Two plain entries written out by hand: `a.txt` ("hello") at chunk 2 and
/// `b.txt` ("abc") at chunk 3. The last entry is not padded, so the file ends
/// right after its payload.
pub fn literal_archive() -> Vec<u8> {
    let mut data = b"CSAF".to_vec();
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend_from_slice(&2u32.to_le_bytes());
    data.extend_from_slice(&48u32.to_le_bytes());
    data.extend_from_slice(&[0u8; 16]);
    for (start_chunk, size) in [(2i32, 5i32), (3, 3)] {
        data.extend_from_slice(&[0xCC; 16]);
        data.extend_from_slice(&start_chunk.to_le_bytes());
        data.extend_from_slice(&size.to_le_bytes());
    }
    data.resize(0x1000, 0);
    for name in ["a.txt", "b.txt"] {
        data.extend(name.encode_utf16().flat_map(|u| u.to_le_bytes()));
        data.extend_from_slice(&[0u8; NAME_TRAILER_SIZE]);
    }
    data.resize(0x1000 + 48, 0);
    data.resize(0x2000, 0);
    data.extend_from_slice(b"hello");
    data.resize(0x3000, PAD_BYTE);
    data.extend_from_slice(b"abc");
    data
}
