//! Key schedule and AES-256-CBC decryption for CSAF archives.
//!
//! Every 4096-byte chunk of an encrypted archive is its own CBC message. Its
//! key is derived from the chunk's absolute index in the file, so each chunk
//! of an entry is decrypted with a different key.
use super::error::CsafError;
use crate::utils::md5::Md5;
use aes::Aes256;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};

type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Size of one addressing and encryption unit.
pub const CHUNK_SIZE: usize = 0x1000;

/// AES block size. Encrypted regions must be a multiple of this.
pub const AES_BLOCK_SIZE: usize = 16;

/// Key material shared by every archive of the supported title.
const DEFAULT_KEY: [u8; 32] = [
    0xF5, 0x96, 0x4B, 0x37, 0xA6, 0x80, 0x10, 0x53, 0x2B, 0x6A, 0x1A, 0x8D, 0x1A, 0xA3, 0x07, 0x73,
    0x3A, 0x25, 0x61, 0x37, 0xE4, 0x52, 0x8F, 0xE5, 0x2F, 0x32, 0xD2, 0xA2, 0x05, 0x58, 0x5A, 0x27,
];

const AES_IV: [u8; AES_BLOCK_SIZE] = *b"FamilyAdvSystem ";

/// Rotates `value` left by `count` bits the way the archive tooling does it.
///
/// The byte is widened to 32 bits and both shift amounts are taken modulo 32,
/// then the result is truncated back to 8 bits. This is a plain rotation for
/// `count` in `0..=8` and drops bits beyond that. The exact form has to be
/// kept: chunk indices above 8 feed straight into it.
pub fn rotate_byte_left(value: u8, count: u32) -> u8 {
    let v = value as u32;
    (v.wrapping_shl(count) | v.wrapping_shr(8u32.wrapping_sub(count))) as u8
}

/// Derives the AES-256 key for the chunk at absolute index `data_offset`.
///
/// Each 16-byte half of the default key is rotated byte-wise and hashed. Both
/// halves go through the same [Md5] instance without a reset in between, so
/// the second digest also covers the first half and its padding.
pub fn derive_key(data_offset: u32) -> [u8; 32] {
    let start = ((data_offset >> 3) % 16) as usize;
    let mut md5 = Md5::new();
    let mut key = [0u8; 32];
    for (src, dst) in DEFAULT_KEY.chunks_exact(16).zip(key.chunks_exact_mut(16)) {
        for (i, b) in dst.iter_mut().enumerate() {
            *b = rotate_byte_left(src[(start + i) % 16], data_offset);
        }
        md5.update(dst);
        dst.copy_from_slice(&md5.finish());
    }
    key
}

/// Decrypts `data` in place as a single CBC message keyed for `data_offset`.
pub fn decrypt_block(data: &mut [u8], data_offset: u32) -> Result<(), CsafError> {
    let len = data.len();
    if len % AES_BLOCK_SIZE != 0 {
        return Err(CsafError::UnalignedCipherText(len));
    }
    let key = derive_key(data_offset);
    Aes256CbcDec::new(&key.into(), &AES_IV.into())
        .decrypt_padded_mut::<NoPadding>(data)
        .map_err(|_| CsafError::UnalignedCipherText(len))?;
    Ok(())
}

/// Decrypts every [CHUNK_SIZE] chunk of `data`, the first one being at
/// absolute chunk index `start_chunk`.
pub fn decrypt_chunks(data: &mut [u8], start_chunk: u32) -> anyhow::Result<()> {
    for (i, chunk) in data.chunks_mut(CHUNK_SIZE).enumerate() {
        let index = u32::try_from(i)
            .ok()
            .and_then(|i| start_chunk.checked_add(i))
            .ok_or_else(|| anyhow::anyhow!("Chunk index overflow after chunk {}", start_chunk))?;
        decrypt_block(chunk, index)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn encrypt_block(data: &mut [u8], data_offset: u32) {
    use cbc::cipher::BlockEncryptMut;
    let key = derive_key(data_offset);
    let len = data.len();
    cbc::Encryptor::<Aes256>::new(&key.into(), &AES_IV.into())
        .encrypt_padded_mut::<NoPadding>(data, len)
        .expect("test data must be block aligned");
}
