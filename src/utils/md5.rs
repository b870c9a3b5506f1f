//! Incremental MD5 digest (RFC 1321).
//!
//! Unlike most digest crates, [Md5::finish] does not consume the hasher: the
//! padding and length trailer are fed through the stream like ordinary data,
//! so the hasher keeps running afterwards. The CSAF key schedule relies on
//! this.

/// Size of one MD5 input block in bytes.
pub const BLOCK_SIZE: usize = 64;

/// Size of an MD5 digest in bytes.
pub const DIGEST_SIZE: usize = 16;

const INIT_STATE: [u32; 4] = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476];

const SHIFTS: [[u32; 4]; 4] = [[7, 12, 17, 22], [5, 9, 14, 20], [4, 11, 16, 23], [6, 10, 15, 21]];

const SINES: [u32; 64] = [
    0xd76aa478, 0xe8c7b756, 0x242070db, 0xc1bdceee, 0xf57c0faf, 0x4787c62a, 0xa8304613, 0xfd469501,
    0x698098d8, 0x8b44f7af, 0xffff5bb1, 0x895cd7be, 0x6b901122, 0xfd987193, 0xa679438e, 0x49b40821,
    0xf61e2562, 0xc040b340, 0x265e5a51, 0xe9b6c7aa, 0xd62f105d, 0x02441453, 0xd8a1e681, 0xe7d3fbc8,
    0x21e1cde6, 0xc33707d6, 0xf4d50d87, 0x455a14ed, 0xa9e3e905, 0xfcefa3f8, 0x676f02d9, 0x8d2a4c8a,
    0xfffa3942, 0x8771f681, 0x6d9d6122, 0xfde5380c, 0xa4beea44, 0x4bdecfa9, 0xf6bb4b60, 0xbebfbc70,
    0x289b7ec6, 0xeaa127fa, 0xd4ef3085, 0x04881d05, 0xd9d4d039, 0xe6db99e5, 0x1fa27cf8, 0xc4ac5665,
    0xf4292244, 0x432aff97, 0xab9423a7, 0xfc93a039, 0x655b59c3, 0x8f0ccc92, 0xffeff47d, 0x85845dd1,
    0x6fa87e4f, 0xfe2ce6e0, 0xa3014314, 0x4e0811a1, 0xf7537e82, 0xbd3af235, 0x2ad7d2bb, 0xeb86d391,
];

const PADDING: [u8; BLOCK_SIZE] = {
    let mut pad = [0u8; BLOCK_SIZE];
    pad[0] = 0x80;
    pad
};

#[derive(Clone, Debug)]
/// Streaming MD5 hasher.
pub struct Md5 {
    state: [u32; 4],
    /// Total number of bits fed so far, padding included.
    bit_len: u64,
    buffer: [u8; BLOCK_SIZE],
}

impl Default for Md5 {
    fn default() -> Self {
        Self::new()
    }
}

impl Md5 {
    /// Creates a hasher in the initial state.
    pub fn new() -> Self {
        Md5 {
            state: INIT_STATE,
            bit_len: 0,
            buffer: [0u8; BLOCK_SIZE],
        }
    }

    /// Restores the initial state.
    pub fn reset(&mut self) {
        self.state = INIT_STATE;
        self.bit_len = 0;
        self.buffer = [0u8; BLOCK_SIZE];
    }

    /// One-shot digest of `data`.
    pub fn digest(data: &[u8]) -> [u8; DIGEST_SIZE] {
        let mut md5 = Md5::new();
        md5.update(data);
        md5.finish()
    }

    fn buffered(&self) -> usize {
        ((self.bit_len >> 3) % BLOCK_SIZE as u64) as usize
    }

    /// Feeds `data` into the hasher. Any length is accepted.
    pub fn update(&mut self, mut data: &[u8]) {
        let index = self.buffered();
        self.bit_len = self.bit_len.wrapping_add((data.len() as u64) << 3);
        if index > 0 {
            let fill = BLOCK_SIZE - index;
            if data.len() < fill {
                self.buffer[index..index + data.len()].copy_from_slice(data);
                return;
            }
            self.buffer[index..].copy_from_slice(&data[..fill]);
            let block = self.buffer;
            transform(&mut self.state, &block);
            data = &data[fill..];
        }
        let mut blocks = data.chunks_exact(BLOCK_SIZE);
        for block in &mut blocks {
            transform(&mut self.state, block);
        }
        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
    }

    /// Pads the stream and returns the current digest.
    ///
    /// The padding stays part of the stream: calling [Md5::update] afterwards
    /// continues hashing after it, and a later `finish` yields the standard
    /// MD5 of `m1 || pad(m1) || m2`.
    pub fn finish(&mut self) -> [u8; DIGEST_SIZE] {
        let length = self.bit_len.to_le_bytes();
        let index = self.buffered();
        let pad_len = if index < 56 { 56 - index } else { 120 - index };
        self.update(&PADDING[..pad_len]);
        self.update(&length);
        let mut digest = [0u8; DIGEST_SIZE];
        for (out, word) in digest.chunks_exact_mut(4).zip(self.state.iter()) {
            out.copy_from_slice(&word.to_le_bytes());
        }
        digest
    }
}

fn transform(state: &mut [u32; 4], block: &[u8]) {
    let mut x = [0u32; 16];
    for (word, bytes) in x.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    let [mut a, mut b, mut c, mut d] = *state;
    for i in 0..64 {
        let round = i / 16;
        let (f, g) = match round {
            0 => ((b & c) | (!b & d), i),
            1 => ((b & d) | (c & !d), (5 * i + 1) % 16),
            2 => (b ^ c ^ d, (3 * i + 5) % 16),
            _ => (c ^ (b | !d), (7 * i) % 16),
        };
        let sum = a
            .wrapping_add(f)
            .wrapping_add(SINES[i])
            .wrapping_add(x[g]);
        a = d;
        d = c;
        c = b;
        b = b.wrapping_add(sum.rotate_left(SHIFTS[round][i % 4]));
    }
    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
}
