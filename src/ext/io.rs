//! Extensions for [std::io].
use std::io::*;

/// Little-endian primitive readers for any [Read].
pub trait ReadExt {
    fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N]>;
    fn read_exact_vec(&mut self, len: usize) -> Result<Vec<u8>>;
    /// Reads and discards `len` bytes.
    fn skip(&mut self, len: usize) -> Result<()>;

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_bytes()?))
    }
    fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_bytes()?))
    }
}

impl<T: Read> ReadExt for T {
    fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_exact_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn skip(&mut self, len: usize) -> Result<()> {
        let copied = copy(&mut self.take(len as u64), &mut sink())?;
        if copied < len as u64 {
            return Err(Error::new(
                ErrorKind::UnexpectedEof,
                "Unexpected end of stream while skipping",
            ));
        }
        Ok(())
    }
}

/// Length of a seekable stream. The current position is preserved.
pub fn stream_length<S: Seek + ?Sized>(stream: &mut S) -> Result<u64> {
    let current = stream.stream_position()?;
    let len = stream.seek(SeekFrom::End(0))?;
    if current != len {
        stream.seek(SeekFrom::Start(current))?;
    }
    Ok(len)
}

/// An owned in-memory stream.
pub struct MemReader {
    data: Vec<u8>,
    pos: usize,
}

impl std::fmt::Debug for MemReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemReader")
            .field("pos", &self.pos)
            .field("data_length", &self.data.len())
            .finish_non_exhaustive()
    }
}

impl MemReader {
    pub fn new(data: Vec<u8>) -> Self {
        MemReader { data, pos: 0 }
    }
}

impl Read for MemReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let rest = self.data.get(self.pos..).unwrap_or_default();
        let len = buf.len().min(rest.len());
        buf[..len].copy_from_slice(&rest[..len]);
        self.pos += len;
        Ok(len)
    }
}

impl Seek for MemReader {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(offset) => (self.data.len() as u64).checked_add_signed(offset),
            SeekFrom::Current(offset) => (self.pos as u64).checked_add_signed(offset),
        };
        let Some(target) = target else {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Seek to a negative or overflowing position",
            ));
        };
        // Seeking past the end is allowed, reads there return 0 bytes.
        self.pos = usize::try_from(target).map_err(|e| Error::new(ErrorKind::InvalidInput, e))?;
        Ok(target)
    }

    fn stream_position(&mut self) -> Result<u64> {
        Ok(self.pos as u64)
    }
}
