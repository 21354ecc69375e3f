//! Bounds-checked integer extraction from raw byte buffers.

mod endian;
pub use endian::{Be, Le};

use bytemuck::Pod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("truncated input: {need} bytes wanted at +{at:#x}, buffer is {have} bytes")]
pub struct Truncated {
    pub at:   usize,
    pub need: usize,
    pub have: usize,
}

pub fn bytes_at(bs: &[u8], at: usize, need: usize) -> Result<&[u8], Truncated> {
    at.checked_add(need)
        .and_then(|end| bs.get(at..end))
        .ok_or(Truncated{at, need, have: bs.len()})
}

pub fn read_be<T: Pod>(bs: &[u8], at: usize) -> Result<T, Truncated> {
    let bytes = bytes_at(bs, at, std::mem::size_of::<T>())?;
    Ok(bytemuck::pod_read_unaligned::<Be<T>>(bytes).get())
}

pub fn read_le<T: Pod>(bs: &[u8], at: usize) -> Result<T, Truncated> {
    let bytes = bytes_at(bs, at, std::mem::size_of::<T>())?;
    Ok(bytemuck::pod_read_unaligned::<Le<T>>(bytes).get())
}

/// Forward-only cursor over a byte slice. A failed read leaves the
/// position where it was.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    bs:  &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bs: &'a [u8]) -> Self {
        Self{bs, pos: 0}
    }

    pub fn position(&self) -> usize { self.pos }
    pub fn remaining(&self) -> usize { self.bs.len().saturating_sub(self.pos) }
    pub fn is_empty(&self) -> bool { self.remaining() == 0 }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], Truncated> {
        let bytes = bytes_at(self.bs, self.pos, n)?;
        self.pos += n;
        Ok(bytes)
    }

    /// Moves past `n` bytes, which must all be inside the buffer.
    pub fn skip(&mut self, n: usize) -> Result<(), Truncated> {
        self.take(n).map(drop)
    }

    pub fn tag(&mut self) -> Result<[u8; 4], Truncated> {
        let bytes = self.take(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn le<T: Pod>(&mut self) -> Result<T, Truncated> {
        let x = read_le(self.bs, self.pos)?;
        self.pos += std::mem::size_of::<T>();
        Ok(x)
    }

    pub fn be<T: Pod>(&mut self) -> Result<T, Truncated> {
        let x = read_be(self.bs, self.pos)?;
        self.pos += std::mem::size_of::<T>();
        Ok(x)
    }
}
