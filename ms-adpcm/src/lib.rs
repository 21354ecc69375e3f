//! Microsoft ADPCM (WAVE format tag 2) block decoding, mono only.
//!
//! A block is a 7-byte header followed by packed 4-bit codes, high nibble
//! first. Every block seeds its own predictor, so blocks decode
//! independently of one another.

use util::{Reader, Truncated};

pub const HEADER_LEN: usize = 7;
pub const MIN_DELTA: i32 = 16;

pub const COEFF1: [i32; 7] = [256, 512, 0, 192, 240, 460, 392];
pub const COEFF2: [i32; 7] = [  0,-256, 0,  64,   0,-208,-232];

pub const ADAPTATION: [i32; 16] = [
    230, 230, 230, 230, 307, 409, 512, 614,
    768, 614, 512, 409, 307, 230, 230, 230,
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Truncated(#[from] Truncated),
    #[error("invalid predictor index {0} (expected 0..=6)")]
    InvalidPredictor(u8),
    #[error("block align {0} leaves no room after the 7-byte block header")]
    BlockAlign(usize),
    #[error("output buffer overrun: block needs {need} samples, {have} available")]
    Overrun { need: usize, have: usize },
}

/// Samples produced by one block of `block_len` bytes: the two seed
/// samples plus two per code byte.
pub const fn samples_per_block(block_len: usize) -> usize {
    2 + block_len.saturating_sub(HEADER_LEN) * 2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub predictor: u8,
    pub delta:     i16,
    pub sample1:   i16,
    pub sample2:   i16,
}

impl BlockHeader {
    pub fn parse(block: &[u8]) -> Result<Self, DecodeError> {
        let mut r = Reader::new(block);
        let header = Self {
            predictor: r.le()?,
            delta:     r.le()?,
            sample1:   r.le()?,
            sample2:   r.le()?,
        };
        if header.predictor as usize >= COEFF1.len() {
            return Err(DecodeError::InvalidPredictor(header.predictor));
        }
        Ok(header)
    }
}

/// Running state within a single block.
#[derive(Debug, Clone)]
struct Channel {
    coeff1:  i32,
    coeff2:  i32,
    delta:   i32,
    sample1: i16,
    sample2: i16,
}

impl Channel {
    fn new(header: &BlockHeader) -> Self {
        let p = header.predictor as usize;
        Self {
            coeff1:  COEFF1[p],
            coeff2:  COEFF2[p],
            delta:   header.delta as i32,
            sample1: header.sample1,
            sample2: header.sample2,
        }
    }

    fn expand(&mut self, code: u8) -> i16 {
        debug_assert!(code < 16);
        let signed = ((code << 4) as i8 >> 4) as i32;

        // `/` truncates toward zero, which the format relies on
        let predicted = (self.sample1 as i32 * self.coeff1 + self.sample2 as i32 * self.coeff2) / 256;
        let predicted = predicted.wrapping_add(signed.wrapping_mul(self.delta));

        // wraps rather than saturates
        let sample = predicted as u16 as i16;

        self.sample2 = self.sample1;
        self.sample1 = sample;
        self.delta = (ADAPTATION[code as usize].wrapping_mul(self.delta) / 256).max(MIN_DELTA);

        sample
    }
}

/// Decodes one block into the front of `out`, returning how many samples
/// were written.
pub fn decode_block(block: &[u8], out: &mut [i16]) -> Result<usize, DecodeError> {
    let header = BlockHeader::parse(block)?;
    let need = samples_per_block(block.len());
    let have = out.len();
    let out = out.get_mut(..need).ok_or(DecodeError::Overrun{need, have})?;

    let (seeds, rest) = out.split_at_mut(2);
    seeds.copy_from_slice(&[header.sample2, header.sample1]);

    let mut channel = Channel::new(&header);
    let codes = block[HEADER_LEN..].iter()
        .flat_map(|&b| [b >> 4, b & 0xf]);
    for (slot, code) in rest.iter_mut().zip(codes) {
        *slot = channel.expand(code);
    }

    Ok(need)
}

/// Decodes a whole `data` payload made of `block_align`-sized blocks.
/// Trailing bytes that do not fill a block are ignored.
pub fn decode(payload: &[u8], block_align: usize) -> Result<Vec<i16>, DecodeError> {
    if block_align <= HEADER_LEN {
        return Err(DecodeError::BlockAlign(block_align));
    }
    if payload.len() < block_align {
        return Err(Truncated{at: 0, need: block_align, have: payload.len()}.into());
    }

    let n_blocks = payload.len() / block_align;
    let per_block = samples_per_block(block_align);
    let leftover = payload.len() % block_align;
    if leftover != 0 {
        log::warn!("ignoring {leftover}B trailing partial block");
    }
    log::debug!("decoding {n_blocks} blocks of {block_align}B; {per_block} samples each");

    let mut samples = vec![0i16; n_blocks * per_block];
    decode_blocks(&payload[..n_blocks * block_align], block_align, per_block, &mut samples)?;
    Ok(samples)
}

#[cfg(not(feature = "parallel"))]
fn decode_blocks(blocks: &[u8], block_align: usize, per_block: usize, out: &mut [i16])
    -> Result<(), DecodeError>
{
    blocks.chunks_exact(block_align)
        .zip(out.chunks_exact_mut(per_block))
        .try_for_each(|(block, out)| decode_block(block, out).map(drop))
}

#[cfg(feature = "parallel")]
fn decode_blocks(blocks: &[u8], block_align: usize, per_block: usize, out: &mut [i16])
    -> Result<(), DecodeError>
{
    use rayon::prelude::*;
    blocks.par_chunks_exact(block_align)
        .zip(out.par_chunks_exact_mut(per_block))
        .try_for_each(|(block, out)| decode_block(block, out).map(drop))
}
