use {
    bytemuck::{Pod, Zeroable},
    std::{fmt, io},
    util::{Le, Reader, Truncated},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatTag(pub u16);

impl FormatTag {
    pub const PCM:      Self = Self(0x0001);
    pub const MS_ADPCM: Self = Self(0x0002);

    pub fn codec_name(self) -> &'static str {
        match self {
            Self::PCM      => "pcm",
            Self::MS_ADPCM => "ms-adpcm",
            _              => "unknown",
        }
    }
}

/// The `fmt ` chunk of a WAVE file (WAVEFORMATEX).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaveFormat {
    pub format_tag:      u16,
    pub channels:        u16,
    pub sample_rate:     u32,
    pub avg_byte_rate:   u32,
    pub block_align:     u16,
    pub bits_per_sample: u16,
    pub extra_size:      u16,
}

impl WaveFormat {
    /// Size of the fixed part of the chunk; `extra_size` follows if present.
    pub const BASE_LEN: usize = 16;

    pub fn from_chunk(chunk: &[u8]) -> Result<Self, Truncated> {
        let mut r = Reader::new(chunk);
        let mut format = Self {
            format_tag:      r.le()?,
            channels:        r.le()?,
            sample_rate:     r.le()?,
            avg_byte_rate:   r.le()?,
            block_align:     r.le()?,
            bits_per_sample: r.le()?,
            extra_size:      0,
        };
        if r.remaining() >= 2 {
            format.extra_size = r.le()?;
        }
        Ok(format)
    }

    pub fn pcm16_mono(sample_rate: u32) -> Self {
        Self {
            format_tag:      FormatTag::PCM.0,
            channels:        1,
            sample_rate,
            avg_byte_rate:   sample_rate.wrapping_mul(2),
            block_align:     2,
            bits_per_sample: 16,
            extra_size:      0,
        }
    }

    pub fn tag(&self) -> FormatTag {
        FormatTag(self.format_tag)
    }

    pub fn to_fmt_bytes(&self) -> [u8; 16] {
        let chunk = FmtChunk {
            format_tag:      self.format_tag.into(),
            channels:        self.channels.into(),
            sample_rate:     self.sample_rate.into(),
            avg_byte_rate:   self.avg_byte_rate.into(),
            block_align:     self.block_align.into(),
            bits_per_sample: self.bits_per_sample.into(),
        };
        bytemuck::cast(chunk)
    }
}

/// On-disk layout of the fixed part of a `fmt ` chunk.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct FmtChunk {
    format_tag:      Le<u16>,
    channels:        Le<u16>,
    sample_rate:     Le<u32>,
    avg_byte_rate:   Le<u32>,
    block_align:     Le<u16>,
    bits_per_sample: Le<u16>,
}

impl fmt::Display for WaveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "format tag:       {} ({})", self.format_tag, self.tag().codec_name())?;
        writeln!(f, "channels:         {}", self.channels)?;
        writeln!(f, "sample rate:      {}", self.sample_rate)?;
        writeln!(f, "avg byte rate:    {}", self.avg_byte_rate)?;
        writeln!(f, "block align:      {}", self.block_align)?;
        writeln!(f, "bits per sample:  {}", self.bits_per_sample)?;
        write!  (f, "extra size:       {}", self.extra_size)
    }
}

pub const PCM_HEADER_LEN: usize = 44;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0} samples overflow the 32-bit RIFF size fields")]
pub struct TooLong(pub usize);

/// Byte length of the `data` chunk holding `n_samples` 16-bit samples,
/// if the whole file still fits the RIFF size field.
pub fn pcm16_data_len(n_samples: usize) -> Result<u32, TooLong> {
    n_samples.checked_mul(2)
        .filter(|len| len.checked_add(36).is_some_and(|riff| riff <= u32::MAX as usize))
        .and_then(|len| u32::try_from(len).ok())
        .ok_or(TooLong(n_samples))
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct PcmHeader {
    riff_head: [Le<u32>; 3],
    fmt_head:  [Le<u32>; 2],
    fmt_chunk: FmtChunk,
    data_head: [Le<u32>; 2],
}

fn tag(t: &[u8; 4]) -> Le<u32> {
    Le::from(u32::from_le_bytes(*t))
}

fn pcm16_header(n_samples: usize, sample_rate: u32) -> Result<[u8; PCM_HEADER_LEN], TooLong> {
    let data_len = pcm16_data_len(n_samples)?;
    let format = WaveFormat::pcm16_mono(sample_rate).to_fmt_bytes();

    let header = PcmHeader {
        riff_head: [tag(b"RIFF"), (data_len + 36).into(), tag(b"WAVE")],
        fmt_head:  [tag(b"fmt "), (format.len() as u32).into()],
        fmt_chunk: bytemuck::cast(format),
        data_head: [tag(b"data"), data_len.into()],
    };
    let mut buf = [0u8; PCM_HEADER_LEN];
    buf.copy_from_slice(bytemuck::bytes_of(&header));
    Ok(buf)
}

/// Serialises mono 16-bit samples as a canonical PCM WAVE file.
pub fn write_pcm16(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, TooLong> {
    let header = pcm16_header(samples.len(), sample_rate)?;
    let mut out = Vec::with_capacity(PCM_HEADER_LEN + samples.len() * 2);
    out.extend_from_slice(&header);
    out.extend(samples.iter().copied().flat_map(i16::to_le_bytes));
    Ok(out)
}

pub fn write_pcm16_to<W>(out: &mut W, samples: &[i16], sample_rate: u32) -> io::Result<()>
where
    W: io::Write,
{
    let header = pcm16_header(samples.len(), sample_rate)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    out.write_all(&header)?;
    for &sample in samples {
        out.write_all(bytemuck::bytes_of(&Le::from(sample)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fmt_chunk() {
        let chunk = [
            0x02, 0x00,             // ms-adpcm
            0x01, 0x00,             // mono
            0x44, 0xac, 0x00, 0x00, // 44100
            0x2e, 0x5b, 0x00, 0x00,
            0x00, 0x02,             // 512
            0x04, 0x00,
            0x20, 0x00,
        ];
        let format = WaveFormat::from_chunk(&chunk).unwrap();
        assert_eq!(format.tag(), FormatTag::MS_ADPCM);
        assert_eq!(format.channels, 1);
        assert_eq!(format.sample_rate, 44_100);
        assert_eq!(format.avg_byte_rate, 23_342);
        assert_eq!(format.block_align, 512);
        assert_eq!(format.bits_per_sample, 4);
        assert_eq!(format.extra_size, 32);

        let short = WaveFormat::from_chunk(&chunk[..16]).unwrap();
        assert_eq!(short.extra_size, 0);
        assert_eq!(short.block_align, 512);

        assert!(WaveFormat::from_chunk(&chunk[..15]).is_err());
    }

    #[test]
    fn canonical_header() {
        let samples = [0i16, 1, -1, i16::MAX, i16::MIN];
        let wav = write_pcm16(&samples, 22_050).unwrap();
        assert_eq!(wav.len(), PCM_HEADER_LEN + 10);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 36 + 10);
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(u32::from_le_bytes(wav[16..20].try_into().unwrap()), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 10);
        assert_eq!(&wav[44..], &[0, 0, 1, 0, 0xff, 0xff, 0xff, 0x7f, 0x00, 0x80]);

        let format = WaveFormat::from_chunk(&wav[20..36]).unwrap();
        assert_eq!(format, WaveFormat::pcm16_mono(22_050));
        assert_eq!(format.avg_byte_rate, 44_100);
        assert_eq!(format.block_align, 2);

        let mut streamed = Vec::new();
        write_pcm16_to(&mut streamed, &samples, 22_050).unwrap();
        assert_eq!(streamed, wav);
    }

    #[test]
    fn display_lists_every_field() {
        let text = WaveFormat::pcm16_mono(8_000).to_string();
        assert!(text.contains("format tag:       1 (pcm)"));
        assert!(text.contains("sample rate:      8000"));
        assert_eq!(text.lines().count(), 7);
    }

    #[test]
    fn oversized_data_is_refused() {
        let most = (u32::MAX as usize - 36) / 2;
        assert_eq!(pcm16_data_len(most), Ok(most as u32 * 2));
        assert_eq!(pcm16_data_len(most + 1), Err(TooLong(most + 1)));

        assert_eq!(pcm16_header(1 << 31, 8_000), Err(TooLong(1 << 31)));
        assert!(pcm16_header((1 << 31) - 10, 8_000).is_err());
        assert!(pcm16_data_len(usize::MAX).is_err());

        let header = pcm16_header(most, 8_000).unwrap();
        assert_eq!(u32::from_le_bytes(header[4..8].try_into().unwrap()), u32::MAX - 1);
        assert_eq!(u32::from_le_bytes(header[40..44].try_into().unwrap()), most as u32 * 2);
    }
}
