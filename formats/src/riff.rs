use {
    crate::wave::WaveFormat,
    util::{Reader, Truncated},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Format,
    Data,
    Other([u8; 4]),
}

impl From<[u8; 4]> for ChunkKind {
    fn from(tag: [u8; 4]) -> Self {
        match &tag {
            b"fmt " => Self::Format,
            b"data" => Self::Data,
            _       => Self::Other(tag),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("not a WAVE file (header {riff:?}/{wave:?})", riff = show_tag(.0), wave = show_tag(.1))]
    NotWave([u8; 4], [u8; 4]),
    #[error(transparent)]
    Truncated(#[from] Truncated),
    #[error("no data chunk")]
    NoData,
}

fn show_tag(tag: &[u8; 4]) -> String {
    tag.escape_ascii().to_string()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Skip the pad byte RIFF puts after odd-sized chunks. Off by default,
    /// which matches files written by tools that never pad.
    pub word_aligned: bool,
}

/// A parsed WAVE container. `data` borrows from the input buffer.
#[derive(Debug, Clone, Copy)]
pub struct Wave<'a> {
    /// Zeroed if the file had no `fmt ` chunk.
    pub format:       WaveFormat,
    pub format_found: bool,
    pub data:         &'a [u8],
    pub data_offset:  usize,
}

pub fn parse(bytes: &[u8]) -> Result<Wave<'_>, ParseError> {
    parse_with(bytes, &ParseOptions::default())
}

pub fn parse_with<'a>(bytes: &'a [u8], options: &ParseOptions) -> Result<Wave<'a>, ParseError> {
    let mut r = Reader::new(bytes);

    let riff = r.tag()?;
    let riff_len: u32 = r.le()?;
    let wave = r.tag()?;
    if &riff != b"RIFF" || &wave != b"WAVE" {
        return Err(ParseError::NotWave(riff, wave));
    }
    log::debug!("riff container: {riff_len}B declared, {}B present", bytes.len());

    let mut format = None;
    let mut data = None;

    while !r.is_empty() {
        let chunk_at = r.position();
        let tag = r.tag()?;
        let len = r.le::<u32>()? as usize;
        let payload_at = r.position();
        let payload = r.take(len)?;
        log::debug!("chunk {} at +{chunk_at:05x}; {len}B", tag.escape_ascii());

        match ChunkKind::from(tag) {
            ChunkKind::Format => {
                if len < WaveFormat::BASE_LEN {
                    return Err(Truncated{at: payload_at, need: WaveFormat::BASE_LEN, have: len}.into());
                }
                format = Some(WaveFormat::from_chunk(payload)?);
            }
            ChunkKind::Data => data = Some((payload_at, payload)),
            ChunkKind::Other(_) => {}
        }

        if options.word_aligned && len % 2 == 1 && !r.is_empty() {
            r.skip(1)?;
        }
    }

    let (data_offset, data) = data.ok_or(ParseError::NoData)?;
    if format.is_none() {
        log::warn!("no fmt chunk; format left zeroed");
    }

    Ok(Wave {
        format:       format.unwrap_or_default(),
        format_found: format.is_some(),
        data,
        data_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut bs = tag.to_vec();
        bs.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bs.extend_from_slice(payload);
        bs
    }

    fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body = chunks.concat();
        let mut bs = b"RIFF".to_vec();
        bs.extend_from_slice(&(body.len() as u32 + 4).to_le_bytes());
        bs.extend_from_slice(b"WAVE");
        bs.extend_from_slice(&body);
        bs
    }

    fn adpcm_fmt(block_align: u16) -> Vec<u8> {
        let mut f = WaveFormat {
            format_tag: 2,
            channels: 1,
            sample_rate: 8_000,
            avg_byte_rate: 4_096,
            block_align,
            bits_per_sample: 4,
            extra_size: 0,
        }.to_fmt_bytes().to_vec();
        f.extend_from_slice(&[0, 0]);
        chunk(b"fmt ", &f)
    }

    #[test]
    fn finds_format_and_data() {
        let bytes = riff(&[
            adpcm_fmt(256),
            chunk(b"LIST", b"INFOjunk"),
            chunk(b"data", &[1, 2, 3, 4]),
        ]);
        let wave = parse(&bytes).unwrap();
        assert!(wave.format_found);
        assert_eq!(wave.format.block_align, 256);
        assert_eq!(wave.format.sample_rate, 8_000);
        assert_eq!(wave.data, &[1, 2, 3, 4]);
        assert_eq!(&bytes[wave.data_offset..][..4], wave.data);
    }

    #[test]
    fn rejects_non_wave() {
        let mut bytes = riff(&[chunk(b"data", &[])]);
        bytes[8..12].copy_from_slice(b"AVI ");
        let err = parse(&bytes).unwrap_err();
        assert!(matches!(err, ParseError::NotWave(_, wave) if &wave == b"AVI "));
        assert!(err.to_string().starts_with("not a WAVE file"));

        assert!(matches!(parse(b"RIFF"), Err(ParseError::Truncated(_))));
    }

    #[test]
    fn chunk_past_end_is_truncated() {
        let mut bytes = riff(&[adpcm_fmt(256), chunk(b"data", &[0; 16])]);
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(parse(&bytes), Err(ParseError::Truncated(_))));

        // half a chunk header
        let mut bytes = riff(&[adpcm_fmt(256), chunk(b"data", &[0; 16])]);
        bytes.extend_from_slice(b"LI");
        assert!(matches!(parse(&bytes), Err(ParseError::Truncated(_))));

        let bytes = riff(&[chunk(b"fmt ", &[0; 12]), chunk(b"data", &[])]);
        assert!(matches!(parse(&bytes), Err(ParseError::Truncated(_))));
    }

    #[test]
    fn missing_format_is_zeroed() {
        let bytes = riff(&[chunk(b"data", &[0; 8])]);
        let wave = parse(&bytes).unwrap();
        assert!(!wave.format_found);
        assert_eq!(wave.format, WaveFormat::default());
        assert_eq!(wave.format.block_align, 0);

        let bytes = riff(&[adpcm_fmt(256)]);
        assert!(matches!(parse(&bytes), Err(ParseError::NoData)));
    }

    #[test]
    fn odd_chunks_and_padding() {
        let mut padded = chunk(b"note", b"odd");
        padded.push(0);
        let bytes = riff(&[padded, adpcm_fmt(256), chunk(b"data", &[9; 4])]);

        let wave = parse_with(&bytes, &ParseOptions{word_aligned: true}).unwrap();
        assert_eq!(wave.format.block_align, 256);
        assert_eq!(wave.data, &[9; 4]);

        // without alignment the pad byte shifts every later chunk header
        assert!(parse(&bytes).is_err());

        let unpadded = riff(&[chunk(b"note", b"odd"), adpcm_fmt(256), chunk(b"data", &[9; 4])]);
        assert_eq!(parse(&unpadded).unwrap().data, &[9; 4]);
    }

    #[test]
    fn later_chunks_win() {
        let bytes = riff(&[
            adpcm_fmt(64),
            chunk(b"data", &[1]),
            adpcm_fmt(128),
            chunk(b"data", &[2, 2]),
        ]);
        let wave = parse(&bytes).unwrap();
        assert_eq!(wave.format.block_align, 128);
        assert_eq!(wave.data, &[2, 2]);
    }

    #[test]
    fn chunk_kinds() {
        assert_eq!(ChunkKind::from(*b"fmt "), ChunkKind::Format);
        assert_eq!(ChunkKind::from(*b"data"), ChunkKind::Data);
        assert_eq!(ChunkKind::from(*b"fact"), ChunkKind::Other(*b"fact"));
    }
}
