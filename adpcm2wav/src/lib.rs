//! MS-ADPCM WAVE to PCM WAVE conversion.

use {
    camino::{Utf8Path, Utf8PathBuf},
    formats::{FormatTag, ParseOptions, WaveFormat},
    std::io::Write as _,
};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] formats::ParseError),
    #[error(transparent)]
    Decode(#[from] ms_adpcm::DecodeError),
    #[error("{0} channels; only mono is supported")]
    Channels(u16),
    #[error(transparent)]
    TooLong(#[from] formats::TooLong),
    #[error("{path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}: file is empty")]
    Empty(Utf8PathBuf),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub parse: ParseOptions,
}

#[derive(Debug, Clone)]
pub struct Conversion {
    /// Descriptor of the input file.
    pub format:  WaveFormat,
    pub samples: Vec<i16>,
}

impl Conversion {
    pub fn to_wave_bytes(&self) -> Result<Vec<u8>, ConvertError> {
        Ok(formats::write_pcm16(&self.samples, self.format.sample_rate)?)
    }
}

pub fn convert(bytes: &[u8], options: &Options) -> Result<Conversion, ConvertError> {
    let wave = formats::parse_with(bytes, &options.parse)?;
    let format = wave.format;

    if format.tag() != FormatTag::MS_ADPCM {
        log::warn!("format tag is {} ({}), decoding as ms-adpcm anyway",
            format.format_tag, format.tag().codec_name());
    }
    // a missing fmt chunk leaves channels at zero; let the block align check report it
    if wave.format_found && format.channels != 1 {
        return Err(ConvertError::Channels(format.channels));
    }

    let samples = ms_adpcm::decode(wave.data, format.block_align as usize)?;
    formats::pcm16_data_len(samples.len())?;
    log::debug!("decoded {} samples from {}B at +{:x}",
        samples.len(), wave.data.len(), wave.data_offset);

    Ok(Conversion{format, samples})
}

pub fn load(path: &Utf8Path) -> Result<Vec<u8>, ConvertError> {
    let bytes = std::fs::read(path)
        .map_err(|source| ConvertError::Io{path: path.to_owned(), source})?;
    if bytes.is_empty() {
        return Err(ConvertError::Empty(path.to_owned()));
    }
    Ok(bytes)
}

pub fn store(path: &Utf8Path, conversion: &Conversion) -> Result<(), ConvertError> {
    formats::pcm16_data_len(conversion.samples.len())?;
    let io_err = |source| ConvertError::Io{path: path.to_owned(), source};
    let file = std::fs::File::create(path).map_err(io_err)?;
    let mut out = std::io::BufWriter::new(file);
    formats::write_pcm16_to(&mut out, &conversion.samples, conversion.format.sample_rate)
        .map_err(io_err)?;
    out.flush().map_err(io_err)
}
