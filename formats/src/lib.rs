//! RIFF/WAVE container handling.

pub mod riff;
pub mod wave;

pub use riff::{parse, parse_with, ChunkKind, ParseError, ParseOptions, Wave};
pub use wave::{pcm16_data_len, write_pcm16, write_pcm16_to, FormatTag, TooLong, WaveFormat, PCM_HEADER_LEN};
