use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AacError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("wrong adts sync word: {0:#06x}")]
    WrongSyncWord(u16),
    #[error("unknown sampling frequency index: {0}")]
    UnknownSamplingFrequencyIndex(u8),
    #[error("unsupported sampling frequency: {0}")]
    UnsupportedSamplingFrequency(u32),
    #[error("invalid audio specific config: {0}")]
    InvalidAudioSpecificConfig(String),
    #[error("aac frame too large for adts: {0}")]
    FrameTooLarge(usize),
}

pub type AacResult<T> = Result<T, AacError>;
