use std::io;

use codec_h265::errors::H265CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RtpH265Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("h265 codec error: {0}")]
    Codec(#[from] H265CodecError),
    #[error("unsupported h265 packet type: {0}")]
    UnsupportedPacketType(u8),
    #[error("forbidden_zero_bit is set: {0:#06x}")]
    ForbiddenZeroBitSet(u16),
    #[error("invalid aggregation packet: {0}")]
    InvalidAggregation(String),
    #[error("fragmentation sequence broken: {0}")]
    FragmentSequenceBroken(String),
    #[error("invalid sprop parameter set: {0}")]
    InvalidSpropParameterSet(String),
}

pub type RtpH265Result<T> = Result<T, RtpH265Error>;
