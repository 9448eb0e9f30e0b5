use std::io;

use codec_h264::errors::H264CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RtpH264Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("h264 codec error: {0}")]
    Codec(#[from] H264CodecError),
    #[error("invalid h264 packet type: {0}")]
    InvalidPacketType(u8),
    #[error("unsupported h264 packet type: {0}")]
    UnsupportedPacketType(u8),
    #[error("forbidden_zero_bit is set: {0:#04x}")]
    ForbiddenZeroBitSet(u8),
    #[error("invalid aggregation packet: {0}")]
    InvalidAggregation(String),
    #[error("fragmentation sequence broken: {0}")]
    FragmentSequenceBroken(String),
    #[error("invalid sprop-parameter-sets: {0}")]
    InvalidSpropParameterSets(String),
}

pub type RtpH264Result<T> = Result<T, RtpH264Error>;
