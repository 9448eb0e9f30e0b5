use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum H265CodecError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("unknown nalu type: {0}")]
    UnknownNaluType(u8),
    #[error("forbidden_zero_bit is set in nalu header: {0:#06x}")]
    ForbiddenZeroBitSet(u16),
    #[error("nalu is empty")]
    EmptyNalu,
}

pub type H265CodecResult<T> = Result<T, H265CodecError>;
