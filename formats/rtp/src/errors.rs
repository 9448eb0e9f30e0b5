use std::io;

use thiserror::Error;

use crate::codec::{
    h264::errors::RtpH264Error, h265::errors::RtpH265Error, mpeg4_generic::errors::RtpMpeg4Error,
};

#[derive(Debug, Error)]
pub enum RtpError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("rtp payload is empty")]
    EmptyPayload,
    #[error("bad padding size: {0}")]
    BadPaddingSize(usize),
    #[error("unsupported rtp version: {0}")]
    UnsupportedVersion(u8),
    #[error("h264 payload error: {0}")]
    H264(#[from] RtpH264Error),
    #[error("h265 payload error: {0}")]
    H265(#[from] RtpH265Error),
    #[error("mpeg4-generic payload error: {0}")]
    Mpeg4(#[from] RtpMpeg4Error),
}

pub type RtpResult<T> = Result<T, RtpError>;
