use std::io;

use codec_aac::errors::AacError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RtpMpeg4Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("aac codec error: {0}")]
    Aac(#[from] AacError),
    #[error("unsupported mpeg4-generic mode: {0}")]
    UnsupportedMode(String),
    #[error("syntax error: {0}")]
    SyntaxError(String),
    #[error("sdp parameter error: {0}")]
    SdpParameter(#[from] sdp_formats::errors::SDPError),
}

pub type RtpMpeg4Result<T> = Result<T, RtpMpeg4Error>;
