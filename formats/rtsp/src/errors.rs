use std::io;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum RtspMessageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("format error: {0}")]
    FormatError(#[from] std::fmt::Error),
    #[error("Unknown method: {0:?}")]
    UnknownMethod(Option<String>),
    #[error("Unknown uri: {0:?}")]
    UnknownUri(Option<Url>),
    #[error("Unknown rtsp version: {0:?}")]
    UnknownRtspVersion(Option<String>),
    #[error("Missing Content-Type header for a message with a body")]
    MissingContentType,
    #[error("Invalid message format: {0}")]
    InvalidRtspMessageFormat(String),
    #[error("Invalid Url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Invalid transport header: {0}")]
    InvalidTransportHeader(String),
}

pub type RtspMessageResult<T> = Result<T, RtspMessageError>;
