use std::io;

use rtp_formats::errors::RtpError;
use rtsp_formats::{consts::methods::RtspMethod, errors::RtspMessageError};
use sdp_formats::errors::SDPError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("rtsp request timed out: {0}")]
    RequestTimeout(RtspMethod),
    #[error("rtsp status {code}: {phrase}")]
    Status { code: u16, phrase: String },
    #[error("operation not valid in this session state: {0}")]
    ProtocolState(String),
    #[error("rtsp message error: {0}")]
    Message(#[from] RtspMessageError),
    #[error("sdp error: {0}")]
    Sdp(#[from] SDPError),
    #[error("rtp error: {0}")]
    Rtp(#[from] RtpError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("the session carries no supported video track")]
    MissingVideoTrack,
    #[error("more than one video track is not supported")]
    MultipleVideoTracks,
    #[error("more than one audio track is not supported")]
    MultipleAudioTracks,
    #[error("invalid session config: {0}")]
    InvalidConfig(String),
}

pub type SessionResult<T> = Result<T, SessionError>;
