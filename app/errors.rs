use std::io;

use config::ConfigError;
use rtsp_session::errors::SessionError;
use segmenter::errors::SegmenterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("rtsp session error: {0}")]
    Session(#[from] SessionError),
    #[error("segmenter error: {0}")]
    Segmenter(#[from] SegmenterError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("worker task failed: {0}")]
    Task(String),
}

impl AppError {
    /// 0 is a clean shutdown, 2 bad arguments, 3 rtsp connect/setup,
    /// 4 i/o, 1 anything else.
    pub(crate) fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::InvalidArgument(_) => 2,
            Self::Session(_) => 3,
            Self::Io(_) | Self::Segmenter(SegmenterError::Io(_)) => 4,
            _ => 1,
        }
    }
}

pub(crate) type AppResult<T> = Result<T, AppError>;
