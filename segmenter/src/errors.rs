use std::io;

use mpegts_formats::errors::MpegTsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SegmenterError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("ts mux error: {0}")]
    Mux(#[from] MpegTsError),
    #[error("playlist update failed: {0}")]
    PlaylistUpdate(String),
    #[error("invalid segmenter config: {0}")]
    InvalidConfig(String),
    #[error("mix queue is full at {0} frames")]
    MixQueueFull(usize),
}

pub type SegmenterResult<T> = Result<T, SegmenterError>;
