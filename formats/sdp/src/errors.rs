use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SDPError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("syntax error: {0}")]
    SyntaxError(String),
    #[error("invalid attribute line: {0}")]
    InvalidAttributeLine(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type SDPResult<T> = Result<T, SDPError>;
