use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpServerError {
    #[error("http server launch failed: {0}")]
    Launch(String),
}

pub type HttpServerResult<T> = Result<T, HttpServerError>;
