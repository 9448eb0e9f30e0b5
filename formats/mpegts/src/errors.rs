use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MpegTsError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("pes payload too large for a bounded packet: {0}")]
    PesPayloadTooLarge(usize),
    #[error("adaptation field cannot occupy {0} bytes")]
    BadAdaptationFieldSize(usize),
    #[error("psi section too large: {0}")]
    SectionTooLarge(usize),
    #[error("pes payload is empty")]
    EmptyPesPayload,
}

pub type MpegTsResult<T> = Result<T, MpegTsError>;
