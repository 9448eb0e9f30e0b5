pub mod builder;
pub mod reader;
#[cfg(test)]
mod test;

use std::fmt;

use builder::RtspResponseBuilder;

use crate::{
    consts::{common::CRLF_STR, status::RtspStatus, version::RtspVersion},
    header::RtspHeaders,
};

#[derive(Debug, Clone)]
pub struct RtspResponse {
    pub(crate) status: RtspStatus,
    pub(crate) reason: String,
    pub(crate) version: RtspVersion,
    pub(crate) headers: RtspHeaders,
    pub(crate) body: Option<String>,
}

impl RtspResponse {
    pub fn builder() -> RtspResponseBuilder {
        RtspResponseBuilder::new()
    }

    pub fn status(&self) -> RtspStatus {
        self.status
    }

    /// The reason phrase exactly as the server sent it.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn version(&self) -> &RtspVersion {
        &self.version
    }

    pub fn headers(&self) -> &RtspHeaders {
        &self.headers
    }

    pub fn body(&self) -> Option<&String> {
        self.body.as_ref()
    }
}

impl fmt::Display for RtspResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}{}",
            self.version,
            self.status.code(),
            self.reason,
            CRLF_STR
        )?;
        write!(f, "{}{}", self.headers, CRLF_STR)?;
        if let Some(body) = &self.body {
            f.write_str(body)?;
        }
        Ok(())
    }
}
