use crate::{
    consts::{status::RtspStatus, version::RtspVersion},
    errors::{RtspMessageError, RtspMessageResult},
    header::{RtspHeader, RtspHeaders},
};

use super::RtspResponse;

#[derive(Debug, Default)]
pub struct RtspResponseBuilder {
    status: Option<RtspStatus>,
    version: Option<RtspVersion>,
    headers: RtspHeaders,
    body: Option<String>,
}

impl RtspResponseBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn status(mut self, status: RtspStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn version(mut self, version: RtspVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn header<S: Into<String>>(mut self, key: RtspHeader, value: S) -> Self {
        self.headers.push(key, value.into());
        self
    }

    pub fn body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn build(mut self) -> RtspMessageResult<RtspResponse> {
        let status = self.status.unwrap_or(RtspStatus::OK);

        if let Some(body) = &self.body {
            if !self.headers.contains(RtspHeader::ContentType) {
                return Err(RtspMessageError::MissingContentType);
            }

            self.headers.remove(RtspHeader::ContentLength);
            self.headers
                .push(RtspHeader::ContentLength, format!("{}", body.len()));
        }

        Ok(RtspResponse {
            status,
            reason: status.description().to_owned(),
            version: self.version.unwrap_or_default(),
            headers: self.headers,
            body: self.body,
        })
    }
}
