use std::{
    io::{self},
    str::FromStr,
};

use utils::traits::reader::TryReadFrom;

use crate::{
    consts::{status::RtspStatus, version::RtspVersion},
    errors::RtspMessageError,
    header::RtspHeaders,
    util::TextReader,
};

use super::RtspResponse;

impl<R: AsRef<[u8]>> TryReadFrom<R> for RtspResponse {
    type Error = RtspMessageError;
    fn try_read_from(reader: &mut io::Cursor<R>) -> Result<Option<Self>, Self::Error> {
        let status_line = {
            let mut text_reader = TextReader::new(&mut *reader);
            match text_reader.try_read_line()? {
                Some(line) => line,
                None => return Ok(None),
            }
        };

        let mut parts = status_line.trim().splitn(3, ' ');
        let version = parts
            .next()
            .map(RtspVersion::from_str)
            .transpose()?
            .ok_or_else(|| {
                RtspMessageError::InvalidRtspMessageFormat(format!(
                    "invalid response status line: {}",
                    status_line
                ))
            })?;
        let status: RtspStatus = parts
            .next()
            .and_then(|code| code.parse::<u16>().ok())
            .map(RtspStatus::from)
            .ok_or_else(|| {
                RtspMessageError::InvalidRtspMessageFormat(format!(
                    "invalid status code in: {}",
                    status_line
                ))
            })?;
        let reason = parts
            .next()
            .map(|phrase| phrase.trim().to_owned())
            .unwrap_or_else(|| status.description().to_owned());

        let headers = match RtspHeaders::try_read_from(reader)? {
            Some(headers) => headers,
            None => return Ok(None),
        };

        let body = match headers.content_length() {
            Some(0) | None => None,
            Some(length) => {
                let mut text_reader = TextReader::new(&mut *reader);
                match text_reader.try_read_exact(length)? {
                    Some(body) => Some(body),
                    None => return Ok(None),
                }
            }
        };

        Ok(Some(Self {
            status,
            reason,
            version,
            headers,
            body,
        }))
    }
}

impl FromStr for RtspResponse {
    type Err = RtspMessageError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cursor = io::Cursor::new(s.as_bytes());
        Self::try_read_from(&mut cursor)?.ok_or_else(|| {
            RtspMessageError::InvalidRtspMessageFormat(format!("rtsp response is incomplete: {}", s))
        })
    }
}
