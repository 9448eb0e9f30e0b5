pub mod header_names;
pub mod transport;

use std::{fmt, io};

use utils::traits::reader::TryReadFrom;

use crate::{
    consts::common::{CRLF_STR, HTAB, SPACE},
    errors::RtspMessageError,
    util::TextReader,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtspHeader {
    Accept,
    Authorization,
    ContentBase,
    ContentLength,
    ContentLocation,
    ContentType,
    CSeq,
    Public,
    Range,
    RtpInfo,
    Session,
    Transport,
    UserAgent,
}

impl From<&RtspHeader> for &'static str {
    fn from(value: &RtspHeader) -> Self {
        match value {
            RtspHeader::Accept => header_names::ACCEPT,
            RtspHeader::Authorization => header_names::AUTHORIZATION,
            RtspHeader::ContentBase => header_names::CONTENT_BASE,
            RtspHeader::ContentLength => header_names::CONTENT_LENGTH,
            RtspHeader::ContentLocation => header_names::CONTENT_LOCATION,
            RtspHeader::ContentType => header_names::CONTENT_TYPE,
            RtspHeader::CSeq => header_names::C_SEQ,
            RtspHeader::Public => header_names::PUBLIC,
            RtspHeader::Range => header_names::RANGE,
            RtspHeader::RtpInfo => header_names::RTP_INFO,
            RtspHeader::Session => header_names::SESSION,
            RtspHeader::Transport => header_names::TRANSPORT,
            RtspHeader::UserAgent => header_names::USER_AGENT,
        }
    }
}

impl fmt::Display for RtspHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let str: &str = self.into();
        f.write_str(str)
    }
}

/// Ordered multi-map of message headers.
///
/// Names are stored as received; lookups compare case-insensitively since
/// RFC 2326 header names are not case-sensitive on the wire.
#[derive(Debug, Default, Clone)]
pub struct RtspHeaders {
    entries: Vec<(String, String)>,
}

impl RtspHeaders {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push<S: Into<String>>(&mut self, key: RtspHeader, value: S) {
        let name: &str = (&key).into();
        self.entries.push((name.to_owned(), value.into()));
    }

    pub fn push_raw(&mut self, key: String, value: String) {
        self.entries.push((key, value));
    }

    pub fn append(&mut self, headers: Vec<(RtspHeader, String)>) {
        headers
            .into_iter()
            .for_each(|(key, value)| self.push(key, value));
    }

    pub fn get(&self, key: RtspHeader) -> Vec<&str> {
        let name: &str = (&key).into();
        self.entries
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn get_unique(&self, key: RtspHeader) -> Option<&str> {
        let name: &str = (&key).into();
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: RtspHeader) -> bool {
        self.get_unique(key).is_some()
    }

    pub fn remove(&mut self, key: RtspHeader) {
        let name: &str = (&key).into();
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn cseq(&self) -> Option<u64> {
        self.get_unique(RtspHeader::CSeq)
            .and_then(|v| v.trim().parse().ok())
    }

    pub fn content_length(&self) -> Option<usize> {
        self.get_unique(RtspHeader::ContentLength)
            .and_then(|v| v.trim().parse().ok())
    }

    /// The session id without the optional `;timeout=` parameter.
    pub fn session_id(&self) -> Option<&str> {
        self.get_unique(RtspHeader::Session)
            .map(|v| v.split(';').next().unwrap_or(v).trim())
    }
}

impl fmt::Display for RtspHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entries
            .iter()
            .try_for_each(|(key, value)| write!(f, "{}: {}{}", key, value, CRLF_STR))
    }
}

impl<R: AsRef<[u8]>> TryReadFrom<R> for RtspHeaders {
    type Error = RtspMessageError;
    fn try_read_from(reader: &mut io::Cursor<R>) -> Result<Option<Self>, Self::Error> {
        let mut text_reader = TextReader::new(reader);
        let mut headers = RtspHeaders::new();
        loop {
            let line = text_reader.try_read_line()?;
            let Some(line) = line else {
                // terminator not buffered yet, the message is incomplete
                return Ok(None);
            };
            if line.trim().is_empty() {
                return Ok(Some(headers));
            }

            if line.starts_with(SPACE as char) || line.starts_with(HTAB as char) {
                // folded continuation of the previous header value
                match headers.entries.last_mut() {
                    Some((_, value)) => {
                        value.push(' ');
                        value.push_str(line.trim());
                    }
                    None => {
                        return Err(RtspMessageError::InvalidRtspMessageFormat(format!(
                            "header continuation without a header: {}",
                            line
                        )));
                    }
                }
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                return Err(RtspMessageError::InvalidRtspMessageFormat(format!(
                    "invalid header line: {}",
                    line
                )));
            };
            headers.push_raw(key.trim().to_owned(), value.trim().to_owned());
        }
    }
}

