//! @see: RFC 8866 SDP: Session Description Protocol

use std::fmt;

use crate::{
    CRLF,
    attributes::{SDPAttribute, fmtp::FormatParameters, rtpmap::RtpMap},
    errors::SDPError,
    reader::SessionDescriptionReader,
};

/// 5.2. Origin ("o=")
/// o=<username> <sess-id> <sess-version> <nettype> <addrtype> <unicast-address>
#[derive(Debug, Default, Clone)]
pub struct SDPOrigin {
    pub user_name: String,
    pub session_id: u64,
    pub session_version: u64,
    pub net_type: String,
    pub addr_type: String,
    pub unicast_address: String,
}

impl fmt::Display for SDPOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "o={} {} {} {} {} {}{}",
            self.user_name,
            self.session_id,
            self.session_version,
            self.net_type,
            self.addr_type,
            self.unicast_address,
            CRLF
        )
    }
}

/// 5.14. Media Descriptions ("m=")
/// m=<media> <port> <proto> <fmt> ...
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub enum SDPMediaType {
    #[default]
    Audio,
    Video,
    Other(String),
}

impl From<&str> for SDPMediaType {
    fn from(value: &str) -> Self {
        match value {
            "audio" => Self::Audio,
            "video" => Self::Video,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for SDPMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Audio => "audio",
                Self::Video => "video",
                Self::Other(str) => str,
            }
        )
    }
}

#[derive(Debug, Default, Clone)]
pub struct SDPMediaLine {
    pub media_type: SDPMediaType,
    pub port: u16,
    pub protocol: String,
    pub formats: Vec<String>,
}

impl SDPMediaLine {
    pub fn first_payload_type(&self) -> Result<u8, SDPError> {
        let first = self
            .formats
            .first()
            .ok_or(SDPError::MissingField("media format"))?;
        first.parse().map_err(|err| {
            SDPError::SyntaxError(format!("parse payload type failed: {}, {}", first, err))
        })
    }
}

impl fmt::Display for SDPMediaLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m={} {} {}", self.media_type, self.port, self.protocol)?;
        self.formats
            .iter()
            .try_for_each(|item| write!(f, " {}", item))?;
        write!(f, "{}", CRLF)
    }
}

#[derive(Debug, Default, Clone)]
pub struct SDPMediaDescription {
    pub media_line: SDPMediaLine,
    pub attributes: Vec<SDPAttribute>,
}

impl SDPMediaDescription {
    pub fn get_rtp_map(&self) -> Option<&RtpMap> {
        self.attributes.iter().find_map(|attr| {
            if let SDPAttribute::RtpMap(rtpmap) = attr {
                Some(rtpmap)
            } else {
                None
            }
        })
    }

    pub fn get_fmtp(&self) -> Option<&FormatParameters> {
        self.attributes.iter().find_map(|attr| {
            if let SDPAttribute::Fmtp(fmtp) = attr {
                Some(fmtp)
            } else {
                None
            }
        })
    }

    pub fn get_control(&self) -> Option<&str> {
        self.attributes.iter().find_map(|attr| {
            if let SDPAttribute::Control(control) = attr {
                Some(control.as_str())
            } else {
                None
            }
        })
    }
}

impl fmt::Display for SDPMediaDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.media_line)?;
        self.attributes
            .iter()
            .try_for_each(|item| write!(f, "a={}{}", item, CRLF))?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct SessionDescription {
    pub version: u32,
    pub origin: SDPOrigin,
    pub session_name: String,
    pub attributes: Vec<SDPAttribute>,
    pub media_description: Vec<SDPMediaDescription>,
}

impl SessionDescription {
    pub fn reader() -> SessionDescriptionReader {
        SessionDescriptionReader::new()
    }

    /// Session-level `a=control:` attribute, used as the aggregate control
    /// url base by RTSP servers.
    pub fn get_control(&self) -> Option<&str> {
        self.attributes.iter().find_map(|attr| {
            if let SDPAttribute::Control(control) = attr {
                Some(control.as_str())
            } else {
                None
            }
        })
    }
}

impl fmt::Display for SessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v={}{}", self.version, CRLF)?;
        write!(f, "{}", self.origin)?;
        write!(f, "s={}{}", self.session_name, CRLF)?;
        self.attributes
            .iter()
            .try_for_each(|item| write!(f, "a={}{}", item, CRLF))?;
        self.media_description
            .iter()
            .try_for_each(|item| write!(f, "{}", item))?;
        Ok(())
    }
}
