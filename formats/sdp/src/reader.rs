use crate::{
    LF,
    errors::{SDPError, SDPResult},
    session::{SDPMediaDescription, SessionDescription},
};

/// Line-oriented SDP reader.
///
/// CR/LF and bare LF endings are both accepted, unknown line types are
/// skipped, and attribute lines that fail to parse as a typed attribute are
/// kept verbatim as trivial attributes. The reader only insists on the
/// handful of lines the session layer consumes: `v=`, `m=`, `a=`.
pub struct SessionDescriptionReader {
    session_description: SessionDescription,
}

impl SessionDescriptionReader {
    pub fn new() -> Self {
        Self {
            session_description: Default::default(),
        }
    }

    pub fn read_from(mut self, text: &str) -> SDPResult<SessionDescription> {
        if text.trim().is_empty() {
            return Err(SDPError::InvalidPayload("payload is empty".to_owned()));
        }

        let mut seen_version = false;
        for line in text.split(LF) {
            let line = line.trim_end_matches('\r').trim();
            if line.is_empty() {
                continue;
            }
            if line.len() < 2 || line.as_bytes()[1] != b'=' {
                return Err(SDPError::SyntaxError(format!("invalid sdp line: {}", line)));
            }

            let (line_type, value) = line.split_at(2);
            match line_type {
                "v=" => {
                    self.session_description.version = value.parse().map_err(|err| {
                        SDPError::SyntaxError(format!("parse version failed: {}, {}", value, err))
                    })?;
                    seen_version = true;
                }
                "o=" => self.read_origin_line(value)?,
                "s=" => self.session_description.session_name = value.to_owned(),
                "m=" => self.read_media_line(value)?,
                "a=" => self.read_attribute_line(value)?,
                // connection, bandwidth, timing and the other line types
                // carry nothing this consumer acts on
                _ => {}
            }
        }

        if !seen_version {
            return Err(SDPError::MissingField("v="));
        }
        Ok(self.session_description)
    }

    fn read_origin_line(&mut self, value: &str) -> SDPResult<()> {
        let fields: Vec<&str> = value.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(SDPError::SyntaxError(format!(
                "invalid origin line, fields count is not 6: {}",
                value
            )));
        }

        self.session_description.origin.user_name = fields[0].to_owned();
        self.session_description.origin.session_id = fields[1].parse().map_err(|err| {
            SDPError::SyntaxError(format!("parse session id failed: {}, {}", fields[1], err))
        })?;
        self.session_description.origin.session_version = fields[2].parse().map_err(|err| {
            SDPError::SyntaxError(format!("parse session version failed: {}, {}", fields[2], err))
        })?;
        self.session_description.origin.net_type = fields[3].to_owned();
        self.session_description.origin.addr_type = fields[4].to_owned();
        self.session_description.origin.unicast_address = fields[5].to_owned();
        Ok(())
    }

    fn read_media_line(&mut self, value: &str) -> SDPResult<()> {
        let fields: Vec<&str> = value.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(SDPError::SyntaxError(format!(
                "invalid media field line: {}",
                value
            )));
        }

        let mut media: SDPMediaDescription = Default::default();
        media.media_line.media_type = fields[0].into();
        media.media_line.port = fields[1].parse().map_err(|err| {
            SDPError::SyntaxError(format!("parse media port failed: {}, {}", fields[1], err))
        })?;
        media.media_line.protocol = fields[2].to_owned();
        media.media_line.formats = fields[3..].iter().map(|item| item.to_string()).collect();
        self.session_description.media_description.push(media);
        Ok(())
    }

    fn read_attribute_line(&mut self, value: &str) -> SDPResult<()> {
        let attribute = value.parse()?;
        match self.session_description.media_description.last_mut() {
            Some(media) => media.attributes.push(attribute),
            None => self.session_description.attributes.push(attribute),
        }
        Ok(())
    }
}

impl Default for SessionDescriptionReader {
    fn default() -> Self {
        Self::new()
    }
}
