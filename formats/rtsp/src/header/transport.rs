use std::{fmt, str::FromStr};

use num::Integer;

use crate::errors::RtspMessageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportProtocol {
    RtpAvpUdp,
    RtpAvpTcp,
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RtpAvpUdp => write!(f, "RTP/AVP"),
            Self::RtpAvpTcp => write!(f, "RTP/AVP/TCP"),
        }
    }
}

impl FromStr for TransportProtocol {
    type Err = RtspMessageError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RTP/AVP" | "RTP/AVP/UDP" => Ok(Self::RtpAvpUdp),
            "RTP/AVP/TCP" => Ok(Self::RtpAvpTcp),
            other => Err(RtspMessageError::InvalidTransportHeader(format!(
                "unsupported transport protocol: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCast {
    Unicast,
    Multicast,
}

impl fmt::Display for TransportCast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unicast => write!(f, "unicast"),
            Self::Multicast => write!(f, "multicast"),
        }
    }
}

fn parse_number_range<T: FromStr + Integer + Copy>(s: &str) -> Result<(T, T), T::Err> {
    if !s.contains('-') {
        let port: T = s.parse::<T>()?;
        return Ok((port, port));
    }

    let (first, second) = s.split_once('-').unwrap();
    Ok((first.parse()?, second.parse()?))
}

/// The subset of RFC 2326 12.39 a unicast UDP client sends and receives.
/// Unknown parameters are preserved so the header survives a round trip.
#[derive(Debug, Clone)]
pub struct TransportHeader {
    pub protocol: TransportProtocol,
    pub cast: TransportCast,
    pub client_port: Option<(u16, u16)>,
    pub server_port: Option<(u16, u16)>,
    pub ssrc: Option<u32>,
    pub source: Option<String>,
    pub others: Vec<String>,
}

impl TransportHeader {
    /// The header a client offers in SETUP for one UDP track:
    /// `RTP/AVP;unicast;client_port=<rtp>-<rtcp>`.
    pub fn unicast_udp(rtp_port: u16, rtcp_port: u16) -> Self {
        Self {
            protocol: TransportProtocol::RtpAvpUdp,
            cast: TransportCast::Unicast,
            client_port: Some((rtp_port, rtcp_port)),
            server_port: None,
            ssrc: None,
            source: None,
            others: Vec::new(),
        }
    }
}

impl FromStr for TransportHeader {
    type Err = RtspMessageError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(';').map(|part| part.trim());
        let protocol: TransportProtocol = parts
            .next()
            .ok_or_else(|| {
                RtspMessageError::InvalidTransportHeader("empty transport header".to_owned())
            })?
            .parse()?;

        let mut result = Self {
            protocol,
            cast: TransportCast::Unicast,
            client_port: None,
            server_port: None,
            ssrc: None,
            source: None,
            others: Vec::new(),
        };

        for part in parts {
            if part.is_empty() {
                continue;
            }
            if part.eq_ignore_ascii_case("unicast") {
                result.cast = TransportCast::Unicast;
                continue;
            }
            if part.eq_ignore_ascii_case("multicast") {
                result.cast = TransportCast::Multicast;
                continue;
            }

            match part.split_once('=') {
                Some((key, value)) if key.eq_ignore_ascii_case("client_port") => {
                    result.client_port = Some(parse_number_range(value).map_err(|err| {
                        RtspMessageError::InvalidTransportHeader(format!(
                            "bad client_port: {}, {}",
                            value, err
                        ))
                    })?);
                }
                Some((key, value)) if key.eq_ignore_ascii_case("server_port") => {
                    result.server_port = Some(parse_number_range(value).map_err(|err| {
                        RtspMessageError::InvalidTransportHeader(format!(
                            "bad server_port: {}, {}",
                            value, err
                        ))
                    })?);
                }
                Some((key, value)) if key.eq_ignore_ascii_case("ssrc") => {
                    result.ssrc = u32::from_str_radix(value.trim(), 16).ok();
                    if result.ssrc.is_none() {
                        result.others.push(part.to_owned());
                    }
                }
                Some((key, value)) if key.eq_ignore_ascii_case("source") => {
                    result.source = Some(value.to_owned());
                }
                _ => result.others.push(part.to_owned()),
            }
        }

        Ok(result)
    }
}

impl fmt::Display for TransportHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.protocol, self.cast)?;
        if let Some((first, second)) = self.client_port {
            write!(f, ";client_port={}-{}", first, second)?;
        }
        if let Some((first, second)) = self.server_port {
            write!(f, ";server_port={}-{}", first, second)?;
        }
        if let Some(ssrc) = self.ssrc {
            write!(f, ";ssrc={:08X}", ssrc)?;
        }
        if let Some(source) = &self.source {
            write!(f, ";source={}", source)?;
        }
        for other in &self.others {
            write!(f, ";{}", other)?;
        }
        Ok(())
    }
}
