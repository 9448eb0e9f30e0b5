pub mod fmtp;
pub mod rtpmap;

use std::{fmt, str::FromStr};

use fmtp::FormatParameters;
use rtpmap::RtpMap;

use crate::errors::SDPError;

/// 5.13. Attributes ("a=")
/// a=<attribute-name>
/// a=<attribute-name>:<attribute-value>
#[derive(Debug, Clone)]
pub struct SDPTrivialAttribute {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub enum SDPAttribute {
    RtpMap(RtpMap),
    Fmtp(FormatParameters),
    Control(String),
    Trivial(SDPTrivialAttribute),
}

impl FromStr for SDPAttribute {
    type Err = SDPError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s.split_once(':').unwrap_or((s, ""));
        match k {
            "rtpmap" => Ok(Self::RtpMap(v.parse()?)),
            "fmtp" => Ok(Self::Fmtp(v.parse()?)),
            "control" => Ok(Self::Control(v.to_owned())),
            _ => Ok(Self::Trivial(SDPTrivialAttribute {
                name: k.to_owned(),
                value: if v.is_empty() {
                    None
                } else {
                    Some(v.to_owned())
                },
            })),
        }
    }
}

impl fmt::Display for SDPAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RtpMap(rtpmap) => write!(f, "rtpmap:{}", rtpmap),
            Self::Fmtp(fmtp) => write!(f, "fmtp:{}", fmtp),
            Self::Control(control) => write!(f, "control:{}", control),
            Self::Trivial(trivial) => {
                write!(f, "{}", trivial.name)?;
                if let Some(value) = &trivial.value {
                    write!(f, ":{}", value)?;
                }
                Ok(())
            }
        }
    }
}
