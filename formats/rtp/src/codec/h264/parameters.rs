use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use codec_h264::{
    nalu::NalUnit,
    nalu_type::NALUType,
};
use sdp_formats::attributes::fmtp::FormatParameters;
use utils::traits::reader::ReadFrom;

use super::errors::{RtpH264Error, RtpH264Result};

/// Out-of-band H.264 parameters from `a=fmtp`.
///
/// `sprop-parameter-sets` carries base64 NAL units (usually SPS then PPS)
/// that let a receiver start decoding before they repeat in-band.
#[derive(Debug, Default)]
pub struct RtpH264Fmtp {
    pub packetization_mode: u8,
    pub sps: Option<NalUnit>,
    pub pps: Option<NalUnit>,
}

impl RtpH264Fmtp {
    pub fn from_fmtp(fmtp: &FormatParameters) -> RtpH264Result<Self> {
        let packetization_mode = fmtp
            .get("packetization-mode")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        let mut result = Self {
            packetization_mode,
            sps: None,
            pps: None,
        };

        if let Some(sprop) = fmtp.get("sprop-parameter-sets") {
            for encoded in sprop.split(',') {
                let encoded = encoded.trim();
                if encoded.is_empty() {
                    continue;
                }
                let bytes = BASE64.decode(encoded).map_err(|err| {
                    RtpH264Error::InvalidSpropParameterSets(format!("{}: {}", encoded, err))
                })?;
                let nalu = NalUnit::read_from(&bytes[..])?;
                match nalu.header.nal_unit_type {
                    NALUType::SPS => result.sps = Some(nalu),
                    NALUType::PPS => result.pps = Some(nalu),
                    other => {
                        return Err(RtpH264Error::InvalidSpropParameterSets(format!(
                            "unexpected nalu type in sprop: {:?}",
                            other
                        )));
                    }
                }
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_sprop_parameter_sets() {
        // Z0IAHukBQHsg -> SPS, aM4xUg== -> PPS
        let fmtp: FormatParameters =
            "96 packetization-mode=1;sprop-parameter-sets=Z0IAHukBQHsg,aM4xUg=="
                .parse()
                .expect("parse fmtp");
        let params = RtpH264Fmtp::from_fmtp(&fmtp).expect("parse sprop");
        assert_eq!(params.packetization_mode, 1);
        let sps = params.sps.expect("sps");
        assert_eq!(sps.header.nal_unit_type, NALUType::SPS);
        let pps = params.pps.expect("pps");
        assert_eq!(pps.header.nal_unit_type, NALUType::PPS);
    }

    #[test]
    fn test_missing_sprop_is_fine() {
        let fmtp: FormatParameters = "96 packetization-mode=1".parse().unwrap();
        let params = RtpH264Fmtp::from_fmtp(&fmtp).expect("parse fmtp");
        assert!(params.sps.is_none() && params.pps.is_none());
    }
}
