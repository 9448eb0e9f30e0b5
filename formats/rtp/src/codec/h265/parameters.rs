use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use codec_h265::{nalu::NalUnit, nalu_type::NALUType};
use sdp_formats::attributes::fmtp::FormatParameters;
use utils::traits::reader::ReadFrom;

use super::errors::{RtpH265Error, RtpH265Result};

/// Out-of-band H.265 parameters from `a=fmtp`: RFC 7798 carries each
/// parameter set in its own base64 attribute.
#[derive(Debug, Default)]
pub struct RtpH265Fmtp {
    pub vps: Option<NalUnit>,
    pub sps: Option<NalUnit>,
    pub pps: Option<NalUnit>,
}

impl RtpH265Fmtp {
    pub fn from_fmtp(fmtp: &FormatParameters) -> RtpH265Result<Self> {
        let mut result = Self::default();
        for (key, expected) in [
            ("sprop-vps", NALUType::Vps),
            ("sprop-sps", NALUType::Sps),
            ("sprop-pps", NALUType::Pps),
        ] {
            let Some(encoded) = fmtp.get(key) else {
                continue;
            };
            // each attribute may carry a comma separated list; the first
            // entry is the one the stream starts from
            let encoded = encoded.split(',').next().unwrap_or(encoded).trim();
            let bytes = BASE64.decode(encoded).map_err(|err| {
                RtpH265Error::InvalidSpropParameterSet(format!("{}: {}", key, err))
            })?;
            let nalu = NalUnit::read_from(&bytes[..])?;
            if nalu.header.nal_unit_type != expected {
                return Err(RtpH265Error::InvalidSpropParameterSet(format!(
                    "{} carries nalu type {:?}",
                    key, nalu.header.nal_unit_type
                )));
            }
            match expected {
                NALUType::Vps => result.vps = Some(nalu),
                NALUType::Sps => result.sps = Some(nalu),
                NALUType::Pps => result.pps = Some(nalu),
                _ => unreachable!(),
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_sprop_sets() {
        // QAEMAf//: VPS header 0x40 0x01; QgEB: SPS header 0x42 0x01; RAHA: PPS header 0x44 0x01
        let fmtp: FormatParameters = "96 sprop-vps=QAEMAf//;sprop-sps=QgEB;sprop-pps=RAHA"
            .parse()
            .expect("parse fmtp");
        let params = RtpH265Fmtp::from_fmtp(&fmtp).expect("parse sprop");
        assert_eq!(
            params.vps.expect("vps").header.nal_unit_type,
            NALUType::Vps
        );
        assert_eq!(
            params.sps.expect("sps").header.nal_unit_type,
            NALUType::Sps
        );
        assert_eq!(
            params.pps.expect("pps").header.nal_unit_type,
            NALUType::Pps
        );
    }
}
