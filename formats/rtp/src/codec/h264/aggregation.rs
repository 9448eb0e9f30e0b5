use std::io;

use byteorder::{BigEndian, ReadBytesExt};
use codec_h264::nalu::NalUnit;
use utils::traits::reader::{ReadExactFrom, ReadRemainingFrom};

use super::errors::RtpH264Error;

/// @see: RFC 6184 5.7.1. Single-Time Aggregation Packet (STAP), Figure 7
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |STAP-A NAL HDR |        NALU 1 Size            |   NALU 1 HDR  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        NALU 1 Data                            |
/// :                                                               :
/// +               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |               |            NALU 2 Size        |  NALU 2 HDR   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        NALU 2 Data                            |
/// :                                                               :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug)]
pub struct StapAFormat {
    pub header: u8,
    pub nal_units: Vec<NalUnit>,
}

impl<R: io::Read> ReadRemainingFrom<u8, R> for StapAFormat {
    type Error = RtpH264Error;
    fn read_remaining_from(header: u8, mut reader: R) -> Result<Self, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let mut cursor = io::Cursor::new(&bytes[..]);
        let mut nal_units = Vec::new();
        while (cursor.position() as usize) < bytes.len() {
            let size = cursor.read_u16::<BigEndian>()? as usize;
            let remaining = bytes.len() - cursor.position() as usize;
            if size == 0 || size > remaining {
                return Err(RtpH264Error::InvalidAggregation(format!(
                    "aggregate size {} with {} bytes remaining",
                    size, remaining
                )));
            }
            nal_units.push(NalUnit::read_exact_from(size, &mut cursor)?);
        }

        if nal_units.is_empty() {
            return Err(RtpH264Error::InvalidAggregation(
                "stap-a packet carries no nal units".to_owned(),
            ));
        }
        Ok(Self { header, nal_units })
    }
}

#[cfg(test)]
mod test {
    use codec_h264::nalu_type::NALUType;
    use utils::traits::reader::ReadFrom;

    use crate::codec::h264::RtpH264NalUnit;

    #[test]
    fn test_parse_stap_a() {
        // STAP-A header, then SPS (3 bytes) and PPS (2 bytes) aggregates
        let payload: Vec<u8> = vec![
            0x18, 0x00, 0x03, 0x67, 0x42, 0x00, 0x00, 0x02, 0x68, 0xCE,
        ];
        let parsed = RtpH264NalUnit::read_from(&payload[..]).expect("parse stap-a");
        let RtpH264NalUnit::StapA(stap) = parsed else {
            panic!("expected stap-a");
        };
        assert_eq!(stap.nal_units.len(), 2);
        assert_eq!(stap.nal_units[0].header.nal_unit_type, NALUType::SPS);
        assert_eq!(stap.nal_units[0].body.as_ref(), &[0x42, 0x00]);
        assert_eq!(stap.nal_units[1].header.nal_unit_type, NALUType::PPS);
    }

    #[test]
    fn test_truncated_stap_a_rejected() {
        let payload: Vec<u8> = vec![0x18, 0x00, 0x09, 0x67];
        assert!(RtpH264NalUnit::read_from(&payload[..]).is_err());
    }
}
