use std::io;

use byteorder::{BigEndian, ReadBytesExt};
use codec_h265::{nalu::NalUnit, nalu_header::NaluHeader};
use utils::traits::reader::{ReadExactFrom, ReadRemainingFrom};

use super::errors::RtpH265Error;

/// @see: RFC 7798 4.4.2. Aggregation Packets (APs)
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   PayloadHdr (Type=48)        |        NALU 1 Size            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |         NALU 1 HDR            |                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+        NALU 1 Data            |
/// :                                                               :
/// +               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |               |            NALU 2 Size        | NALU 2 HDR    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// :                                                               :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug)]
pub struct ApFormat {
    pub payload_header: NaluHeader,
    pub nal_units: Vec<NalUnit>,
}

impl<R: io::Read> ReadRemainingFrom<NaluHeader, R> for ApFormat {
    type Error = RtpH265Error;
    fn read_remaining_from(payload_header: NaluHeader, mut reader: R) -> Result<Self, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let mut cursor = io::Cursor::new(&bytes[..]);
        let mut nal_units = Vec::new();
        while (cursor.position() as usize) < bytes.len() {
            let size = cursor.read_u16::<BigEndian>()? as usize;
            let remaining = bytes.len() - cursor.position() as usize;
            if size < 2 || size > remaining {
                return Err(RtpH265Error::InvalidAggregation(format!(
                    "aggregate size {} with {} bytes remaining",
                    size, remaining
                )));
            }
            nal_units.push(NalUnit::read_exact_from(size, &mut cursor)?);
        }

        if nal_units.is_empty() {
            return Err(RtpH265Error::InvalidAggregation(
                "ap packet carries no nal units".to_owned(),
            ));
        }
        Ok(Self {
            payload_header,
            nal_units,
        })
    }
}
