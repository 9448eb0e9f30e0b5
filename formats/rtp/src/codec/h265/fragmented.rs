use std::io;

use byteorder::ReadBytesExt;
use codec_h265::nalu_header::NaluHeader;
use tokio_util::bytes::Bytes;
use utils::traits::{fixed_packet::FixedPacket, reader::ReadRemainingFrom};

use super::errors::RtpH265Error;

/// @see: RFC 7798 4.4.3. Fragmentation Units
/// +---------------+
/// |0|1|2|3|4|5|6|7|
/// +-+-+-+-+-+-+-+-+
/// |S|E|  FuType   |
/// +---------------+
#[derive(Debug, Clone, Copy)]
pub struct FuHeader {
    pub start_bit: bool,
    pub end_bit: bool,
    pub nalu_type: u8,
}

impl From<FuHeader> for u8 {
    fn from(value: FuHeader) -> Self {
        ((value.start_bit as u8) << 7)
            | ((value.end_bit as u8) << 6)
            | (value.nalu_type & 0b11_1111)
    }
}

impl From<u8> for FuHeader {
    fn from(value: u8) -> Self {
        Self {
            start_bit: ((value >> 7) & 0b1) == 0b1,
            end_bit: ((value >> 6) & 0b1) == 0b1,
            nalu_type: value & 0b11_1111,
        }
    }
}

impl FixedPacket for FuHeader {
    fn bytes_count() -> usize {
        1
    }
}

///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    PayloadHdr (Type=49)       |   FU header   |               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+               |
/// |                                                               |
/// |                         FU payload                            |
/// |                                                               |
/// |                               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                               :...OPTIONAL RTP padding        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug)]
pub struct FuPacket {
    pub payload_header: NaluHeader,
    pub fu_header: FuHeader,
    pub payload: Bytes,
}

impl<R: io::Read> ReadRemainingFrom<NaluHeader, R> for FuPacket {
    type Error = RtpH265Error;
    fn read_remaining_from(payload_header: NaluHeader, mut reader: R) -> Result<Self, Self::Error> {
        let fu_header: FuHeader = reader.read_u8()?.into();
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self {
            payload_header,
            fu_header,
            payload: Bytes::from(bytes),
        })
    }
}
