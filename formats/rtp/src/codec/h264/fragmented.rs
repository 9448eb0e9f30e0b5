use std::io;

use byteorder::ReadBytesExt;
use tokio_util::bytes::Bytes;
use utils::traits::{fixed_packet::FixedPacket, reader::ReadRemainingFrom};

use super::errors::RtpH264Error;

/// @see: RFC 6184 5.8. Fragmentation Units (FUs)
/// +---------------+
/// |0|1|2|3|4|5|6|7|
/// +-+-+-+-+-+-+-+-+
/// |S|E|R|   Type  |
/// +---------------+
#[derive(Debug, Clone, Copy)]
pub struct FuHeader {
    pub start_bit: bool,
    pub end_bit: bool,
    pub reserved_bit: bool,
    pub nalu_type: u8,
}

impl From<FuHeader> for u8 {
    fn from(value: FuHeader) -> Self {
        ((value.start_bit as u8) << 7)
            | ((value.end_bit as u8) << 6)
            | ((value.reserved_bit as u8) << 5)
            | (value.nalu_type & 0b1_1111)
    }
}

impl From<u8> for FuHeader {
    fn from(value: u8) -> Self {
        Self {
            start_bit: ((value >> 7) & 0b1) == 0b1,
            end_bit: ((value >> 6) & 0b1) == 0b1,
            reserved_bit: ((value >> 5) & 0b1) == 0b1,
            nalu_type: value & 0b1_1111,
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
/// | FU indicator  |   FU header   |                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               |
/// |                                                               |
/// |                          FU payload                           |
/// |                                                               |
/// |                               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                               :...OPTIONAL RTP padding        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug)]
pub struct FuAPacket {
    pub indicator: u8,
    pub fu_header: FuHeader,
    pub payload: Bytes,
}

impl<R: io::Read> ReadRemainingFrom<u8, R> for FuAPacket {
    type Error = RtpH264Error;
    fn read_remaining_from(indicator: u8, mut reader: R) -> Result<Self, Self::Error> {
        let fu_header: FuHeader = reader.read_u8()?.into();
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self {
            indicator,
            fu_header,
            payload: Bytes::from(bytes),
        })
    }
}
