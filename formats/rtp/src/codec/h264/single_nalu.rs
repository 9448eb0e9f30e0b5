use std::io;

use codec_h264::nalu::NalUnit;
use codec_h264::nalu_header::NaluHeader;
use utils::traits::reader::ReadRemainingFrom;

use super::errors::RtpH264Error;

/// @see: RFC 6184 5.6. Single NAL Unit Packet
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |F|NRI|  Type   |                                               |
/// +-+-+-+-+-+-+-+-+                                               |
/// |                                                               |
/// |               Bytes 2..n of a single NAL unit                 |
/// |                                                               |
/// |                               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                               :...OPTIONAL RTP padding        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug)]
pub struct SingleNalUnit(pub NalUnit);

impl<R: io::Read> ReadRemainingFrom<u8, R> for SingleNalUnit {
    type Error = RtpH264Error;
    fn read_remaining_from(header: u8, reader: R) -> Result<Self, Self::Error> {
        let nal_header: NaluHeader = header.try_into().map_err(RtpH264Error::Codec)?;
        Ok(Self(NalUnit::read_remaining_from(nal_header, reader)?))
    }
}
