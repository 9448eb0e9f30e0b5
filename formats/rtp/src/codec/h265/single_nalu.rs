use std::io;

use codec_h265::{nalu::NalUnit, nalu_header::NaluHeader};
use utils::traits::reader::ReadRemainingFrom;

use super::errors::RtpH265Error;

/// @see: RFC 7798 4.4.1. Single NAL Unit Packets
#[derive(Debug)]
pub struct SingleNalUnit(pub NalUnit);

impl<R: io::Read> ReadRemainingFrom<NaluHeader, R> for SingleNalUnit {
    type Error = RtpH265Error;
    fn read_remaining_from(header: NaluHeader, reader: R) -> Result<Self, Self::Error> {
        Ok(Self(NalUnit::read_remaining_from(header, reader)?))
    }
}
