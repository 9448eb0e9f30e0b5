pub mod aggregation;
pub mod depacketizer;
pub mod errors;
pub mod fragmented;
pub mod parameters;
pub mod single_nalu;

use std::io;

use byteorder::ReadBytesExt;
use utils::traits::reader::{ReadFrom, ReadRemainingFrom};

use aggregation::StapAFormat;
use errors::RtpH264Error;
use fragmented::FuAPacket;
use single_nalu::SingleNalUnit;

/// @see: RFC 6184 5.2, Table 1
#[derive(Debug, Clone, Copy)]
pub enum PayloadStructureType {
    SingleNalu(u8),
    StapA,
    FuA,
}

impl TryFrom<u8> for PayloadStructureType {
    type Error = RtpH264Error;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value & 0b1_1111 {
            v if (1..=23).contains(&v) => Ok(Self::SingleNalu(value)),
            24 => Ok(Self::StapA),
            28 => Ok(Self::FuA),
            // STAP-B, MTAP16/24 and FU-B belong to the interleaved
            // packetization mode, which is not negotiated here
            v @ (25..=27 | 29) => Err(RtpH264Error::UnsupportedPacketType(v)),
            v => Err(RtpH264Error::InvalidPacketType(v)),
        }
    }
}

#[derive(Debug)]
pub enum RtpH264NalUnit {
    SingleNalu(SingleNalUnit),
    StapA(StapAFormat),
    FuA(FuAPacket),
}

impl<R: io::Read> ReadFrom<R> for RtpH264NalUnit {
    type Error = RtpH264Error;
    fn read_from(mut reader: R) -> Result<Self, Self::Error> {
        let first_byte = reader.read_u8()?;
        if (first_byte >> 7) & 0b1 == 0b1 {
            return Err(RtpH264Error::ForbiddenZeroBitSet(first_byte));
        }
        let payload_structure: PayloadStructureType = first_byte.try_into()?;
        Ok(match payload_structure {
            PayloadStructureType::SingleNalu(header) => {
                RtpH264NalUnit::SingleNalu(SingleNalUnit::read_remaining_from(header, reader)?)
            }
            PayloadStructureType::StapA => {
                RtpH264NalUnit::StapA(StapAFormat::read_remaining_from(first_byte, reader)?)
            }
            PayloadStructureType::FuA => {
                RtpH264NalUnit::FuA(FuAPacket::read_remaining_from(first_byte, reader)?)
            }
        })
    }
}
