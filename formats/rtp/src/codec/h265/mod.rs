pub mod aggregation;
pub mod depacketizer;
pub mod errors;
pub mod fragmented;
pub mod parameters;
pub mod single_nalu;

use std::io;

use byteorder::{BigEndian, ReadBytesExt};
use codec_h265::nalu_header::NaluHeader;
use utils::traits::reader::ReadRemainingFrom;

use aggregation::ApFormat;
use errors::RtpH265Error;
use fragmented::FuPacket;
use single_nalu::SingleNalUnit;

pub const AP_PACKET_TYPE: u8 = 48;
pub const FU_PACKET_TYPE: u8 = 49;
pub const PACI_PACKET_TYPE: u8 = 50;

/// @see: RFC 7798 4.4
#[derive(Debug, Clone, Copy)]
pub enum PayloadStructureType {
    SingleNalu,
    Ap,
    Fu,
}

impl TryFrom<u8> for PayloadStructureType {
    type Error = RtpH265Error;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value & 0b11_1111 {
            v if v <= 40 => Ok(Self::SingleNalu),
            AP_PACKET_TYPE => Ok(Self::Ap),
            FU_PACKET_TYPE => Ok(Self::Fu),
            v => Err(RtpH265Error::UnsupportedPacketType(v)),
        }
    }
}

#[derive(Debug)]
pub enum RtpH265NalUnit {
    SingleNalu(SingleNalUnit),
    Ap(ApFormat),
    Fu(FuPacket),
}

impl RtpH265NalUnit {
    pub fn read_from<R: io::Read>(mut reader: R) -> Result<Self, RtpH265Error> {
        let payload_header: NaluHeader = reader.read_u16::<BigEndian>()?.try_into()?;
        if payload_header.forbidden_zero_bit {
            return Err(RtpH265Error::ForbiddenZeroBitSet(payload_header.into()));
        }
        let nalu_type: u8 = payload_header.nal_unit_type.into();
        let payload_structure: PayloadStructureType = nalu_type.try_into()?;
        Ok(match payload_structure {
            PayloadStructureType::SingleNalu => {
                RtpH265NalUnit::SingleNalu(SingleNalUnit::read_remaining_from(
                    payload_header,
                    reader,
                )?)
            }
            PayloadStructureType::Ap => {
                RtpH265NalUnit::Ap(ApFormat::read_remaining_from(payload_header, reader)?)
            }
            PayloadStructureType::Fu => {
                RtpH265NalUnit::Fu(FuPacket::read_remaining_from(payload_header, reader)?)
            }
        })
    }
}
