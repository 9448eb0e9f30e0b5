use utils::traits::fixed_packet::FixedPacket;

use crate::{
    errors::H265CodecError,
    nalu_type::{H265_NALU_TYPE_U8_MASK, NALUType},
};

/// +---------------+---------------+
/// |0|1|2|3|4|5|6|7|0|1|2|3|4|5|6|7|
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |F|   Type    |  LayerId  | TID |
/// +-------------+-----------------+
#[derive(Debug, Clone, Copy)]
pub struct NaluHeader {
    // 1 bit
    pub forbidden_zero_bit: bool,
    // 6 bits
    pub nal_unit_type: NALUType,
    // 6 bits
    pub layer_id: u8,
    // 3 bits
    pub temporal_id_plus_1: u8,
}

impl From<NaluHeader> for u16 {
    fn from(value: NaluHeader) -> Self {
        let nalu_type: u8 = value.nal_unit_type.into();
        ((value.forbidden_zero_bit as u16) << 15)
            | ((nalu_type as u16 & 0b11_1111) << 9)
            | ((value.layer_id as u16 & 0b11_1111) << 3)
            | (value.temporal_id_plus_1 as u16 & 0b111)
    }
}

impl From<NaluHeader> for [u8; 2] {
    fn from(value: NaluHeader) -> Self {
        let header: u16 = value.into();
        header.to_be_bytes()
    }
}

impl TryFrom<u16> for NaluHeader {
    type Error = H265CodecError;
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let forbidden_zero_bit = ((value >> 15) & 0b1) == 0b1;
        let nal_unit_type: NALUType = (((value >> 9) as u8) & H265_NALU_TYPE_U8_MASK).try_into()?;
        let layer_id = ((value >> 3) as u8) & 0b11_1111;
        let temporal_id_plus_1 = (value as u8) & 0b111;
        Ok(Self {
            forbidden_zero_bit,
            nal_unit_type,
            layer_id,
            temporal_id_plus_1,
        })
    }
}

impl TryFrom<[u8; 2]> for NaluHeader {
    type Error = H265CodecError;
    fn try_from(value: [u8; 2]) -> Result<Self, Self::Error> {
        u16::from_be_bytes(value).try_into()
    }
}

impl FixedPacket for NaluHeader {
    fn bytes_count() -> usize {
        2
    }
}
