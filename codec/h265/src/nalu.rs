use std::io;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use tokio_util::bytes::Bytes;
use utils::traits::{
    dynamic_sized_packet::DynamicSizedPacket,
    fixed_packet::FixedPacket,
    reader::{ReadExactFrom, ReadFrom, ReadRemainingFrom},
    writer::WriteTo,
};

use crate::{
    ANNEX_B_START_CODE,
    errors::{H265CodecError, H265CodecResult},
    nalu_header::NaluHeader,
};

#[derive(Debug, Clone)]
pub struct NalUnit {
    pub header: NaluHeader,
    // bytes in body do not include the two header bytes
    pub body: Bytes,
}

impl<R: io::Read> ReadRemainingFrom<NaluHeader, R> for NalUnit {
    type Error = H265CodecError;
    fn read_remaining_from(header: NaluHeader, mut reader: R) -> Result<Self, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self {
            header,
            body: Bytes::from(bytes),
        })
    }
}

impl<R: io::Read> ReadFrom<R> for NalUnit {
    type Error = H265CodecError;
    fn read_from(mut reader: R) -> Result<Self, Self::Error> {
        let header: NaluHeader = reader.read_u16::<BigEndian>()?.try_into()?;
        Self::read_remaining_from(header, reader)
    }
}

impl<R: io::Read> ReadExactFrom<R> for NalUnit {
    type Error = H265CodecError;
    fn read_exact_from(length: usize, mut reader: R) -> Result<Self, Self::Error> {
        if length < NaluHeader::bytes_count() {
            return Err(H265CodecError::EmptyNalu);
        }
        let header: NaluHeader = reader.read_u16::<BigEndian>()?.try_into()?;
        let mut bytes = vec![0_u8; length - NaluHeader::bytes_count()];
        reader.read_exact(&mut bytes)?;
        Ok(Self {
            header,
            body: Bytes::from(bytes),
        })
    }
}

impl<W: io::Write> WriteTo<W> for NalUnit {
    type Error = H265CodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write_u16::<BigEndian>(self.header.into())?;
        writer.write_all(&self.body)?;
        Ok(())
    }
}

impl DynamicSizedPacket for NalUnit {
    fn get_packet_bytes_count(&self) -> usize {
        NaluHeader::bytes_count() + self.body.len()
    }
}

impl NalUnit {
    /// Writes `00 00 00 01` followed by the nalu bytes.
    pub fn write_annex_b_to<W: io::Write>(&self, writer: &mut W) -> H265CodecResult<()> {
        writer.write_all(&ANNEX_B_START_CODE)?;
        self.write_to(writer)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::nalu_type::NALUType;

    #[test]
    fn test_nalu_header_round_trip() {
        // F=0, Type=20 (IDR_N_LP), LayerId=0, TID=1
        let header: NaluHeader = [0x28_u8, 0x01].try_into().expect("parse header");
        assert_eq!(header.nal_unit_type, NALUType::IdrNLp);
        assert_eq!(header.layer_id, 0);
        assert_eq!(header.temporal_id_plus_1, 1);
        assert!(header.nal_unit_type.is_irap());
        let bytes: [u8; 2] = header.into();
        assert_eq!(bytes, [0x28, 0x01]);
    }

    #[test]
    fn test_nalu_round_trip() {
        let bytes: Vec<u8> = vec![0x40, 0x01, 0x0c, 0x01];
        let nalu = NalUnit::read_from(&bytes[..]).expect("parse vps");
        assert_eq!(nalu.header.nal_unit_type, NALUType::Vps);
        let mut out = Vec::new();
        nalu.write_to(&mut out).expect("write nalu");
        assert_eq!(out, bytes);
    }
}
