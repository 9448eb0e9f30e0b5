use std::io;

use byteorder::WriteBytesExt;
use tokio_util::bytes::Bytes;
use utils::traits::{
    dynamic_sized_packet::DynamicSizedPacket,
    fixed_packet::FixedPacket,
    reader::{ReadExactFrom, ReadFrom, ReadRemainingFrom},
    writer::WriteTo,
};

use crate::{
    ANNEX_B_START_CODE,
    errors::{H264CodecError, H264CodecResult},
    nalu_header::NaluHeader,
};

#[derive(Debug, Clone)]
pub struct NalUnit {
    pub header: NaluHeader,
    // bytes in body do not include the header byte
    pub body: Bytes,
}

/// read all the remaining bytes as body, the header was read ahead
impl<R: io::Read> ReadRemainingFrom<NaluHeader, R> for NalUnit {
    type Error = H264CodecError;
    fn read_remaining_from(header: NaluHeader, mut reader: R) -> Result<Self, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self {
            header,
            body: Bytes::from(bytes),
        })
    }
}

/// read all from reader, including the header;
/// assumes all bytes from the reader consist the nalu
impl<R: io::Read> ReadFrom<R> for NalUnit {
    type Error = H264CodecError;
    fn read_from(mut reader: R) -> Result<Self, Self::Error> {
        let mut first_byte = [0_u8; 1];
        reader.read_exact(&mut first_byte)?;
        let header: NaluHeader = first_byte[0].try_into()?;
        Self::read_remaining_from(header, reader)
    }
}

/// read exact bytes to consist a nalu, header byte included in length
impl<R: io::Read> ReadExactFrom<R> for NalUnit {
    type Error = H264CodecError;
    fn read_exact_from(length: usize, mut reader: R) -> Result<Self, Self::Error> {
        if length == 0 {
            return Err(H264CodecError::EmptyNalu);
        }
        let mut first_byte = [0_u8; 1];
        reader.read_exact(&mut first_byte)?;
        let header: NaluHeader = first_byte[0].try_into()?;
        let mut bytes = vec![0_u8; length - 1];
        reader.read_exact(&mut bytes)?;
        Ok(Self {
            header,
            body: Bytes::from(bytes),
        })
    }
}

impl<W: io::Write> WriteTo<W> for NalUnit {
    type Error = H264CodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write_u8(self.header.into())?;
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
    pub fn write_annex_b_to<W: io::Write>(&self, writer: &mut W) -> H264CodecResult<()> {
        writer.write_all(&ANNEX_B_START_CODE)?;
        self.write_to(writer)
    }
}
