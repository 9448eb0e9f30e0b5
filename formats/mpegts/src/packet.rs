use std::io;

use byteorder::WriteBytesExt;
use utils::traits::{fixed_packet::FixedPacket, writer::WriteTo};

use crate::{
    consts::{PTS_MAX, TS_PAYLOAD_SIZE, TS_SYNC_BYTE},
    errors::MpegTsError,
};

/// adaptation_field_control bits of byte 3.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptationFieldControl {
    PayloadOnly = 0b01,
    AdaptationOnly = 0b10,
    AdaptationAndPayload = 0b11,
}

/// The four fixed header bytes of a transport packet.
///
/// transport_error_indicator, transport_priority and the scrambling bits
/// are always zero on the sending side.
#[derive(Debug, Clone, Copy)]
pub struct TsPacketHeader {
    pub payload_unit_start: bool,
    pub pid: u16,
    pub adaptation_field_control: AdaptationFieldControl,
    pub continuity_counter: u8,
}

impl FixedPacket for TsPacketHeader {
    fn bytes_count() -> usize {
        4
    }
}

impl<W: io::Write> WriteTo<W> for TsPacketHeader {
    type Error = MpegTsError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write_u8(TS_SYNC_BYTE)?;
        writer.write_u8(((self.payload_unit_start as u8) << 6) | ((self.pid >> 8) as u8 & 0x1F))?;
        writer.write_u8((self.pid & 0xFF) as u8)?;
        writer.write_u8(
            ((self.adaptation_field_control as u8) << 4) | (self.continuity_counter & 0x0F),
        )?;
        Ok(())
    }
}

/// An adaptation field that carries a PCR, stuffing, or both.
///
/// `total_bytes` is the exact space the field must occupy inside the
/// packet, length byte included; the writer fills anything beyond the
/// declared contents with 0xFF stuffing.
#[derive(Debug, Clone, Copy)]
pub struct AdaptationField {
    pub pcr_90k: Option<u64>,
    pub total_bytes: usize,
}

impl AdaptationField {
    /// Smallest field that can hold the contents: one length byte, plus
    /// flags and the 6-byte PCR when present.
    pub fn min_bytes(with_pcr: bool) -> usize {
        if with_pcr { 8 } else { 1 }
    }

    pub fn pcr(pcr_90k: u64, total_bytes: usize) -> Self {
        Self {
            pcr_90k: Some(pcr_90k),
            total_bytes,
        }
    }

    pub fn stuffing(total_bytes: usize) -> Self {
        Self {
            pcr_90k: None,
            total_bytes,
        }
    }
}

impl<W: io::Write> WriteTo<W> for AdaptationField {
    type Error = MpegTsError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        if self.total_bytes < Self::min_bytes(self.pcr_90k.is_some())
            || self.total_bytes > TS_PAYLOAD_SIZE
        {
            return Err(MpegTsError::BadAdaptationFieldSize(self.total_bytes));
        }

        writer.write_u8((self.total_bytes - 1) as u8)?;
        if self.total_bytes == 1 {
            return Ok(());
        }

        let mut written = 2;
        match self.pcr_90k {
            None => writer.write_u8(0x00)?,
            Some(pcr) => {
                // PCR_flag set; program_clock_reference_base is the 33-bit
                // 90 kHz clock, the 9-bit extension stays zero
                writer.write_u8(0x10)?;
                let base = pcr % PTS_MAX;
                writer.write_u8((base >> 25) as u8)?;
                writer.write_u8((base >> 17) as u8)?;
                writer.write_u8((base >> 9) as u8)?;
                writer.write_u8((base >> 1) as u8)?;
                writer.write_u8((((base & 0b1) as u8) << 7) | 0x7E)?;
                writer.write_u8(0x00)?;
                written += 6;
            }
        }

        for _ in written..self.total_bytes {
            writer.write_u8(0xFF)?;
        }
        Ok(())
    }
}
