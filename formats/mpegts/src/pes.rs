use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use utils::traits::{fixed_packet::FixedPacket, writer::WriteTo};

use crate::{
    consts::PTS_MAX,
    errors::{MpegTsError, MpegTsResult},
};

/// Header bytes this muxer emits in front of every access unit: start code,
/// stream id, length, the two flag bytes, header data length, and a
/// 5-byte PTS.
pub const PES_HEADER_BYTES: usize = 14;

/// Bytes counted by PES_packet_length for a bounded packet: everything
/// after the length field itself.
const PES_LENGTH_OVERHEAD: usize = 8;

/// The `0010`-prefixed 33-bit PTS with marker bits interleaved.
pub fn encode_pts(pts: u64) -> [u8; 5] {
    let pts = pts % PTS_MAX;
    [
        0x21 | (((pts >> 29) & 0x0E) as u8),
        ((pts >> 22) & 0xFF) as u8,
        0x01 | (((pts >> 14) & 0xFE) as u8),
        ((pts >> 7) & 0xFF) as u8,
        0x01 | (((pts << 1) & 0xFE) as u8),
    ]
}

/// @see: ISO/IEC 13818-1 2.4.3.6
#[derive(Debug, Clone, Copy)]
pub struct PesHeader {
    pub stream_id: u8,
    /// Zero means unbounded, which is only legal for video.
    pub pes_packet_length: u16,
    pub pts_90k: u64,
}

impl PesHeader {
    /// Video PES: length 0 so arbitrarily large access units fit.
    pub fn unbounded(stream_id: u8, pts_90k: u64) -> Self {
        Self {
            stream_id,
            pes_packet_length: 0,
            pts_90k,
        }
    }

    /// Audio PES: the actual length is declared.
    pub fn bounded(stream_id: u8, pts_90k: u64, payload_len: usize) -> MpegTsResult<Self> {
        let total = payload_len + PES_LENGTH_OVERHEAD;
        if total > u16::MAX as usize {
            return Err(MpegTsError::PesPayloadTooLarge(payload_len));
        }
        Ok(Self {
            stream_id,
            pes_packet_length: total as u16,
            pts_90k,
        })
    }
}

impl FixedPacket for PesHeader {
    fn bytes_count() -> usize {
        PES_HEADER_BYTES
    }
}

impl<W: io::Write> WriteTo<W> for PesHeader {
    type Error = MpegTsError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        // packet_start_code_prefix
        writer.write_all(&[0x00, 0x00, 0x01])?;
        writer.write_u8(self.stream_id)?;
        writer.write_u16::<BigEndian>(self.pes_packet_length)?;
        // marker bits only
        writer.write_u8(0x80)?;
        // PTS present, no DTS
        writer.write_u8(0x80)?;
        writer.write_u8(5)?;
        writer.write_all(&encode_pts(self.pts_90k))?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_encode_pts_zero() {
        assert_eq!(encode_pts(0), [0x21, 0x00, 0x01, 0x00, 0x01]);
    }

    #[test]
    fn test_encode_pts_known_value() {
        // pts = 12345 = 0b11000000111001
        let bytes = encode_pts(12345);
        assert_eq!(bytes[0], 0x21);
        assert_eq!(bytes[1], 0x00);
        assert_eq!(bytes[2], 0x01);
        assert_eq!(bytes[3], (12345_u64 >> 7) as u8);
        assert_eq!(bytes[4], 0x01 | ((12345_u64 << 1) & 0xFE) as u8);

        // reassemble the 33-bit value from the marker-interleaved bytes
        let decoded = (((bytes[0] as u64 >> 1) & 0x07) << 30)
            | ((bytes[1] as u64) << 22)
            | (((bytes[2] as u64 >> 1) & 0x7F) << 15)
            | ((bytes[3] as u64) << 7)
            | ((bytes[4] as u64 >> 1) & 0x7F);
        assert_eq!(decoded, 12345);
    }

    #[test]
    fn test_encode_pts_wraps_at_33_bits() {
        assert_eq!(encode_pts(PTS_MAX), encode_pts(0));
        assert_eq!(encode_pts(PTS_MAX + 7), encode_pts(7));
    }

    #[test]
    fn test_unbounded_video_header() {
        let header = PesHeader::unbounded(0xE0, 90_000);
        let mut out = Vec::new();
        header.write_to(&mut out).unwrap();
        assert_eq!(out.len(), PES_HEADER_BYTES);
        assert_eq!(&out[0..4], &[0x00, 0x00, 0x01, 0xE0]);
        assert_eq!(&out[4..6], &[0x00, 0x00]);
        assert_eq!(&out[6..9], &[0x80, 0x80, 0x05]);
    }

    #[test]
    fn test_bounded_audio_header_length() {
        let header = PesHeader::bounded(0xC0, 0, 100).unwrap();
        assert_eq!(header.pes_packet_length, 108);
    }
}
