use std::io;

use tokio_util::bytes::{Buf, Bytes};
use utils::traits::{
    dynamic_sized_packet::DynamicSizedPacket,
    reader::TryReadFrom,
    writer::WriteTo,
};

use crate::{errors::RtpError, header::RtpHeader};

pub const RTP_VERSION: u8 = 2;

/// An RTP packet whose payload has not been interpreted yet.
#[derive(Debug, Clone)]
pub struct RtpTrivialPacket {
    pub header: RtpHeader,
    pub payload: Bytes,
}

impl RtpTrivialPacket {
    pub fn new(header: RtpHeader, payload: Bytes) -> Self {
        Self { header, payload }
    }
}

impl DynamicSizedPacket for RtpTrivialPacket {
    fn get_packet_bytes_count(&self) -> usize {
        self.header.get_packet_bytes_count() + self.payload.len()
    }
}

impl<R: AsRef<[u8]>> TryReadFrom<R> for RtpTrivialPacket {
    type Error = RtpError;
    fn try_read_from(reader: &mut std::io::Cursor<R>) -> Result<Option<Self>, Self::Error> {
        let header = RtpHeader::try_read_from(reader)?;
        let Some(header) = header else {
            return Ok(None);
        };

        if header.version != RTP_VERSION {
            return Err(RtpError::UnsupportedVersion(header.version));
        }

        if !reader.has_remaining() {
            return Err(RtpError::EmptyPayload);
        }
        let payload_size = reader.remaining();
        let payload = reader.copy_to_bytes(payload_size);

        if header.padding {
            let padding_size = *payload.last().unwrap() as usize;
            if padding_size > payload_size {
                return Err(RtpError::BadPaddingSize(padding_size));
            }

            Ok(Some(Self {
                header,
                payload: payload.slice(..payload_size - padding_size),
            }))
        } else {
            Ok(Some(Self { header, payload }))
        }
    }
}

impl<W: io::Write> WriteTo<W> for RtpTrivialPacket {
    type Error = RtpError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        self.header.write_to(writer)?;
        writer.write_all(&self.payload)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    // RTP header followed by a single-nalu h264 payload
    const SINGLE_NALU_PACKET: [u8; 16] = [
        0x80, 0x60, 0x12, 0x34, 0x00, 0x00, 0x30, 0x39, 0x11, 0x22, 0x33, 0x44, 0x65, 0x88, 0x84,
        0x00,
    ];

    #[test]
    fn test_parse_single_nalu_packet() {
        let mut cursor = Cursor::new(&SINGLE_NALU_PACKET[..]);
        let packet = RtpTrivialPacket::try_read_from(&mut cursor)
            .expect("parse rtp")
            .expect("complete rtp");
        assert_eq!(packet.header.version, 2);
        assert_eq!(packet.header.payload_type, 0x60);
        assert_eq!(packet.header.sequence_number, 0x1234);
        assert_eq!(packet.header.timestamp, 12345);
        assert_eq!(packet.header.ssrc, 0x11223344);
        assert_eq!(packet.payload.as_ref(), &[0x65, 0x88, 0x84, 0x00]);
    }

    #[test]
    fn test_reject_wrong_version() {
        let mut bytes = SINGLE_NALU_PACKET;
        bytes[0] = 0x40; // version 1
        let mut cursor = Cursor::new(&bytes[..]);
        assert!(matches!(
            RtpTrivialPacket::try_read_from(&mut cursor),
            Err(RtpError::UnsupportedVersion(1))
        ));
    }

    #[test]
    fn test_padding_is_stripped() {
        let mut bytes = SINGLE_NALU_PACKET.to_vec();
        bytes[0] |= 0b0010_0000;
        bytes.extend_from_slice(&[0x00, 0x02]); // 2 bytes of padding
        let mut cursor = Cursor::new(&bytes[..]);
        let packet = RtpTrivialPacket::try_read_from(&mut cursor)
            .expect("parse rtp")
            .expect("complete rtp");
        assert_eq!(packet.payload.as_ref(), &[0x65, 0x88, 0x84, 0x00]);
    }

    #[test]
    fn test_write_round_trip() {
        let mut cursor = Cursor::new(&SINGLE_NALU_PACKET[..]);
        let packet = RtpTrivialPacket::try_read_from(&mut cursor)
            .unwrap()
            .unwrap();
        let mut out = Vec::new();
        packet.write_to(&mut out).expect("write rtp");
        assert_eq!(out, SINGLE_NALU_PACKET);
    }
}
