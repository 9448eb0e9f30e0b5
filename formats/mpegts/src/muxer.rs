use tokio_util::bytes::BytesMut;
use utils::traits::writer::WriteTo;

use crate::{
    consts::{
        PID_AUDIO, PID_PAT, PID_PMT, PID_VIDEO, STREAM_ID_AUDIO, STREAM_ID_VIDEO, TS_PACKET_SIZE,
        TS_PAYLOAD_SIZE,
    },
    errors::{MpegTsError, MpegTsResult},
    packet::{AdaptationField, AdaptationFieldControl, TsPacketHeader},
    pes::PesHeader,
    psi::{PatSection, PmtSection, PmtStream, StreamType},
};

/// Packetizes access units into 188-byte transport packets on the fixed
/// PID plan: PAT 0x0000, PMT 0x1000, video 0x0100 (also the PCR PID),
/// audio 0x0101.
///
/// Continuity counters advance per PID on payload-bearing packets only and
/// persist across segments; the program tables are re-emitted at the start
/// of every segment with the same version.
#[derive(Debug)]
pub struct TsMuxer {
    video_stream_type: StreamType,
    has_audio: bool,
    pat_continuity: u8,
    pmt_continuity: u8,
    video_continuity: u8,
    audio_continuity: u8,
}

impl TsMuxer {
    pub fn new(video_stream_type: StreamType, has_audio: bool) -> Self {
        Self {
            video_stream_type,
            has_audio,
            pat_continuity: 0,
            pmt_continuity: 0,
            video_continuity: 0,
            audio_continuity: 0,
        }
    }

    /// PAT followed by PMT, one packet each.
    pub fn write_program_tables(&mut self, out: &mut BytesMut) -> MpegTsResult<()> {
        let pat = PatSection {
            transport_stream_id: 1,
            program_number: 1,
            pmt_pid: PID_PMT,
        };
        let pat_bytes = pat.section_bytes()?;
        let pat_continuity = Self::next_continuity(&mut self.pat_continuity);
        Self::write_section_packet(out, PID_PAT, pat_continuity, &pat_bytes)?;

        let mut streams = vec![PmtStream {
            stream_type: self.video_stream_type,
            elementary_pid: PID_VIDEO,
        }];
        if self.has_audio {
            streams.push(PmtStream {
                stream_type: StreamType::AacAdts,
                elementary_pid: PID_AUDIO,
            });
        }
        let pmt = PmtSection {
            program_number: 1,
            pcr_pid: PID_VIDEO,
            streams,
        };
        let pmt_bytes = pmt.section_bytes()?;
        let pmt_continuity = Self::next_continuity(&mut self.pmt_continuity);
        Self::write_section_packet(out, PID_PMT, pmt_continuity, &pmt_bytes)
    }

    /// One video access unit as one unbounded PES; `pcr_90k` is set on the
    /// PES that opens a segment.
    pub fn write_video_pes(
        &mut self,
        out: &mut BytesMut,
        pts_90k: u64,
        data: &[u8],
        pcr_90k: Option<u64>,
    ) -> MpegTsResult<()> {
        let header = PesHeader::unbounded(STREAM_ID_VIDEO, pts_90k);
        self.write_pes(out, PID_VIDEO, header, data, pcr_90k)
    }

    /// One audio access unit (an ADTS frame) as one bounded PES.
    pub fn write_audio_pes(
        &mut self,
        out: &mut BytesMut,
        pts_90k: u64,
        data: &[u8],
    ) -> MpegTsResult<()> {
        let header = PesHeader::bounded(STREAM_ID_AUDIO, pts_90k, data.len())?;
        self.write_pes(out, PID_AUDIO, header, data, None)
    }

    fn next_continuity(counter: &mut u8) -> u8 {
        let value = *counter;
        *counter = (value + 1) & 0x0F;
        value
    }

    /// A PSI section in a single packet: pointer_field, section bytes,
    /// 0xFF fill to the packet end.
    fn write_section_packet(
        out: &mut BytesMut,
        pid: u16,
        continuity_counter: u8,
        section: &[u8],
    ) -> MpegTsResult<()> {
        if 1 + section.len() > TS_PAYLOAD_SIZE {
            return Err(MpegTsError::SectionTooLarge(section.len()));
        }

        let mut packet = Vec::with_capacity(TS_PACKET_SIZE);
        TsPacketHeader {
            payload_unit_start: true,
            pid,
            adaptation_field_control: AdaptationFieldControl::PayloadOnly,
            continuity_counter,
        }
        .write_to(&mut packet)?;
        packet.push(0x00); // pointer_field
        packet.extend_from_slice(section);
        packet.resize(TS_PACKET_SIZE, 0xFF);

        out.extend_from_slice(&packet);
        Ok(())
    }

    fn write_pes(
        &mut self,
        out: &mut BytesMut,
        pid: u16,
        header: PesHeader,
        data: &[u8],
        pcr_90k: Option<u64>,
    ) -> MpegTsResult<()> {
        if data.is_empty() {
            return Err(MpegTsError::EmptyPesPayload);
        }

        let mut pes = Vec::with_capacity(data.len() + 32);
        header.write_to(&mut pes)?;
        pes.extend_from_slice(data);

        let mut remaining = &pes[..];
        let mut first = true;
        while !remaining.is_empty() {
            let continuity_counter = match pid {
                PID_AUDIO => Self::next_continuity(&mut self.audio_continuity),
                _ => Self::next_continuity(&mut self.video_continuity),
            };

            let mut packet = Vec::with_capacity(TS_PACKET_SIZE);
            let with_pcr = first && pcr_90k.is_some();
            let adaptation_min = if with_pcr {
                AdaptationField::min_bytes(true)
            } else {
                0
            };
            let capacity = TS_PAYLOAD_SIZE - adaptation_min;
            let take = remaining.len().min(capacity);
            let adaptation_bytes = TS_PAYLOAD_SIZE - take;

            let adaptation_field_control = if adaptation_bytes > 0 {
                AdaptationFieldControl::AdaptationAndPayload
            } else {
                AdaptationFieldControl::PayloadOnly
            };
            TsPacketHeader {
                payload_unit_start: first,
                pid,
                adaptation_field_control,
                continuity_counter,
            }
            .write_to(&mut packet)?;

            if adaptation_bytes > 0 {
                let field = if with_pcr {
                    AdaptationField::pcr(pcr_90k.unwrap(), adaptation_bytes)
                } else {
                    AdaptationField::stuffing(adaptation_bytes)
                };
                field.write_to(&mut packet)?;
            }

            packet.extend_from_slice(&remaining[..take]);
            debug_assert_eq!(packet.len(), TS_PACKET_SIZE);
            out.extend_from_slice(&packet);

            remaining = &remaining[take..];
            first = false;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::consts::TS_SYNC_BYTE;

    use super::*;

    fn packets(buffer: &BytesMut) -> Vec<&[u8]> {
        assert_eq!(buffer.len() % TS_PACKET_SIZE, 0);
        buffer.chunks(TS_PACKET_SIZE).collect()
    }

    fn pid_of(packet: &[u8]) -> u16 {
        (((packet[1] & 0x1F) as u16) << 8) | packet[2] as u16
    }

    fn continuity_of(packet: &[u8]) -> u8 {
        packet[3] & 0x0F
    }

    #[test]
    fn test_program_tables_layout() {
        let mut muxer = TsMuxer::new(StreamType::H264, true);
        let mut out = BytesMut::new();
        muxer.write_program_tables(&mut out).unwrap();

        let packets = packets(&out);
        assert_eq!(packets.len(), 2);
        for packet in &packets {
            assert_eq!(packet[0], TS_SYNC_BYTE);
            // PUSI set
            assert_eq!(packet[1] & 0x40, 0x40);
        }
        assert_eq!(pid_of(packets[0]), PID_PAT);
        assert_eq!(pid_of(packets[1]), PID_PMT);
        // pointer_field then table_id
        assert_eq!(packets[0][4], 0x00);
        assert_eq!(packets[0][5], 0x00);
        assert_eq!(packets[1][5], 0x02);
        // remainder is 0xFF fill
        assert!(packets[0][4 + 1 + 16..].iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn test_small_video_pes_is_stuffed() {
        let mut muxer = TsMuxer::new(StreamType::H264, false);
        let mut out = BytesMut::new();
        muxer
            .write_video_pes(&mut out, 0, &[0xAA; 10], None)
            .unwrap();

        let packets = packets(&out);
        assert_eq!(packets.len(), 1);
        let packet = packets[0];
        assert_eq!(pid_of(packet), PID_VIDEO);
        // adaptation + payload
        assert_eq!((packet[3] >> 4) & 0b11, 0b11);
        // 14 byte pes header + 10 payload = 24; adaptation occupies the rest
        let adaptation_bytes = TS_PAYLOAD_SIZE - 24;
        assert_eq!(packet[4] as usize, adaptation_bytes - 1);
        // payload is at the tail, PES start code first
        assert_eq!(&packet[4 + adaptation_bytes..4 + adaptation_bytes + 4], &[0x00, 0x00, 0x01, 0xE0]);
        assert_eq!(&packet[TS_PACKET_SIZE - 10..], &[0xAA; 10]);
    }

    #[test]
    fn test_large_pes_spans_packets_with_tail_stuffing() {
        let mut muxer = TsMuxer::new(StreamType::H264, false);
        let mut out = BytesMut::new();
        // 14 + 400 = 414 bytes -> 184 + 184 + 46
        muxer
            .write_video_pes(&mut out, 90_000, &[0xBB; 400], None)
            .unwrap();

        let packets = packets(&out);
        assert_eq!(packets.len(), 3);
        // PUSI only on the first
        assert_eq!(packets[0][1] & 0x40, 0x40);
        assert_eq!(packets[1][1] & 0x40, 0x00);
        assert_eq!(packets[2][1] & 0x40, 0x00);
        // middle packet is payload-only
        assert_eq!((packets[1][3] >> 4) & 0b11, 0b01);
        // final packet stuffs 184 - 46 bytes of adaptation
        assert_eq!((packets[2][3] >> 4) & 0b11, 0b11);
        assert_eq!(packets[2][4] as usize, (TS_PAYLOAD_SIZE - 46) - 1);
        // continuity advances per packet
        assert_eq!(continuity_of(packets[0]), 0);
        assert_eq!(continuity_of(packets[1]), 1);
        assert_eq!(continuity_of(packets[2]), 2);
    }

    #[test]
    fn test_pcr_on_first_packet_only() {
        let mut muxer = TsMuxer::new(StreamType::H264, false);
        let mut out = BytesMut::new();
        muxer
            .write_video_pes(&mut out, 180_000, &[0xCC; 300], Some(180_000))
            .unwrap();

        let packets = packets(&out);
        // adaptation + payload with the PCR flag set
        assert_eq!((packets[0][3] >> 4) & 0b11, 0b11);
        assert_eq!(packets[0][5] & 0x10, 0x10);
        // exactly the 8-byte pcr field on a full first packet
        assert_eq!(packets[0][4], 7);
    }

    #[test]
    fn test_continuity_is_per_pid() {
        let mut muxer = TsMuxer::new(StreamType::H264, true);
        let mut out = BytesMut::new();
        muxer.write_video_pes(&mut out, 0, &[0x01; 10], None).unwrap();
        muxer.write_audio_pes(&mut out, 0, &[0x02; 10]).unwrap();
        muxer.write_video_pes(&mut out, 0, &[0x03; 10], None).unwrap();

        let packets = packets(&out);
        assert_eq!(pid_of(packets[0]), PID_VIDEO);
        assert_eq!(pid_of(packets[1]), PID_AUDIO);
        assert_eq!(pid_of(packets[2]), PID_VIDEO);
        assert_eq!(continuity_of(packets[0]), 0);
        assert_eq!(continuity_of(packets[1]), 0);
        assert_eq!(continuity_of(packets[2]), 1);
    }

    #[test]
    fn test_audio_pes_declares_length() {
        let mut muxer = TsMuxer::new(StreamType::H264, true);
        let mut out = BytesMut::new();
        muxer.write_audio_pes(&mut out, 0, &[0x5A; 50]).unwrap();

        let packets = packets(&out);
        let packet = packets[0];
        let adaptation_bytes = TS_PAYLOAD_SIZE - (14 + 50);
        let pes = &packet[4 + adaptation_bytes..];
        assert_eq!(&pes[0..4], &[0x00, 0x00, 0x01, 0xC0]);
        let declared = ((pes[4] as usize) << 8) | pes[5] as usize;
        assert_eq!(declared, 8 + 50);
    }
}
