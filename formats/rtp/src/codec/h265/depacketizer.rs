use codec_h265::{
    errors::H265CodecResult,
    nalu::NalUnit,
    nalu_header::NaluHeader,
    nalu_type::NALUType,
};
use tokio_util::bytes::{Buf, Bytes, BytesMut};

use crate::packet::RtpTrivialPacket;

use super::{
    RtpH265NalUnit,
    errors::{RtpH265Error, RtpH265Result},
    fragmented::FuPacket,
    parameters::RtpH265Fmtp,
};

/// One video access unit recovered from the RTP stream. IRAP units carry
/// the cached VPS/SPS/PPS in front so segment cuts stay self-contained.
#[derive(Debug, Clone)]
pub struct RtpH265BufferItem {
    pub nal_units: Vec<NalUnit>,
    pub keyframe: bool,
    pub rtp_timestamp: u32,
}

impl RtpH265BufferItem {
    pub fn annex_b_bytes(&self) -> H265CodecResult<Bytes> {
        let mut out = Vec::new();
        for nalu in &self.nal_units {
            nalu.write_annex_b_to(&mut out)?;
        }
        Ok(Bytes::from(out))
    }
}

/// Explicit reassembly state for FUs; every error edge leads back to `Idle`.
#[derive(Debug, Default)]
pub enum FragmentState {
    #[default]
    Idle,
    Reassembling {
        header: NaluHeader,
        buffer: BytesMut,
    },
}

#[derive(Debug, Default)]
pub struct RtpH265Depacketizer {
    fragment_state: FragmentState,
    vps: Option<NalUnit>,
    sps: Option<NalUnit>,
    pps: Option<NalUnit>,
}

impl RtpH265Depacketizer {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_parameters(params: &RtpH265Fmtp) -> Self {
        Self {
            fragment_state: FragmentState::Idle,
            vps: params.vps.clone(),
            sps: params.sps.clone(),
            pps: params.pps.clone(),
        }
    }

    pub fn reset(&mut self) {
        self.fragment_state = FragmentState::Idle;
    }

    pub fn depacketize(
        &mut self,
        packet: RtpTrivialPacket,
    ) -> RtpH265Result<Vec<RtpH265BufferItem>> {
        let timestamp = packet.header.timestamp;
        let payload = RtpH265NalUnit::read_from(packet.payload.reader())?;
        match payload {
            RtpH265NalUnit::SingleNalu(nalu) => Ok(vec![self.finish_nalu(nalu.0, timestamp)]),
            RtpH265NalUnit::Ap(ap) => Ok(ap
                .nal_units
                .into_iter()
                .map(|nalu| self.finish_nalu(nalu, timestamp))
                .collect()),
            RtpH265NalUnit::Fu(fragment) => Ok(self
                .on_fragment(fragment, timestamp)?
                .into_iter()
                .collect()),
        }
    }

    fn on_fragment(
        &mut self,
        fragment: FuPacket,
        timestamp: u32,
    ) -> RtpH265Result<Option<RtpH265BufferItem>> {
        let fu_header = fragment.fu_header;

        if fu_header.start_bit {
            if matches!(self.fragment_state, FragmentState::Reassembling { .. }) {
                self.fragment_state = FragmentState::Idle;
                return Err(RtpH265Error::FragmentSequenceBroken(
                    "fu start while a fragment is already open".to_owned(),
                ));
            }
            // rebuild the real two-byte header: type from the FU header,
            // layer id and tid from the outer payload header
            let header = NaluHeader {
                forbidden_zero_bit: false,
                nal_unit_type: fu_header.nalu_type.try_into()?,
                layer_id: fragment.payload_header.layer_id,
                temporal_id_plus_1: fragment.payload_header.temporal_id_plus_1,
            };
            let mut buffer = BytesMut::with_capacity(fragment.payload.len());
            buffer.extend_from_slice(&fragment.payload);
            self.fragment_state = FragmentState::Reassembling { header, buffer };
        } else {
            match &mut self.fragment_state {
                FragmentState::Idle => {
                    return Err(RtpH265Error::FragmentSequenceBroken(
                        "fu continuation without a start fragment".to_owned(),
                    ));
                }
                FragmentState::Reassembling { buffer, .. } => {
                    buffer.extend_from_slice(&fragment.payload);
                }
            }
        }

        if !fu_header.end_bit {
            return Ok(None);
        }

        let FragmentState::Reassembling { header, buffer } =
            std::mem::take(&mut self.fragment_state)
        else {
            unreachable!("end bit is only reachable with an open fragment");
        };
        let nalu = NalUnit {
            header,
            body: buffer.freeze(),
        };
        Ok(Some(self.finish_nalu(nalu, timestamp)))
    }

    fn finish_nalu(&mut self, nalu: NalUnit, rtp_timestamp: u32) -> RtpH265BufferItem {
        match nalu.header.nal_unit_type {
            NALUType::Vps => self.vps = Some(nalu.clone()),
            NALUType::Sps => self.sps = Some(nalu.clone()),
            NALUType::Pps => self.pps = Some(nalu.clone()),
            _ => {}
        }

        let keyframe = nalu.header.nal_unit_type.is_keyframe_indicator();
        let mut nal_units = Vec::with_capacity(4);
        if nalu.header.nal_unit_type.is_irap() {
            if let Some(vps) = &self.vps {
                nal_units.push(vps.clone());
            }
            if let Some(sps) = &self.sps {
                nal_units.push(sps.clone());
            }
            if let Some(pps) = &self.pps {
                nal_units.push(pps.clone());
            }
        }
        nal_units.push(nalu);

        RtpH265BufferItem {
            nal_units,
            keyframe,
            rtp_timestamp,
        }
    }
}

#[cfg(test)]
mod test {
    use tokio_util::bytes::Bytes;
    use utils::traits::writer::WriteTo;

    use crate::header::RtpHeader;

    use super::*;

    fn rtp_packet(payload: &[u8], timestamp: u32) -> RtpTrivialPacket {
        RtpTrivialPacket::new(
            RtpHeader {
                version: 2,
                padding: false,
                extension: false,
                csrc_count: 0,
                marker: true,
                payload_type: 96,
                sequence_number: 7,
                timestamp,
                ssrc: 1,
                csrc_list: Vec::new(),
                header_extension: None,
            },
            Bytes::copy_from_slice(payload),
        )
    }

    fn nalu_bytes(item: &RtpH265BufferItem, index: usize) -> Vec<u8> {
        let mut out = Vec::new();
        item.nal_units[index].write_to(&mut out).unwrap();
        out
    }

    #[test]
    fn test_single_nalu() {
        let mut depacketizer = RtpH265Depacketizer::new();
        // trail_r, layer 0, tid 1
        let items = depacketizer
            .depacketize(rtp_packet(&[0x02, 0x01, 0xAA, 0xBB], 99))
            .expect("depacketize");
        assert_eq!(items.len(), 1);
        assert!(!items[0].keyframe);
        assert_eq!(nalu_bytes(&items[0], 0), vec![0x02, 0x01, 0xAA, 0xBB]);
    }

    #[test]
    fn test_fu_three_fragments_reconstruct_idr() {
        let mut depacketizer = RtpH265Depacketizer::new();
        assert!(depacketizer
            .depacketize(rtp_packet(&[0x62, 0x01, 0x94, 0x88, 0x84], 12345))
            .expect("start")
            .is_empty());
        assert!(depacketizer
            .depacketize(rtp_packet(&[0x62, 0x01, 0x14, 0x00, 0x01], 12345))
            .expect("middle")
            .is_empty());
        let items = depacketizer
            .depacketize(rtp_packet(&[0x62, 0x01, 0x54, 0x02, 0x03], 12345))
            .expect("end");
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert!(item.keyframe);
        // reconstructed header F=0, Type=20 (IDR_N_LP), LayerId=0, TID=1
        assert_eq!(
            nalu_bytes(item, 0),
            vec![0x28, 0x01, 0x88, 0x84, 0x00, 0x01, 0x02, 0x03]
        );
    }

    #[test]
    fn test_fu_continuation_without_start_is_error() {
        let mut depacketizer = RtpH265Depacketizer::new();
        assert!(depacketizer
            .depacketize(rtp_packet(&[0x62, 0x01, 0x14, 0x00], 1))
            .is_err());
        assert!(matches!(depacketizer.fragment_state, FragmentState::Idle));
    }

    #[test]
    fn test_parameter_sets_prepended_to_irap() {
        let mut depacketizer = RtpH265Depacketizer::new();
        depacketizer
            .depacketize(rtp_packet(&[0x40, 0x01, 0x0C], 1))
            .expect("vps");
        depacketizer
            .depacketize(rtp_packet(&[0x42, 0x01, 0x01], 1))
            .expect("sps");
        depacketizer
            .depacketize(rtp_packet(&[0x44, 0x01, 0xC0], 1))
            .expect("pps");
        // IDR_W_RADL (type 19) single nalu: header 0x26 0x01
        let items = depacketizer
            .depacketize(rtp_packet(&[0x26, 0x01, 0xAF], 2))
            .expect("idr");
        let item = &items[0];
        assert_eq!(item.nal_units.len(), 4);
        assert_eq!(item.nal_units[0].header.nal_unit_type, NALUType::Vps);
        assert_eq!(item.nal_units[1].header.nal_unit_type, NALUType::Sps);
        assert_eq!(item.nal_units[2].header.nal_unit_type, NALUType::Pps);
        assert_eq!(item.nal_units[3].header.nal_unit_type, NALUType::IdrWRadl);
    }

    #[test]
    fn test_ap_aggregation() {
        // AP header (type 48): 0x60 0x01, then two aggregates: vps (3 bytes)
        // and sps (3 bytes), each a 2-byte header + 1 body byte
        let payload: Vec<u8> = vec![
            0x60, 0x01, 0x00, 0x03, 0x40, 0x01, 0x0C, 0x00, 0x03, 0x42, 0x01, 0x01,
        ];
        let mut depacketizer = RtpH265Depacketizer::new();
        let items = depacketizer
            .depacketize(rtp_packet(&payload, 5))
            .expect("ap");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].nal_units[0].header.nal_unit_type, NALUType::Vps);
        assert!(items[0].keyframe);
    }

    #[test]
    fn test_paci_rejected() {
        // type 50 (PACI): header 0x64 0x01
        let mut depacketizer = RtpH265Depacketizer::new();
        assert!(matches!(
            depacketizer.depacketize(rtp_packet(&[0x64, 0x01, 0x00], 1)),
            Err(RtpH265Error::UnsupportedPacketType(50))
        ));
    }
}
