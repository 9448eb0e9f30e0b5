use codec_h264::{
    errors::H264CodecResult,
    nalu::NalUnit,
    nalu_header::NaluHeader,
    nalu_type::NALUType,
};
use tokio_util::bytes::{Buf, Bytes, BytesMut};
use utils::traits::reader::ReadFrom;

use crate::packet::RtpTrivialPacket;

use super::{
    RtpH264NalUnit,
    errors::{RtpH264Error, RtpH264Result},
    fragmented::FuAPacket,
    parameters::RtpH264Fmtp,
};

/// One video access unit recovered from the RTP stream: a single NAL unit,
/// with cached SPS/PPS prepended when it is an IDR picture so that any
/// segment cut at this unit is self-contained.
#[derive(Debug, Clone)]
pub struct RtpH264BufferItem {
    pub nal_units: Vec<NalUnit>,
    pub keyframe: bool,
    pub rtp_timestamp: u32,
}

impl RtpH264BufferItem {
    pub fn annex_b_bytes(&self) -> H264CodecResult<Bytes> {
        let mut out = Vec::new();
        for nalu in &self.nal_units {
            nalu.write_annex_b_to(&mut out)?;
        }
        Ok(Bytes::from(out))
    }
}

/// Explicit reassembly state for FU-A fragments. Every error edge leads
/// back to `Idle`.
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
pub struct RtpH264Depacketizer {
    fragment_state: FragmentState,
    sps: Option<NalUnit>,
    pps: Option<NalUnit>,
}

impl RtpH264Depacketizer {
    pub fn new() -> Self {
        Default::default()
    }

    /// Seeds the parameter set caches from SDP `sprop-parameter-sets`.
    pub fn with_parameters(params: &RtpH264Fmtp) -> Self {
        Self {
            fragment_state: FragmentState::Idle,
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
    ) -> RtpH264Result<Vec<RtpH264BufferItem>> {
        let timestamp = packet.header.timestamp;
        let payload = RtpH264NalUnit::read_from(packet.payload.reader())?;
        match payload {
            RtpH264NalUnit::SingleNalu(nalu) => Ok(vec![self.finish_nalu(nalu.0, timestamp)]),
            RtpH264NalUnit::StapA(stap) => Ok(stap
                .nal_units
                .into_iter()
                .map(|nalu| self.finish_nalu(nalu, timestamp))
                .collect()),
            RtpH264NalUnit::FuA(fragment) => Ok(self
                .on_fragment(fragment, timestamp)?
                .into_iter()
                .collect()),
        }
    }

    fn on_fragment(
        &mut self,
        fragment: FuAPacket,
        timestamp: u32,
    ) -> RtpH264Result<Option<RtpH264BufferItem>> {
        let fu_header = fragment.fu_header;

        if fu_header.start_bit {
            if matches!(self.fragment_state, FragmentState::Reassembling { .. }) {
                self.fragment_state = FragmentState::Idle;
                return Err(RtpH264Error::FragmentSequenceBroken(
                    "fu-a start while a fragment is already open".to_owned(),
                ));
            }
            let header = NaluHeader {
                forbidden_zero_bit: false,
                nal_ref_idc: (fragment.indicator >> 5) & 0b11,
                nal_unit_type: fu_header.nalu_type.try_into()?,
            };
            let mut buffer = BytesMut::with_capacity(fragment.payload.len());
            buffer.extend_from_slice(&fragment.payload);
            self.fragment_state = FragmentState::Reassembling { header, buffer };
        } else {
            match &mut self.fragment_state {
                FragmentState::Idle => {
                    return Err(RtpH264Error::FragmentSequenceBroken(
                        "fu-a continuation without a start fragment".to_owned(),
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

    fn finish_nalu(&mut self, nalu: NalUnit, rtp_timestamp: u32) -> RtpH264BufferItem {
        match nalu.header.nal_unit_type {
            NALUType::SPS => self.sps = Some(nalu.clone()),
            NALUType::PPS => self.pps = Some(nalu.clone()),
            _ => {}
        }

        let keyframe = nalu.header.nal_unit_type.is_keyframe_indicator();
        let mut nal_units = Vec::with_capacity(3);
        if nalu.header.nal_unit_type == NALUType::IDRSlice {
            if let Some(sps) = &self.sps {
                nal_units.push(sps.clone());
            }
            if let Some(pps) = &self.pps {
                nal_units.push(pps.clone());
            }
        }
        nal_units.push(nalu);

        RtpH264BufferItem {
            nal_units,
            keyframe,
            rtp_timestamp,
        }
    }
}
