use codec_aac::adts::header::frame_raw_data_block;
use tokio_util::bytes::Bytes;

use crate::packet::RtpTrivialPacket;

use super::{
    au_header::AuHeaderSection,
    errors::{RtpMpeg4Error, RtpMpeg4Result},
    parameters::RtpMpeg4Fmtp,
};

/// One AAC access unit, both as the raw data block off the wire and as the
/// ADTS frame the muxer consumes.
#[derive(Debug, Clone)]
pub struct RtpAacBufferItem {
    pub raw_data: Bytes,
    pub adts_frame: Bytes,
    pub rtp_timestamp: u32,
}

/// @see: RFC 3640 3.2/3.3, AAC-hbr mode
///
/// AAC-hbr never fragments below one AU per packet boundary in practice
/// (an AU larger than the MTU is not produced by the encoders this client
/// pulls from), so every packet is expected to carry whole AUs.
#[derive(Debug)]
pub struct RtpMpeg4Depacketizer {
    params: RtpMpeg4Fmtp,
}

impl RtpMpeg4Depacketizer {
    pub fn new(params: RtpMpeg4Fmtp) -> Self {
        Self { params }
    }

    pub fn reset(&mut self) {
        // stateless between packets, nothing to drop
    }

    pub fn depacketize(
        &mut self,
        packet: RtpTrivialPacket,
    ) -> RtpMpeg4Result<Vec<RtpAacBufferItem>> {
        let payload = packet.payload;
        let section = AuHeaderSection::read_remaining_from(&self.params, payload.as_ref())?;

        // AUs sit back to back, byte aligned, right after the header section
        let mut offset = section.bytes_count();
        let mut items = Vec::with_capacity(section.au_headers.len());
        for (index, au_header) in section.au_headers.iter().enumerate() {
            let size = au_header.au_size as usize;
            if offset + size > payload.len() {
                return Err(RtpMpeg4Error::SyntaxError(format!(
                    "au data overruns the packet: offset {}, size {}, payload {}",
                    offset,
                    size,
                    payload.len()
                )));
            }
            let raw_data = payload.slice(offset..offset + size);
            offset += size;

            let adts_frame = frame_raw_data_block(
                self.params.sampling_frequency_index,
                self.params.channel_configuration,
                &raw_data,
            )?;

            // the RTP timestamp belongs to the first AU; later AUs in the
            // same packet are one frame duration apart each
            let rtp_timestamp = packet
                .header
                .timestamp
                .wrapping_add((index as u64 * self.params.constant_duration) as u32);

            items.push(RtpAacBufferItem {
                raw_data,
                adts_frame,
                rtp_timestamp,
            });
        }

        Ok(items)
    }
}
