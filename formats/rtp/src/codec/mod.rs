pub mod h264;
pub mod h265;
pub mod mpeg4_generic;

use crate::{errors::RtpError, packet::RtpTrivialPacket};

use h264::depacketizer::{RtpH264BufferItem, RtpH264Depacketizer};
use h265::depacketizer::{RtpH265BufferItem, RtpH265Depacketizer};
use mpeg4_generic::depacketizer::{RtpAacBufferItem, RtpMpeg4Depacketizer};

/// One unit recovered from the RTP payload stream, still carrying its codec
/// identity and the raw RTP timestamp.
#[derive(Debug, Clone)]
pub enum DepacketizedItem {
    H264(RtpH264BufferItem),
    H265(RtpH265BufferItem),
    Aac(RtpAacBufferItem),
}

impl DepacketizedItem {
    pub fn rtp_timestamp(&self) -> u32 {
        match self {
            Self::H264(item) => item.rtp_timestamp,
            Self::H265(item) => item.rtp_timestamp,
            Self::Aac(item) => item.rtp_timestamp,
        }
    }
}

/// Closed set of payload depacketizers this receiver supports. The session
/// layer picks the variant from the negotiated SDP and never needs open
/// dispatch.
pub enum RtpDepacketizer {
    H264(RtpH264Depacketizer),
    H265(RtpH265Depacketizer),
    Mpeg4Generic(RtpMpeg4Depacketizer),
}

impl RtpDepacketizer {
    pub fn depacketize(
        &mut self,
        packet: RtpTrivialPacket,
    ) -> Result<Vec<DepacketizedItem>, RtpError> {
        match self {
            Self::H264(depacketizer) => Ok(depacketizer
                .depacketize(packet)?
                .into_iter()
                .map(DepacketizedItem::H264)
                .collect()),
            Self::H265(depacketizer) => Ok(depacketizer
                .depacketize(packet)?
                .into_iter()
                .map(DepacketizedItem::H265)
                .collect()),
            Self::Mpeg4Generic(depacketizer) => Ok(depacketizer
                .depacketize(packet)?
                .into_iter()
                .map(DepacketizedItem::Aac)
                .collect()),
        }
    }

    /// Drops any half-assembled fragment; parameter set caches survive.
    pub fn reset(&mut self) {
        match self {
            Self::H264(depacketizer) => depacketizer.reset(),
            Self::H265(depacketizer) => depacketizer.reset(),
            Self::Mpeg4Generic(depacketizer) => depacketizer.reset(),
        }
    }
}
