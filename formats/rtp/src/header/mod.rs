use tokio_util::bytes::BytesMut;
use utils::traits::dynamic_sized_packet::DynamicSizedPacket;

pub mod reader;
pub mod writer;

/// @see: RFC 3550 5.1 RTP Fixed Header Fields
#[derive(Debug, Clone)]
pub struct RtpHeader {
    pub version: u8,
    pub padding: bool,
    pub extension: bool,
    pub csrc_count: u8,
    pub marker: bool,
    pub payload_type: u8,
    pub sequence_number: u16,
    pub timestamp: u32,
    pub ssrc: u32,
    pub csrc_list: Vec<u32>,
    pub header_extension: Option<RtpHeaderExtension>,
}

#[derive(Debug, Clone)]
pub struct RtpHeaderExtension {
    pub profile_defined: u16,
    pub length: u16,
    pub bytes: BytesMut,
}

impl DynamicSizedPacket for RtpHeader {
    fn get_packet_bytes_count(&self) -> usize {
        12 + self.csrc_list.len() * 4
            + self
                .header_extension
                .as_ref()
                .map_or(0, |ext| 4 + ext.bytes.len())
    }
}
