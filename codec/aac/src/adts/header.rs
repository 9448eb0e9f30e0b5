use std::io;

use bitstream_io::{BigEndian, BitReader, BitWriter};
use tokio_util::bytes::Bytes;
use utils::traits::fixed_packet::FixedPacket;

use crate::{
    errors::{AacError, AacResult},
    sampling_frequency_index::SamplingFrequencyIndex,
};

use super::{
    fixed_header::{FixedHeader, PROFILE_AAC_LC},
    variable_header::VariableHeader,
};

/// Header length without the optional CRC, which this system never emits.
pub const ADTS_HEADER_BYTES: usize = 7;

/// Maximum aac_frame_length (13 bits), header included.
pub const ADTS_MAX_FRAME_LENGTH: usize = (1 << 13) - 1;

#[derive(Debug, Clone, Copy)]
pub struct AdtsHeader {
    pub fixed_header: FixedHeader,
    pub variable_header: VariableHeader,
}

impl FixedPacket for AdtsHeader {
    fn bytes_count() -> usize {
        ADTS_HEADER_BYTES
    }
}

impl AdtsHeader {
    pub fn read_from<R: io::Read>(reader: &mut BitReader<R, BigEndian>) -> AacResult<Self> {
        let fixed_header = FixedHeader::read_from(reader)?;
        let variable_header = VariableHeader::read_from(reader)?;
        Ok(Self {
            fixed_header,
            variable_header,
        })
    }

    pub fn write_to<W: io::Write>(&self, writer: &mut BitWriter<W, BigEndian>) -> AacResult<()> {
        self.fixed_header.write_to(writer)?;
        self.variable_header.write_to(writer)?;
        Ok(())
    }

    /// Builds the 7-byte no-CRC header that frames one raw data block of
    /// `raw_block_len` bytes as AAC LC.
    pub fn for_raw_data_block(
        sampling_frequency_index: SamplingFrequencyIndex,
        channel_configuration: u8,
        raw_block_len: usize,
    ) -> AacResult<Self> {
        let frame_length = ADTS_HEADER_BYTES + raw_block_len;
        if frame_length > ADTS_MAX_FRAME_LENGTH {
            return Err(AacError::FrameTooLarge(raw_block_len));
        }
        Ok(Self {
            fixed_header: FixedHeader {
                sync_word: super::fixed_header::SYNC_WORD,
                id: false,
                layer: 0,
                protection_absent: true,
                profile: PROFILE_AAC_LC,
                sampling_frequency_index: sampling_frequency_index.into(),
                private_bit: false,
                channel_configuration,
                original_copy: false,
                home: false,
            },
            variable_header: VariableHeader {
                copyright_identification_bit: false,
                copyright_identification_start: false,
                aac_frame_length: frame_length as u16,
                adts_buffer_fullness: 0x7FF, // VBR marker
                number_of_raw_data_blocks_in_frame: 0,
            },
        })
    }
}

/// Frames one raw AAC access unit into a complete ADTS frame.
pub fn frame_raw_data_block(
    sampling_frequency_index: SamplingFrequencyIndex,
    channel_configuration: u8,
    raw_block: &[u8],
) -> AacResult<Bytes> {
    let header = AdtsHeader::for_raw_data_block(
        sampling_frequency_index,
        channel_configuration,
        raw_block.len(),
    )?;
    let mut bytes = Vec::with_capacity(ADTS_HEADER_BYTES + raw_block.len());
    let mut writer = BitWriter::endian(&mut bytes, BigEndian);
    header.write_to(&mut writer)?;
    bytes.extend_from_slice(raw_block);
    Ok(Bytes::from(bytes))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_frame_raw_data_block() {
        let framed = frame_raw_data_block(SamplingFrequencyIndex::F44100, 2, &[0x21, 0x12, 0x23, 0x34])
            .expect("frame aac au");
        assert_eq!(framed.len(), ADTS_HEADER_BYTES + 4);
        // sync word
        assert_eq!(framed[0], 0xFF);
        assert_eq!(framed[1] & 0xF6, 0xF0);
        // protection absent, no crc
        assert_eq!(framed[1] & 0x01, 0x01);
        // profile 1 (AAC LC), frequency index 4 (44.1 kHz)
        assert_eq!(framed[2] >> 6, PROFILE_AAC_LC);
        assert_eq!((framed[2] >> 2) & 0x0F, 0x4);
        // raw payload follows the 7-byte header untouched
        assert_eq!(&framed[ADTS_HEADER_BYTES..], &[0x21, 0x12, 0x23, 0x34]);

        // frame_length spans bits 30..43
        let frame_length =
            (((framed[3] as u16) & 0x03) << 11) | ((framed[4] as u16) << 3) | ((framed[5] as u16) >> 5);
        assert_eq!(frame_length as usize, ADTS_HEADER_BYTES + 4);
    }

    #[test]
    fn test_header_round_trip() {
        let header =
            AdtsHeader::for_raw_data_block(SamplingFrequencyIndex::F48000, 2, 128).expect("header");
        let mut bytes = Vec::new();
        let mut writer = BitWriter::endian(&mut bytes, BigEndian);
        header.write_to(&mut writer).expect("write header");
        assert_eq!(bytes.len(), ADTS_HEADER_BYTES);

        let mut reader = BitReader::endian(&bytes[..], BigEndian);
        let parsed = AdtsHeader::read_from(&mut reader).expect("parse header");
        assert_eq!(parsed.fixed_header.profile, PROFILE_AAC_LC);
        assert_eq!(parsed.fixed_header.sampling_frequency_index, 0x3);
        assert_eq!(parsed.fixed_header.channel_configuration, 2);
        assert_eq!(
            parsed.variable_header.aac_frame_length as usize,
            ADTS_HEADER_BYTES + 128
        );
    }
}
