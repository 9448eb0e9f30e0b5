use std::io;

use bitstream_io::{BigEndian, BitRead, BitReader};

use crate::{
    errors::{AacError, AacResult},
    sampling_frequency_index::SamplingFrequencyIndex,
};

/// @see: ISO/IEC 14496-3 1.6.2.1 AudioSpecificConfig
///
/// Only the leading fields are decoded; everything past the channel
/// configuration is codec payload detail this system never touches.
#[derive(Debug, Clone, Copy)]
pub struct AudioSpecificConfig {
    pub audio_object_type: u8,
    pub sampling_frequency_index: SamplingFrequencyIndex,
    pub sampling_frequency: u32,
    pub channel_configuration: u8,
}

impl AudioSpecificConfig {
    pub fn read_from<R: io::Read>(reader: R) -> AacResult<Self> {
        let mut reader = BitReader::endian(reader, BigEndian);
        let mut audio_object_type: u8 = reader.read(5)?;
        if audio_object_type == 31 {
            // escape: objectType = 32 + 6 more bits
            audio_object_type = 32 + reader.read::<u8>(6)?;
        }

        let index_bits: u8 = reader.read(4)?;
        let sampling_frequency_index: SamplingFrequencyIndex = index_bits.try_into()?;
        let sampling_frequency = match sampling_frequency_index {
            SamplingFrequencyIndex::Escape => reader.read::<u32>(24)?,
            index => index.get_sampling_frequency().ok_or(
                AacError::UnknownSamplingFrequencyIndex(index_bits),
            )?,
        };
        let channel_configuration: u8 = reader.read(4)?;

        Ok(Self {
            audio_object_type,
            sampling_frequency_index,
            sampling_frequency,
            channel_configuration,
        })
    }

    /// Parses the hex blob carried by the SDP `config=` format parameter.
    pub fn from_hex(hex: &str) -> AacResult<Self> {
        let hex = hex.trim();
        if hex.is_empty() || hex.len() % 2 != 0 {
            return Err(AacError::InvalidAudioSpecificConfig(format!(
                "bad config hex length: {}",
                hex.len()
            )));
        }
        let mut bytes = Vec::with_capacity(hex.len() / 2);
        for chunk in hex.as_bytes().chunks(2) {
            let pair = std::str::from_utf8(chunk).map_err(|err| {
                AacError::InvalidAudioSpecificConfig(format!("bad config hex: {}", err))
            })?;
            bytes.push(u8::from_str_radix(pair, 16).map_err(|err| {
                AacError::InvalidAudioSpecificConfig(format!("bad config hex: {}", err))
            })?);
        }
        Self::read_from(&bytes[..])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_aac_lc_48k_stereo() {
        // 00010 0011 0010 ... = AAC LC, 48 kHz, 2 channels
        let config = AudioSpecificConfig::from_hex("1190").expect("parse config");
        assert_eq!(config.audio_object_type, 2);
        assert_eq!(config.sampling_frequency, 48000);
        assert_eq!(config.channel_configuration, 2);
    }

    #[test]
    fn test_read_aac_lc_44k1_stereo() {
        let config = AudioSpecificConfig::from_hex("1210").expect("parse config");
        assert_eq!(config.audio_object_type, 2);
        assert_eq!(config.sampling_frequency, 44100);
        assert_eq!(config.channel_configuration, 2);
    }
}
