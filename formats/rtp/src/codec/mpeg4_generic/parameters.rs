use std::{fmt, str::FromStr};

use codec_aac::{
    audio_specific_config::AudioSpecificConfig,
    sampling_frequency_index::SamplingFrequencyIndex,
};
use sdp_formats::attributes::{fmtp::FormatParameters, rtpmap::RtpMap};

use super::errors::{RtpMpeg4Error, RtpMpeg4Result};

/// @see: RFC 3640 4.1
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Generic,
    #[default]
    AacHbr,
    AacLbr,
}

impl FromStr for Mode {
    type Err = RtpMpeg4Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "aac-hbr" => Ok(Self::AacHbr),
            "aac-lbr" => Ok(Self::AacLbr),
            other => Err(RtpMpeg4Error::UnsupportedMode(other.to_owned())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Generic => "generic",
            Self::AacHbr => "AAC-hbr",
            Self::AacLbr => "AAC-lbr",
        })
    }
}

pub const DEFAULT_HBR_SIZE_LENGTH: u64 = 13;
pub const DEFAULT_HBR_INDEX_LENGTH: u64 = 3;
pub const DEFAULT_HBR_INDEX_DELTA_LENGTH: u64 = 3;

/// Samples per AAC raw data block; used to space the timestamps of AUs
/// that share one RTP packet when no constantDuration is signalled.
pub const AAC_DEFAULT_FRAME_DURATION: u64 = 1024;

/// The negotiated AAC-hbr parameters for one audio track.
#[derive(Debug, Clone, Copy)]
pub struct RtpMpeg4Fmtp {
    pub mode: Mode,
    pub size_length: u64,
    pub index_length: u64,
    pub index_delta_length: u64,
    pub constant_duration: u64,
    pub sampling_frequency_index: SamplingFrequencyIndex,
    pub channel_configuration: u8,
}

impl RtpMpeg4Fmtp {
    /// Combines `a=rtpmap` and `a=fmtp` into the track parameters.
    ///
    /// The `config=` AudioSpecificConfig wins for the sampling rate and
    /// channel count; the rtpmap fields are the fallback (2 channels when
    /// neither says otherwise).
    pub fn from_sdp(rtpmap: &RtpMap, fmtp: Option<&FormatParameters>) -> RtpMpeg4Result<Self> {
        let mode: Mode = match fmtp.and_then(|f| f.get("mode")) {
            Some(mode) => mode.parse()?,
            None => Mode::AacHbr,
        };
        if mode == Mode::AacLbr {
            return Err(RtpMpeg4Error::UnsupportedMode(mode.to_string()));
        }

        let size_length = fmtp
            .map(|f| f.get_u64("sizelength"))
            .transpose()?
            .flatten()
            .unwrap_or(DEFAULT_HBR_SIZE_LENGTH);
        let index_length = fmtp
            .map(|f| f.get_u64("indexlength"))
            .transpose()?
            .flatten()
            .unwrap_or(DEFAULT_HBR_INDEX_LENGTH);
        let index_delta_length = fmtp
            .map(|f| f.get_u64("indexdeltalength"))
            .transpose()?
            .flatten()
            .unwrap_or(DEFAULT_HBR_INDEX_DELTA_LENGTH);
        let constant_duration = fmtp
            .map(|f| f.get_u64("constantduration"))
            .transpose()?
            .flatten()
            .unwrap_or(AAC_DEFAULT_FRAME_DURATION);

        // the fmtp attribute is server controlled; every bit-field width
        // is bounded before the au header reader trusts it
        if size_length == 0 || size_length > 32 {
            return Err(RtpMpeg4Error::SyntaxError(format!(
                "unusable sizeLength: {}",
                size_length
            )));
        }
        if index_length > 32 {
            return Err(RtpMpeg4Error::SyntaxError(format!(
                "unusable indexLength: {}",
                index_length
            )));
        }
        if index_delta_length > 32 {
            return Err(RtpMpeg4Error::SyntaxError(format!(
                "unusable indexDeltaLength: {}",
                index_delta_length
            )));
        }

        let audio_specific_config = fmtp
            .and_then(|f| f.get("config"))
            .map(AudioSpecificConfig::from_hex)
            .transpose()?;

        let (sampling_frequency_index, channel_configuration) = match audio_specific_config {
            Some(config) => (config.sampling_frequency_index, config.channel_configuration),
            None => (
                SamplingFrequencyIndex::from_sampling_frequency(rtpmap.clock_rate)?,
                rtpmap.encoding_params.unwrap_or(2) as u8,
            ),
        };

        Ok(Self {
            mode,
            size_length,
            index_length,
            index_delta_length,
            constant_duration,
            sampling_frequency_index,
            channel_configuration,
        })
    }
}
