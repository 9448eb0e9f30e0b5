use crate::errors::H265CodecError;

/// @see: Recommendation ITU-T H.265, Table 7-1 – NAL unit type codes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NALUType {
    TrailN = 0,
    TrailR = 1,
    TsaN = 2,
    TsaR = 3,
    StsaN = 4,
    StsaR = 5,
    RadlN = 6,
    RadlR = 7,
    RaslN = 8,
    RaslR = 9,
    BlaWLp = 16,
    BlaWRadl = 17,
    BlaNLp = 18,
    IdrWRadl = 19,
    IdrNLp = 20,
    CraNut = 21,
    Vps = 32,
    Sps = 33,
    Pps = 34,
    AccessUnitDelimiter = 35,
    EndOfSequence = 36,
    EndOfBitstream = 37,
    FillerData = 38,
    PrefixSei = 39,
    SuffixSei = 40,
    Reserved(u8),
    Unspecified(u8),
}

pub const H265_NALU_TYPE_U8_MASK: u8 = 0b11_1111;

impl NALUType {
    /// Intra random access point pictures (BLA, IDR, CRA).
    #[inline]
    pub fn is_irap(&self) -> bool {
        matches!(
            self,
            Self::BlaWLp | Self::BlaWRadl | Self::BlaNLp | Self::IdrWRadl | Self::IdrNLp | Self::CraNut
        )
    }

    #[inline]
    pub fn is_parameter_set(&self) -> bool {
        matches!(self, Self::Vps | Self::Sps | Self::Pps)
    }

    /// A stream join point: an IRAP picture or one of the parameter sets it
    /// needs.
    #[inline]
    pub fn is_keyframe_indicator(&self) -> bool {
        self.is_irap() || self.is_parameter_set()
    }
}

impl From<NALUType> for u8 {
    fn from(value: NALUType) -> Self {
        match value {
            NALUType::TrailN => 0,
            NALUType::TrailR => 1,
            NALUType::TsaN => 2,
            NALUType::TsaR => 3,
            NALUType::StsaN => 4,
            NALUType::StsaR => 5,
            NALUType::RadlN => 6,
            NALUType::RadlR => 7,
            NALUType::RaslN => 8,
            NALUType::RaslR => 9,
            NALUType::BlaWLp => 16,
            NALUType::BlaWRadl => 17,
            NALUType::BlaNLp => 18,
            NALUType::IdrWRadl => 19,
            NALUType::IdrNLp => 20,
            NALUType::CraNut => 21,
            NALUType::Vps => 32,
            NALUType::Sps => 33,
            NALUType::Pps => 34,
            NALUType::AccessUnitDelimiter => 35,
            NALUType::EndOfSequence => 36,
            NALUType::EndOfBitstream => 37,
            NALUType::FillerData => 38,
            NALUType::PrefixSei => 39,
            NALUType::SuffixSei => 40,
            NALUType::Reserved(v) | NALUType::Unspecified(v) => v,
        }
    }
}

impl TryFrom<u8> for NALUType {
    type Error = H265CodecError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value & H265_NALU_TYPE_U8_MASK {
            0 => Ok(Self::TrailN),
            1 => Ok(Self::TrailR),
            2 => Ok(Self::TsaN),
            3 => Ok(Self::TsaR),
            4 => Ok(Self::StsaN),
            5 => Ok(Self::StsaR),
            6 => Ok(Self::RadlN),
            7 => Ok(Self::RadlR),
            8 => Ok(Self::RaslN),
            9 => Ok(Self::RaslR),
            16 => Ok(Self::BlaWLp),
            17 => Ok(Self::BlaWRadl),
            18 => Ok(Self::BlaNLp),
            19 => Ok(Self::IdrWRadl),
            20 => Ok(Self::IdrNLp),
            21 => Ok(Self::CraNut),
            32 => Ok(Self::Vps),
            33 => Ok(Self::Sps),
            34 => Ok(Self::Pps),
            35 => Ok(Self::AccessUnitDelimiter),
            36 => Ok(Self::EndOfSequence),
            37 => Ok(Self::EndOfBitstream),
            38 => Ok(Self::FillerData),
            39 => Ok(Self::PrefixSei),
            40 => Ok(Self::SuffixSei),
            v if (10..=15).contains(&v) || (22..=31).contains(&v) || (41..=47).contains(&v) => {
                Ok(Self::Reserved(v))
            }
            v if (48..=63).contains(&v) => Ok(Self::Unspecified(v)),
            v => Err(H265CodecError::UnknownNaluType(v)),
        }
    }
}
