use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use utils::traits::writer::WriteTo;

use crate::{
    crc::crc32_mpeg2,
    errors::{MpegTsError, MpegTsResult},
};

/// PMT stream_type values for the elementary streams this muxer emits.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    H264 = 0x1B,
    H265 = 0x24,
    AacAdts = 0x0F,
}

impl From<StreamType> for u8 {
    fn from(value: StreamType) -> Self {
        value as u8
    }
}

/// Program association section: one program pointing at the PMT.
/// @see: ISO/IEC 13818-1 2.4.4.3
#[derive(Debug, Clone, Copy)]
pub struct PatSection {
    pub transport_stream_id: u16,
    pub program_number: u16,
    pub pmt_pid: u16,
}

impl PatSection {
    pub fn section_bytes(&self) -> MpegTsResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(16);
        bytes.write_u8(0x00)?; // table_id
        // section_syntax_indicator '1', '0', reserved '11';
        // section_length: 5 fixed + 4 program entry + 4 crc
        bytes.write_u16::<BigEndian>(0xB000 | 13)?;
        bytes.write_u16::<BigEndian>(self.transport_stream_id)?;
        // reserved '11', version 0, current_next_indicator '1'
        bytes.write_u8(0xC1)?;
        bytes.write_u8(0x00)?; // section_number
        bytes.write_u8(0x00)?; // last_section_number
        bytes.write_u16::<BigEndian>(self.program_number)?;
        bytes.write_u16::<BigEndian>(0xE000 | (self.pmt_pid & 0x1FFF))?;

        let crc = crc32_mpeg2(&bytes);
        bytes.write_u32::<BigEndian>(crc)?;
        Ok(bytes)
    }
}

impl<W: io::Write> WriteTo<W> for PatSection {
    type Error = MpegTsError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write_all(&self.section_bytes()?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PmtStream {
    pub stream_type: StreamType,
    pub elementary_pid: u16,
}

/// Program map section with empty program_info and ES_info loops.
/// @see: ISO/IEC 13818-1 2.4.4.8
#[derive(Debug, Clone)]
pub struct PmtSection {
    pub program_number: u16,
    pub pcr_pid: u16,
    pub streams: Vec<PmtStream>,
}

impl PmtSection {
    pub fn section_bytes(&self) -> MpegTsResult<Vec<u8>> {
        let section_length = 9 + self.streams.len() * 5 + 4;
        if section_length > 0x3FD {
            return Err(MpegTsError::SectionTooLarge(section_length));
        }

        let mut bytes = Vec::with_capacity(3 + section_length);
        bytes.write_u8(0x02)?; // table_id
        bytes.write_u16::<BigEndian>(0xB000 | section_length as u16)?;
        bytes.write_u16::<BigEndian>(self.program_number)?;
        bytes.write_u8(0xC1)?; // reserved, version 0, current_next '1'
        bytes.write_u8(0x00)?; // section_number
        bytes.write_u8(0x00)?; // last_section_number
        bytes.write_u16::<BigEndian>(0xE000 | (self.pcr_pid & 0x1FFF))?;
        bytes.write_u16::<BigEndian>(0xF000)?; // program_info_length = 0

        for stream in &self.streams {
            bytes.write_u8(stream.stream_type.into())?;
            bytes.write_u16::<BigEndian>(0xE000 | (stream.elementary_pid & 0x1FFF))?;
            bytes.write_u16::<BigEndian>(0xF000)?; // ES_info_length = 0
        }

        let crc = crc32_mpeg2(&bytes);
        bytes.write_u32::<BigEndian>(crc)?;
        Ok(bytes)
    }
}

impl<W: io::Write> WriteTo<W> for PmtSection {
    type Error = MpegTsError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write_all(&self.section_bytes()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use byteorder::{BigEndian, ReadBytesExt};

    use super::*;

    #[test]
    fn test_pat_section_layout() {
        let pat = PatSection {
            transport_stream_id: 1,
            program_number: 1,
            pmt_pid: 0x1000,
        };
        let bytes = pat.section_bytes().unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[0], 0x00);
        assert_eq!(bytes[1], 0xB0);
        assert_eq!(bytes[2], 13);
        // program 1 -> pmt pid 0x1000
        assert_eq!(&bytes[8..12], &[0x00, 0x01, 0xF0, 0x00]);
    }

    #[test]
    fn test_pmt_section_layout() {
        let pmt = PmtSection {
            program_number: 1,
            pcr_pid: 0x0100,
            streams: vec![
                PmtStream {
                    stream_type: StreamType::H264,
                    elementary_pid: 0x0100,
                },
                PmtStream {
                    stream_type: StreamType::AacAdts,
                    elementary_pid: 0x0101,
                },
            ],
        };
        let bytes = pmt.section_bytes().unwrap();
        assert_eq!(bytes.len(), 3 + 9 + 10 + 4);
        assert_eq!(bytes[0], 0x02);
        // pcr pid with reserved bits
        assert_eq!(&bytes[8..10], &[0xE1, 0x00]);
        // first stream entry
        assert_eq!(&bytes[12..17], &[0x1B, 0xE1, 0x00, 0xF0, 0x00]);
        // second stream entry
        assert_eq!(&bytes[17..22], &[0x0F, 0xE1, 0x01, 0xF0, 0x00]);
    }

    #[test]
    fn test_section_crc_is_reproducible() {
        for bytes in [
            PatSection {
                transport_stream_id: 1,
                program_number: 1,
                pmt_pid: 0x1000,
            }
            .section_bytes()
            .unwrap(),
            PmtSection {
                program_number: 1,
                pcr_pid: 0x0100,
                streams: vec![PmtStream {
                    stream_type: StreamType::H265,
                    elementary_pid: 0x0100,
                }],
            }
            .section_bytes()
            .unwrap(),
        ] {
            let (section, mut crc_bytes) = bytes.split_at(bytes.len() - 4);
            let stored = crc_bytes.read_u32::<BigEndian>().unwrap();
            assert_eq!(stored, crc32_mpeg2(section));
        }
    }
}
