use std::io;

use bitstream_io::{BigEndian, BitRead, BitReader};
use num::ToPrimitive;

use super::{
    errors::{RtpMpeg4Error, RtpMpeg4Result},
    parameters::RtpMpeg4Fmtp,
};

/// `RtpMpeg4Fmtp::from_sdp` bounds every field width, but the widths come
/// off the wire, so an out-of-range value stays an error here rather than
/// a panic.
fn field_bits(length: u64, name: &str) -> RtpMpeg4Result<u32> {
    length.to_u32().filter(|bits| *bits <= 32).ok_or_else(|| {
        RtpMpeg4Error::SyntaxError(format!("unusable {} bit width: {}", name, length))
    })
}

/// +---------------------------------------+
/// |             AU-size                   |
/// +---------------------------------------+
/// |       AU-Index / AU-Index-delta       |
/// +---------------------------------------+
#[derive(Debug, Default, Clone, Copy)]
pub struct AuHeader {
    pub bits_cnt: u64,
    pub au_size: u64,
    pub au_index: Option<u64>,
    pub au_index_delta: Option<u64>,
}

impl AuHeader {
    fn read_remaining_from<R: io::Read>(
        header: (&RtpMpeg4Fmtp, bool),
        reader: &mut BitReader<R, BigEndian>,
    ) -> RtpMpeg4Result<Self> {
        let (params, is_first) = header;
        let mut result = Self::default();
        let mut bits_cnt = 0;

        result.au_size = reader.read(field_bits(params.size_length, "sizeLength")?)?;
        bits_cnt += params.size_length;

        if is_first {
            if params.index_length > 0 {
                result.au_index =
                    Some(reader.read(field_bits(params.index_length, "indexLength")?)?);
                bits_cnt += params.index_length;
            }
        } else if params.index_delta_length > 0 {
            result.au_index_delta =
                Some(reader.read(field_bits(params.index_delta_length, "indexDeltaLength")?)?);
            bits_cnt += params.index_delta_length;
        }

        result.bits_cnt = bits_cnt;
        Ok(result)
    }
}

/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+- .. -+-+-+-+-+-+-+-+-+-+
/// |AU-headers-length|AU-header|AU-header|      |AU-header|padding|
/// |                 |   (1)   |   (2)   |      |   (n)   |  bits |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+- .. -+-+-+-+-+-+-+-+-+-+
#[derive(Debug)]
pub struct AuHeaderSection {
    pub au_headers_length: u64,
    pub au_headers: Vec<AuHeader>,
}

impl AuHeaderSection {
    /// Parses the section off the front of an rtp payload; the AU data
    /// area starts at `self.bytes_count()`.
    pub fn read_remaining_from<R: io::Read>(
        params: &RtpMpeg4Fmtp,
        reader: R,
    ) -> RtpMpeg4Result<Self> {
        let mut reader = BitReader::endian(reader, BigEndian);
        let au_headers_length: u64 = reader.read(16)?;
        let mut headers = vec![];
        let mut bits_read = 0;
        while bits_read < au_headers_length {
            let header = AuHeader::read_remaining_from((params, bits_read == 0), &mut reader)?;
            bits_read += header.bits_cnt;
            headers.push(header);
        }

        if bits_read > au_headers_length {
            return Err(RtpMpeg4Error::SyntaxError(format!(
                "au headers overrun the section: {} bits read, {} declared",
                bits_read, au_headers_length
            )));
        }
        if headers.is_empty() {
            return Err(RtpMpeg4Error::SyntaxError(
                "au header section carries no headers".to_owned(),
            ));
        }

        Ok(Self {
            au_headers_length,
            au_headers: headers,
        })
    }

    /// Length of the whole section in bytes: the 16-bit length field plus
    /// the padded header bits.
    pub fn bytes_count(&self) -> usize {
        2 + self.au_headers_length.div_ceil(8) as usize
    }
}
