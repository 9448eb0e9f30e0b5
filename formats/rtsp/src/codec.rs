use std::io::Cursor;

use tokio_util::{
    bytes::{Buf, BytesMut},
    codec::{Decoder, Encoder},
};
use utils::traits::reader::TryReadFrom;

use crate::{
    consts::common::{CR, LF},
    errors::RtspMessageError,
    request::RtspRequest,
    response::RtspResponse,
};

/// Framed codec for the client side of an RTSP control connection:
/// requests are encoded as text, responses decoded as they complete.
///
/// Interleaved `$`-framed binary never appears on this connection because
/// media always travels over the per-track UDP sockets.
#[derive(Debug, Default)]
pub struct RtspClientCodec;

impl Encoder<RtspRequest> for RtspClientCodec {
    type Error = RtspMessageError;
    fn encode(&mut self, item: RtspRequest, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(format!("{}", item).as_bytes());
        Ok(())
    }
}

impl Decoder for RtspClientCodec {
    type Item = RtspResponse;
    type Error = RtspMessageError;
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // some servers pad keepalive replies with stray blank lines
        while src.first().is_some_and(|b| *b == CR || *b == LF) {
            src.advance(1);
        }

        let (res, position) = {
            let mut cursor = Cursor::new(&src);
            let res = RtspResponse::try_read_from(&mut cursor);
            (res, cursor.position())
        };
        if let Ok(Some(_)) = &res {
            src.advance(position as usize);
        }
        res
    }
}

#[cfg(test)]
mod test {
    use tokio_util::bytes::BytesMut;
    use tokio_util::codec::{Decoder, Encoder};
    use url::Url;

    use crate::{
        consts::{methods::RtspMethod, status::RtspStatus},
        header::RtspHeader,
        request::RtspRequest,
    };

    use super::RtspClientCodec;

    #[test]
    fn test_decode_across_split_reads() {
        let mut codec = RtspClientCodec;
        let mut buffer = BytesMut::new();

        buffer.extend_from_slice(b"RTSP/1.0 200 OK\r\nCSeq: 1\r\n");
        assert!(codec.decode(&mut buffer).expect("partial decode").is_none());

        buffer.extend_from_slice(b"Session: 42\r\n\r\n");
        let response = codec
            .decode(&mut buffer)
            .expect("decode")
            .expect("complete response");
        assert_eq!(response.status(), RtspStatus::OK);
        assert_eq!(response.headers().session_id(), Some("42"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_decode_two_pipelined_responses() {
        let mut codec = RtspClientCodec;
        let mut buffer = BytesMut::new();
        buffer.extend_from_slice(
            b"RTSP/1.0 200 OK\r\nCSeq: 1\r\n\r\nRTSP/1.0 200 OK\r\nCSeq: 2\r\n\r\n",
        );

        let first = codec.decode(&mut buffer).unwrap().expect("first response");
        assert_eq!(first.headers().cseq(), Some(1));
        let second = codec.decode(&mut buffer).unwrap().expect("second response");
        assert_eq!(second.headers().cseq(), Some(2));
    }

    #[test]
    fn test_encode_request() {
        let mut codec = RtspClientCodec;
        let mut buffer = BytesMut::new();
        let request = RtspRequest::builder()
            .method(RtspMethod::Options)
            .uri(Url::parse("rtsp://example.com/live").unwrap())
            .header(RtspHeader::CSeq, "1")
            .build()
            .unwrap();
        codec.encode(request, &mut buffer).expect("encode");
        let text = String::from_utf8(buffer.to_vec()).unwrap();
        assert!(text.starts_with("OPTIONS rtsp://example.com/live RTSP/1.0\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }
}
