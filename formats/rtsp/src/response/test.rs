use std::{io::Cursor, str::FromStr};

use utils::traits::reader::TryReadFrom;

use crate::{
    consts::status::RtspStatus,
    header::RtspHeader,
    response::RtspResponse,
};

#[test]
fn test_parse_simple_response() {
    let response = RtspResponse::from_str("RTSP/1.0 200 OK\r\nCSeq: 1\r\nSession: 12345678\r\n\r\n")
        .expect("parse response");
    assert_eq!(response.status(), RtspStatus::OK);
    assert_eq!(response.headers().cseq(), Some(1));
    assert_eq!(response.headers().session_id(), Some("12345678"));
    assert!(response.body().is_none());
}

#[test]
fn test_parse_response_with_body() {
    let body = "v=0\r\no=- 1 1 IN IP4 0.0.0.0\r\ns=x\r\n";
    let text = format!(
        "RTSP/1.0 200 OK\r\nCSeq: 2\r\nContent-Type: application/sdp\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    let response = RtspResponse::from_str(&text).expect("parse response");
    assert_eq!(response.body().map(|b| b.as_str()), Some(body));
}

#[test]
fn test_header_names_are_case_insensitive() {
    let response =
        RtspResponse::from_str("RTSP/1.0 200 OK\r\ncseq: 3\r\nCONTENT-LENGTH: 0\r\nsession: abc;timeout=60\r\n\r\n")
            .expect("parse response");
    assert_eq!(response.headers().cseq(), Some(3));
    assert_eq!(response.headers().session_id(), Some("abc"));
}

#[test]
fn test_folded_header_value() {
    let response = RtspResponse::from_str(
        "RTSP/1.0 200 OK\r\nCSeq: 4\r\nPublic: OPTIONS, DESCRIBE,\r\n SETUP, PLAY\r\n\r\n",
    )
    .expect("parse response");
    assert_eq!(
        response.headers().get_unique(RtspHeader::Public),
        Some("OPTIONS, DESCRIBE, SETUP, PLAY")
    );
}

#[test]
fn test_non_200_status() {
    let response = RtspResponse::from_str("RTSP/1.0 454 Session Not Found\r\nCSeq: 5\r\n\r\n")
        .expect("parse response");
    assert_eq!(response.status(), RtspStatus::SessionNotFound);
    assert_eq!(response.status().code(), 454);
    assert_eq!(response.reason(), "Session Not Found");
}

#[test]
fn test_unknown_status_code_is_tolerated() {
    let response = RtspResponse::from_str("RTSP/1.0 499 Strange Vendor Code\r\nCSeq: 6\r\n\r\n")
        .expect("parse response");
    assert_eq!(response.status(), RtspStatus::Other(499));
    assert_eq!(response.reason(), "Strange Vendor Code");
}

#[test]
fn test_incomplete_message_yields_none() {
    let mut cursor = Cursor::new(&b"RTSP/1.0 200 OK\r\nCSeq: 7\r\n"[..]);
    let result = RtspResponse::try_read_from(&mut cursor).expect("incomplete parse");
    assert!(result.is_none());

    let mut cursor = Cursor::new(&b"RTSP/1.0 200 OK\r\nContent-Length: 10\r\n\r\nshort"[..]);
    let result = RtspResponse::try_read_from(&mut cursor).expect("incomplete body parse");
    assert!(result.is_none());
}

#[test]
fn test_build_then_parse_round_trip() {
    let response = RtspResponse::builder()
        .status(RtspStatus::OK)
        .header(RtspHeader::CSeq, "8")
        .header(RtspHeader::ContentType, "application/sdp")
        .body("v=0\r\n".to_owned())
        .build()
        .expect("build response");
    let rendered = format!("{}", response);
    let reparsed = RtspResponse::from_str(&rendered).expect("reparse response");
    assert_eq!(reparsed.headers().cseq(), Some(8));
    assert_eq!(reparsed.body().map(|b| b.as_str()), Some("v=0\r\n"));
}
