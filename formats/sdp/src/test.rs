use crate::session::{SDPMediaType, SessionDescription};

const TWO_TRACK_SDP: &str = "v=0\r\n\
o=- 1234567890 1 IN IP4 192.168.1.10\r\n\
s=Live Stream\r\n\
t=0 0\r\n\
m=video 0 RTP/AVP 96\r\n\
a=rtpmap:96 H264/90000\r\n\
a=control:track1\r\n\
m=audio 0 RTP/AVP 97\r\n\
a=rtpmap:97 AAC/48000\r\n\
a=control:track2\r\n";

#[test]
fn test_two_track_sdp() {
    let sdp = SessionDescription::reader()
        .read_from(TWO_TRACK_SDP)
        .expect("parse sdp");

    assert_eq!(sdp.version, 0);
    assert_eq!(sdp.origin.session_id, 1234567890);
    assert_eq!(sdp.media_description.len(), 2);

    let video = &sdp.media_description[0];
    assert_eq!(video.media_line.media_type, SDPMediaType::Video);
    assert_eq!(video.media_line.first_payload_type().unwrap(), 96);
    let rtpmap = video.get_rtp_map().expect("video rtpmap");
    assert_eq!(rtpmap.encoding_name, "H264");
    assert_eq!(rtpmap.clock_rate, 90000);
    assert_eq!(video.get_control(), Some("track1"));

    let audio = &sdp.media_description[1];
    assert_eq!(audio.media_line.media_type, SDPMediaType::Audio);
    assert_eq!(audio.media_line.first_payload_type().unwrap(), 97);
    let rtpmap = audio.get_rtp_map().expect("audio rtpmap");
    assert_eq!(rtpmap.encoding_name, "AAC");
    assert_eq!(rtpmap.clock_rate, 48000);
    assert_eq!(audio.get_control(), Some("track2"));
}

#[test]
fn test_lf_only_line_endings() {
    let sdp = SessionDescription::reader()
        .read_from("v=0\no=- 1 1 IN IP4 0.0.0.0\ns=x\nm=video 0 RTP/AVP 96\na=rtpmap:96 H265/90000\n")
        .expect("parse lf-only sdp");
    assert_eq!(sdp.media_description.len(), 1);
    assert_eq!(
        sdp.media_description[0].get_rtp_map().unwrap().encoding_name,
        "H265"
    );
}

#[test]
fn test_unknown_lines_ignored() {
    let sdp = SessionDescription::reader()
        .read_from("v=0\r\nc=IN IP4 0.0.0.0\r\nb=AS:5000\r\nk=none\r\nm=audio 0 RTP/AVP 97\r\na=rtpmap:97 mpeg4-generic/44100/2\r\n")
        .expect("parse sdp with unknown lines");
    let rtpmap = sdp.media_description[0].get_rtp_map().unwrap();
    assert_eq!(rtpmap.clock_rate, 44100);
    assert_eq!(rtpmap.encoding_params, Some(2));
}

#[test]
fn test_fmtp_parameters() {
    let sdp = SessionDescription::reader()
        .read_from(
            "v=0\r\nm=audio 0 RTP/AVP 97\r\n\
a=fmtp:97 streamtype=5; profile-level-id=1;mode=AAC-hbr;sizeLength=13;indexLength=3;indexDeltaLength=3;config=1190\r\n",
        )
        .expect("parse sdp with fmtp");
    let fmtp = sdp.media_description[0].get_fmtp().expect("fmtp");
    assert_eq!(fmtp.format, 97);
    assert_eq!(fmtp.get("mode"), Some("AAC-hbr"));
    assert_eq!(fmtp.get_u64("sizelength").unwrap(), Some(13));
    assert_eq!(fmtp.get_u64("indexLength").unwrap(), Some(3));
    assert_eq!(fmtp.get("config"), Some("1190"));
}

#[test]
fn test_missing_version_rejected() {
    assert!(
        SessionDescription::reader()
            .read_from("m=video 0 RTP/AVP 96\r\n")
            .is_err()
    );
}

#[test]
fn test_render_round_trip() {
    let sdp = SessionDescription::reader()
        .read_from(TWO_TRACK_SDP)
        .expect("parse sdp");
    let rendered = format!("{}", sdp);
    let reparsed = SessionDescription::reader()
        .read_from(&rendered)
        .expect("reparse rendered sdp");
    assert_eq!(reparsed.media_description.len(), 2);
    assert_eq!(reparsed.media_description[1].get_control(), Some("track2"));
}
