use std::fmt;

use sdp_formats::{
    attributes::{fmtp::FormatParameters, rtpmap::RtpMap},
    session::{SDPMediaType, SessionDescription},
};
use segmenter::access_unit::MediaKind;
use url::Url;

use crate::errors::{SessionError, SessionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackCodec {
    H264,
    H265,
    Aac,
}

impl fmt::Display for TrackCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::H264 => "h264",
            Self::H265 => "h265",
            Self::Aac => "aac",
        })
    }
}

impl TrackCodec {
    fn from_encoding_name(kind: MediaKind, name: &str) -> Option<Self> {
        match (kind, name.to_ascii_uppercase().as_str()) {
            (MediaKind::Video, "H264") => Some(Self::H264),
            (MediaKind::Video, "H265" | "HEVC") => Some(Self::H265),
            (MediaKind::Audio, "MPEG4-GENERIC" | "AAC") => Some(Self::Aac),
            _ => None,
        }
    }
}

/// One negotiated media stream: the SDP description resolved into what the
/// receive path needs, plus the local port pair once SETUP assigned it.
#[derive(Debug, Clone)]
pub struct Track {
    pub kind: MediaKind,
    pub codec: TrackCodec,
    pub rtpmap: RtpMap,
    pub fmtp: Option<FormatParameters>,
    pub control_url: Url,
    pub rtp_port: u16,
    pub rtcp_port: u16,
}

impl Track {
    pub fn payload_type(&self) -> u8 {
        self.rtpmap.payload_type
    }

    pub fn clock_rate(&self) -> u32 {
        self.rtpmap.clock_rate
    }
}

/// Builds the track table from a DESCRIBE body.
///
/// Exactly one supported video track and at most one AAC audio track;
/// media sections with codecs this pipeline cannot depacketize are skipped
/// with a warning rather than failing the whole session.
pub fn tracks_from_sdp(sdp: &SessionDescription, base_url: &Url) -> SessionResult<Vec<Track>> {
    let mut tracks: Vec<Track> = Vec::new();

    for media in &sdp.media_description {
        let kind = match media.media_line.media_type {
            SDPMediaType::Video => MediaKind::Video,
            SDPMediaType::Audio => MediaKind::Audio,
            SDPMediaType::Other(ref other) => {
                tracing::debug!("skipping media section of type {}", other);
                continue;
            }
        };

        let Some(rtpmap) = media.get_rtp_map() else {
            tracing::warn!("media section without rtpmap, skipping");
            continue;
        };
        let Some(codec) = TrackCodec::from_encoding_name(kind, &rtpmap.encoding_name) else {
            tracing::warn!(
                "unsupported {:?} codec {}, skipping",
                kind,
                rtpmap.encoding_name
            );
            continue;
        };

        let control_url = match media.get_control() {
            Some(token) => resolve_control_url(base_url, token)?,
            None => base_url.clone(),
        };

        tracks.push(Track {
            kind,
            codec,
            rtpmap: rtpmap.clone(),
            fmtp: media.get_fmtp().cloned(),
            control_url,
            rtp_port: 0,
            rtcp_port: 0,
        });
    }

    let video_count = tracks.iter().filter(|t| t.kind == MediaKind::Video).count();
    let audio_count = tracks.iter().filter(|t| t.kind == MediaKind::Audio).count();
    if video_count == 0 {
        return Err(SessionError::MissingVideoTrack);
    }
    if video_count > 1 {
        return Err(SessionError::MultipleVideoTracks);
    }
    if audio_count > 1 {
        return Err(SessionError::MultipleAudioTracks);
    }

    Ok(tracks)
}

/// Per RFC 2326 C.1.1: an absolute control url is used as is, `*` means
/// the session base, anything else is resolved relative to the base.
fn resolve_control_url(base_url: &Url, token: &str) -> SessionResult<Url> {
    if token == "*" || token.is_empty() {
        return Ok(base_url.clone());
    }
    if let Ok(url) = Url::parse(token) {
        if url.scheme().starts_with("rtsp") {
            return Ok(url);
        }
    }

    let mut joined = base_url.as_str().trim_end_matches('/').to_owned();
    joined.push('/');
    joined.push_str(token);
    Url::parse(&joined).map_err(|err| SessionError::Message(err.into()))
}

#[cfg(test)]
mod test {
    use sdp_formats::session::SessionDescription;

    use super::*;

    fn base() -> Url {
        Url::parse("rtsp://example.com:554/live").unwrap()
    }

    fn parse(sdp: &str) -> SessionDescription {
        SessionDescription::reader().read_from(sdp).unwrap()
    }

    #[test]
    fn test_two_track_session() {
        let sdp = parse(
            "v=0\r\nm=video 0 RTP/AVP 96\r\na=rtpmap:96 H264/90000\r\na=control:track1\r\n\
m=audio 0 RTP/AVP 97\r\na=rtpmap:97 AAC/48000\r\na=control:track2\r\n",
        );
        let tracks = tracks_from_sdp(&sdp, &base()).unwrap();
        assert_eq!(tracks.len(), 2);

        assert_eq!(tracks[0].kind, MediaKind::Video);
        assert_eq!(tracks[0].codec, TrackCodec::H264);
        assert_eq!(tracks[0].payload_type(), 96);
        assert_eq!(tracks[0].clock_rate(), 90000);
        assert_eq!(
            tracks[0].control_url.as_str(),
            "rtsp://example.com:554/live/track1"
        );

        assert_eq!(tracks[1].kind, MediaKind::Audio);
        assert_eq!(tracks[1].codec, TrackCodec::Aac);
        assert_eq!(tracks[1].clock_rate(), 48000);
        assert_eq!(
            tracks[1].control_url.as_str(),
            "rtsp://example.com:554/live/track2"
        );
    }

    #[test]
    fn test_absolute_control_url() {
        let sdp = parse(
            "v=0\r\nm=video 0 RTP/AVP 96\r\na=rtpmap:96 H265/90000\r\n\
a=control:rtsp://other.example.com/stream/video\r\n",
        );
        let tracks = tracks_from_sdp(&sdp, &base()).unwrap();
        assert_eq!(tracks[0].codec, TrackCodec::H265);
        assert_eq!(
            tracks[0].control_url.as_str(),
            "rtsp://other.example.com/stream/video"
        );
    }

    #[test]
    fn test_session_without_video_is_rejected() {
        let sdp = parse("v=0\r\nm=audio 0 RTP/AVP 97\r\na=rtpmap:97 AAC/44100\r\n");
        assert!(matches!(
            tracks_from_sdp(&sdp, &base()),
            Err(SessionError::MissingVideoTrack)
        ));
    }

    #[test]
    fn test_two_video_tracks_rejected() {
        let sdp = parse(
            "v=0\r\nm=video 0 RTP/AVP 96\r\na=rtpmap:96 H264/90000\r\n\
m=video 0 RTP/AVP 98\r\na=rtpmap:98 H264/90000\r\n",
        );
        assert!(matches!(
            tracks_from_sdp(&sdp, &base()),
            Err(SessionError::MultipleVideoTracks)
        ));
    }

    #[test]
    fn test_unknown_audio_codec_is_skipped() {
        let sdp = parse(
            "v=0\r\nm=video 0 RTP/AVP 96\r\na=rtpmap:96 H264/90000\r\n\
m=audio 0 RTP/AVP 0\r\na=rtpmap:0 PCMU/8000\r\n",
        );
        let tracks = tracks_from_sdp(&sdp, &base()).unwrap();
        assert_eq!(tracks.len(), 1);
    }
}
