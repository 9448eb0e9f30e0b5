//! @see: RFC 8216 4.3, protocol version 3 media playlists.

use std::fmt;

const LINE_BREAK: &str = "\n";

#[derive(Debug, Clone)]
pub struct MediaSegmentEntry {
    pub duration_ms: u64,
    pub uri: String,
}

/// A live media playlist over the current segment window.
///
/// This is a derived view: the segmenter rebuilds it from the window after
/// every mutation, it never feeds back into segment bookkeeping.
#[derive(Debug, Clone)]
pub struct MediaPlaylist {
    /// EXT-X-TARGETDURATION, whole seconds.
    pub target_duration: u64,
    /// EXT-X-MEDIA-SEQUENCE: the index of the oldest live segment.
    pub media_sequence: u32,
    pub segments: Vec<MediaSegmentEntry>,
}

impl fmt::Display for MediaPlaylist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#EXTM3U{}", LINE_BREAK)?;
        write!(f, "#EXT-X-VERSION:3{}", LINE_BREAK)?;
        write!(f, "#EXT-X-TARGETDURATION:{}{}", self.target_duration, LINE_BREAK)?;
        write!(f, "#EXT-X-MEDIA-SEQUENCE:{}{}", self.media_sequence, LINE_BREAK)?;
        for segment in &self.segments {
            write!(
                f,
                "#EXTINF:{:.1},{}",
                segment.duration_ms as f64 / 1000.0,
                LINE_BREAK
            )?;
            write!(f, "{}{}", segment.uri, LINE_BREAK)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_two_segment_playlist() {
        let playlist = MediaPlaylist {
            target_duration: 10,
            media_sequence: 0,
            segments: vec![
                MediaSegmentEntry {
                    duration_ms: 1000,
                    uri: "segment_0.ts".to_owned(),
                },
                MediaSegmentEntry {
                    duration_ms: 1000,
                    uri: "segment_1.ts".to_owned(),
                },
            ],
        };
        assert_eq!(
            format!("{}", playlist),
            "#EXTM3U\n\
#EXT-X-VERSION:3\n\
#EXT-X-TARGETDURATION:10\n\
#EXT-X-MEDIA-SEQUENCE:0\n\
#EXTINF:1.0,\n\
segment_0.ts\n\
#EXTINF:1.0,\n\
segment_1.ts\n"
        );
    }

    #[test]
    fn test_fractional_durations_round_to_one_decimal() {
        let playlist = MediaPlaylist {
            target_duration: 3,
            media_sequence: 7,
            segments: vec![MediaSegmentEntry {
                duration_ms: 2340,
                uri: "segment_7.ts".to_owned(),
            }],
        };
        let text = format!("{}", playlist);
        assert!(text.contains("#EXT-X-MEDIA-SEQUENCE:7\n"));
        assert!(text.contains("#EXTINF:2.3,\n"));
    }
}
