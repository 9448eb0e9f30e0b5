use tokio_util::bytes::Bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

/// The smallest unit the muxer consumes: one video frame in Annex-B form
/// or one ADTS-framed AAC frame, timed on the shared 90 kHz clock.
#[derive(Debug, Clone)]
pub struct AccessUnit {
    pub kind: MediaKind,
    pub pts_90k: u64,
    pub keyframe: bool,
    pub data: Bytes,
}

impl AccessUnit {
    #[inline]
    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    #[inline]
    pub fn is_audio(&self) -> bool {
        self.kind == MediaKind::Audio
    }
}
