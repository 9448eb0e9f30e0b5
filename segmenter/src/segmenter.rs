use std::{collections::VecDeque, path::PathBuf};

use hls_formats::playlist::{MediaPlaylist, MediaSegmentEntry};
use mpegts_formats::{muxer::TsMuxer, psi::StreamType};
use tokio::sync::mpsc;
use tokio_util::{bytes::BytesMut, sync::CancellationToken};
use utils::traits::buffer::GenericSequencer;

use crate::{
    access_unit::{AccessUnit, MediaKind},
    errors::{SegmenterError, SegmenterResult},
    mix_queue::MixQueue,
    segment::{Segment, SegmentInfo, segment_filename},
};

pub const PLAYLIST_FILENAME: &str = "index.m3u8";

const MIX_QUEUE_CAPACITY: usize = 1024;
const MIX_QUEUE_PURE_AV_MAX: usize = 16;

#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    pub output_dir: PathBuf,
    pub segment_duration_ms: u64,
    pub max_segments: usize,
}

impl SegmenterConfig {
    pub fn validate(&self) -> SegmenterResult<()> {
        if self.segment_duration_ms < 1000 {
            return Err(SegmenterError::InvalidConfig(format!(
                "segment duration must be at least 1000 ms, got {}",
                self.segment_duration_ms
            )));
        }
        if self.max_segments < 1 {
            return Err(SegmenterError::InvalidConfig(
                "window must keep at least one segment".to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct OpenSegment {
    index: u32,
    start_pts_90k: u64,
    last_video_pts_90k: u64,
    buffer: BytesMut,
}

/// Cuts the muxed transport stream into keyframe-aligned segments and
/// maintains the sliding window plus the live playlist.
///
/// Cut rule: a video keyframe opens a new segment once the in-progress one
/// has covered the configured duration in PTS time. Anything arriving
/// before the first keyframe cannot start a playable segment and is
/// dropped.
#[derive(Debug)]
pub struct HlsSegmenter {
    config: SegmenterConfig,
    muxer: TsMuxer,
    current: Option<OpenSegment>,
    window: VecDeque<SegmentInfo>,
    next_index: u32,
    leading_dropped: u64,
}

impl HlsSegmenter {
    pub fn new(
        config: SegmenterConfig,
        video_stream_type: StreamType,
        has_audio: bool,
    ) -> SegmenterResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            muxer: TsMuxer::new(video_stream_type, has_audio),
            current: None,
            window: VecDeque::new(),
            next_index: 0,
            leading_dropped: 0,
        })
    }

    pub fn segment_count(&self) -> usize {
        self.window.len()
    }

    pub async fn push(&mut self, unit: AccessUnit) -> SegmenterResult<()> {
        match unit.kind {
            MediaKind::Video => self.push_video(unit).await,
            MediaKind::Audio => self.push_audio(unit),
        }
    }

    async fn push_video(&mut self, unit: AccessUnit) -> SegmenterResult<()> {
        let should_cut = unit.keyframe
            && match &self.current {
                None => true,
                Some(open) => {
                    unit.pts_90k.saturating_sub(open.start_pts_90k) / 90
                        >= self.config.segment_duration_ms
                }
            };

        if should_cut {
            self.close_current(Some(unit.pts_90k)).await?;

            let mut buffer = BytesMut::new();
            self.muxer.write_program_tables(&mut buffer)?;
            self.muxer
                .write_video_pes(&mut buffer, unit.pts_90k, &unit.data, Some(unit.pts_90k))?;
            self.current = Some(OpenSegment {
                index: self.next_index,
                start_pts_90k: unit.pts_90k,
                last_video_pts_90k: unit.pts_90k,
                buffer,
            });
            self.next_index += 1;
            return Ok(());
        }

        match &mut self.current {
            Some(open) => {
                self.muxer
                    .write_video_pes(&mut open.buffer, unit.pts_90k, &unit.data, None)?;
                open.last_video_pts_90k = open.last_video_pts_90k.max(unit.pts_90k);
            }
            None => {
                // only a keyframe may start the stream
                self.leading_dropped += 1;
            }
        }
        Ok(())
    }

    fn push_audio(&mut self, unit: AccessUnit) -> SegmenterResult<()> {
        match &mut self.current {
            Some(open) => {
                self.muxer
                    .write_audio_pes(&mut open.buffer, unit.pts_90k, &unit.data)?;
            }
            None => {
                self.leading_dropped += 1;
            }
        }
        Ok(())
    }

    /// Flushes the in-progress segment on shutdown.
    pub async fn finish(&mut self) -> SegmenterResult<()> {
        self.close_current(None).await
    }

    async fn close_current(&mut self, cut_pts_90k: Option<u64>) -> SegmenterResult<()> {
        let Some(open) = self.current.take() else {
            return Ok(());
        };

        let end_pts = cut_pts_90k.unwrap_or(open.last_video_pts_90k);
        let duration_ms = end_pts.saturating_sub(open.start_pts_90k) / 90;
        let segment = Segment {
            index: open.index,
            duration_ms,
            filename: segment_filename(open.index),
            data: open.buffer.freeze(),
        };

        let path = self.config.output_dir.join(&segment.filename);
        tokio::fs::write(&path, &segment.data).await?;
        tracing::debug!(
            "segment {} closed: {} ms, {} bytes",
            segment.index,
            segment.duration_ms,
            segment.data.len()
        );

        self.window.push_back(segment.info());
        while self.window.len() > self.config.max_segments {
            let evicted = self.window.pop_front().unwrap();
            let evicted_path = self.config.output_dir.join(&evicted.filename);
            if let Err(err) = tokio::fs::remove_file(&evicted_path).await {
                tracing::warn!("unlink of evicted segment {:?} failed: {}", evicted_path, err);
            }
        }

        self.rewrite_playlist().await
    }

    fn build_playlist(&self) -> MediaPlaylist {
        let max_segment_secs = self
            .window
            .iter()
            .map(|segment| segment.duration_ms.div_ceil(1000))
            .max()
            .unwrap_or(0);
        MediaPlaylist {
            target_duration: max_segment_secs.max(self.config.segment_duration_ms.div_ceil(1000)),
            media_sequence: self.window.front().map(|segment| segment.index).unwrap_or(0),
            segments: self
                .window
                .iter()
                .map(|segment| MediaSegmentEntry {
                    duration_ms: segment.duration_ms,
                    uri: segment.filename.clone(),
                })
                .collect(),
        }
    }

    /// Write-new-then-rename so a reader never observes a torn playlist.
    /// One retry, then the session is considered unservable.
    async fn rewrite_playlist(&mut self) -> SegmenterResult<()> {
        let text = format!("{}", self.build_playlist());
        let final_path = self.config.output_dir.join(PLAYLIST_FILENAME);
        let temp_path = self.config.output_dir.join(format!("{}.tmp", PLAYLIST_FILENAME));

        let mut last_error = None;
        for _ in 0..2 {
            let result = async {
                tokio::fs::write(&temp_path, text.as_bytes()).await?;
                tokio::fs::rename(&temp_path, &final_path).await
            }
            .await;
            match result {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::warn!("playlist write failed, retrying: {}", err);
                    last_error = Some(err);
                }
            }
        }
        Err(SegmenterError::PlaylistUpdate(format!(
            "{}",
            last_error.expect("retry loop always sets the error")
        )))
    }
}

/// The muxer worker: drains the access unit channel through the mix queue
/// into the segmenter until the channel closes or shutdown is requested.
pub async fn run_muxer(
    mut segmenter: HlsSegmenter,
    mut receiver: mpsc::Receiver<AccessUnit>,
    shutdown: CancellationToken,
) -> SegmenterResult<()> {
    let mut queue = MixQueue::new(MIX_QUEUE_CAPACITY, MIX_QUEUE_PURE_AV_MAX);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = receiver.recv() => {
                let Some(unit) = received else {
                    break;
                };
                queue.enqueue(unit)?;
                for ordered in queue.try_dump() {
                    segmenter.push(ordered).await?;
                }
            }
        }
    }

    for ordered in queue.drain() {
        segmenter.push(ordered).await?;
    }
    segmenter.finish().await?;
    tracing::info!("muxer drained, {} segments live", segmenter.segment_count());
    Ok(())
}

#[cfg(test)]
mod test {
    use tokio_util::bytes::Bytes;

    use super::*;

    fn config(dir: &std::path::Path, duration_ms: u64, max_segments: usize) -> SegmenterConfig {
        SegmenterConfig {
            output_dir: dir.to_path_buf(),
            segment_duration_ms: duration_ms,
            max_segments,
        }
    }

    fn video(pts_ms: u64, keyframe: bool) -> AccessUnit {
        AccessUnit {
            kind: MediaKind::Video,
            pts_90k: pts_ms * 90,
            keyframe,
            data: Bytes::from_static(&[0x00, 0x00, 0x00, 0x01, 0x65, 0x88]),
        }
    }

    fn audio(pts_ms: u64) -> AccessUnit {
        AccessUnit {
            kind: MediaKind::Audio,
            pts_90k: pts_ms * 90,
            keyframe: false,
            data: Bytes::from_static(&[0xFF, 0xF1, 0x50, 0x80, 0x01, 0x00, 0x00, 0x21]),
        }
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("segmenter-test-{}-{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_config_validation() {
        assert!(config(std::path::Path::new("."), 999, 4).validate().is_err());
        assert!(config(std::path::Path::new("."), 1000, 0).validate().is_err());
        assert!(config(std::path::Path::new("."), 1000, 1).validate().is_ok());
    }

    #[tokio::test]
    async fn test_segments_cut_on_keyframes() {
        let dir = temp_dir("cut");
        let mut segmenter =
            HlsSegmenter::new(config(&dir, 1000, 8), StreamType::H264, false).unwrap();

        // 500 ms frame spacing, keyframe every second frame
        for frame in 0..6_u64 {
            segmenter
                .push(video(frame * 500, frame % 2 == 0))
                .await
                .unwrap();
        }
        segmenter.finish().await.unwrap();

        // cuts at 0 ms, 1000 ms, 2000 ms -> three segments
        assert_eq!(segmenter.segment_count(), 3);
        for index in 0..3 {
            let path = dir.join(segment_filename(index));
            let bytes = std::fs::read(&path).unwrap();
            assert!(!bytes.is_empty());
            assert_eq!(bytes.len() % 188, 0);
            // segment starts with PAT, then PMT
            assert_eq!(bytes[0], 0x47);
            assert_eq!(bytes[5], 0x00);
            assert_eq!(bytes[188 + 5], 0x02);
        }
        let playlist = std::fs::read_to_string(dir.join(PLAYLIST_FILENAME)).unwrap();
        assert!(playlist.starts_with("#EXTM3U\n"));
        assert!(playlist.contains("#EXT-X-MEDIA-SEQUENCE:0\n"));
        assert!(playlist.contains("segment_2.ts\n"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_non_keyframe_does_not_cut() {
        let dir = temp_dir("nocut");
        let mut segmenter =
            HlsSegmenter::new(config(&dir, 1000, 8), StreamType::H264, false).unwrap();

        segmenter.push(video(0, true)).await.unwrap();
        // far past the duration but never a keyframe
        for frame in 1..10_u64 {
            segmenter.push(video(frame * 400, false)).await.unwrap();
        }
        assert_eq!(segmenter.segment_count(), 0);

        segmenter.push(video(4000, true)).await.unwrap();
        assert_eq!(segmenter.segment_count(), 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_audio_before_first_keyframe_is_dropped() {
        let dir = temp_dir("leading-audio");
        let mut segmenter =
            HlsSegmenter::new(config(&dir, 1000, 8), StreamType::H264, true).unwrap();

        segmenter.push(audio(0)).await.unwrap();
        segmenter.push(audio(21)).await.unwrap();
        assert_eq!(segmenter.leading_dropped, 2);

        segmenter.push(video(100, true)).await.unwrap();
        segmenter.push(audio(120)).await.unwrap();
        segmenter.push(video(1200, true)).await.unwrap();
        assert_eq!(segmenter.segment_count(), 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_sliding_window_evicts_files() {
        let dir = temp_dir("window");
        let mut segmenter =
            HlsSegmenter::new(config(&dir, 1000, 2), StreamType::H264, false).unwrap();

        for second in 0..5_u64 {
            segmenter.push(video(second * 1000, true)).await.unwrap();
        }
        segmenter.finish().await.unwrap();

        // 5 segments were cut, only the last 2 may remain
        assert_eq!(segmenter.segment_count(), 2);
        assert!(!dir.join(segment_filename(0)).exists());
        assert!(!dir.join(segment_filename(2)).exists());
        assert!(dir.join(segment_filename(3)).exists());
        assert!(dir.join(segment_filename(4)).exists());

        let playlist = std::fs::read_to_string(dir.join(PLAYLIST_FILENAME)).unwrap();
        assert!(playlist.contains("#EXT-X-MEDIA-SEQUENCE:3\n"));
        assert!(!playlist.contains("segment_0.ts"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_playlist_matches_expected_text() {
        let dir = temp_dir("playlist");
        let mut segmenter =
            HlsSegmenter::new(config(&dir, 10_000, 8), StreamType::H264, false).unwrap();

        // two closed 1000 ms segments against the configured 10 s target
        for index in 0..2 {
            segmenter.window.push_back(SegmentInfo {
                index,
                duration_ms: 1000,
                filename: segment_filename(index),
            });
        }
        segmenter.rewrite_playlist().await.unwrap();

        let playlist = std::fs::read_to_string(dir.join(PLAYLIST_FILENAME)).unwrap();
        assert_eq!(
            playlist,
            "#EXTM3U\n\
#EXT-X-VERSION:3\n\
#EXT-X-TARGETDURATION:10\n\
#EXT-X-MEDIA-SEQUENCE:0\n\
#EXTINF:1.0,\n\
segment_0.ts\n\
#EXTINF:1.0,\n\
segment_1.ts\n"
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_run_muxer_drains_channel() {
        let dir = temp_dir("run");
        let segmenter =
            HlsSegmenter::new(config(&dir, 1000, 8), StreamType::H264, true).unwrap();
        let (sender, receiver) = mpsc::channel(64);
        let shutdown = CancellationToken::new();

        let worker = tokio::spawn(run_muxer(segmenter, receiver, shutdown.clone()));

        sender.send(video(0, true)).await.unwrap();
        sender.send(audio(10)).await.unwrap();
        sender.send(video(1000, true)).await.unwrap();
        sender.send(audio(1010)).await.unwrap();
        drop(sender);

        worker.await.unwrap().unwrap();
        assert!(dir.join(segment_filename(0)).exists());
        assert!(dir.join(PLAYLIST_FILENAME).exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
