use std::collections::BTreeMap;

use utils::traits::buffer::GenericSequencer;

use crate::{access_unit::AccessUnit, errors::SegmenterError};

/// Reorders the merged audio/video stream into presentation order before
/// the muxer consumes it.
///
/// Frames are keyed by (pts, arrival sequence), so equal timestamps keep
/// their arrival order and each track's units stay PTS-monotonic. Output is
/// held back while only one media kind is buffered, up to a bound, so a
/// track that runs slightly ahead cannot leapfrog the other at segment
/// boundaries.
#[derive(Debug)]
pub struct MixQueue {
    frames: BTreeMap<(u64, u64), AccessUnit>,
    video_cnt: usize,
    audio_cnt: usize,
    capacity: usize,
    pure_av_max_frame_count: usize,
    seq_counter: u64,
}

impl MixQueue {
    pub fn new(capacity: usize, pure_av_max_frame_count: usize) -> Self {
        assert!(capacity > 0);
        assert!(pure_av_max_frame_count > 0);
        Self {
            frames: BTreeMap::new(),
            video_cnt: 0,
            audio_cnt: 0,
            capacity,
            pure_av_max_frame_count,
            seq_counter: 0,
        }
    }

    fn try_dump_one(&mut self) -> Option<AccessUnit> {
        if self.frames.is_empty() {
            return None;
        }

        let pure_av = self.video_cnt == 0 || self.audio_cnt == 0;
        if pure_av && self.frames.len() < self.pure_av_max_frame_count {
            return None;
        }

        let (_, frame) = self.frames.pop_first()?;
        if frame.is_video() {
            self.video_cnt -= 1;
        } else {
            self.audio_cnt -= 1;
        }
        Some(frame)
    }

    /// Empties the queue in presentation order regardless of the holdback,
    /// for shutdown.
    pub fn drain(&mut self) -> Vec<AccessUnit> {
        self.video_cnt = 0;
        self.audio_cnt = 0;
        let frames = std::mem::take(&mut self.frames);
        frames.into_values().collect()
    }
}

impl GenericSequencer for MixQueue {
    type In = AccessUnit;
    type Out = AccessUnit;
    type Error = SegmenterError;

    fn enqueue(&mut self, frame: Self::In) -> Result<(), Self::Error> {
        if self.frames.len() >= self.capacity {
            return Err(SegmenterError::MixQueueFull(self.capacity));
        }

        if frame.is_video() {
            self.video_cnt += 1;
        } else {
            self.audio_cnt += 1;
        }
        let key = (frame.pts_90k, self.seq_counter);
        self.seq_counter = self.seq_counter.wrapping_add(1);
        self.frames.insert(key, frame);
        Ok(())
    }

    fn try_dump(&mut self) -> Vec<Self::Out> {
        let mut result = Vec::new();
        while let Some(frame) = self.try_dump_one() {
            result.push(frame);
        }
        result
    }
}
