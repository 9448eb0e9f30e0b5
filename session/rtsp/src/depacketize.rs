use std::time::{Duration, Instant};

use rtp_formats::{
    codec::{DepacketizedItem, RtpDepacketizer},
    errors::RtpError,
    packet::RtpTrivialPacket,
    reorder::{DEFAULT_REORDER_CAPACITY, RtpReorderBuffer},
};
use rtp_formats::codec::{
    h264::{depacketizer::RtpH264Depacketizer, parameters::RtpH264Fmtp},
    h265::{depacketizer::RtpH265Depacketizer, parameters::RtpH265Fmtp},
    mpeg4_generic::{depacketizer::RtpMpeg4Depacketizer, parameters::RtpMpeg4Fmtp},
};
use segmenter::access_unit::{AccessUnit, MediaKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use utils::traits::buffer::GenericSequencer;

use crate::{
    errors::SessionResult,
    track::{Track, TrackCodec},
};

/// The muxing clock: all access unit timestamps are expressed in 90 kHz
/// ticks regardless of the codec clock.
pub const PTS_CLOCK_HZ: u64 = 90_000;

/// Exact rational re-base of an RTP timestamp onto the 90 kHz clock.
/// Video clocks are already 90 kHz and pass through unchanged.
pub fn rtp_timestamp_to_90k(timestamp: u32, clock_rate: u32) -> u64 {
    (timestamp as u64 * PTS_CLOCK_HZ) / clock_rate as u64
}

/// Builds the codec-matched depacketizer for a negotiated track, seeding
/// parameter set caches from the fmtp attributes when present.
pub fn depacketizer_for_track(track: &Track) -> SessionResult<RtpDepacketizer> {
    Ok(match track.codec {
        TrackCodec::H264 => match &track.fmtp {
            Some(fmtp) => {
                let params = RtpH264Fmtp::from_fmtp(fmtp).map_err(RtpError::from)?;
                RtpDepacketizer::H264(RtpH264Depacketizer::with_parameters(&params))
            }
            None => RtpDepacketizer::H264(RtpH264Depacketizer::new()),
        },
        TrackCodec::H265 => match &track.fmtp {
            Some(fmtp) => {
                let params = RtpH265Fmtp::from_fmtp(fmtp).map_err(RtpError::from)?;
                RtpDepacketizer::H265(RtpH265Depacketizer::with_parameters(&params))
            }
            None => RtpDepacketizer::H265(RtpH265Depacketizer::new()),
        },
        TrackCodec::Aac => {
            let params = RtpMpeg4Fmtp::from_sdp(&track.rtpmap, track.fmtp.as_ref())
                .map_err(RtpError::from)?;
            RtpDepacketizer::Mpeg4Generic(RtpMpeg4Depacketizer::new(params))
        }
    })
}

const ERROR_BURST_WINDOW: Duration = Duration::from_secs(1);
const ERROR_BURST_THRESHOLD: u64 = 100;

/// Per-packet errors drop the packet and continue; a burst past the
/// threshold inside one window is reported once instead of flooding the
/// log.
#[derive(Debug)]
struct ErrorBurstCounter {
    window_start: Instant,
    in_window: u64,
    total: u64,
    burst_reported: bool,
}

impl ErrorBurstCounter {
    fn new() -> Self {
        Self {
            window_start: Instant::now(),
            in_window: 0,
            total: 0,
            burst_reported: false,
        }
    }

    fn record(&mut self, error: &dyn std::fmt::Display) {
        if self.window_start.elapsed() > ERROR_BURST_WINDOW {
            self.window_start = Instant::now();
            self.in_window = 0;
            self.burst_reported = false;
        }
        self.in_window += 1;
        self.total += 1;

        if self.in_window > ERROR_BURST_THRESHOLD {
            if !self.burst_reported {
                tracing::warn!(
                    "depacketizer error burst, {} errors within a second: {}",
                    self.in_window,
                    error
                );
                self.burst_reported = true;
            }
        } else {
            tracing::debug!("dropping rtp packet: {}", error);
        }
    }
}

fn to_access_unit(item: DepacketizedItem, clock_rate: u32) -> Result<AccessUnit, RtpError> {
    Ok(match item {
        DepacketizedItem::H264(item) => AccessUnit {
            kind: MediaKind::Video,
            pts_90k: rtp_timestamp_to_90k(item.rtp_timestamp, clock_rate),
            keyframe: item.keyframe,
            data: item.annex_b_bytes().map_err(|err| {
                RtpError::from(rtp_formats::codec::h264::errors::RtpH264Error::from(err))
            })?,
        },
        DepacketizedItem::H265(item) => AccessUnit {
            kind: MediaKind::Video,
            pts_90k: rtp_timestamp_to_90k(item.rtp_timestamp, clock_rate),
            keyframe: item.keyframe,
            data: item.annex_b_bytes().map_err(|err| {
                RtpError::from(rtp_formats::codec::h265::errors::RtpH265Error::from(err))
            })?,
        },
        DepacketizedItem::Aac(item) => AccessUnit {
            kind: MediaKind::Audio,
            pts_90k: rtp_timestamp_to_90k(item.rtp_timestamp, clock_rate),
            keyframe: false,
            data: item.adts_frame,
        },
    })
}

/// One depacketize worker per track: re-orders packets, recovers access
/// units and pushes them onto the shared muxer queue.
pub async fn run_depacketizer(
    track: Track,
    mut depacketizer: RtpDepacketizer,
    mut receiver: mpsc::Receiver<RtpTrivialPacket>,
    sender: mpsc::Sender<AccessUnit>,
    shutdown: CancellationToken,
) {
    let clock_rate = track.clock_rate();
    let mut reorder = RtpReorderBuffer::new(DEFAULT_REORDER_CAPACITY);
    let mut errors = ErrorBurstCounter::new();

    loop {
        let packet = tokio::select! {
            _ = shutdown.cancelled() => break,
            packet = receiver.recv() => packet,
        };
        let Some(packet) = packet else {
            break;
        };

        if let Err(err) = reorder.enqueue(packet) {
            errors.record(&err);
            continue;
        }
        for ordered in reorder.try_dump() {
            let items = match depacketizer.depacketize(ordered) {
                Ok(items) => items,
                Err(err) => {
                    depacketizer.reset();
                    errors.record(&err);
                    continue;
                }
            };

            for item in items {
                let unit = match to_access_unit(item, clock_rate) {
                    Ok(unit) => unit,
                    Err(err) => {
                        errors.record(&err);
                        continue;
                    }
                };
                if sender.send(unit).await.is_err() {
                    // the muxer is gone, nothing left to produce for
                    return;
                }
            }
        }
    }

    tracing::debug!(
        "depacketizer for {} track exiting: {} packets gapped, {} late, {} duplicate, {} errors",
        track.codec,
        reorder.gap_count(),
        reorder.late_count(),
        reorder.duplicate_count(),
        errors.total,
    );
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_video_timestamps_pass_through() {
        assert_eq!(rtp_timestamp_to_90k(12345, 90_000), 12345);
    }

    #[test]
    fn test_audio_timestamps_rebase_exactly() {
        // 44.1 kHz: one second of samples lands on one second of pts
        assert_eq!(rtp_timestamp_to_90k(44100, 44100), 90_000);
        assert_eq!(rtp_timestamp_to_90k(22050, 44100), 45_000);
        // 48 kHz frames of 1024 samples
        assert_eq!(rtp_timestamp_to_90k(1024, 48000), 1920);
    }
}
