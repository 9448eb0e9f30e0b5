use std::time::Duration;

use futures::future::join_all;
use segmenter::access_unit::{AccessUnit, MediaKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    config::{RTP_CHANNEL_CAPACITY, SessionConfig},
    depacketize::{depacketizer_for_track, run_depacketizer},
    errors::{SessionError, SessionResult},
    receiver::{bind_track_sockets, run_receiver},
    session::RtspPullSession,
    track::{Track, TrackCodec},
};

/// Wires the whole receive side together: the control session, one UDP
/// receiver plus one depacketizer per track, and the keepalive timer.
///
/// `start()` runs the pre-media handshake so the caller can inspect the
/// negotiated tracks (the muxer needs the codec and audio presence before
/// any packet flows); `run()` then drives the session until shutdown.
pub struct RtspPullPipeline {
    session: RtspPullSession,
    config: SessionConfig,
    shutdown: CancellationToken,
}

impl RtspPullPipeline {
    pub fn new(config: SessionConfig, shutdown: CancellationToken) -> SessionResult<Self> {
        Ok(Self {
            session: RtspPullSession::new(config.clone())?,
            config,
            shutdown,
        })
    }

    /// connect → OPTIONS → DESCRIBE.
    pub async fn start(&mut self) -> SessionResult<()> {
        self.session.connect().await?;
        self.session.options().await?;
        self.session.describe().await?;
        Ok(())
    }

    pub fn tracks(&self) -> &[Track] {
        self.session.tracks()
    }

    pub fn video_codec(&self) -> SessionResult<TrackCodec> {
        self.tracks()
            .iter()
            .find(|track| track.kind == MediaKind::Video)
            .map(|track| track.codec)
            .ok_or(SessionError::MissingVideoTrack)
    }

    pub fn has_audio(&self) -> bool {
        self.tracks()
            .iter()
            .any(|track| track.kind == MediaKind::Audio)
    }

    /// SETUP → PLAY, then stream until shutdown; tears the session down on
    /// every exit path.
    pub async fn run(mut self, unit_sender: mpsc::Sender<AccessUnit>) -> SessionResult<()> {
        let result = self.run_inner(unit_sender).await;
        if let Err(err) = self.session.teardown().await {
            tracing::warn!("teardown failed: {}", err);
        }
        result
    }

    async fn run_inner(&mut self, unit_sender: mpsc::Sender<AccessUnit>) -> SessionResult<()> {
        // bind every port pair before SETUP advertises it
        let mut sockets = Vec::with_capacity(self.session.tracks().len());
        for index in 0..self.session.tracks().len() {
            let bound = bind_track_sockets(self.config.rtp_base_port, index).await?;
            let track = &mut self.session.tracks_mut()[index];
            track.rtp_port = bound.rtp_port;
            track.rtcp_port = bound.rtcp_port;
            sockets.push(bound);
        }

        self.session.setup().await?;
        self.session.play().await?;

        let mut workers = Vec::new();
        // rtcp sockets stay bound but idle until the session ends, so the
        // advertised port pairs remain reserved
        let mut rtcp_guards = Vec::new();
        for bound in sockets {
            let track = self
                .session
                .tracks()
                .iter()
                .find(|track| track.rtp_port == bound.rtp_port)
                .expect("every bound socket belongs to a track")
                .clone();
            let depacketizer = depacketizer_for_track(&track)?;

            let (packet_sender, packet_receiver) = mpsc::channel(RTP_CHANNEL_CAPACITY);
            workers.push(tokio::spawn(run_receiver(
                bound.rtp,
                packet_sender,
                self.shutdown.clone(),
            )));
            workers.push(tokio::spawn(run_depacketizer(
                track,
                depacketizer,
                packet_receiver,
                unit_sender.clone(),
                self.shutdown.clone(),
            )));
            rtcp_guards.push(bound.rtcp);
        }
        drop(unit_sender);

        let keepalive = Duration::from_millis(self.config.keepalive_interval_ms.max(1000));
        let result = loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break Ok(()),
                _ = tokio::time::sleep(keepalive) => {
                    if let Err(err) = self.session.keepalive().await {
                        // control errors are unrecoverable for the session
                        break Err(err);
                    }
                }
            }
        };

        self.shutdown.cancel();
        join_all(workers).await;
        drop(rtcp_guards);
        result
    }
}
