use std::{fmt, time::Duration};

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use futures::{SinkExt, StreamExt};
use rtsp_formats::{
    codec::RtspClientCodec,
    consts::methods::RtspMethod,
    header::{RtspHeader, transport::TransportHeader},
    request::RtspRequest,
    response::RtspResponse,
};
use sdp_formats::session::SessionDescription;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use url::Url;

use crate::{
    config::SessionConfig,
    errors::{SessionError, SessionResult},
    track::{Track, tracks_from_sdp},
};

const USER_AGENT: &str = concat!("rill/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    Described,
    Setup,
    Playing,
    Paused,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Described => "described",
            Self::Setup => "setup",
            Self::Playing => "playing",
            Self::Paused => "paused",
        })
    }
}

/// The client half of one RTSP 1.0 control connection.
///
/// Drives `Disconnected → Connected → Described → Setup → Playing ⇄ Paused`
/// and owns the CSeq counter, the server-issued session id and the track
/// table. Media never flows here; SETUP points the server at the per-track
/// UDP ports instead.
pub struct RtspPullSession {
    config: SessionConfig,
    state: SessionState,
    cseq: u64,
    io: Option<Framed<TcpStream, RtspClientCodec>>,
    session_id: Option<String>,
    content_base: Url,
    tracks: Vec<Track>,
    authorization: Option<String>,
}

impl RtspPullSession {
    pub fn new(config: SessionConfig) -> SessionResult<Self> {
        config.validate()?;

        // rfc 2326 carries no auth scheme of its own; Basic credentials
        // travel in the url userinfo
        let authorization = match config.url.password() {
            Some(password) => {
                let credentials = format!("{}:{}", config.url.username(), password);
                Some(format!("Basic {}", BASE64.encode(credentials)))
            }
            None if !config.url.username().is_empty() => {
                let credentials = format!("{}:", config.url.username());
                Some(format!("Basic {}", BASE64.encode(credentials)))
            }
            None => None,
        };

        let content_base = config.url.clone();
        Ok(Self {
            config,
            state: SessionState::Disconnected,
            cseq: 0,
            io: None,
            session_id: None,
            content_base,
            tracks: Vec::new(),
            authorization,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn tracks_mut(&mut self) -> &mut [Track] {
        &mut self.tracks
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    fn require_state(&self, allowed: &[SessionState], operation: &str) -> SessionResult<()> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        Err(SessionError::ProtocolState(format!(
            "{} is not allowed while {}",
            operation, self.state
        )))
    }

    pub async fn connect(&mut self) -> SessionResult<()> {
        self.require_state(&[SessionState::Disconnected], "connect")?;

        let host = self
            .config
            .url
            .host_str()
            .expect("validated config carries a host")
            .to_owned();
        let port = self.config.rtsp_port();
        let stream = tokio::time::timeout(
            Duration::from_millis(self.config.connect_timeout_ms),
            TcpStream::connect((host.as_str(), port)),
        )
        .await
        .map_err(|_| SessionError::Connect(format!("connect to {}:{} timed out", host, port)))?
        .map_err(|err| SessionError::Connect(format!("{}:{}: {}", host, port, err)))?;

        tracing::info!("rtsp control connection established to {}:{}", host, port);
        self.io = Some(Framed::new(stream, RtspClientCodec));
        self.state = SessionState::Connected;
        Ok(())
    }

    pub async fn options(&mut self) -> SessionResult<()> {
        self.require_state(
            &[
                SessionState::Connected,
                SessionState::Described,
                SessionState::Setup,
                SessionState::Playing,
                SessionState::Paused,
            ],
            "options",
        )?;
        let request = self.build_request(RtspMethod::Options, self.content_base.clone(), vec![])?;
        self.exchange(request).await?;
        Ok(())
    }

    pub async fn describe(&mut self) -> SessionResult<()> {
        self.require_state(&[SessionState::Connected], "describe")?;

        let request = self.build_request(
            RtspMethod::Describe,
            self.config.url.clone(),
            vec![(RtspHeader::Accept, "application/sdp".to_owned())],
        )?;
        let response = self.exchange(request).await?;

        // the effective base url for track controls, rfc 2326 C.1.1 order
        if let Some(base) = response
            .headers()
            .get_unique(RtspHeader::ContentBase)
            .or_else(|| response.headers().get_unique(RtspHeader::ContentLocation))
        {
            self.content_base =
                Url::parse(base).map_err(|err| SessionError::Message(err.into()))?;
        }

        let body = response.body().ok_or_else(|| {
            SessionError::ProtocolState("describe response carries no sdp body".to_owned())
        })?;
        let sdp: SessionDescription = SessionDescription::reader().read_from(body)?;

        if let Some(session_control) = sdp.get_control() {
            if session_control != "*" {
                if let Ok(url) = Url::parse(session_control) {
                    self.content_base = url;
                }
            }
        }

        self.tracks = tracks_from_sdp(&sdp, &self.content_base)?;
        tracing::info!(
            "described {}: {} tracks",
            self.config.url,
            self.tracks.len()
        );
        self.state = SessionState::Described;
        Ok(())
    }

    /// Issues one SETUP per track. The local port pairs must have been
    /// written into the track table (the pipeline binds them first).
    pub async fn setup(&mut self) -> SessionResult<()> {
        self.require_state(&[SessionState::Described], "setup")?;

        for index in 0..self.tracks.len() {
            let track = self.tracks[index].clone();
            debug_assert!(track.rtp_port != 0, "ports are bound before setup");

            let transport = TransportHeader::unicast_udp(track.rtp_port, track.rtcp_port);
            let request = self.build_request(
                RtspMethod::Setup,
                track.control_url.clone(),
                vec![(RtspHeader::Transport, format!("{}", transport))],
            )?;
            let response = self.exchange(request).await?;

            // the first response assigns the session id every later
            // request must echo
            if self.session_id.is_none() {
                let Some(id) = response.headers().session_id() else {
                    return Err(SessionError::ProtocolState(
                        "setup response carries no session id".to_owned(),
                    ));
                };
                self.session_id = Some(id.to_owned());
            }

            if let Some(value) = response.headers().get_unique(RtspHeader::Transport) {
                match value.parse::<TransportHeader>() {
                    Ok(server_transport) => tracing::debug!(
                        "track {} transport: {:?}",
                        index,
                        server_transport.server_port
                    ),
                    Err(err) => tracing::warn!("unparseable transport reply: {}", err),
                }
            }
        }

        tracing::info!(
            "setup complete, session id {:?}",
            self.session_id.as_deref().unwrap_or("-")
        );
        self.state = SessionState::Setup;
        Ok(())
    }

    pub async fn play(&mut self) -> SessionResult<()> {
        self.require_state(&[SessionState::Setup, SessionState::Paused], "play")?;
        let request = self.build_request(
            RtspMethod::Play,
            self.content_base.clone(),
            vec![(RtspHeader::Range, "npt=0.000-".to_owned())],
        )?;
        self.exchange(request).await?;
        self.state = SessionState::Playing;
        Ok(())
    }

    pub async fn pause(&mut self) -> SessionResult<()> {
        self.require_state(&[SessionState::Playing], "pause")?;
        let request = self.build_request(RtspMethod::Pause, self.content_base.clone(), vec![])?;
        self.exchange(request).await?;
        self.state = SessionState::Paused;
        Ok(())
    }

    /// Keepalive while the server streams; OPTIONS with the session id is
    /// what the widest range of servers accepts.
    pub async fn keepalive(&mut self) -> SessionResult<()> {
        self.require_state(&[SessionState::Playing, SessionState::Paused], "keepalive")?;
        let request = self.build_request(RtspMethod::Options, self.content_base.clone(), vec![])?;
        self.exchange(request).await?;
        Ok(())
    }

    /// Always leaves the session in `Disconnected`; a second call is a
    /// no-op. The TEARDOWN request itself is best effort.
    pub async fn teardown(&mut self) -> SessionResult<()> {
        if self.state == SessionState::Disconnected {
            return Ok(());
        }

        if self.io.is_some() && self.session_id.is_some() {
            match self.build_request(RtspMethod::TearDown, self.content_base.clone(), vec![]) {
                Ok(request) => {
                    if let Err(err) = self.exchange(request).await {
                        tracing::warn!("teardown request failed, closing locally: {}", err);
                    }
                }
                Err(err) => tracing::warn!("teardown request build failed: {}", err),
            }
        }

        self.io = None;
        self.session_id = None;
        self.tracks.clear();
        self.state = SessionState::Disconnected;
        tracing::info!("session torn down");
        Ok(())
    }

    fn next_cseq(&mut self) -> u64 {
        self.cseq += 1;
        self.cseq
    }

    fn build_request(
        &mut self,
        method: RtspMethod,
        uri: Url,
        extra_headers: Vec<(RtspHeader, String)>,
    ) -> SessionResult<RtspRequest> {
        let mut builder = RtspRequest::builder()
            .method(method)
            .uri(uri)
            .header(RtspHeader::CSeq, format!("{}", self.next_cseq()))
            .header(RtspHeader::UserAgent, USER_AGENT);
        if let Some(authorization) = &self.authorization {
            builder = builder.header(RtspHeader::Authorization, authorization.clone());
        }
        if let Some(session_id) = &self.session_id {
            builder = builder.header(RtspHeader::Session, session_id.clone());
        }
        builder = builder.headers(extra_headers);
        Ok(builder.build()?)
    }

    async fn exchange(&mut self, request: RtspRequest) -> SessionResult<RtspResponse> {
        let method = request.method();
        let sent_cseq = request.headers().cseq();
        tracing::debug!("sending rtsp request: {} {}", method, request.uri());

        let timeout = Duration::from_millis(self.config.connect_timeout_ms);
        let io = self.io.as_mut().ok_or_else(|| {
            SessionError::ProtocolState("no control connection".to_owned())
        })?;

        tokio::time::timeout(timeout, io.send(request))
            .await
            .map_err(|_| SessionError::RequestTimeout(method))??;

        loop {
            let received = tokio::time::timeout(timeout, io.next())
                .await
                .map_err(|_| SessionError::RequestTimeout(method))?;
            let response = match received {
                Some(Ok(response)) => response,
                Some(Err(err)) => return Err(err.into()),
                None => {
                    return Err(SessionError::Connect(
                        "control connection closed by the server".to_owned(),
                    ));
                }
            };

            // a stale reply to an earlier request is skipped, not fatal
            if let (Some(sent), Some(received_cseq)) = (sent_cseq, response.headers().cseq()) {
                if received_cseq != sent {
                    tracing::warn!(
                        "skipping response with stale cseq {} (waiting for {})",
                        received_cseq,
                        sent
                    );
                    continue;
                }
            }

            if !response.status().is_success() {
                return Err(SessionError::Status {
                    code: response.status().code(),
                    phrase: response.reason().to_owned(),
                });
            }
            return Ok(response);
        }
    }
}
