use url::Url;

use crate::errors::{SessionError, SessionResult};

pub const DEFAULT_RTSP_PORT: u16 = 554;

/// Depth of each receiver's packet queue; on overflow the receiver drops,
/// because blocking a UDP reader only amplifies loss.
pub const RTP_CHANNEL_CAPACITY: usize = 256;

/// Depth of the shared access unit queue into the muxer.
pub const ACCESS_UNIT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub url: Url,
    pub connect_timeout_ms: u64,
    pub keepalive_interval_ms: u64,
    pub rtp_base_port: u16,
}

impl SessionConfig {
    pub fn validate(&self) -> SessionResult<()> {
        if !self.url.scheme().starts_with("rtsp") {
            return Err(SessionError::InvalidConfig(format!(
                "expected an rtsp url, got scheme {}",
                self.url.scheme()
            )));
        }
        if self.url.host_str().is_none() {
            return Err(SessionError::InvalidConfig(
                "the rtsp url carries no host".to_owned(),
            ));
        }
        if self.connect_timeout_ms == 0 {
            return Err(SessionError::InvalidConfig(
                "connect timeout must be non-zero".to_owned(),
            ));
        }
        if self.rtp_base_port == 0 || self.rtp_base_port % 2 != 0 {
            return Err(SessionError::InvalidConfig(format!(
                "rtp base port must be a non-zero even port, got {}",
                self.rtp_base_port
            )));
        }
        Ok(())
    }

    pub fn rtsp_port(&self) -> u16 {
        self.url.port().unwrap_or(DEFAULT_RTSP_PORT)
    }
}
