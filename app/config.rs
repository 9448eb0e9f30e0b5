use std::{env, net::IpAddr, path::Path};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::{cli::AppCli, errors::AppResult, util::parse_log_level};

#[derive(Debug, Deserialize)]
pub(crate) struct Logger {
    pub(crate) level: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Session {
    pub(crate) connect_timeout_ms: u64,
    pub(crate) keepalive_interval_ms: u64,
    pub(crate) rtp_base_port: u16,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Segments {
    pub(crate) segment_duration_ms: u64,
    pub(crate) max_segments: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HttpServer {
    pub(crate) address: IpAddr,
    pub(crate) port: u16,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AppConfig {
    pub(crate) logger: Logger,
    pub(crate) session: Session,
    pub(crate) segments: Segments,
    pub(crate) http_server: HttpServer,
}

impl AppConfig {
    /// Defaults, overlaid by an optional config file (flag or RILL_CONFIG)
    /// and RILL__-prefixed environment variables.
    pub(crate) fn new(config_path: Option<&Path>) -> AppResult<Self> {
        let mut builder = Config::builder()
            .set_default("logger.level", "info")?
            .set_default("session.connect_timeout_ms", 10_000_i64)?
            .set_default("session.keepalive_interval_ms", 30_000_i64)?
            .set_default("session.rtp_base_port", 5000_i64)?
            .set_default("segments.segment_duration_ms", 2000_i64)?
            .set_default("segments.max_segments", 6_i64)?
            .set_default("http_server.address", "0.0.0.0")?
            .set_default("http_server.port", 8080_i64)?;

        let config_path_composed = config_path
            .map(|path| path.to_string_lossy().to_string())
            .or_else(|| env::var("RILL_CONFIG").ok());
        if let Some(path) = config_path_composed {
            builder = builder.add_source(File::with_name(&path));
        }
        builder = builder.add_source(Environment::with_prefix("RILL").separator("__"));

        let config = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    pub(crate) fn apply(&mut self, cli_args: &AppCli) {
        if let Some(level) = &cli_args.log_level {
            self.logger.level = level.clone();
        }
        self.http_server.port = cli_args.port;
    }

    pub(crate) fn validate(&self) -> AppResult<()> {
        let _ = parse_log_level(&self.logger.level)?;
        Ok(())
    }
}
