use std::path::PathBuf;

use clap::Parser;

/// Pulls a live RTSP stream and republishes it as HLS over HTTP.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct AppCli {
    /// rtsp:// source to pull from
    pub(crate) rtsp_url: String,
    /// directory the playlist and segments are written to
    #[arg(default_value = "./segments")]
    pub(crate) output_dir: PathBuf,
    /// port the http file server listens on
    #[arg(default_value_t = 8080)]
    pub(crate) port: u16,
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, value_name = "LOG_LEVEL")]
    pub(crate) log_level: Option<String>,
}
