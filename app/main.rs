mod cli;
mod config;
mod errors;
mod util;

use clap::Parser;
use http_server::{config::HttpServerConfig, server::HttpServer};
use mpegts_formats::psi::StreamType;
use rtsp_session::{
    config::{ACCESS_UNIT_CHANNEL_CAPACITY, SessionConfig},
    errors::SessionError,
    pipeline::RtspPullPipeline,
    track::TrackCodec,
};
use segmenter::segmenter::{HlsSegmenter, SegmenterConfig, run_muxer};
use tokio::{signal, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tracing::Dispatch;
use tracing_subscriber::{self, EnvFilter};
use url::Url;

use crate::{
    cli::AppCli,
    config::AppConfig,
    errors::{AppError, AppResult},
    util::parse_log_level,
};

#[tokio::main]
async fn main() {
    let cli_args = AppCli::parse();
    if let Err(err) = run(cli_args).await {
        eprintln!("rill: {}", err);
        std::process::exit(err.exit_code());
    }
}

async fn run(cli_args: AppCli) -> AppResult<()> {
    let mut app_config = AppConfig::new(cli_args.config.as_deref())?;
    app_config.apply(&cli_args);
    app_config.validate()?;
    init_tracing(&app_config)?;

    let url = Url::parse(&cli_args.rtsp_url)
        .map_err(|err| AppError::InvalidArgument(format!("bad rtsp url: {}", err)))?;
    tokio::fs::create_dir_all(&cli_args.output_dir).await?;

    let shutdown = CancellationToken::new();

    // the pre-media handshake tells us which codecs the muxer must expect
    let session_config = SessionConfig {
        url,
        connect_timeout_ms: app_config.session.connect_timeout_ms,
        keepalive_interval_ms: app_config.session.keepalive_interval_ms,
        rtp_base_port: app_config.session.rtp_base_port,
    };
    let mut pipeline = RtspPullPipeline::new(session_config, shutdown.clone())?;
    pipeline.start().await?;

    let video_stream_type = match pipeline.video_codec()? {
        TrackCodec::H264 => StreamType::H264,
        TrackCodec::H265 => StreamType::H265,
        TrackCodec::Aac => return Err(AppError::Session(SessionError::MissingVideoTrack)),
    };
    let has_audio = pipeline.has_audio();
    tracing::info!(
        "stream negotiated: video {:?}, audio {}",
        video_stream_type,
        has_audio
    );

    let hls_segmenter = HlsSegmenter::new(
        SegmenterConfig {
            output_dir: cli_args.output_dir.clone(),
            segment_duration_ms: app_config.segments.segment_duration_ms,
            max_segments: app_config.segments.max_segments,
        },
        video_stream_type,
        has_audio,
    )?;
    let (unit_sender, unit_receiver) = mpsc::channel(ACCESS_UNIT_CHANNEL_CAPACITY);
    let muxer_task = tokio::spawn(run_muxer(hls_segmenter, unit_receiver, shutdown.clone()));

    let mut http = HttpServer::new(HttpServerConfig {
        address: app_config.http_server.address,
        port: app_config.http_server.port,
        root: cli_args.output_dir.clone(),
    });
    tokio::spawn(async move {
        if let Err(err) = http.run().await {
            tracing::error!("http server exited: {}", err);
        }
    });

    let mut session_task = tokio::spawn(pipeline.run(unit_sender));

    let session_result = tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("shutdown requested");
            shutdown.cancel();
            session_task.await
        }
        result = &mut session_task => {
            shutdown.cancel();
            result
        }
    };
    session_result.map_err(|err| AppError::Task(format!("session: {}", err)))??;

    muxer_task
        .await
        .map_err(|err| AppError::Task(format!("muxer: {}", err)))??;

    tracing::info!("clean shutdown");
    Ok(())
}

fn init_tracing(app_config: &AppConfig) -> AppResult<()> {
    let level = parse_log_level(&app_config.logger.level)?;
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_target(true)
        .with_env_filter(filter)
        .finish();
    tracing::dispatcher::set_global_default(Dispatch::new(subscriber))
        .map_err(|err| AppError::InvalidArgument(format!("tracing init failed: {}", err)))?;
    Ok(())
}
