mod terminal;

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use mdl_client::catalog::{default_for, find_quality, is_default, options_for, Format, Location};
use mdl_client::config::{load_config, validate_config};
use mdl_client::controller::{DownloadController, SubmissionRequest};
use mdl_client::labels::fetch_location_labels;
use mdl_client::poller::PollState;
use mdl_client::HttpJobApi;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::terminal::TerminalView;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Mp3,
    Mp4,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Mp3 => Format::Mp3,
            FormatArg::Mp4 => Format::Mp4,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LocationArg {
    Default,
    Alt,
}

impl From<LocationArg> for Location {
    fn from(arg: LocationArg) -> Self {
        match arg {
            LocationArg::Default => Location::Default,
            LocationArg::Alt => Location::Alt,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "mdl")]
#[command(about = "Submit a media download to the backend and follow its progress", long_about = None)]
#[command(version)]
struct Args {
    /// Media or playlist URL
    #[arg(required_unless_present = "list_qualities")]
    url: Option<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Quality preset for the chosen format (see --list-qualities)
    #[arg(short, long)]
    quality: Option<String>,

    /// Storage location on the server
    #[arg(short, long, value_enum)]
    location: Option<LocationArg>,

    /// Tag playlist entries with the playlist title as album
    #[arg(long)]
    album: bool,

    /// Print status updates as HTML markup
    #[arg(long)]
    html: bool,

    /// List quality presets for the chosen format and exit
    #[arg(long)]
    list_qualities: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .init();

    let args = Args::parse();

    let mut config = match load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    if let Some(server) = args.server {
        config.server_url = server;
        validate_config(&config)?;
    }

    let format = args.format.map(Format::from).unwrap_or(config.default_format);

    if args.list_qualities {
        for opt in options_for(format) {
            let marker = if is_default(format, opt) { "*" } else { " " };
            println!("{} {:<6} {}", marker, opt.value, opt.label);
        }
        return Ok(());
    }

    let quality = match args.quality {
        Some(q) => {
            if find_quality(format, &q).is_none() {
                let valid: Vec<_> = options_for(format).iter().map(|o| o.value).collect();
                return Err(anyhow!(
                    "Quality {} is not available for {}; choose one of: {}",
                    q,
                    format,
                    valid.join(", ")
                ));
            }
            q
        }
        None => default_for(format).to_string(),
    };
    let location = args.location.map(Location::from).unwrap_or(config.default_location);

    info!("Media download client v{}", env!("CARGO_PKG_VERSION"));
    info!("Server: {}", config.server_url);

    let api = Arc::new(HttpJobApi::new(&config)?);
    let labels = fetch_location_labels(api.as_ref()).await;
    info!("Saving to {}", labels.label_for(location));

    let view = Arc::new(TerminalView::new(args.html));
    let controller = DownloadController::new(api, view, config.poll_interval());

    let request = SubmissionRequest {
        url: args.url.unwrap_or_default(),
        format,
        quality,
        location,
        is_album: args.album,
    };

    match controller.submit(request).await {
        Ok(task_id) => info!("Tracking task {}", task_id),
        Err(e) => {
            error!("Download not started: {}", e);
            return Err(e.into());
        }
    }

    match controller.poller().wait_until_stopped().await {
        PollState::StoppedSuccess => {
            info!("Download complete");
            Ok(())
        }
        state => Err(anyhow!("Download did not complete ({:?})", state)),
    }
}
