//! `devtrack-tui`: keyboard-driven terminal client for deviation records.
//!
//! Built on [ratatui](https://ratatui.rs) over the reactive store in
//! `devtrack-core`. The shell is a header (title, loading throbber, error
//! banner), a side navigation (Deviations, Reports, Settings) and the
//! routed content. `--route` picks the initial screen using the same
//! paths as the web client (`/deviations/new`, `/public/deviation/{id}`).
//!
//! Logs are written to a file (default `/tmp/devtrack-tui.log`) to avoid
//! corrupting the terminal UI.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use devtrack_core::{DeviationFacade, Route, TlsVerification};

use crate::app::App;
use crate::screens::settings::SettingsInfo;

/// Terminal client for tracking deviations.
#[derive(Parser, Debug)]
#[command(name = "devtrack-tui", version, about)]
struct Cli {
    /// Initial route (e.g. /deviations, /deviations/new, /reports)
    #[arg(short = 'r', long, default_value = "/deviations")]
    route: String,

    /// Backend profile to use
    #[arg(short = 'p', long, env = "DEVTRACK_PROFILE")]
    profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(short = 'u', long, env = "DEVTRACK_API_URL")]
    api_url: Option<String>,

    /// Log file path
    #[arg(long, default_value = "/tmp/devtrack-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Nothing may log to stdout/stderr while the
/// terminal is in raw mode. The returned guard flushes on drop.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "devtrack_tui={log_level},devtrack_core={log_level},devtrack_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("."));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("devtrack-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Resolve the profile and build the facade. Flags override the profile.
fn build_facade(cli: &Cli) -> Result<(DeviationFacade, SettingsInfo)> {
    let cfg = devtrack_config::load_config_or_default();
    let profile_name = cfg.active_profile_name(cli.profile.as_deref());
    let mut profile = match cfg.profile(&profile_name) {
        Ok(profile) => profile,
        Err(_) if cli.api_url.is_some() => devtrack_config::Profile::default(),
        Err(e) => return Err(e).wrap_err("could not load profile"),
    };
    if let Some(ref url) = cli.api_url {
        profile.api_url.clone_from(url);
    }

    let client = devtrack_config::profile_to_client_config(&profile, &cfg.defaults)
        .wrap_err("invalid profile")?;
    let facade = DeviationFacade::from_config(&client).wrap_err("could not build API client")?;

    let info = SettingsInfo {
        profile: profile_name,
        api_url: client.api_url.to_string(),
        tls: match client.tls {
            TlsVerification::SystemDefaults => "system roots".into(),
            TlsVerification::CustomCa(ref path) => format!("custom CA ({})", path.display()),
            TlsVerification::DangerAcceptInvalid => "accept invalid certificates".into(),
        },
        timeout: client.timeout,
        page_size: profile.page_size(&cfg.defaults),
        config_path: devtrack_config::config_path(),
    };
    Ok((facade, info))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let (facade, settings) = build_facade(&cli)?;
    let route = Route::parse(&cli.route);
    info!(
        api_url = %settings.api_url,
        profile = %settings.profile,
        route = %route,
        timeout = ?settings.timeout,
        "starting devtrack-tui"
    );

    let mut app = App::new(facade, settings, route);
    app.run().await?;

    Ok(())
}
