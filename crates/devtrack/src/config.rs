//! CLI configuration: thin wrapper around `devtrack_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--profile, --api-url, --insecure, --timeout).

use std::time::Duration;

use devtrack_core::{ClientConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use devtrack_config::{
    Config, ConfigError, Profile, config_path, load_config, load_config_or_default, save_config,
};

/// Connection settings plus the page size the profile asks for.
#[derive(Debug)]
pub struct Resolved {
    pub client: ClientConfig,
    pub page_size: u32,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Build the client configuration: flags override the profile, the
/// profile overrides `[defaults]`.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, config);
    let profile = match config.profile(&profile_name) {
        Ok(profile) => profile,
        // An explicit --api-url makes a missing profile irrelevant.
        Err(_) if global.api_url.is_some() => Profile::default(),
        Err(_) => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(config),
            });
        }
    };

    let profile = Profile {
        api_url: global.api_url.clone().unwrap_or(profile.api_url),
        ..profile
    };

    let mut client = devtrack_config::profile_to_client_config(&profile, &config.defaults)
        .map_err(|e| match e {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        })?;

    if global.insecure {
        client.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        client.timeout = Duration::from_secs(secs);
    }

    Ok(Resolved {
        client,
        page_size: profile.page_size(&config.defaults),
    })
}

pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config
            .profiles
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}
