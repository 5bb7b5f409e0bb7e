//! Config subcommand handlers.

use dialoguer::{Confirm, Input};

use devtrack_core::config::DEFAULT_API_URL;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("devtrack configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let api_url: String = Input::new()
        .with_prompt("API base URL")
        .default(global.api_url.clone().unwrap_or_else(|| DEFAULT_API_URL.into()))
        .validate_with(|input: &String| -> Result<(), String> {
            url::Url::parse(input)
                .map(|_| ())
                .map_err(|e| format!("invalid URL: {e}"))
        })
        .interact_text()
        .map_err(prompt_err)?;

    let insecure = Confirm::new()
        .with_prompt("Accept invalid TLS certificates?")
        .default(false)
        .interact()
        .map_err(prompt_err)?;

    let page_size: u32 = Input::new()
        .with_prompt("Records per page")
        .default(25)
        .interact_text()
        .map_err(prompt_err)?;

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(
        profile_name.clone(),
        Profile {
            api_url,
            insecure: insecure.then_some(true),
            page_size: (page_size != cfg.defaults.page_size).then_some(page_size),
            ..Profile::default()
        },
    );
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: devtrack list");
    Ok(())
}

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config()?;
    let out = match global.output {
        OutputFormat::Table | OutputFormat::Plain => {
            toml::to_string_pretty(&cfg).map_err(config::ConfigError::from)?
        }
        ref other => output::render_single(other, &cfg, |_| String::new(), |_| String::new())?,
    };
    output::print_output(out.trim_end(), global.quiet);
    Ok(())
}

fn profiles(cfg: &Config) {
    let default = cfg.default_profile.as_deref().unwrap_or("default");
    if cfg.profiles.is_empty() {
        eprintln!("No profiles configured. Run: devtrack config init");
        return;
    }
    for name in cfg.profiles.keys() {
        let marker = if name == default { " *" } else { "" };
        println!("{name}{marker}");
    }
}

fn use_profile(name: String) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();
    if !cfg.profiles.contains_key(&name) {
        return Err(CliError::ProfileNotFound {
            available: config::available_profiles(&cfg),
            name,
        });
    }
    cfg.default_profile = Some(name.clone());
    config::save_config(&cfg)?;
    eprintln!("✓ Default profile set to '{name}'");
    Ok(())
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),
        ConfigCommand::Show => show(global),
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
        ConfigCommand::Profiles => {
            profiles(&config::load_config_or_default());
            Ok(())
        }
        ConfigCommand::Use { name } => use_profile(name),
    }
}
