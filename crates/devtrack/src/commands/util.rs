//! Shared helpers for command handlers.

use std::future::Future;
use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;

use devtrack_core::{
    DeviationFacade, DeviationPriority, DeviationStatus, FailureKind, SortOrder,
};

use crate::cli::{GlobalOpts, PriorityArg, SortOrderArg, StatusArg};
use crate::error::CliError;

// ── Arg → domain conversions ────────────────────────────────────────

impl From<StatusArg> for DeviationStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Open => Self::Open,
            StatusArg::InProgress => Self::InProgress,
            StatusArg::UnderReview => Self::UnderReview,
            StatusArg::Closed => Self::Closed,
            StatusArg::Rejected => Self::Rejected,
        }
    }
}

impl From<PriorityArg> for DeviationPriority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Critical => Self::Critical,
            PriorityArg::High => Self::High,
            PriorityArg::Medium => Self::Medium,
            PriorityArg::Low => Self::Low,
        }
    }
}

impl From<SortOrderArg> for SortOrder {
    fn from(arg: SortOrderArg) -> Self {
        match arg {
            SortOrderArg::Asc => Self::Asc,
            SortOrderArg::Desc => Self::Desc,
        }
    }
}

// ── Facade failures ─────────────────────────────────────────────────

/// Turn the facade's recorded failure into a CLI error.
///
/// `id` names the record the operation targeted, so a 404 can be reported
/// as a missing deviation rather than a generic failure.
pub fn failure(facade: &DeviationFacade, id: Option<&str>) -> CliError {
    let message = facade
        .error()
        .unwrap_or_else(|| "Request failed".to_owned());
    match (facade.last_failure(), id) {
        (Some(FailureKind::NotFound), Some(id)) => CliError::NotFound { id: id.to_owned() },
        (Some(FailureKind::Connection), _) => CliError::ConnectionFailed {
            url: facade.api().base_url().to_string(),
            reason: message,
        },
        (Some(FailureKind::Timeout), _) => CliError::Timeout,
        _ => CliError::OperationFailed { message },
    }
}

// ── Progress ────────────────────────────────────────────────────────

/// Run `fut` behind a spinner on stderr. Skipped when quiet or when
/// stderr is not a terminal.
pub async fn with_spinner<F: Future>(global: &GlobalOpts, message: &str, fut: F) -> F::Output {
    if global.quiet || !std::io::stderr().is_terminal() {
        return fut.await;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_owned());
    pb.enable_steady_tick(Duration::from_millis(100));

    let out = fut.await;
    pb.finish_and_clear();
    out
}

// ── Prompts & files ─────────────────────────────────────────────────

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without `--yes` a terminal is required; scripts get an error instead
/// of a prompt that can never be answered.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.to_owned(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;

    use devtrack_core::UpdateDeviation;

    use super::*;

    #[test]
    fn arg_enums_map_to_wire_values() {
        assert_eq!(
            DeviationStatus::from(StatusArg::UnderReview).to_string(),
            "under_review"
        );
        assert_eq!(DeviationPriority::from(PriorityArg::Low), DeviationPriority::Low);
        assert_eq!(SortOrder::from(SortOrderArg::Desc), SortOrder::Desc);
    }

    #[test]
    fn read_json_file_parses_partial_update() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"status": "closed"}}"#).unwrap();

        let update: UpdateDeviation = read_json_file(file.path()).unwrap();
        assert_eq!(update.status, Some(DeviationStatus::Closed));
        assert!(update.title.is_none());
    }

    #[test]
    fn read_json_file_reports_bad_json_as_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = read_json_file::<UpdateDeviation>(file.path()).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }
}
