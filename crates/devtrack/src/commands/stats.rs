//! `stats`: server-side deviation statistics.

use tabled::Tabled;

use devtrack_core::{DeviationFacade, DeviationStats};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, priority_badge, should_color, status_badge};

use super::util;

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Group")]
    group: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Count")]
    count: u64,
}

fn rows(stats: &DeviationStats, color: bool) -> Vec<StatRow> {
    let by_status = stats.by_status.iter().map(|(s, n)| StatRow {
        group: "status",
        value: status_badge(*s, color),
        count: *n,
    });
    let by_priority = stats.by_priority.iter().map(|(p, n)| StatRow {
        group: "priority",
        value: priority_badge(*p, color),
        count: *n,
    });
    by_status.chain(by_priority).collect()
}

fn render_table(stats: &DeviationStats, color: bool) -> String {
    let table = tabled::Table::new(rows(stats, color))
        .with(tabled::settings::Style::rounded())
        .to_string();
    format!("Total deviations: {}\n{table}", stats.total)
}

fn plain(stats: &DeviationStats) -> String {
    let mut lines = vec![format!("total={}", stats.total)];
    lines.extend(
        stats
            .by_status
            .iter()
            .map(|(s, n)| format!("status.{s}={n}")),
    );
    lines.extend(
        stats
            .by_priority
            .iter()
            .map(|(p, n)| format!("priority.{p}={n}")),
    );
    lines.join("\n")
}

pub async fn handle(facade: &DeviationFacade, global: &GlobalOpts) -> Result<(), CliError> {
    let stats = util::with_spinner(global, "Loading statistics", facade.load_stats())
        .await
        .ok_or_else(|| util::failure(facade, None))?;

    let color = should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &stats,
        |s| render_table(s, color),
        plain,
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
