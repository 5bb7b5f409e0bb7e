//! Status and priority badges.

use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use devtrack_core::{DeviationPriority, DeviationStatus};

use crate::theme;

pub fn status(status: DeviationStatus) -> Span<'static> {
    Span::styled(
        format!("● {}", status.label()),
        Style::default().fg(theme::status_color(status)),
    )
}

pub fn priority(priority: DeviationPriority) -> Span<'static> {
    let style = Style::default().fg(theme::priority_color(priority));
    let style = if priority == DeviationPriority::Critical {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    };
    Span::styled(format!("▲ {}", priority.label()), style)
}
