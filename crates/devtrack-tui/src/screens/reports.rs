//! Reports: status and priority breakdown of the loaded deviations.

use std::collections::BTreeMap;
use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use devtrack_core::DeviationState;

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::badges;

const BAR_WIDTH: usize = 30;

/// `count / max` scaled to `BAR_WIDTH` block characters.
fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (count * BAR_WIDTH).div_ceil(max);
    "█".repeat(len)
}

fn breakdown<K: Copy>(
    counts: &BTreeMap<K, usize>,
    badge: impl Fn(K) -> Span<'static>,
    color: impl Fn(K) -> ratatui::style::Color,
) -> Vec<Line<'static>> {
    let max = counts.values().copied().max().unwrap_or(0);
    if counts.is_empty() {
        return vec![Line::from(Span::styled("  No data", theme::key_hint()))];
    }
    counts
        .iter()
        .map(|(k, n)| {
            Line::from(vec![
                Span::raw("  "),
                badge(*k),
                Span::raw("  "),
                Span::styled(bar(*n, max), Style::default().fg(color(*k))),
                Span::styled(format!(" {n}"), theme::table_row()),
            ])
        })
        .collect()
}

pub struct ReportsScreen {
    focused: bool,
    state: Arc<DeviationState>,
}

impl ReportsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            state: Arc::default(),
        }
    }

    fn panel(&self, title: &str) -> Block<'static> {
        Block::default()
            .title(format!(" {title} "))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            })
    }
}

impl Component for ReportsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match key.code {
            KeyCode::Char('r') => Some(Action::Reload),
            KeyCode::Esc => Some(Action::FocusNav),
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::StateUpdated(state) = action {
            self.state = Arc::clone(state);
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Min(0),
        ])
        .split(area);

        let shown = self.state.filtered().len();
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!(" {shown} deviations in view"), theme::table_row()),
                Span::styled("   r ", theme::key_hint_key()),
                Span::styled("reload", theme::key_hint()),
            ])),
            layout[0],
        );

        let status = breakdown(
            &self.state.counts_by_status(),
            badges::status,
            theme::status_color,
        );
        frame.render_widget(
            Paragraph::new(status).block(self.panel("By status")),
            layout[1],
        );

        let priority = breakdown(
            &self.state.counts_by_priority(),
            badges::priority,
            theme::priority_color,
        );
        frame.render_widget(
            Paragraph::new(priority).block(self.panel("By priority")),
            layout[2],
        );
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
