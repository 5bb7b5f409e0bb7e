//! Side navigation with a visible focus marker.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::screen::ScreenId;
use crate::theme;

/// Render the navigation list. `active` is the entry for the current
/// route; `cursor` is the entry under the keyboard when focused.
pub fn render(frame: &mut Frame, area: Rect, active: ScreenId, cursor: usize, focused: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            theme::border_focused()
        } else {
            theme::border_default()
        });

    let lines: Vec<Line> = ScreenId::NAV
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let marker = if focused && i == cursor { "▸ " } else { "  " };
            let style = if i == active.nav_index() {
                theme::nav_active()
            } else {
                theme::nav_inactive()
            };
            Line::from(vec![
                Span::styled(marker, theme::key_hint_key()),
                Span::styled(format!("{} {}", i + 1, id.label()), style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
