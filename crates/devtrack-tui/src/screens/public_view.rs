//! Public read-only view of a single deviation.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use devtrack_core::{Deviation, DeviationState, Route};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::badges;

pub struct PublicViewScreen {
    focused: bool,
    id: Option<String>,
    state: Arc<DeviationState>,
}

impl PublicViewScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            id: None,
            state: Arc::default(),
        }
    }

    /// The selected record, only if it is the one this route asked for.
    fn record(&self) -> Option<&Arc<Deviation>> {
        let id = self.id.as_deref()?;
        self.state.selected.as_ref().filter(|d| d.id == id)
    }

    fn body(&self) -> Vec<Line<'static>> {
        let Some(d) = self.record() else {
            let text = if self.state.error.is_some() && !self.state.loading {
                "This deviation is not available."
            } else {
                "Loading…"
            };
            return vec![Line::from(Span::styled(text, theme::table_row()))];
        };

        let mut lines = vec![
            Line::from(Span::styled(d.title.clone(), theme::title_style())),
            Line::from(""),
            Line::from(vec![
                badges::status(d.status),
                Span::raw("   "),
                badges::priority(d.priority),
                Span::styled(format!("   {}", d.category), theme::label()),
            ]),
        ];
        if let Some(due) = d.due_date {
            lines.push(Line::from(Span::styled(
                format!("Due {}", due.date_naive()),
                theme::label(),
            )));
        }
        lines.push(Line::from(""));
        lines.extend(
            d.description
                .lines()
                .map(|l| Line::from(Span::styled(l.to_owned(), theme::table_row()))),
        );
        lines
    }
}

impl Component for PublicViewScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match key.code {
            KeyCode::Char('b') | KeyCode::Backspace => Some(Action::Navigate(Route::DeviationList)),
            KeyCode::Esc => Some(Action::FocusNav),
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::RouteEntered(Route::PublicDeviation(id)) => self.id = Some(id.clone()),
            Action::StateUpdated(state) => self.state = Arc::clone(state),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Deviation ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        frame.render_widget(
            Paragraph::new(self.body())
                .block(block)
                .wrap(Wrap { trim: false }),
            area,
        );
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
