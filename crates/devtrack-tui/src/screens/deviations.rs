//! Deviation list: table with badges, filter cycling, search and counts.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use tui_input::{Input, InputRequest};

use devtrack_core::{
    Deviation, DeviationPriority, DeviationState, DeviationStatus, FilterUpdate, Route,
};

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::theme;
use crate::widgets::badges;

const STATUSES: [DeviationStatus; 5] = [
    DeviationStatus::Open,
    DeviationStatus::InProgress,
    DeviationStatus::UnderReview,
    DeviationStatus::Closed,
    DeviationStatus::Rejected,
];

const PRIORITIES: [DeviationPriority; 4] = [
    DeviationPriority::Critical,
    DeviationPriority::High,
    DeviationPriority::Medium,
    DeviationPriority::Low,
];

/// Next filter value: none → first → … → last → none.
fn cycle<T: Copy + PartialEq>(current: Option<T>, all: &[T]) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(value) => all
            .iter()
            .position(|v| *v == value)
            .and_then(|i| all.get(i + 1))
            .copied(),
    }
}

pub struct DeviationsScreen {
    focused: bool,
    state: Arc<DeviationState>,
    rows: Vec<Arc<Deviation>>,
    table_state: TableState,
    search: Input,
    searching: bool,
}

impl DeviationsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            state: Arc::default(),
            rows: Vec::new(),
            table_state: TableState::default().with_selected(Some(0)),
            search: Input::default(),
            searching: false,
        }
    }

    fn selected(&self) -> Option<&Arc<Deviation>> {
        self.rows.get(self.table_state.selected().unwrap_or(0))
    }

    fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = current
            .saturating_add_signed(delta)
            .min(self.rows.len() - 1);
        self.table_state.select(Some(next));
    }

    fn search_filter(&self) -> Action {
        let value = self.search.value().to_owned();
        Action::SetFilters(FilterUpdate::search((!value.is_empty()).then_some(value)))
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Option<Action> {
        let request = match key.code {
            KeyCode::Esc => {
                self.searching = false;
                self.search.reset();
                return Some(self.search_filter());
            }
            KeyCode::Enter => {
                self.searching = false;
                return None;
            }
            KeyCode::Char(c) => InputRequest::InsertChar(c),
            KeyCode::Backspace => InputRequest::DeletePrevChar,
            KeyCode::Delete => InputRequest::DeleteNextChar,
            KeyCode::Left => InputRequest::GoToPrevChar,
            KeyCode::Right => InputRequest::GoToNextChar,
            KeyCode::Home => InputRequest::GoToStart,
            KeyCode::End => InputRequest::GoToEnd,
            _ => return None,
        };
        self.search
            .handle(request)
            .filter(|change| change.value)
            .map(|_| self.search_filter())
    }

    fn page_action(&self, forward: bool) -> Option<Action> {
        let p = self.state.pagination;
        let last = u32::try_from(p.page_count()).unwrap_or(u32::MAX).max(1);
        if forward && p.page < last {
            Some(Action::LoadPage(p.page + 1))
        } else if !forward && p.page > 1 {
            Some(Action::LoadPage(p.page - 1))
        } else {
            None
        }
    }

    fn render_filters(&self, frame: &mut Frame, area: Rect) {
        let filters = &self.state.filters;
        let status = filters.status.map_or_else(
            || Span::styled("any", theme::nav_inactive()),
            badges::status,
        );
        let priority = filters.priority.map_or_else(
            || Span::styled("any", theme::nav_inactive()),
            badges::priority,
        );
        let search_style = if self.searching {
            Style::default().fg(theme::NEON_CYAN)
        } else {
            theme::nav_inactive()
        };
        let search = if self.search.value().is_empty() && !self.searching {
            "—".to_owned()
        } else {
            self.search.value().to_owned()
        };

        let mut spans = vec![
            Span::styled(" Status ", theme::label()),
            status,
            Span::styled("   Priority ", theme::label()),
            priority,
            Span::styled("   Search ", theme::label()),
        ];
        let prefix: usize = spans.iter().map(Span::width).sum();
        spans.push(Span::styled(search, search_style));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);

        if self.searching && self.focused {
            let offset = u16::try_from(prefix + self.search.visual_cursor()).unwrap_or(u16::MAX);
            frame.set_cursor_position((area.x.saturating_add(offset), area.y));
        }
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let p = self.state.pagination;
        let title = format!(
            " Deviations ({} shown · page {}/{} · {} total) ",
            self.rows.len(),
            p.page,
            p.page_count().max(1),
            p.total
        );
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        if self.rows.is_empty() {
            let message = if self.state.loading {
                "  Loading deviations…"
            } else if self.state.filters.is_empty() {
                "  No deviations yet. Press n to create one."
            } else {
                "  No deviations match the current filters."
            };
            frame.render_widget(
                Paragraph::new(message).style(theme::table_row()).block(block),
                area,
            );
            return;
        }

        let header = Row::new(["Title", "Status", "Priority", "Category", "Assignee", "Due"])
            .style(theme::table_header());
        let rows = self.rows.iter().map(|d| {
            Row::new(vec![
                Cell::from(d.title.clone()),
                Cell::from(badges::status(d.status)),
                Cell::from(badges::priority(d.priority)),
                Cell::from(d.category.clone()),
                Cell::from(d.assigned_to.clone().unwrap_or_else(|| "─".into())),
                Cell::from(
                    d.due_date
                        .map_or_else(|| "─".into(), |dt| dt.date_naive().to_string()),
                ),
            ])
            .style(theme::table_row())
        });

        let table = Table::new(
            rows,
            [
                Constraint::Fill(3),
                Constraint::Length(16),
                Constraint::Length(12),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Length(11),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(theme::table_selected())
        .highlight_symbol("▸ ");

        frame.render_stateful_widget(table, area, &mut self.table_state.clone());
    }

    fn render_counts(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(" ", theme::label())];
        for (status, count) in self.state.counts_by_status() {
            spans.push(badges::status(status));
            spans.push(Span::styled(format!(" {count}   "), theme::table_row()));
        }
        spans.push(Span::styled("│ ", theme::key_hint()));
        for (priority, count) in self.state.counts_by_priority() {
            spans.push(badges::priority(priority));
            spans.push(Span::styled(format!(" {count}   "), theme::table_row()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_hints(frame: &mut Frame, area: Rect) {
        let hint = |key: &'static str, text: &'static str| {
            [
                Span::styled(key, theme::key_hint_key()),
                Span::styled(text, theme::key_hint()),
            ]
        };
        let spans: Vec<Span> = [
            hint(" n ", "new  "),
            hint("Enter ", "edit  "),
            hint("v ", "view  "),
            hint("d ", "delete  "),
            hint("s/p ", "filter  "),
            hint("/ ", "search  "),
            hint("c ", "clear  "),
            hint("[/] ", "page  "),
            hint("r ", "reload"),
        ]
        .into_iter()
        .flatten()
        .collect();
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

impl Component for DeviationsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.searching {
            return Ok(self.handle_search_key(key));
        }
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return Ok(None);
        }

        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.table_state.select(Some(0));
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.table_state.select(Some(self.rows.len().saturating_sub(1)));
                None
            }
            KeyCode::Enter => self
                .selected()
                .map(|d| Action::Navigate(Route::DeviationEdit(d.id.clone()))),
            KeyCode::Char('v') => self
                .selected()
                .map(|d| Action::Navigate(Route::PublicDeviation(d.id.clone()))),
            KeyCode::Char('n') => Some(Action::Navigate(Route::DeviationCreate)),
            KeyCode::Char('d') => self.selected().map(|d| {
                Action::ShowConfirm(ConfirmAction::DeleteDeviation {
                    id: d.id.clone(),
                    title: d.title.clone(),
                })
            }),
            KeyCode::Char('s') => Some(Action::SetFilters(FilterUpdate::status(cycle(
                self.state.filters.status,
                &STATUSES,
            )))),
            KeyCode::Char('p') => Some(Action::SetFilters(FilterUpdate::priority(cycle(
                self.state.filters.priority,
                &PRIORITIES,
            )))),
            KeyCode::Char('/') => {
                self.searching = true;
                None
            }
            KeyCode::Char('c') => {
                self.search.reset();
                Some(Action::ClearFilters)
            }
            KeyCode::Char('r') => Some(Action::Reload),
            KeyCode::Char(']') => self.page_action(true),
            KeyCode::Char('[') => self.page_action(false),
            KeyCode::Esc => Some(Action::FocusNav),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::StateUpdated(state) = action {
            self.state = Arc::clone(state);
            self.rows = state.filtered();
            let max = self.rows.len().saturating_sub(1);
            let selected = self.table_state.selected().unwrap_or(0).min(max);
            self.table_state.select(Some(selected));
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Length(1), // filters
            Constraint::Min(3),    // table
            Constraint::Length(1), // counts
            Constraint::Length(1), // hints
        ])
        .split(area);

        self.render_filters(frame, layout[0]);
        self.render_table(frame, layout[1]);
        self.render_counts(frame, layout[2]);
        Self::render_hints(frame, layout[3]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn captures_text(&self) -> bool {
        self.searching
    }
}
