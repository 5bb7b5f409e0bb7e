//! Deviation form: create and edit with inline field errors.
//!
//! Text fields are backed by `tui_input::Input` and mirrored into the core
//! `DeviationForm`, which owns validation, dirty tracking and payloads.
//! Status and priority are choice fields cycled with ←/→.

use std::collections::BTreeMap;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tui_input::{Input, InputRequest};

use devtrack_core::{
    Deviation, DeviationForm, DeviationPriority, DeviationStatus, FormField, Route,
};

use crate::action::{Action, Notification};
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

/// Step through `all` from `current`, wrapping at both ends.
fn step<T: Copy + PartialEq>(current: Option<T>, all: &[T], forward: bool) -> Option<T> {
    let len = all.len();
    if len == 0 {
        return None;
    }
    let idx = current
        .and_then(|c| all.iter().position(|v| *v == c))
        .unwrap_or(0);
    let next = if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    };
    all.get(next).copied()
}

fn is_choice(field: FormField) -> bool {
    matches!(field, FormField::Status | FormField::Priority)
}

fn hint(field: FormField) -> Option<&'static str> {
    match field {
        FormField::DueDate => Some("YYYY-MM-DD"),
        FormField::Tags => Some("comma separated"),
        _ => None,
    }
}

/// What the screen is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Create,
    /// Waiting for the resolver.
    Loading(String),
    Edit,
    /// The edit route's record could not be resolved.
    Missing(String),
}

pub struct FormScreen {
    focused: bool,
    mode: Mode,
    form: DeviationForm,
    inputs: BTreeMap<FormField, Input>,
    active: usize,
    submitting: bool,
    throbber_state: ThrobberState,
}

impl FormScreen {
    pub fn new() -> Self {
        let mut screen = Self {
            focused: false,
            mode: Mode::Create,
            form: DeviationForm::new(),
            inputs: BTreeMap::new(),
            active: 0,
            submitting: false,
            throbber_state: ThrobberState::default(),
        };
        screen.sync_inputs();
        screen
    }

    fn reset(&mut self, mode: Mode, form: DeviationForm) {
        self.mode = mode;
        self.form = form;
        self.active = 0;
        self.submitting = false;
        self.sync_inputs();
    }

    fn load(&mut self, record: &Deviation) {
        self.reset(Mode::Edit, DeviationForm::edit(record));
    }

    /// Rebuild the text inputs from the form values.
    fn sync_inputs(&mut self) {
        self.inputs = self
            .form
            .fields()
            .into_iter()
            .filter(|f| !is_choice(*f))
            .map(|f| (f, Input::new(self.form.value(f).to_owned())))
            .collect();
    }

    fn fields(&self) -> Vec<FormField> {
        self.form.fields()
    }

    fn active_field(&self) -> Option<FormField> {
        self.fields().get(self.active).copied()
    }

    fn editable(&self) -> bool {
        matches!(self.mode, Mode::Create | Mode::Edit) && !self.submitting
    }

    fn move_focus(&mut self, forward: bool) {
        if let Some(field) = self.active_field() {
            self.form.touch(field);
        }
        let len = self.fields().len();
        if len == 0 {
            return;
        }
        self.active = if forward {
            (self.active + 1) % len
        } else {
            (self.active + len - 1) % len
        };
    }

    fn cycle_choice(&mut self, field: FormField, forward: bool) {
        match field {
            FormField::Status => {
                if let Some(next) = step(self.form.status(), &STATUSES, forward) {
                    self.form.set_status(next);
                }
            }
            FormField::Priority => {
                if let Some(next) = step(self.form.priority(), &PRIORITIES, forward) {
                    self.form.set_priority(next);
                }
            }
            _ => {}
        }
    }

    fn edit_text(&mut self, field: FormField, request: InputRequest) {
        let Some(input) = self.inputs.get_mut(&field) else {
            return;
        };
        if input.handle(request).is_some_and(|change| change.value) {
            let value = input.value().to_owned();
            self.form.set(field, value);
        }
    }

    fn submit(&mut self) -> Option<Action> {
        self.form.mark_all_touched();
        if !self.form.is_valid() {
            return Some(Action::Notify(Notification::error(
                "Fix the highlighted fields before saving",
            )));
        }

        let action = match self.form.editing_id() {
            Some(id) => match self.form.to_update() {
                Ok(update) if update.is_empty() => {
                    return Some(Action::Notify(Notification::info("Nothing to save")));
                }
                Ok(update) => Action::SubmitUpdate(id.to_owned(), update),
                Err(e) => return Some(Action::Notify(Notification::error(e.to_string()))),
            },
            None => match self.form.to_create() {
                Ok(payload) => Action::SubmitCreate(payload),
                Err(e) => return Some(Action::Notify(Notification::error(e.to_string()))),
            },
        };
        self.submitting = true;
        Some(action)
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn title(&self) -> String {
        match &self.mode {
            Mode::Create => " New Deviation ".into(),
            Mode::Loading(id) | Mode::Missing(id) => format!(" Deviation {id} "),
            Mode::Edit => {
                let dirty = if self.form.is_dirty() { " ●" } else { "" };
                format!(" Edit Deviation{dirty} ")
            }
        }
    }

    fn render_field(&self, frame: &mut Frame, area: Rect, field: FormField, active: bool) {
        let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);

        let marker = if active && self.focused { "▸ " } else { "  " };
        let required = if field.is_required() { " *" } else { "" };
        let mut label = vec![
            Span::styled(marker, theme::key_hint_key()),
            Span::styled(format!("{field}{required}"), theme::label()),
        ];
        if let Some(h) = hint(field) {
            label.push(Span::styled(format!("  ({h})"), theme::key_hint()));
        }

        let value_style = if active && self.focused {
            Style::default()
                .fg(theme::NEON_CYAN)
                .add_modifier(Modifier::UNDERLINED)
        } else {
            theme::table_row()
        };

        let value: Span = match field {
            FormField::Status => self
                .form
                .status()
                .map_or_else(|| Span::styled("─", value_style), badges::status),
            FormField::Priority => self
                .form
                .priority()
                .map_or_else(|| Span::styled("─", value_style), badges::priority),
            _ => Span::styled(self.form.value(field).to_owned(), value_style),
        };

        let mut line = vec![Span::raw("    "), value];
        if is_choice(field) && active && self.focused {
            line.push(Span::styled("  ←/→", theme::key_hint()));
        }
        if let Some(error) = self.form.error(field) {
            line.push(Span::styled(format!("   {error}"), theme::field_error()));
        }

        frame.render_widget(Paragraph::new(Line::from(label)), rows[0]);
        frame.render_widget(Paragraph::new(Line::from(line)), rows[1]);

        if active && self.focused && self.editable() {
            if let Some(input) = self.inputs.get(&field) {
                let x = u16::try_from(4 + input.visual_cursor()).unwrap_or(u16::MAX);
                frame.set_cursor_position((rows[1].x.saturating_add(x), rows[1].y));
            }
        }
    }

    fn render_message(&self, frame: &mut Frame, area: Rect, text: &str, spinner: bool) {
        if spinner {
            let throbber = Throbber::default()
                .label(format!("  {text}"))
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, area, &mut self.throbber_state.clone());
        } else {
            frame.render_widget(
                Paragraph::new(format!("  {text}"))
                    .style(theme::field_error())
                    .wrap(Wrap { trim: false }),
                area,
            );
        }
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect) {
        let spans = if self.submitting {
            vec![Span::styled("  Saving…", theme::key_hint())]
        } else {
            vec![
                Span::styled("  Tab ", theme::key_hint_key()),
                Span::styled("next field  ", theme::key_hint()),
                Span::styled("Ctrl+S ", theme::key_hint_key()),
                Span::styled("save  ", theme::key_hint()),
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("back to list", theme::key_hint()),
            ]
        };
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

impl Component for FormScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.code == KeyCode::Esc {
            return Ok(Some(Action::Navigate(Route::DeviationList)));
        }
        if !self.editable() {
            return Ok(None);
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(match key.code {
                KeyCode::Char('s') => self.submit(),
                _ => None,
            });
        }

        let Some(field) = self.active_field() else {
            return Ok(None);
        };

        match key.code {
            KeyCode::Tab | KeyCode::Down | KeyCode::Enter => self.move_focus(true),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(false),
            KeyCode::Left if is_choice(field) => self.cycle_choice(field, false),
            KeyCode::Right | KeyCode::Char(' ') if is_choice(field) => {
                self.cycle_choice(field, true);
            }
            KeyCode::Char(c) => self.edit_text(field, InputRequest::InsertChar(c)),
            KeyCode::Backspace => self.edit_text(field, InputRequest::DeletePrevChar),
            KeyCode::Delete => self.edit_text(field, InputRequest::DeleteNextChar),
            KeyCode::Left => self.edit_text(field, InputRequest::GoToPrevChar),
            KeyCode::Right => self.edit_text(field, InputRequest::GoToNextChar),
            KeyCode::Home => self.edit_text(field, InputRequest::GoToStart),
            KeyCode::End => self.edit_text(field, InputRequest::GoToEnd),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::RouteEntered(Route::DeviationCreate) => {
                self.reset(Mode::Create, DeviationForm::new());
            }
            Action::RouteEntered(Route::DeviationEdit(id)) => {
                self.reset(Mode::Loading(id.clone()), DeviationForm::new());
            }
            Action::FormLoaded(record) => {
                if let Mode::Loading(ref id) = self.mode {
                    match record.as_deref() {
                        Some(record) if record.id == *id => self.load(record),
                        _ => self.mode = Mode::Missing(id.clone()),
                    }
                }
            }
            Action::SaveFinished(ok) => {
                self.submitting = false;
                if *ok {
                    self.form.mark_pristine();
                }
            }
            Action::Tick if matches!(self.mode, Mode::Loading(_)) || self.submitting => {
                self.throbber_state.calc_next();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(self.title())
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let outer = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

        match &self.mode {
            Mode::Loading(_) => {
                self.render_message(frame, outer[0], "Loading deviation…", true);
                return;
            }
            Mode::Missing(id) => {
                self.render_message(
                    frame,
                    outer[0],
                    &format!("Deviation {id} could not be loaded. Press Esc to go back."),
                    false,
                );
                return;
            }
            Mode::Create | Mode::Edit => {}
        }

        let fields = self.fields();
        let constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
        let slots = Layout::vertical(constraints).split(outer[0]);
        for (i, (field, slot)) in fields.iter().zip(slots.iter()).enumerate() {
            self.render_field(frame, *slot, *field, i == self.active);
        }
        self.render_hints(frame, outer[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_dirty(&self) -> bool {
        self.form.is_dirty()
    }

    fn captures_text(&self) -> bool {
        self.editable()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(screen: &mut FormScreen, text: &str) {
        for c in text.chars() {
            screen.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
    }

    fn record() -> Deviation {
        Deviation {
            id: "dev-7".into(),
            title: "Pump Leak".into(),
            description: "Oil pooling under pump 3".into(),
            status: DeviationStatus::Open,
            priority: DeviationPriority::High,
            category: "Equipment".into(),
            created_by: "alice".into(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap(),
            assigned_to: None,
            due_date: None,
            tags: None,
        }
    }

    #[test]
    fn typing_marks_form_dirty() {
        let mut screen = FormScreen::new();
        assert!(!screen.is_dirty());
        type_text(&mut screen, "Pump");
        assert!(screen.is_dirty());
        assert_eq!(screen.form.value(FormField::Title), "Pump");
    }

    #[test]
    fn invalid_submit_reveals_errors() {
        let mut screen = FormScreen::new();
        let action = screen.handle_key_event(ctrl('s')).unwrap();
        assert!(matches!(action, Some(Action::Notify(_))));
        assert_eq!(
            screen.form.error(FormField::Title).as_deref(),
            Some("This field is required")
        );
        assert!(!screen.submitting);
    }

    #[test]
    fn valid_create_submits_payload() {
        let mut screen = FormScreen::new();
        type_text(&mut screen, "Pump Leak");
        screen.handle_key_event(key(KeyCode::Tab)).unwrap();
        type_text(&mut screen, "Oil pooling under pump 3");
        screen.handle_key_event(key(KeyCode::Tab)).unwrap(); // priority
        screen.handle_key_event(key(KeyCode::Right)).unwrap(); // medium -> low
        screen.handle_key_event(key(KeyCode::Tab)).unwrap();
        type_text(&mut screen, "Equipment");

        let action = screen.handle_key_event(ctrl('s')).unwrap();
        match action {
            Some(Action::SubmitCreate(payload)) => {
                assert_eq!(payload.title, "Pump Leak");
                assert_eq!(payload.priority, DeviationPriority::Low);
                assert_eq!(payload.category, "Equipment");
            }
            other => panic!("unexpected action: {other:?}"),
        }
        assert!(screen.submitting);
        assert!(!screen.captures_text());
    }

    #[test]
    fn edit_route_waits_for_resolver() {
        let mut screen = FormScreen::new();
        screen
            .update(&Action::RouteEntered(Route::DeviationEdit("dev-7".into())))
            .unwrap();
        assert_eq!(screen.mode, Mode::Loading("dev-7".into()));

        screen
            .update(&Action::FormLoaded(Some(Arc::new(record()))))
            .unwrap();
        assert_eq!(screen.mode, Mode::Edit);
        assert_eq!(screen.form.value(FormField::Title), "Pump Leak");
        assert!(!screen.is_dirty());
    }

    #[test]
    fn unresolved_edit_shows_missing() {
        let mut screen = FormScreen::new();
        screen
            .update(&Action::RouteEntered(Route::DeviationEdit("dev-404".into())))
            .unwrap();
        screen.update(&Action::FormLoaded(None)).unwrap();
        assert_eq!(screen.mode, Mode::Missing("dev-404".into()));
    }

    #[test]
    fn unchanged_edit_has_nothing_to_save() {
        let mut screen = FormScreen::new();
        screen
            .update(&Action::RouteEntered(Route::DeviationEdit("dev-7".into())))
            .unwrap();
        screen
            .update(&Action::FormLoaded(Some(Arc::new(record()))))
            .unwrap();
        let action = screen.handle_key_event(ctrl('s')).unwrap();
        assert!(matches!(action, Some(Action::Notify(n)) if n.message == "Nothing to save"));
    }

    #[test]
    fn successful_save_clears_dirty() {
        let mut screen = FormScreen::new();
        type_text(&mut screen, "Pump");
        screen.update(&Action::SaveFinished(true)).unwrap();
        assert!(!screen.is_dirty());
    }

    #[test]
    fn step_wraps_both_ways() {
        assert_eq!(
            step(Some(DeviationPriority::Low), &PRIORITIES, true),
            Some(DeviationPriority::Critical)
        );
        assert_eq!(
            step(Some(DeviationPriority::Critical), &PRIORITIES, false),
            Some(DeviationPriority::Low)
        );
    }
}
