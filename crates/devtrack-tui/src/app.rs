//! Application core: the event loop and action dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use devtrack_core::{
    DeviationFacade, DeviationState, ListParams, Route, UnsavedChangesGuard, resolve_deviation,
};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, Pace, TerminalEvents};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::screens::settings::SettingsInfo;
use crate::theme;
use crate::tui::Session;
use crate::widgets::sidenav;

const NOTIFICATION_TTL: Duration = Duration::from_secs(3);
const NAV_WIDTH: u16 = 18;

/// Which pane receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Nav,
    Content,
}

/// Top-level application state and event loop.
pub struct App {
    facade: DeviationFacade,
    route: Route,
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    focus: Focus,
    /// Side navigation entry under the keyboard.
    nav_cursor: usize,
    running: bool,
    page_size: u32,
    /// Latest store snapshot, for the header and route side effects.
    state: Arc<DeviationState>,
    throbber_state: ThrobberState,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    data_cancel: CancellationToken,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    notification: Option<(Notification, Instant)>,
}

impl App {
    pub fn new(facade: DeviationFacade, settings: SettingsInfo, route: Route) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let page_size = settings.page_size;
        let screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens(settings).into_iter().collect();
        let state = facade.state();

        Self {
            facade,
            active_screen: ScreenId::for_route(&route),
            route,
            screens,
            focus: Focus::Content,
            nav_cursor: 0,
            running: true,
            page_size,
            state,
            throbber_state: ThrobberState::default(),
            action_tx,
            action_rx,
            data_cancel: CancellationToken::new(),
            pending_confirm: None,
            notification: None,
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        Ok(())
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut session = Session::open()?;
        self.init_screens()?;

        let facade = self.facade.clone();
        let cancel = self.data_cancel.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            crate::data_bridge::spawn_data_bridge(facade, tx, cancel).await;
        });

        self.enter_route(self.route.clone())?;

        let mut events = TerminalEvents::spawn(Pace::default());

        info!(route = %self.route, "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize { cols, rows } => {
                    debug!(cols, rows, "terminal resized");
                    self.action_tx.send(Action::Render)?;
                }
                Event::Spin => self.action_tx.send(Action::Tick)?,
                Event::Frame => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    session.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        drop(events);
        info!("TUI event loop ended");
        Ok(())
    }

    fn active(&self) -> Option<&dyn Component> {
        self.screens.get(&self.active_screen).map(AsRef::as_ref)
    }

    // ── Input ────────────────────────────────────────────────────────

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        let captures = self.focus == Focus::Content
            && self.active().is_some_and(|s| s.captures_text());
        if !captures {
            match key.code {
                KeyCode::Char('q') => return Ok(Some(Action::Quit)),
                KeyCode::Char(c @ '1'..='3') => {
                    let idx = "123".find(c);
                    return Ok(idx
                        .and_then(|i| ScreenId::NAV.get(i))
                        .map(|id| Action::Navigate(id.route())));
                }
                _ => {}
            }
        }

        if self.focus == Focus::Nav {
            let last = ScreenId::NAV.len() - 1;
            return Ok(match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.nav_cursor = self.nav_cursor.saturating_sub(1);
                    None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.nav_cursor = (self.nav_cursor + 1).min(last);
                    None
                }
                KeyCode::Enter => ScreenId::NAV
                    .get(self.nav_cursor)
                    .map(|id| Action::Navigate(id.route())),
                KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => Some(Action::FocusContent),
                _ => None,
            });
        }

        match self.screens.get_mut(&self.active_screen) {
            Some(screen) => screen.handle_key_event(key),
            None => Ok(None),
        }
    }

    // ── Actions ──────────────────────────────────────────────────────

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Render | Action::RouteEntered(_) => {}

            Action::Tick => {
                if self.state.loading {
                    self.throbber_state.calc_next();
                }
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() > NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
                self.forward(action)?;
            }

            Action::Navigate(target) => self.navigate(target.clone())?,

            Action::FocusNav => self.set_focus(Focus::Nav),
            Action::FocusContent => self.set_focus(Focus::Content),

            Action::StateUpdated(state) => {
                self.state = Arc::clone(state);
                for screen in self.screens.values_mut() {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            Action::Reload => self.spawn_load(self.state.pagination.page),
            Action::LoadPage(page) => self.spawn_load(*page),

            Action::SetFilters(update) => self.facade.set_filters(update.clone()),
            Action::ClearFilters => self.facade.clear_filters(),

            Action::SubmitCreate(payload) => {
                let facade = self.facade.clone();
                let tx = self.action_tx.clone();
                let payload = payload.clone();
                tokio::spawn(async move {
                    let created = facade.create(&payload).await;
                    finish_save(&facade, &tx, created.map(|d| format!("Created \"{}\"", d.title)));
                });
            }

            Action::SubmitUpdate(id, payload) => {
                let facade = self.facade.clone();
                let tx = self.action_tx.clone();
                let id = id.clone();
                let payload = payload.clone();
                tokio::spawn(async move {
                    let updated = facade.update(&id, &payload).await;
                    finish_save(&facade, &tx, updated.map(|d| format!("Saved \"{}\"", d.title)));
                });
            }

            Action::ShowConfirm(confirm) => self.pending_confirm = Some(confirm.clone()),

            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.execute_confirm(confirm)?;
                }
            }

            Action::ConfirmNo => {
                if let Some(ConfirmAction::LeaveForm(_)) = self.pending_confirm.take() {
                    self.nav_cursor = self.active_screen.nav_index();
                }
            }

            Action::Notify(n) => self.notification = Some((n.clone(), Instant::now())),

            Action::FormLoaded(_) | Action::SaveFinished(_) => {
                if let Some(screen) = self.screens.get_mut(&ScreenId::Form) {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Pass an action to the active screen only.
    fn forward(&mut self, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        if focus == Focus::Nav {
            self.nav_cursor = self.active_screen.nav_index();
        }
        let content = focus == Focus::Content;
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(content);
        }
    }

    /// Guarded navigation: a dirty form asks before it is left.
    fn navigate(&mut self, target: Route) -> Result<()> {
        if target == self.route {
            self.set_focus(Focus::Content);
            return Ok(());
        }
        let dirty = self.route.is_guarded() && self.active().is_some_and(|s| s.is_dirty());
        if UnsavedChangesGuard::can_leave(dirty, &false) {
            self.enter_route(target)
        } else {
            debug!(from = %self.route, to = %target, "navigation held for confirmation");
            self.pending_confirm = Some(ConfirmAction::LeaveForm(target));
            Ok(())
        }
    }

    /// Activate `route` unconditionally and start whatever it loads.
    fn enter_route(&mut self, route: Route) -> Result<()> {
        debug!(from = %self.route, to = %route, "entering route");
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(false);
        }
        self.route = route.clone();
        self.active_screen = ScreenId::for_route(&route);
        self.nav_cursor = self.active_screen.nav_index();
        self.set_focus(Focus::Content);
        self.forward(&Action::RouteEntered(route.clone()))?;

        match route {
            Route::DeviationList => self.spawn_load(self.state.pagination.page),
            Route::Reports if self.state.records.is_empty() => self.spawn_load(1),
            Route::DeviationEdit(id) => {
                let facade = self.facade.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let record = resolve_deviation(&facade, Some(&id)).await;
                    let _ = tx.send(Action::FormLoaded(record));
                });
            }
            Route::PublicDeviation(id) => {
                let facade = self.facade.clone();
                tokio::spawn(async move {
                    facade.load_one(&id).await;
                });
            }
            Route::DeviationCreate | Route::Reports | Route::Settings => {}
        }
        Ok(())
    }

    fn spawn_load(&self, page: u32) {
        let facade = self.facade.clone();
        let params = ListParams {
            page: Some(page.max(1)),
            page_size: Some(self.page_size),
            ..ListParams::default()
        };
        tokio::spawn(async move {
            facade.load_list(Some(&params)).await;
        });
    }

    fn execute_confirm(&mut self, confirm: ConfirmAction) -> Result<()> {
        match confirm {
            ConfirmAction::LeaveForm(route) => self.enter_route(route),
            ConfirmAction::DeleteDeviation { id, title } => {
                let facade = self.facade.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let n = if facade.delete(&id).await {
                        Notification::success(format!("Deleted \"{title}\""))
                    } else {
                        Notification::error(
                            facade.error().unwrap_or_else(|| "Delete failed".into()),
                        )
                    };
                    let _ = tx.send(Action::Notify(n));
                });
                Ok(())
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

        self.render_header(frame, layout[0]);

        if self.route.uses_shell() {
            let body = Layout::horizontal([Constraint::Length(NAV_WIDTH), Constraint::Min(1)])
                .split(layout[1]);
            sidenav::render(
                frame,
                body[0],
                self.active_screen,
                self.nav_cursor,
                self.focus == Focus::Nav,
            );
            if let Some(screen) = self.active() {
                screen.render(frame, body[1]);
            }
        } else if let Some(screen) = self.active() {
            screen.render(frame, layout[1]);
        }

        self.render_status_bar(frame, layout[2]);

        if let Some(ref confirm) = self.pending_confirm {
            render_confirm_dialog(frame, area, confirm);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let cols = Layout::horizontal([
            Constraint::Length(40),
            Constraint::Length(14),
            Constraint::Min(0),
        ])
        .split(area);

        let title = Line::from(vec![
            Span::styled(" devtrack", theme::title_style()),
            Span::styled(" · ", theme::key_hint()),
            Span::styled(self.route.title(), Style::default().fg(theme::DIM_WHITE)),
        ]);
        frame.render_widget(Paragraph::new(title), cols[0]);

        if self.state.loading {
            let throbber = Throbber::default()
                .label("loading")
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, cols[1], &mut self.throbber_state.clone());
        }

        if let Some(ref error) = self.state.error {
            let banner = Line::from(Span::styled(
                format!("✗ {error}"),
                Style::default().fg(theme::ERROR_RED),
            ));
            frame.render_widget(Paragraph::new(banner), cols[2]);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let line = match self.notification {
            Some((ref n, _)) => {
                let (color, icon) = match n.level {
                    NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
                    NotificationLevel::Error => (theme::ERROR_RED, "✗"),
                    NotificationLevel::Info => (theme::NEON_CYAN, "·"),
                };
                Line::from(vec![
                    Span::styled(format!(" {icon} "), Style::default().fg(color)),
                    Span::styled(n.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
                ])
            }
            None => {
                let mut spans = vec![Span::raw(" ")];
                let hints: &[(&str, &str)] = if self.focus == Focus::Nav {
                    &[("↑↓", "move"), ("Enter", "open"), ("Tab", "content"), ("q", "quit")]
                } else {
                    &[("1-3", "jump"), ("Esc", "menu"), ("Ctrl+C", "quit")]
                };
                for (key, label) in hints {
                    spans.push(Span::styled(*key, theme::key_hint_key()));
                    spans.push(Span::styled(format!(" {label}  "), theme::key_hint()));
                }
                Line::from(spans)
            }
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Report the outcome of a create/update. The form hears first, so a
/// successful save is pristine before the list route is requested.
fn finish_save(
    facade: &DeviationFacade,
    tx: &mpsc::UnboundedSender<Action>,
    success: Option<String>,
) {
    match success {
        Some(message) => {
            let _ = tx.send(Action::SaveFinished(true));
            let _ = tx.send(Action::Notify(Notification::success(message)));
            let _ = tx.send(Action::Navigate(Route::DeviationList));
        }
        None => {
            let _ = tx.send(Action::SaveFinished(false));
            let message = facade.error().unwrap_or_else(|| "Save failed".into());
            let _ = tx.send(Action::Notify(Notification::error(message)));
        }
    }
}

fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let width = 60u16.min(area.width.saturating_sub(4));
    let height = 6u16;
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    let dialog_area = Rect::new(area.x + x, area.y + y, width, height);

    frame.render_widget(Clear, dialog_area);
    let block = Block::default()
        .title(" Confirm ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ELECTRIC_YELLOW))
        .style(Style::default().bg(theme::BG_DARK));

    let text = vec![
        Line::from(Span::styled(
            format!(" {confirm}"),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: true }),
        dialog_area,
    );
}
