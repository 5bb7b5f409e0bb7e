//! Settings: the resolved connection configuration (read-only).

use std::path::PathBuf;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

/// What the process resolved at startup.
#[derive(Debug, Clone)]
pub struct SettingsInfo {
    pub profile: String,
    pub api_url: String,
    pub tls: String,
    pub timeout: Duration,
    pub page_size: u32,
    pub config_path: PathBuf,
}

pub struct SettingsScreen {
    focused: bool,
    info: SettingsInfo,
}

impl SettingsScreen {
    pub fn new(info: SettingsInfo) -> Self {
        Self {
            focused: false,
            info,
        }
    }

    fn row(label: &str, value: String) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("  {label:<12}"), theme::label()),
            Span::styled(value, theme::table_row()),
        ])
    }
}

impl Component for SettingsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok((key.code == KeyCode::Esc).then_some(Action::FocusNav))
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let info = &self.info;
        let lines = vec![
            Self::row("Profile", info.profile.clone()),
            Self::row("API URL", info.api_url.clone()),
            Self::row("TLS", info.tls.clone()),
            Self::row("Timeout", format!("{}s", info.timeout.as_secs())),
            Self::row("Page size", info.page_size.to_string()),
            Self::row("Config", info.config_path.display().to_string()),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Edit with ", theme::key_hint()),
                Span::styled("devtrack config init", theme::key_hint_key()),
                Span::styled(" and restart.", theme::key_hint()),
            ]),
        ];

        let block = Block::default()
            .title(" Settings ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
