//! Screen registry.

pub mod deviations;
pub mod form;
pub mod public_view;
pub mod reports;
pub mod settings;

use crate::component::Component;
use crate::screen::ScreenId;

use self::settings::SettingsInfo;

/// Create every screen component, keyed by ScreenId.
pub fn create_screens(settings: SettingsInfo) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Deviations,
            Box::new(deviations::DeviationsScreen::new()),
        ),
        (ScreenId::Form, Box::new(form::FormScreen::new())),
        (
            ScreenId::PublicView,
            Box::new(public_view::PublicViewScreen::new()),
        ),
        (ScreenId::Reports, Box::new(reports::ReportsScreen::new())),
        (
            ScreenId::Settings,
            Box::new(settings::SettingsScreen::new(settings)),
        ),
    ]
}
