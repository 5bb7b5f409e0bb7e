use std::fmt;

/// Addressable screens of the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    DeviationList,
    DeviationCreate,
    DeviationEdit(String),
    /// Read-only view of one record, no shell chrome.
    PublicDeviation(String),
    Reports,
    Settings,
}

impl Route {
    /// Map a path to a route. Empty, `/` and `/dashboard` redirect to the
    /// list; unknown paths fall back to it too.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["deviations", "new"] => Self::DeviationCreate,
            ["deviations", id] => Self::DeviationEdit((*id).to_owned()),
            ["public", "deviation", id] => Self::PublicDeviation((*id).to_owned()),
            ["reports"] => Self::Reports,
            ["settings"] => Self::Settings,
            _ => Self::DeviationList,
        }
    }

    /// Canonical path for this route.
    pub fn path(&self) -> String {
        match self {
            Self::DeviationList => "/deviations".into(),
            Self::DeviationCreate => "/deviations/new".into(),
            Self::DeviationEdit(id) => format!("/deviations/{id}"),
            Self::PublicDeviation(id) => format!("/public/deviation/{id}"),
            Self::Reports => "/reports".into(),
            Self::Settings => "/settings".into(),
        }
    }

    /// Routes whose screen holds a form behind the unsaved-changes guard.
    pub fn is_guarded(&self) -> bool {
        matches!(self, Self::DeviationCreate | Self::DeviationEdit(_))
    }

    /// Record id to resolve before the screen opens.
    pub fn resolve_id(&self) -> Option<&str> {
        match self {
            Self::DeviationEdit(id) => Some(id),
            _ => None,
        }
    }

    /// Routes rendered inside the shell (title bar + side navigation).
    pub fn uses_shell(&self) -> bool {
        !matches!(self, Self::PublicDeviation(_))
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::DeviationList => "Deviations",
            Self::DeviationCreate => "New Deviation",
            Self::DeviationEdit(_) => "Edit Deviation",
            Self::PublicDeviation(_) => "Deviation",
            Self::Reports => "Reports",
            Self::Settings => "Settings",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
