//! Screen identifiers and their mapping to routes.

use std::fmt;

use devtrack_core::Route;

/// Identifies each content screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Deviations,
    /// Create and edit share one form screen.
    Form,
    PublicView,
    Reports,
    Settings,
}

impl ScreenId {
    /// Side navigation entries, in order.
    pub const NAV: [ScreenId; 3] = [Self::Deviations, Self::Reports, Self::Settings];

    pub fn for_route(route: &Route) -> Self {
        match route {
            Route::DeviationList => Self::Deviations,
            Route::DeviationCreate | Route::DeviationEdit(_) => Self::Form,
            Route::PublicDeviation(_) => Self::PublicView,
            Route::Reports => Self::Reports,
            Route::Settings => Self::Settings,
        }
    }

    /// Route a navigation entry leads to.
    pub fn route(self) -> Route {
        match self {
            Self::Deviations | Self::Form | Self::PublicView => Route::DeviationList,
            Self::Reports => Route::Reports,
            Self::Settings => Route::Settings,
        }
    }

    /// Position in the side navigation; detail screens highlight their parent.
    pub fn nav_index(self) -> usize {
        match self {
            Self::Deviations | Self::Form | Self::PublicView => 0,
            Self::Reports => 1,
            Self::Settings => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Deviations => "Deviations",
            Self::Form => "Deviation",
            Self::PublicView => "Public View",
            Self::Reports => "Reports",
            Self::Settings => "Settings",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_routes_highlight_deviations() {
        let edit = ScreenId::for_route(&Route::DeviationEdit("dev-1".into()));
        assert_eq!(edit, ScreenId::Form);
        assert_eq!(edit.nav_index(), 0);
        assert_eq!(ScreenId::for_route(&Route::Reports).nav_index(), 1);
    }

    #[test]
    fn nav_entries_round_trip_through_routes() {
        for id in ScreenId::NAV {
            assert_eq!(ScreenId::for_route(&id.route()), id);
        }
    }
}
