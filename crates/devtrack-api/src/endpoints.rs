// Endpoint templates for the deviation REST surface.
//
// All paths are relative to the configured API base URL and expressed as
// path segments so ids are percent-encoded as a single segment.

const DEVIATIONS: &str = "deviations";
const STATS: &str = "stats";

/// One addressable resource on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// `/deviations`
    Collection,
    /// `/deviations/{id}`
    Item(&'a str),
    /// `/deviations/stats`
    Stats,
}

impl<'a> Endpoint<'a> {
    pub fn segments(self) -> Vec<&'a str> {
        match self {
            Self::Collection => vec![DEVIATIONS],
            Self::Item(id) => vec![DEVIATIONS, id],
            Self::Stats => vec![DEVIATIONS, STATS],
        }
    }

    /// Display form of the template, e.g. `/deviations/{id}`.
    pub fn template(self) -> &'static str {
        match self {
            Self::Collection => "/deviations",
            Self::Item(_) => "/deviations/{id}",
            Self::Stats => "/deviations/stats",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_segments_carry_raw_id() {
        assert_eq!(Endpoint::Item("a/b").segments(), vec!["deviations", "a/b"]);
        assert_eq!(Endpoint::Stats.segments(), vec!["deviations", "stats"]);
        assert_eq!(Endpoint::Item("x").template(), "/deviations/{id}");
    }
}
