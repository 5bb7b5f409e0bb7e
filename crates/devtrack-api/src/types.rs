// Wire types for the deviation REST API.
//
// Field names are camelCase on the wire, enum values snake_case.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ── Enumerations ─────────────────────────────────────────────────────

/// Lifecycle stage of a deviation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviationStatus {
    Open,
    InProgress,
    UnderReview,
    Closed,
    Rejected,
}

impl DeviationStatus {
    /// Human-facing label ("In Progress").
    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::UnderReview => "Under Review",
            Self::Closed => "Closed",
            Self::Rejected => "Rejected",
        }
    }
}

/// Urgency of a deviation.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviationPriority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl DeviationPriority {
    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

// ── Records ──────────────────────────────────────────────────────────

/// A deviation record as returned by the backend.
///
/// `id`, `created_by` and the timestamps are server-assigned; the client
/// never sends them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deviation {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: DeviationStatus,
    pub priority: DeviationPriority,
    pub category: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Body of `POST /deviations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeviation {
    pub title: String,
    pub description: String,
    pub priority: DeviationPriority,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Body of `PATCH /deviations/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeviation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<DeviationPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl UpdateDeviation {
    /// `true` when no field is set (the PATCH would be a no-op).
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ── Queries & envelopes ──────────────────────────────────────────────

/// Query parameters for `GET /deviations`. Only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<DeviationPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

/// Paginated list envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Aggregate counts from `GET /deviations/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviationStats {
    pub total: u64,
    #[serde(default)]
    pub by_status: BTreeMap<DeviationStatus, u64>,
    #[serde(default)]
    pub by_priority: BTreeMap<DeviationPriority, u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn deviation_deserializes_from_camel_case() {
        let raw = json!({
            "id": "dev-1",
            "title": "Pump Leak",
            "description": "oil on the floor near pump 3",
            "status": "in_progress",
            "priority": "high",
            "category": "Equipment",
            "createdBy": "alice",
            "createdAt": "2026-03-01T08:00:00Z",
            "updatedAt": "2026-03-02T09:30:00Z",
            "assignedTo": "bob",
            "tags": ["pump", "oil"]
        });

        let dev: Deviation = serde_json::from_value(raw).unwrap();
        assert_eq!(dev.status, DeviationStatus::InProgress);
        assert_eq!(dev.priority, DeviationPriority::High);
        assert_eq!(dev.assigned_to.as_deref(), Some("bob"));
        assert_eq!(dev.due_date, None);
        assert_eq!(dev.tags, Some(vec!["pump".to_owned(), "oil".to_owned()]));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let raw = json!({
            "id": "dev-1", "title": "t", "description": "d",
            "status": "archived", "priority": "low", "category": "c",
            "createdBy": "a",
            "createdAt": "2026-03-01T08:00:00Z",
            "updatedAt": "2026-03-01T08:00:00Z"
        });
        assert!(serde_json::from_value::<Deviation>(raw).is_err());
    }

    #[test]
    fn update_payload_omits_absent_fields() {
        let update = UpdateDeviation {
            status: Some(DeviationStatus::Closed),
            ..UpdateDeviation::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "status": "closed" })
        );
        assert!(!update.is_empty());
        assert!(UpdateDeviation::default().is_empty());
    }

    #[test]
    fn enum_string_forms_match_wire() {
        assert_eq!(DeviationStatus::UnderReview.to_string(), "under_review");
        assert_eq!(
            "in_progress".parse::<DeviationStatus>().unwrap(),
            DeviationStatus::InProgress
        );
        assert_eq!(DeviationPriority::default(), DeviationPriority::Medium);
        assert_eq!(DeviationStatus::InProgress.label(), "In Progress");
    }

    #[test]
    fn stats_keys_deserialize_as_enums() {
        let raw = json!({
            "total": 3,
            "byStatus": { "open": 2, "closed": 1 },
            "byPriority": { "low": 3 }
        });
        let stats: DeviationStats = serde_json::from_value(raw).unwrap();
        assert_eq!(stats.by_status.get(&DeviationStatus::Open), Some(&2));
        assert_eq!(stats.by_priority.get(&DeviationPriority::Low), Some(&3));
        assert_eq!(stats.by_status.values().sum::<u64>(), stats.total);
    }
}
