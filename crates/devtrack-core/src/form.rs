// ── Deviation form ──
//
// Text-backed create/edit form with per-field validation, touched and
// dirty tracking, and conversion to API payloads.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::error::CoreError;
use crate::model::{
    CreateDeviation, Deviation, DeviationPriority, DeviationStatus, UpdateDeviation,
};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MIN: usize = 10;

const REQUIRED: &str = "This field is required";
const INVALID_CHOICE: &str = "Invalid value";
const INVALID_DATE: &str = "Invalid date (expected YYYY-MM-DD)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum FormField {
    Title,
    Description,
    Status,
    Priority,
    Category,
    #[strum(to_string = "Assigned To")]
    AssignedTo,
    #[strum(to_string = "Due Date")]
    DueDate,
    Tags,
}

impl FormField {
    pub fn is_required(self) -> bool {
        matches!(
            self,
            Self::Title | Self::Description | Self::Priority | Self::Category
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Values {
    title: String,
    description: String,
    status: String,
    priority: String,
    category: String,
    assigned_to: String,
    due_date: String,
    tags: String,
}

impl Values {
    fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Description => &self.description,
            FormField::Status => &self.status,
            FormField::Priority => &self.priority,
            FormField::Category => &self.category,
            FormField::AssignedTo => &self.assigned_to,
            FormField::DueDate => &self.due_date,
            FormField::Tags => &self.tags,
        }
    }

    fn slot(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
            FormField::Status => &mut self.status,
            FormField::Priority => &mut self.priority,
            FormField::Category => &mut self.category,
            FormField::AssignedTo => &mut self.assigned_to,
            FormField::DueDate => &mut self.due_date,
            FormField::Tags => &mut self.tags,
        }
    }
}

/// Create or edit form for one deviation.
#[derive(Debug, Clone)]
pub struct DeviationForm {
    /// Id of the record being edited; `None` for a create form.
    editing: Option<String>,
    initial: Values,
    values: Values,
    touched: BTreeSet<FormField>,
    dirty: BTreeSet<FormField>,
    /// Tags as a list, for the baseline and for `set_tags`. The tags text
    /// is only split on commas once it has been edited as free text.
    initial_tags: Vec<String>,
    tag_list: Option<Vec<String>>,
}

impl Default for DeviationForm {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviationForm {
    /// Empty create form; priority starts at `medium`.
    pub fn new() -> Self {
        let initial = Values {
            priority: DeviationPriority::default().to_string(),
            ..Values::default()
        };
        Self {
            editing: None,
            values: initial.clone(),
            initial,
            touched: BTreeSet::new(),
            dirty: BTreeSet::new(),
            initial_tags: Vec::new(),
            tag_list: None,
        }
    }

    /// Edit form seeded from an existing record.
    pub fn edit(record: &Deviation) -> Self {
        let initial = Values {
            title: record.title.clone(),
            description: record.description.clone(),
            status: record.status.to_string(),
            priority: record.priority.to_string(),
            category: record.category.clone(),
            assigned_to: record.assigned_to.clone().unwrap_or_default(),
            due_date: record
                .due_date
                .map(|d| d.date_naive().to_string())
                .unwrap_or_default(),
            tags: record.tags.as_deref().unwrap_or_default().join(", "),
        };
        Self {
            editing: Some(record.id.clone()),
            values: initial.clone(),
            initial,
            touched: BTreeSet::new(),
            dirty: BTreeSet::new(),
            initial_tags: record.tags.clone().unwrap_or_default(),
            tag_list: None,
        }
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    /// Fields shown by this form, in display order. Status is edit-only.
    pub fn fields(&self) -> Vec<FormField> {
        FormField::iter()
            .filter(|f| *f != FormField::Status || self.is_edit())
            .collect()
    }

    // ── Values ───────────────────────────────────────────────────────

    pub fn value(&self, field: FormField) -> &str {
        self.values.get(field)
    }

    /// Replace a field's text. Marks the field dirty when the new value
    /// differs from the initial one.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        if value != self.initial.get(field) {
            self.dirty.insert(field);
        }
        if field == FormField::Tags {
            self.tag_list = None;
        }
        *self.values.slot(field) = value;
    }

    /// Replace the tags with an exact list. Entries are kept whole, commas
    /// included; blank entries are dropped.
    pub fn set_tags(&mut self, tags: &[String]) {
        let tags: Vec<String> = tags
            .iter()
            .map(String::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect();
        if tags != self.initial_tags {
            self.dirty.insert(FormField::Tags);
        }
        self.values.tags = tags.join(", ");
        self.tag_list = Some(tags);
    }

    /// Tags the payload will carry.
    pub fn tags(&self) -> Vec<String> {
        match self.tag_list {
            Some(ref tags) => tags.clone(),
            None if self.values.tags == self.initial.tags => self.initial_tags.clone(),
            None => parse_tags(&self.values.tags),
        }
    }

    /// Whether `field` differs from the baseline.
    pub fn is_changed(&self, field: FormField) -> bool {
        match field {
            FormField::Tags => self.tags() != self.initial_tags,
            _ => self.values.get(field) != self.initial.get(field),
        }
    }

    pub fn set_priority(&mut self, priority: DeviationPriority) {
        self.set(FormField::Priority, priority.to_string());
    }

    pub fn set_status(&mut self, status: DeviationStatus) {
        self.set(FormField::Status, status.to_string());
    }

    pub fn priority(&self) -> Option<DeviationPriority> {
        self.values.priority.parse().ok()
    }

    pub fn status(&self) -> Option<DeviationStatus> {
        self.values.status.parse().ok()
    }

    // ── Interaction state ────────────────────────────────────────────

    pub fn touch(&mut self, field: FormField) {
        self.touched.insert(field);
    }

    /// Reveal every error (used on a submit attempt).
    pub fn mark_all_touched(&mut self) {
        self.touched.extend(self.fields());
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Current values become the baseline; clears dirty and touched.
    pub fn mark_pristine(&mut self) {
        self.initial_tags = self.tags();
        self.tag_list = None;
        self.initial = self.values.clone();
        self.dirty.clear();
        self.touched.clear();
    }

    // ── Validation ───────────────────────────────────────────────────

    /// Rule check for one field, regardless of touched/dirty.
    pub fn validate(&self, field: FormField) -> Option<String> {
        let value = self.values.get(field);
        if field.is_required() && value.trim().is_empty() {
            return Some(REQUIRED.into());
        }
        let len = value.chars().count();
        match field {
            FormField::Title if len < TITLE_MIN => Some(format!("Minimum length is {TITLE_MIN}")),
            FormField::Title if len > TITLE_MAX => Some(format!("Maximum length is {TITLE_MAX}")),
            FormField::Description if len < DESCRIPTION_MIN => {
                Some(format!("Minimum length is {DESCRIPTION_MIN}"))
            }
            FormField::Priority if self.priority().is_none() => Some(INVALID_CHOICE.into()),
            FormField::Status if self.is_edit() && self.status().is_none() => {
                Some(INVALID_CHOICE.into())
            }
            FormField::DueDate if !value.trim().is_empty() && parse_due_date(value).is_none() => {
                Some(INVALID_DATE.into())
            }
            _ => None,
        }
    }

    /// Fields subject to validation. An edit form only checks the fields
    /// it changes.
    fn checked(&self, field: FormField) -> bool {
        !self.is_edit() || self.is_changed(field)
    }

    /// Error to display for `field`: only once it is touched or dirty.
    pub fn error(&self, field: FormField) -> Option<String> {
        if !self.checked(field) {
            return None;
        }
        if self.touched.contains(&field) || self.dirty.contains(&field) {
            self.validate(field)
        } else {
            None
        }
    }

    /// Every rule violation, keyed by field.
    pub fn validation_errors(&self) -> BTreeMap<FormField, String> {
        self.fields()
            .into_iter()
            .filter(|f| self.checked(*f))
            .filter_map(|f| self.validate(f).map(|e| (f, e)))
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.validation_errors().is_empty()
    }

    fn ensure_valid(&self) -> Result<(), CoreError> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            return Ok(());
        }
        let message = errors
            .iter()
            .map(|(field, error)| format!("{field}: {error}"))
            .collect::<Vec<_>>()
            .join("; ");
        Err(CoreError::ValidationFailed { message })
    }

    // ── Payloads ─────────────────────────────────────────────────────

    /// Create payload. Empty assignee is omitted; tags default to `[]`.
    pub fn to_create(&self) -> Result<CreateDeviation, CoreError> {
        self.ensure_valid()?;
        let v = &self.values;
        Ok(CreateDeviation {
            title: v.title.clone(),
            description: v.description.clone(),
            priority: self.priority().unwrap_or_default(),
            category: v.category.clone(),
            assigned_to: non_empty(&v.assigned_to),
            due_date: parse_due_date(&v.due_date),
            tags: Some(self.tags()),
        })
    }

    /// Update payload holding only the fields that differ from the
    /// initial values. A cleared assignee is sent as an empty string.
    pub fn to_update(&self) -> Result<UpdateDeviation, CoreError> {
        self.ensure_valid()?;
        let changed = |f: FormField| self.is_changed(f);
        let v = &self.values;

        let mut update = UpdateDeviation::default();
        if changed(FormField::Title) {
            update.title = Some(v.title.clone());
        }
        if changed(FormField::Description) {
            update.description = Some(v.description.clone());
        }
        if changed(FormField::Status) {
            update.status = self.status();
        }
        if changed(FormField::Priority) {
            update.priority = self.priority();
        }
        if changed(FormField::Category) {
            update.category = Some(v.category.clone());
        }
        if changed(FormField::AssignedTo) {
            update.assigned_to = Some(v.assigned_to.trim().to_owned());
        }
        if changed(FormField::DueDate) {
            update.due_date = parse_due_date(&v.due_date);
        }
        if changed(FormField::Tags) {
            update.tags = Some(self.tags());
        }
        Ok(update)
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_owned())
}

fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn filled() -> DeviationForm {
        let mut form = DeviationForm::new();
        form.set(FormField::Title, "Pump Leak");
        form.set(FormField::Description, "Oil pooling under pump 3");
        form.set(FormField::Category, "Equipment");
        form
    }

    fn record() -> Deviation {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        Deviation {
            id: "d1".into(),
            title: "Pump Leak".into(),
            description: "Oil pooling under pump 3".into(),
            status: DeviationStatus::Open,
            priority: DeviationPriority::High,
            category: "Equipment".into(),
            created_by: "alice".into(),
            created_at: at,
            updated_at: at,
            assigned_to: Some("bob".into()),
            due_date: Some(Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap()),
            tags: Some(vec!["pump".into(), "oil".into()]),
        }
    }

    #[test]
    fn new_form_defaults() {
        let form = DeviationForm::new();
        assert_eq!(form.priority(), Some(DeviationPriority::Medium));
        assert!(!form.is_dirty());
        assert!(!form.fields().contains(&FormField::Status));
        assert!(!form.is_valid());
    }

    #[test]
    fn errors_hidden_until_touched() {
        let mut form = DeviationForm::new();
        assert_eq!(form.error(FormField::Title), None);

        form.touch(FormField::Title);
        assert_eq!(
            form.error(FormField::Title).as_deref(),
            Some("This field is required")
        );
        assert_eq!(form.error(FormField::Category), None);

        form.mark_all_touched();
        assert_eq!(
            form.error(FormField::Category).as_deref(),
            Some("This field is required")
        );
    }

    #[test]
    fn length_rules() {
        let mut form = filled();
        form.set(FormField::Title, "ab");
        assert_eq!(
            form.error(FormField::Title).as_deref(),
            Some("Minimum length is 3")
        );
        form.set(FormField::Title, "x".repeat(201));
        assert_eq!(
            form.error(FormField::Title).as_deref(),
            Some("Maximum length is 200")
        );
        form.set(FormField::Title, "x".repeat(200));
        assert_eq!(form.error(FormField::Title), None);

        form.set(FormField::Description, "too short");
        assert_eq!(
            form.error(FormField::Description).as_deref(),
            Some("Minimum length is 10")
        );
    }

    #[test]
    fn whitespace_only_is_missing() {
        let mut form = filled();
        form.set(FormField::Category, "   ");
        assert_eq!(
            form.validate(FormField::Category).as_deref(),
            Some("This field is required")
        );
    }

    #[test]
    fn create_payload_conversion() {
        let mut form = filled();
        form.set(FormField::AssignedTo, "");
        let payload = form.to_create().unwrap();

        assert_eq!(payload.title, "Pump Leak");
        assert_eq!(payload.priority, DeviationPriority::Medium);
        assert_eq!(payload.assigned_to, None);
        assert_eq!(payload.tags, Some(vec![]));
        assert_eq!(payload.due_date, None);
    }

    #[test]
    fn create_payload_parses_tags_and_date() {
        let mut form = filled();
        form.set(FormField::Tags, "pump, oil,,  ");
        form.set(FormField::DueDate, "2026-04-01");
        form.set(FormField::AssignedTo, " bob ");
        let payload = form.to_create().unwrap();

        assert_eq!(payload.tags, Some(vec!["pump".to_owned(), "oil".to_owned()]));
        assert_eq!(
            payload.due_date,
            Some(Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(payload.assigned_to.as_deref(), Some("bob"));
    }

    #[test]
    fn invalid_form_refuses_payload() {
        let mut form = filled();
        form.set(FormField::DueDate, "next tuesday");
        let err = form.to_create().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: Due Date: Invalid date (expected YYYY-MM-DD)"
        );
    }

    #[test]
    fn dirty_tracking_and_pristine() {
        let mut form = filled();
        assert!(form.is_dirty());
        form.mark_pristine();
        assert!(!form.is_dirty());

        form.set(FormField::Title, "Pump Leak");
        assert!(!form.is_dirty());
        form.set(FormField::Title, "Pump Leak 2");
        assert!(form.is_dirty());
    }

    #[test]
    fn edit_form_sends_only_changes() {
        let mut form = DeviationForm::edit(&record());
        assert_eq!(form.editing_id(), Some("d1"));
        assert!(form.fields().contains(&FormField::Status));
        assert_eq!(form.value(FormField::DueDate), "2026-04-01");
        assert_eq!(form.value(FormField::Tags), "pump, oil");
        assert!(form.to_update().unwrap().is_empty());

        form.set_status(DeviationStatus::Closed);
        form.set(FormField::AssignedTo, "");
        let update = form.to_update().unwrap();
        assert_eq!(
            update,
            UpdateDeviation {
                status: Some(DeviationStatus::Closed),
                assigned_to: Some(String::new()),
                ..UpdateDeviation::default()
            }
        );
    }

    #[test]
    fn tag_list_keeps_commas() {
        let mut form = filled();
        form.set_tags(&["ISO 9001, clause 7".to_owned(), " pump ".to_owned(), String::new()]);
        assert_eq!(
            form.to_create().unwrap().tags,
            Some(vec!["ISO 9001, clause 7".to_owned(), "pump".to_owned()])
        );

        form.set(FormField::Tags, "a, b");
        assert_eq!(form.tags(), vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn edit_form_keeps_stored_comma_tags() {
        let mut rec = record();
        rec.tags = Some(vec!["ISO 9001, clause 7".into()]);
        let mut form = DeviationForm::edit(&rec);
        assert!(!form.is_changed(FormField::Tags));

        form.set_tags(&["ISO 9001, clause 7".to_owned()]);
        assert!(form.to_update().unwrap().is_empty());

        form.set_tags(&["ISO 9001, clause 8".to_owned()]);
        assert_eq!(
            form.to_update().unwrap().tags,
            Some(vec!["ISO 9001, clause 8".to_owned()])
        );

        form.mark_pristine();
        assert_eq!(form.tags(), vec!["ISO 9001, clause 8".to_owned()]);
        assert!(form.to_update().unwrap().is_empty());
    }

    #[test]
    fn edit_form_validates_changed_fields_only() {
        let mut rec = record();
        rec.description = "oil".into();
        let mut form = DeviationForm::edit(&rec);
        form.mark_all_touched();
        assert_eq!(form.error(FormField::Description), None);

        form.set_status(DeviationStatus::Closed);
        assert_eq!(
            form.to_update().unwrap(),
            UpdateDeviation {
                status: Some(DeviationStatus::Closed),
                ..UpdateDeviation::default()
            }
        );

        form.set(FormField::Description, "leak");
        let err = form.to_update().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: Description: Minimum length is 10"
        );
    }
}
