use chrono::{DateTime, Utc};

use super::{Deviation, DeviationPriority, DeviationStatus};

/// Partial overwrite of a stored record.
///
/// `None` leaves the field alone. Nullable fields use a nested `Option`
/// so a patch can clear them (`Some(None)`). The id is never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviationPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<DeviationStatus>,
    pub priority: Option<DeviationPriority>,
    pub category: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub assigned_to: Option<Option<String>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub tags: Option<Option<Vec<String>>>,
}

impl DeviationPatch {
    /// Overwrite exactly the present fields of `record`.
    pub fn apply_to(&self, record: &mut Deviation) {
        fn set<T: Clone>(slot: &mut T, value: Option<&T>) {
            if let Some(v) = value {
                slot.clone_from(v);
            }
        }

        set(&mut record.title, self.title.as_ref());
        set(&mut record.description, self.description.as_ref());
        set(&mut record.status, self.status.as_ref());
        set(&mut record.priority, self.priority.as_ref());
        set(&mut record.category, self.category.as_ref());
        set(&mut record.created_by, self.created_by.as_ref());
        set(&mut record.created_at, self.created_at.as_ref());
        set(&mut record.updated_at, self.updated_at.as_ref());
        set(&mut record.assigned_to, self.assigned_to.as_ref());
        set(&mut record.due_date, self.due_date.as_ref());
        set(&mut record.tags, self.tags.as_ref());
    }
}

/// A full record is authoritative: every field is present in the patch.
impl From<Deviation> for DeviationPatch {
    fn from(d: Deviation) -> Self {
        Self {
            title: Some(d.title),
            description: Some(d.description),
            status: Some(d.status),
            priority: Some(d.priority),
            category: Some(d.category),
            created_by: Some(d.created_by),
            created_at: Some(d.created_at),
            updated_at: Some(d.updated_at),
            assigned_to: Some(d.assigned_to),
            due_date: Some(d.due_date),
            tags: Some(d.tags),
        }
    }
}
