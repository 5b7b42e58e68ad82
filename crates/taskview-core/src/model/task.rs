use super::{LabelId, ListId, TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A label attached to a task, as shown in task listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub title: String,
}

/// A task as returned by collection queries.
///
/// Unset dates are `None` and serialize as `null`. Tasks are only read here;
/// the mutation API owns every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub done: bool,
    pub done_at: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub reminder_dates: Vec<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub priority: i64,
    pub percent_done: f64,
    pub hex_color: String,
    pub list_id: ListId,
    pub index: i64,
    pub position: f64,
    pub bucket_id: i64,
    pub repeat_after: i64,
    pub assignees: Vec<UserId>,
    pub labels: Vec<Label>,
    pub is_favorite: bool,
    pub created_by: UserId,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Task {
    /// A task with every optional attribute unset, mostly useful for fixtures.
    #[must_use]
    pub fn new(id: TaskId, list_id: ListId, title: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            done: false,
            done_at: None,
            due_date: None,
            reminder_dates: Vec::new(),
            start_date: None,
            end_date: None,
            priority: 0,
            percent_done: 0.0,
            hex_color: String::new(),
            list_id,
            index: id.get(),
            position: 0.0,
            bucket_id: 0,
            repeat_after: 0,
            assignees: Vec::new(),
            labels: Vec::new(),
            is_favorite: false,
            created_by: UserId(0),
            created,
            updated: created,
        }
    }

    /// Label identifiers in attachment order.
    pub fn label_ids(&self) -> impl Iterator<Item = LabelId> + '_ {
        self.labels.iter().map(|label| label.id)
    }
}
