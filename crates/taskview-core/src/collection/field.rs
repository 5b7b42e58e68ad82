//! Allow-list of task fields that filters and sorts may name.
//!
//! Request tokens are only ever looked up here; SQL is built from the fixed
//! column expressions below, never from request text.

use crate::model::task::Task;
use std::fmt;

/// Semantic type a field's filter values are coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    Float,
    Date,
    Bool,
    Text,
    /// Set of identifiers (assignees, labels); membership comparisons only.
    IdSet,
}

/// Every task field a collection request may filter or sort on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskField {
    Id,
    Title,
    Description,
    Done,
    DoneAt,
    DueDate,
    StartDate,
    EndDate,
    Priority,
    PercentDone,
    HexColor,
    ListId,
    Index,
    Position,
    BucketId,
    RepeatAfter,
    CreatedBy,
    Created,
    Updated,
    Assignees,
    Labels,
}

/// Junction table backing a set-valued field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetRelation {
    pub table: &'static str,
    pub column: &'static str,
}

/// A field's value on one task, as the in-memory evaluator sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Integer(i64),
    Float(f64),
    /// Epoch seconds; `None` when unset.
    Date(Option<i64>),
    Bool(bool),
    Text(&'a str),
    IdSet(Vec<i64>),
}

impl TaskField {
    pub const ALL: [Self; 21] = [
        Self::Id,
        Self::Title,
        Self::Description,
        Self::Done,
        Self::DoneAt,
        Self::DueDate,
        Self::StartDate,
        Self::EndDate,
        Self::Priority,
        Self::PercentDone,
        Self::HexColor,
        Self::ListId,
        Self::Index,
        Self::Position,
        Self::BucketId,
        Self::RepeatAfter,
        Self::CreatedBy,
        Self::Created,
        Self::Updated,
        Self::Assignees,
        Self::Labels,
    ];

    /// The request token (and JSON key) naming this field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Description => "description",
            Self::Done => "done",
            Self::DoneAt => "done_at",
            Self::DueDate => "due_date",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::Priority => "priority",
            Self::PercentDone => "percent_done",
            Self::HexColor => "hex_color",
            Self::ListId => "list_id",
            Self::Index => "index",
            Self::Position => "position",
            Self::BucketId => "bucket_id",
            Self::RepeatAfter => "repeat_after",
            Self::CreatedBy => "created_by",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Assignees => "assignees",
            Self::Labels => "labels",
        }
    }

    /// Look up a request token. Matching is exact and case-sensitive.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == token)
    }

    #[must_use]
    pub const fn field_type(self) -> FieldType {
        match self {
            Self::Id
            | Self::Priority
            | Self::ListId
            | Self::Index
            | Self::BucketId
            | Self::RepeatAfter
            | Self::CreatedBy => FieldType::Integer,
            Self::PercentDone | Self::Position => FieldType::Float,
            Self::DoneAt
            | Self::DueDate
            | Self::StartDate
            | Self::EndDate
            | Self::Created
            | Self::Updated => FieldType::Date,
            Self::Done => FieldType::Bool,
            Self::Title | Self::Description | Self::HexColor => FieldType::Text,
            Self::Assignees | Self::Labels => FieldType::IdSet,
        }
    }

    /// Column expression on the `tasks t` alias; `None` for set-valued fields.
    #[must_use]
    pub const fn column(self) -> Option<&'static str> {
        Some(match self {
            Self::Id => "t.id",
            Self::Title => "t.title",
            Self::Description => "t.description",
            Self::Done => "t.done",
            Self::DoneAt => "t.done_at",
            Self::DueDate => "t.due_date",
            Self::StartDate => "t.start_date",
            Self::EndDate => "t.end_date",
            Self::Priority => "t.priority",
            Self::PercentDone => "t.percent_done",
            Self::HexColor => "t.hex_color",
            Self::ListId => "t.list_id",
            Self::Index => "t.task_index",
            Self::Position => "t.position",
            Self::BucketId => "t.bucket_id",
            Self::RepeatAfter => "t.repeat_after",
            Self::CreatedBy => "t.created_by",
            Self::Created => "t.created",
            Self::Updated => "t.updated",
            Self::Assignees | Self::Labels => return None,
        })
    }

    /// Junction table for set-valued fields.
    #[must_use]
    pub const fn set_relation(self) -> Option<SetRelation> {
        match self {
            Self::Assignees => Some(SetRelation {
                table: "task_assignees",
                column: "user_id",
            }),
            Self::Labels => Some(SetRelation {
                table: "task_labels",
                column: "label_id",
            }),
            _ => None,
        }
    }

    /// Whether the stored column may be `NULL` (unset dates).
    #[must_use]
    pub const fn is_nullable(self) -> bool {
        matches!(
            self,
            Self::DoneAt | Self::DueDate | Self::StartDate | Self::EndDate
        )
    }

    /// Set-valued fields have no single value to order by.
    #[must_use]
    pub const fn is_sortable(self) -> bool {
        !matches!(self.field_type(), FieldType::IdSet)
    }

    /// Read this field from a hydrated task.
    #[must_use]
    pub fn value(self, task: &Task) -> FieldValue<'_> {
        let date = |ts: Option<chrono::DateTime<chrono::Utc>>| FieldValue::Date(ts.map(|t| t.timestamp()));
        match self {
            Self::Id => FieldValue::Integer(task.id.get()),
            Self::Title => FieldValue::Text(&task.title),
            Self::Description => FieldValue::Text(&task.description),
            Self::Done => FieldValue::Bool(task.done),
            Self::DoneAt => date(task.done_at),
            Self::DueDate => date(task.due_date),
            Self::StartDate => date(task.start_date),
            Self::EndDate => date(task.end_date),
            Self::Priority => FieldValue::Integer(task.priority),
            Self::PercentDone => FieldValue::Float(task.percent_done),
            Self::HexColor => FieldValue::Text(&task.hex_color),
            Self::ListId => FieldValue::Integer(task.list_id.get()),
            Self::Index => FieldValue::Integer(task.index),
            Self::Position => FieldValue::Float(task.position),
            Self::BucketId => FieldValue::Integer(task.bucket_id),
            Self::RepeatAfter => FieldValue::Integer(task.repeat_after),
            Self::CreatedBy => FieldValue::Integer(task.created_by.get()),
            Self::Created => date(Some(task.created)),
            Self::Updated => date(Some(task.updated)),
            Self::Assignees => FieldValue::IdSet(task.assignees.iter().map(|u| u.get()).collect()),
            Self::Labels => FieldValue::IdSet(task.label_ids().map(|l| l.get()).collect()),
        }
    }
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
