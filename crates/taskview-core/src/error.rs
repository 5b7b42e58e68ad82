use std::fmt;

use crate::model::{ListId, SavedFilterId};

/// Machine-readable error codes clients use for localization and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    ListNotFound,
    SavedFilterNotFound,
    InvalidTaskField,
    InvalidSortOrder,
    InvalidTaskFilterValue,
    InvalidPagination,
    StorageFailure,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::ListNotFound => "E2001",
            Self::SavedFilterNotFound => "E2002",
            Self::InvalidTaskField => "E4016",
            Self::InvalidSortOrder => "E4017",
            Self::InvalidTaskFilterValue => "E4019",
            Self::InvalidPagination => "E4020",
            Self::StorageFailure => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::ListNotFound => "List not found",
            Self::SavedFilterNotFound => "Saved filter not found",
            Self::InvalidTaskField => "Invalid task field",
            Self::InvalidSortOrder => "Invalid sort order",
            Self::InvalidTaskFilterValue => "Invalid task filter value",
            Self::InvalidPagination => "Invalid pagination parameter",
            Self::StorageFailure => "Storage failure",
        }
    }

    /// Optional remediation hint that can be surfaced to clients.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .taskview/config.toml and retry."),
            Self::ListNotFound | Self::SavedFilterNotFound => None,
            Self::InvalidTaskField => {
                Some("Use one of the documented task fields, e.g. due_date or priority.")
            }
            Self::InvalidSortOrder => Some("Use `asc` or `desc` for order_by."),
            Self::InvalidTaskFilterValue => Some(
                "Pass one filter_comparator and filter_value per filter_by; dates accept epoch seconds or RFC3339.",
            ),
            Self::InvalidPagination => Some("Use positive integers for page and per_page."),
            Self::StorageFailure => Some("Retry once. If persistent, report a bug with logs."),
        }
    }

    /// HTTP status the transport layer answers with.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidTaskField
            | Self::InvalidSortOrder
            | Self::InvalidTaskFilterValue
            | Self::InvalidPagination => 400,
            Self::ListNotFound | Self::SavedFilterNotFound => 404,
            Self::ConfigParseError | Self::StorageFailure => 500,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors surfaced by collection requests.
///
/// Compilation errors are raised before any storage access, so a request
/// never produces partial results alongside an error.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    /// A filter or sort field outside the task field allow-list.
    #[error("invalid task field: '{field}'")]
    InvalidTaskField { field: String },

    /// An `order_by` token other than `asc` or `desc`.
    #[error("invalid sort order: '{order}'")]
    InvalidSortOrder { order: String },

    /// A filter value or comparator that does not fit the field's type.
    #[error("invalid filter value for '{field}': {reason}")]
    InvalidTaskFilterValue { field: String, reason: String },

    /// `page` or `per_page` that is not an integer.
    #[error("invalid pagination parameter {param}='{value}'")]
    InvalidPagination { param: &'static str, value: String },

    /// The list does not exist or the actor cannot read it.
    #[error("list {0} not found")]
    ListNotFound(ListId),

    /// The saved filter does not exist or the actor does not own it.
    #[error("saved filter {0} not found")]
    SavedFilterNotFound(SavedFilterId),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The backing store failed; propagated unchanged.
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl CollectionError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidTaskField { .. } => ErrorCode::InvalidTaskField,
            Self::InvalidSortOrder { .. } => ErrorCode::InvalidSortOrder,
            Self::InvalidTaskFilterValue { .. } => ErrorCode::InvalidTaskFilterValue,
            Self::InvalidPagination { .. } => ErrorCode::InvalidPagination,
            Self::ListNotFound(_) => ErrorCode::ListNotFound,
            Self::SavedFilterNotFound(_) => ErrorCode::SavedFilterNotFound,
            Self::Config(_) => ErrorCode::ConfigParseError,
            Self::Storage(_) => ErrorCode::StorageFailure,
        }
    }

    /// Remediation text for CLI and API error bodies.
    #[must_use]
    pub fn suggestion(&self) -> String {
        let code = self.error_code();
        code.hint().unwrap_or_else(|| code.message()).to_string()
    }

    pub(crate) fn filter_value(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTaskFilterValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for collection operations.
pub type CollectionResult<T> = Result<T, CollectionError>;
