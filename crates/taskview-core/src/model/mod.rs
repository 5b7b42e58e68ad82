//! Domain types read by the collection engine.

pub mod access;
pub mod task;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map(Self)
            }
        }
    };
}

id_type!(
    /// Identifier of a user account.
    UserId
);
id_type!(
    /// Identifier of a team.
    TeamId
);
id_type!(
    /// Identifier of a namespace grouping lists.
    NamespaceId
);
id_type!(
    /// Identifier of a concrete (task-owning) list.
    ListId
);
id_type!(
    /// Identifier of a task. Monotonic; the final sort tie-break.
    TaskId
);
id_type!(
    /// Identifier of a label.
    LabelId
);
id_type!(
    /// Internal identifier of a saved filter.
    ///
    /// Externally a saved filter is addressed like a list through a negative
    /// pseudo-list identifier, see [`SavedFilterId::from_pseudo_list`].
    SavedFilterId
);

/// Pseudo-list identifier reserved for the favorites view.
pub const FAVORITES_PSEUDO_LIST: i64 = -1;

impl SavedFilterId {
    /// Decode a negative pseudo-list identifier (`-2` is saved filter 1).
    #[must_use]
    pub const fn from_pseudo_list(list_id: i64) -> Option<Self> {
        if list_id <= FAVORITES_PSEUDO_LIST - 1 {
            Some(Self(-(list_id + 1)))
        } else {
            None
        }
    }

    /// The pseudo-list identifier clients use to select this filter.
    #[must_use]
    pub const fn to_pseudo_list(self) -> i64 {
        -self.0 - 1
    }
}

/// Convert stored epoch seconds into a UTC timestamp.
#[must_use]
pub fn from_epoch(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}
