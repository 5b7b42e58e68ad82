//! Collection scopes and the shared list-identifier space.

use crate::error::{CollectionError, CollectionResult};
use crate::model::{FAVORITES_PSEUDO_LIST, ListId, SavedFilterId};
use serde::Serialize;
use std::fmt;

/// Which tasks a collection request draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Scope {
    /// Every list the actor can read.
    AllVisible,
    /// One list, which the actor must be able to read.
    ConcreteList(ListId),
    /// Tasks the actor marked favorite, in lists they can read.
    Favorites,
    /// A saved filter owned by the actor.
    SavedFilter(SavedFilterId),
}

impl Scope {
    /// Decode an optional `list` identifier.
    ///
    /// Positive ids are concrete lists, `-1` is favorites, and `-2` and below
    /// address saved filters (`-2` is saved filter 1).
    ///
    /// # Errors
    ///
    /// [`CollectionError::ListNotFound`] for `0`, which names nothing.
    pub fn from_list_param(list: Option<i64>) -> CollectionResult<Self> {
        match list {
            None => Ok(Self::AllVisible),
            Some(id) if id > 0 => Ok(Self::ConcreteList(ListId(id))),
            Some(FAVORITES_PSEUDO_LIST) => Ok(Self::Favorites),
            Some(id) => SavedFilterId::from_pseudo_list(id)
                .map(Self::SavedFilter)
                .ok_or(CollectionError::ListNotFound(ListId(id))),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllVisible => f.write_str("all visible lists"),
            Self::ConcreteList(id) => write!(f, "list {id}"),
            Self::Favorites => f.write_str("favorites"),
            Self::SavedFilter(id) => write!(f, "saved filter {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn list_identifiers_decode_to_scopes() {
        assert_eq!(Scope::from_list_param(None).expect("none"), Scope::AllVisible);
        assert_eq!(
            Scope::from_list_param(Some(7)).expect("list"),
            Scope::ConcreteList(ListId(7))
        );
        assert_eq!(Scope::from_list_param(Some(-1)).expect("fav"), Scope::Favorites);
        assert_eq!(
            Scope::from_list_param(Some(-2)).expect("filter"),
            Scope::SavedFilter(SavedFilterId(1))
        );
        assert_eq!(
            Scope::from_list_param(Some(-11)).expect("filter"),
            Scope::SavedFilter(SavedFilterId(10))
        );
    }

    #[test]
    fn zero_names_no_list() {
        let err = Scope::from_list_param(Some(0)).expect_err("zero");
        assert_eq!(err.error_code(), ErrorCode::ListNotFound);
    }

    #[test]
    fn extreme_identifiers_do_not_overflow() {
        assert_eq!(
            Scope::from_list_param(Some(i64::MIN)).expect("filter"),
            Scope::SavedFilter(SavedFilterId(i64::MAX))
        );
    }
}
