//! Share grants and the requesting identity.
//!
//! Privilege is a total order (`admin ⊇ write ⊇ read`). Read visibility only
//! needs the floor, so every grant level makes its target readable; the level
//! itself matters for write-path authorization elsewhere.

use super::{ListId, NamespaceId, TeamId, UserId};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Access level carried by a share grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privilege {
    Read,
    Write,
    Admin,
}

impl Privilege {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Admin => "admin",
        }
    }

    /// Integer encoding used by the store (`0=read, 1=write, 2=admin`).
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Read => 0,
            Self::Write => 1,
            Self::Admin => 2,
        }
    }

    #[must_use]
    pub const fn from_i64(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(Self::Read),
            1 => Some(Self::Write),
            2 => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a privilege name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid privilege: '{0}'")]
pub struct ParsePrivilegeError(pub String);

impl FromStr for Privilege {
    type Err = ParsePrivilegeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "admin" => Ok(Self::Admin),
            _ => Err(ParsePrivilegeError(s.to_string())),
        }
    }
}

/// Who a grant is given to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Subject {
    User(UserId),
    Team(TeamId),
}

/// What a grant gives access to. A namespace grant covers every list in it,
/// including lists created after the grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ShareTarget {
    List(ListId),
    Namespace(NamespaceId),
}

/// A `(subject, target, privilege)` share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShareGrant {
    pub subject: Subject,
    pub target: ShareTarget,
    pub privilege: Privilege,
}

/// The authenticated identity a collection request runs as.
///
/// Team memberships are resolved by the authentication layer; the store
/// offers `db::query::load_actor` for callers without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub team_ids: Vec<TeamId>,
}

impl Actor {
    #[must_use]
    pub fn new(user_id: UserId, team_ids: impl IntoIterator<Item = TeamId>) -> Self {
        let mut team_ids: Vec<TeamId> = team_ids.into_iter().collect();
        team_ids.sort_unstable();
        team_ids.dedup();
        Self { user_id, team_ids }
    }

    /// Whether the subject of a grant names this actor directly or via a team.
    #[must_use]
    pub fn is_named_by(&self, subject: Subject) -> bool {
        match subject {
            Subject::User(user_id) => user_id == self.user_id,
            Subject::Team(team_id) => self.team_ids.binary_search(&team_id).is_ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privilege_is_a_total_order() {
        assert!(Privilege::Admin > Privilege::Write);
        assert!(Privilege::Write > Privilege::Read);
        // Stored levels are compared with `>=` in SQL.
        assert!(Privilege::Admin.as_i64() > Privilege::Write.as_i64());
        assert!(Privilege::Write.as_i64() > Privilege::Read.as_i64());
    }

    #[test]
    fn privilege_integer_encoding_roundtrips() {
        for privilege in [Privilege::Read, Privilege::Write, Privilege::Admin] {
            assert_eq!(Privilege::from_i64(privilege.as_i64()), Some(privilege));
        }
        assert_eq!(Privilege::from_i64(3), None);
    }

    #[test]
    fn privilege_parses_case_insensitively() {
        assert_eq!("Admin".parse::<Privilege>(), Ok(Privilege::Admin));
        assert!("owner".parse::<Privilege>().is_err());
    }

    #[test]
    fn actor_matches_user_and_team_subjects() {
        let actor = Actor::new(UserId(1), [TeamId(9), TeamId(3), TeamId(9)]);
        assert_eq!(actor.team_ids, vec![TeamId(3), TeamId(9)]);
        assert!(actor.is_named_by(Subject::User(UserId(1))));
        assert!(actor.is_named_by(Subject::Team(TeamId(3))));
        assert!(!actor.is_named_by(Subject::User(UserId(2))));
        assert!(!actor.is_named_by(Subject::Team(TeamId(4))));
    }
}
