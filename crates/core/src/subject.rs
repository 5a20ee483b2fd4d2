//! Permission subjects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Wire name of the anonymous subject.
pub const ANONYMOUS_USER: &str = "AnonymousUser";

/// Wire name of the pseudo-group every authenticated user belongs to.
pub const REGISTERED_MEMBERS: &str = "registered-members";

/// Prefix that marks a group subject on the wire.
pub const GROUP_PREFIX: &str = "group:";

/// Errors from parsing a [`Subject`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubjectParseError {
    /// The subject string was empty.
    #[error("subject cannot be empty")]
    Empty,
    /// A `group:` prefix with no group name after it.
    #[error("group subject has no name: {0:?}")]
    EmptyGroup(String),
}

/// Someone a permission grant is attached to.
///
/// Serialized as a single string so a subject can key a JSON object:
/// `AnonymousUser`, `registered-members`, `group:<name>`, or a bare username.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Subject {
    /// The unauthenticated visitor.
    Anonymous,
    /// Every authenticated user.
    RegisteredMembers,
    /// A named group.
    Group(String),
    /// A named user.
    User(String),
}

impl Subject {
    /// A user subject.
    pub fn user(name: impl Into<String>) -> Self {
        Self::User(name.into())
    }

    /// A group subject.
    pub fn group(name: impl Into<String>) -> Self {
        Self::Group(name.into())
    }

    /// Reserved subjects can never be granted `manage`.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        matches!(self, Self::Anonymous | Self::RegisteredMembers)
    }

    /// The username, when this subject is a user.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::User(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str(ANONYMOUS_USER),
            Self::RegisteredMembers => f.write_str(REGISTERED_MEMBERS),
            Self::Group(name) => write!(f, "{GROUP_PREFIX}{name}"),
            Self::User(name) => f.write_str(name),
        }
    }
}

impl FromStr for Subject {
    type Err = SubjectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SubjectParseError::Empty);
        }
        if s == ANONYMOUS_USER {
            return Ok(Self::Anonymous);
        }
        if s == REGISTERED_MEMBERS {
            return Ok(Self::RegisteredMembers);
        }
        if let Some(group) = s.strip_prefix(GROUP_PREFIX) {
            let group = group.trim();
            if group.is_empty() {
                return Err(SubjectParseError::EmptyGroup(s.to_owned()));
            }
            return Ok(Self::Group(group.to_owned()));
        }
        Ok(Self::User(s.to_owned()))
    }
}

impl TryFrom<String> for Subject {
    type Error = SubjectParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Subject> for String {
    fn from(subject: Subject) -> Self {
        subject.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("AnonymousUser", Subject::Anonymous)]
    #[case("registered-members", Subject::RegisteredMembers)]
    #[case("group:editors", Subject::group("editors"))]
    #[case("alice", Subject::user("alice"))]
    fn parse_and_display_agree(#[case] raw: &str, #[case] expected: Subject) {
        let parsed: Subject = raw.parse().unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.to_string(), raw);
    }

    #[test]
    fn empty_group_is_rejected() {
        assert!(matches!(
            "group:".parse::<Subject>(),
            Err(SubjectParseError::EmptyGroup(_))
        ));
        assert_eq!("".parse::<Subject>(), Err(SubjectParseError::Empty));
    }

    #[test]
    fn reserved_subjects() {
        assert!(Subject::Anonymous.is_reserved());
        assert!(Subject::RegisteredMembers.is_reserved());
        assert!(!Subject::user("bob").is_reserved());
        assert!(!Subject::group("staff").is_reserved());
    }

    #[test]
    fn subjects_key_json_objects() {
        let mut map = BTreeMap::new();
        map.insert(Subject::user("bob"), 1);
        map.insert(Subject::Anonymous, 2);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"AnonymousUser":2,"bob":1}"#);

        let back: BTreeMap<Subject, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
