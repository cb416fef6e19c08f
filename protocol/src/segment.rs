use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Identifier of a user that can be mentioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// One piece of editor content.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    /// Free text. May contain literal newlines.
    PlainText { value: String },

    /// Atomic reference to a user. The editor never places a cursor inside it.
    Mention {
        user_id: UserId,
        display_name: String,
    },
}

impl Segment {
    pub fn text(value: impl Into<String>) -> Self {
        Self::PlainText {
            value: value.into(),
        }
    }

    pub fn mention(user_id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self::Mention {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }

    /// Number of bytes this segment occupies in the rendered text.
    ///
    /// A mention renders as `@` followed by its display name.
    pub fn rendered_len(&self) -> usize {
        match self {
            Self::PlainText { value } => value.len(),
            Self::Mention { display_name, .. } => '@'.len_utf8() + display_name.len(),
        }
    }

    pub fn is_mention(&self) -> bool {
        matches!(self, Self::Mention { .. })
    }
}

/// A user returned by the lookup collaborator, eligible for insertion as a mention.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub id: UserId,
    pub name: String,
}

impl Candidate {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn to_segment(&self) -> Segment {
        Segment::Mention {
            user_id: self.id,
            display_name: self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mention_renders_with_sigil() {
        assert_eq!(Segment::mention(7, "Bob").rendered_len(), 4);
        assert_eq!(Segment::text("h\u{a0}").rendered_len(), 3);
    }

    #[test]
    fn candidate_deserializes_from_lookup_payload() {
        let candidate: Candidate =
            serde_json::from_str(r#"{"id":42,"name":"Bob"}"#).expect("parse candidate");
        assert_eq!(candidate, Candidate::new(42, "Bob"));
        assert_eq!(candidate.to_segment(), Segment::mention(42, "Bob"));
    }
}
