use std::fmt;

use serde::Serialize;

static BODY_EXCERPT_LEN: usize = 200;

/// Meaning of a remote mutation, decoded once from status code and body.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum RemoteOutcome {
    /// The resource (or link) was newly created.
    Created,
    /// The judge refused because a resource with the same name exists.
    AlreadyExists { status: u16 },
    /// The problem was already part of the contest.
    AlreadyLinked,
    /// Anything else.
    Rejected { status: u16, body: String },
}

impl RemoteOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created)
    }

    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            body: body.into(),
        }
    }
}

impl fmt::Display for RemoteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::AlreadyExists { status } => {
                write!(f, "status {}, maybe it was uploaded before", status)
            }
            Self::AlreadyLinked => f.write_str("already linked"),
            Self::Rejected { status, body } => {
                let body = body.trim();
                if body.is_empty() {
                    write!(f, "status {}", status)
                } else if body.chars().count() > BODY_EXCERPT_LEN {
                    let excerpt: String = body.chars().take(BODY_EXCERPT_LEN).collect();
                    write!(f, "status {} : {} ...", status, excerpt)
                } else {
                    write!(f, "status {} : {}", status, body)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rejected_truncates_body() {
        let long_body = "x".repeat(1000);
        let actual = RemoteOutcome::rejected(500, long_body).to_string();
        assert!(actual.starts_with("status 500 : xxx"));
        assert!(actual.ends_with(" ..."));
        assert!(actual.len() < 300);
    }

    #[test]
    fn test_display_rejected_empty_body() {
        assert_eq!(RemoteOutcome::rejected(403, "  ").to_string(), "status 403");
    }
}
