//! Meaning of the judge's answers to mutations.
//!
//! The judge overloads status codes, so each operation has its own decoder. All of them
//! are pure functions of status and body.

use djsync_util::model::RemoteOutcome;
use djsync_util::regex;
use reqwest::StatusCode;

static PROBLEM_SAVED_MARKER: &str = "Saved problem";

/// `POST /api/v4/contests/{id}/problems`
pub fn problem_upload(status: StatusCode, body: &str) -> RemoteOutcome {
    match status {
        StatusCode::OK if body.contains(PROBLEM_SAVED_MARKER) => RemoteOutcome::Created,
        StatusCode::OK => RemoteOutcome::AlreadyExists {
            status: status.as_u16(),
        },
        _ => RemoteOutcome::rejected(status.as_u16(), body),
    }
}

/// `POST /jury/executables/add`
pub fn validator_upload(status: StatusCode, body: &str) -> RemoteOutcome {
    match status {
        StatusCode::OK => RemoteOutcome::Created,
        // duplicates surface as a database error page
        StatusCode::INTERNAL_SERVER_ERROR => RemoteOutcome::AlreadyExists {
            status: status.as_u16(),
        },
        _ => RemoteOutcome::rejected(status.as_u16(), body),
    }
}

/// `PUT /api/v4/contests/{cid}/problems/{pid}`
pub fn problem_link(status: StatusCode, body: &str) -> RemoteOutcome {
    if status.is_success() {
        RemoteOutcome::Created
    } else if regex!(r"(?i)already\s+linked").is_match(body) {
        RemoteOutcome::AlreadyLinked
    } else {
        RemoteOutcome::rejected(status.as_u16(), body)
    }
}

/// `POST /jury/contests/add`, after following redirects.
pub fn contest_creation(status: StatusCode, body: &str) -> RemoteOutcome {
    match status {
        StatusCode::OK => RemoteOutcome::Created,
        _ => RemoteOutcome::rejected(status.as_u16(), body),
    }
}
