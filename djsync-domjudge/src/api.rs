//! Endpoints of the structured api. Every request carries basic auth.

use djsync_util::error::SyncError;
use djsync_util::model::{Contest, ContestId, RemoteId, RemoteOutcome};

use crate::Result;

pub static CONTESTS_PATH: &str = "/api/v4/contests";

pub fn contest_problems_path(contest_id: &ContestId) -> String {
    format!("{}/{}/problems", CONTESTS_PATH, contest_id)
}

pub fn contest_problem_path(contest_id: &ContestId, problem_id: &RemoteId) -> String {
    format!("{}/{}/problems/{}", CONTESTS_PATH, contest_id, problem_id)
}

/// Decodes the contest listing. A body that is not a contest list, such as a login page
/// served with 200, is a rejection.
pub fn parse_contests(body: &str) -> Result<Vec<Contest>> {
    serde_json::from_str(body).map_err(|err| {
        tracing::debug!(%err, "could not decode contest listing");
        SyncError::Remote {
            operation: "Contest listing".into(),
            resource: CONTESTS_PATH.into(),
            outcome: RemoteOutcome::rejected(200, body),
        }
        .into()
    })
}
