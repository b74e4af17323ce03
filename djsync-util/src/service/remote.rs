//! Typed view of the judge used by the reconciliation engine.

use crate::model::{
    Archive, Contest, ContestId, JudgeUrl, NewContest, RemoteId, RemoteOutcome, ResourceKind,
    ResourceName, TeamCategory,
};
use crate::{Console, Result};

/// Primitive queries and mutations of a judge.
///
/// Mutations return the decoded [`RemoteOutcome`] and leave it to the caller to decide
/// what counts as success. `Err` is reserved for transport failures and for responses
/// that could not be read at all.
pub trait Remote {
    fn judge(&self) -> &JudgeUrl;

    /// Ids of all listed resources of `kind` whose name contains `name`, in listing order.
    fn find_resource_ids(
        &mut self,
        kind: ResourceKind,
        name: &ResourceName,
        cnsl: &mut Console,
    ) -> Result<Vec<RemoteId>>;

    /// The first listed resource of `kind` whose name contains `name`.
    fn find_resource_id(
        &mut self,
        kind: ResourceKind,
        name: &ResourceName,
        cnsl: &mut Console,
    ) -> Result<Option<RemoteId>> {
        let ids = self.find_resource_ids(kind, name, cnsl)?;
        Ok(ids.into_iter().next())
    }

    fn upload_problem(
        &mut self,
        contest_id: &ContestId,
        archive: &Archive,
        cnsl: &mut Console,
    ) -> Result<RemoteOutcome>;

    fn upload_validator(&mut self, archive: &Archive, cnsl: &mut Console)
        -> Result<RemoteOutcome>;

    /// Requests deletion. The response is not trusted, callers look the resource up again.
    fn delete_resource(
        &mut self,
        kind: ResourceKind,
        id: &RemoteId,
        cnsl: &mut Console,
    ) -> Result<()>;

    fn link_problem(
        &mut self,
        contest_id: &ContestId,
        problem_id: &RemoteId,
        label: &str,
        cnsl: &mut Console,
    ) -> Result<RemoteOutcome>;

    fn list_contests(&mut self, cnsl: &mut Console) -> Result<Vec<Contest>>;

    fn list_team_categories(&mut self, cnsl: &mut Console) -> Result<Vec<TeamCategory>>;

    fn create_contest(
        &mut self,
        contest: &NewContest,
        category: &TeamCategory,
        cnsl: &mut Console,
    ) -> Result<RemoteOutcome>;
}
