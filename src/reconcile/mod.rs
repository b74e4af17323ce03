//! Brings remote resources in line with local archives.
//!
//! For every archive the remote listing decides what happens:
//!
//! - nothing matches the name: the archive is uploaded.
//! - a resource matches: the user decides between replacing it (delete, check, upload)
//!   and keeping it. A kept problem is linked to the target contest, a kept validator is
//!   left alone.
//!
//! Only an explicit `Created` counts as a successful upload. Everything else stops the
//! run with the decoded outcome.

use std::fmt;
use std::io::Write as _;

use djsync_util::abs_path::AbsPathBuf;
use djsync_util::decide::Decide;
use djsync_util::error::SyncError;
use djsync_util::model::{
    Archive, ContestId, Presence, RemoteId, RemoteOutcome, ResourceKind, ResourceName,
};
use djsync_util::service::Remote;
use serde::Serialize;

mod batch;
mod contest;

pub use batch::{problem_dirs, ProblemArtifacts};

use crate::{Console, Result};

/// What was done to a resource.
#[derive(Serialize, IntoStaticStr, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Action {
    Uploaded,
    Replaced,
    Linked,
    AlreadyLinked,
    Kept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.into())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceReport {
    pub kind: ResourceKind,
    pub name: ResourceName,
    pub action: Action,
    /// Remote id, when the run learned it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RemoteId>,
}

impl fmt::Display for ResourceReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:9} {:24} {}", self.kind, self.name, self.action)?;
        if let Some(id) = &self.id {
            write!(f, " (id {})", id)?;
        }
        Ok(())
    }
}

/// Reconciliation over one remote, with one source of decisions.
pub struct Engine<'a> {
    remote: &'a mut dyn Remote,
    decide: &'a mut dyn Decide,
    cnsl: &'a mut Console,
}

impl<'a> Engine<'a> {
    pub fn new(
        remote: &'a mut dyn Remote,
        decide: &'a mut dyn Decide,
        cnsl: &'a mut Console,
    ) -> Self {
        Self {
            remote,
            decide,
            cnsl,
        }
    }

    /// All distinct remote resources of `kind` matching `name`.
    pub fn locate(&mut self, kind: ResourceKind, name: &ResourceName) -> Result<Presence> {
        let ids = self.remote.find_resource_ids(kind, name, self.cnsl)?;
        Ok(Presence::from_matches(ids))
    }

    /// Reconciles the validator of a problem, then the problem itself.
    pub fn sync_problem(
        &mut self,
        contest_id: &ContestId,
        artifacts: &ProblemArtifacts,
    ) -> Result<Vec<ResourceReport>> {
        let mut reports = Vec::new();
        if let Some(validator) = artifacts.load_validator()? {
            reports.push(self.reconcile(contest_id, &validator)?);
        }
        let problem = artifacts.load_problem()?;
        reports.push(self.reconcile(contest_id, &problem)?);
        Ok(reports)
    }

    /// Reconciles every problem directory under `contest_dir` in name order.
    ///
    /// Stops at the first failure. Problems reconciled before it stay as they are.
    pub fn sync_batch(
        &mut self,
        contest_id: &ContestId,
        contest_dir: &AbsPathBuf,
    ) -> Result<Vec<ResourceReport>> {
        let mut reports = Vec::new();
        for problem_dir in problem_dirs(contest_dir)? {
            writeln!(self.cnsl, "Problem directory {}", problem_dir)?;
            let artifacts = ProblemArtifacts::in_problem_dir(&problem_dir)?;
            reports.extend(self.sync_problem(contest_id, &artifacts)?);
        }
        Ok(reports)
    }

    /// Makes the remote copy of `archive` match the local one.
    pub fn reconcile(
        &mut self,
        contest_id: &ContestId,
        archive: &Archive,
    ) -> Result<ResourceReport> {
        let kind = *archive.kind();
        let name = archive.name();
        let presence = self.locate(kind, name)?;
        tracing::info!(%kind, %name, ?presence, "located");

        let (action, id) = match presence.first().cloned() {
            None => {
                self.upload(contest_id, archive)?;
                (Action::Uploaded, None)
            }
            Some(first) => {
                if self.decide.confirm_replace(kind, name, self.cnsl)? {
                    self.replace(contest_id, archive, &presence)?;
                    (Action::Replaced, None)
                } else {
                    match kind {
                        ResourceKind::Problem => {
                            (self.link(contest_id, &first, name)?, Some(first))
                        }
                        ResourceKind::Validator => (Action::Kept, Some(first)),
                    }
                }
            }
        };

        let report = ResourceReport {
            kind,
            name: name.clone(),
            action,
            id,
        };
        writeln!(self.cnsl, "{}", report)?;
        Ok(report)
    }

    fn replace(
        &mut self,
        contest_id: &ContestId,
        archive: &Archive,
        presence: &Presence,
    ) -> Result<()> {
        let kind = *archive.kind();
        let name = archive.name();
        let id = match presence {
            Presence::Present(id) => id,
            Presence::Ambiguous(ids) => {
                let ids = ids.iter().map(RemoteId::as_str).collect::<Vec<_>>();
                return Err(SyncError::consistency(format!(
                    "Refusing to delete {} {} : the name matches several resources (ids {})",
                    kind,
                    name,
                    ids.join(", ")
                ))
                .into());
            }
            Presence::Absent => {
                let message = format!("Could not find {} {}", kind, name);
                return Err(SyncError::not_found(message).into());
            }
        };

        self.remote.delete_resource(kind, id, self.cnsl)?;
        if !self.locate(kind, name)?.is_absent() {
            return Err(SyncError::consistency(format!(
                "{} {} (id {}) is still listed after deleting it",
                kind, name, id
            ))
            .into());
        }
        tracing::info!(%kind, %name, %id, "deleted");
        self.upload(contest_id, archive)
    }

    fn upload(&mut self, contest_id: &ContestId, archive: &Archive) -> Result<()> {
        let (operation, outcome) = match archive.kind() {
            ResourceKind::Problem => (
                "Problem upload",
                self.remote.upload_problem(contest_id, archive, self.cnsl)?,
            ),
            ResourceKind::Validator => (
                "Validator upload",
                self.remote.upload_validator(archive, self.cnsl)?,
            ),
        };
        if outcome.is_created() {
            Ok(())
        } else {
            Err(SyncError::Remote {
                operation: operation.into(),
                resource: archive.name().to_string(),
                outcome,
            }
            .into())
        }
    }

    fn link(
        &mut self,
        contest_id: &ContestId,
        problem_id: &RemoteId,
        name: &ResourceName,
    ) -> Result<Action> {
        let outcome = self
            .remote
            .link_problem(contest_id, problem_id, name.as_str(), self.cnsl)?;
        match outcome {
            RemoteOutcome::Created => Ok(Action::Linked),
            RemoteOutcome::AlreadyLinked => Ok(Action::AlreadyLinked),
            outcome => Err(SyncError::Remote {
                operation: "Problem link".into(),
                resource: name.to_string(),
                outcome,
            }
            .into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod fake;
