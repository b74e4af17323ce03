//! In-memory judge and scripted decisions for engine tests.

use chrono::{FixedOffset, TimeZone as _};
use djsync_util::decide::Decide;
use djsync_util::model::{
    Archive, Contest, ContestId, JudgeUrl, NewContest, RemoteId, RemoteOutcome, ResourceKind,
    ResourceName, TeamCategory,
};
use djsync_util::service::Remote;

use crate::{Console, Result};

/// Mutations seen by [`FakeRemote`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    CreateContest(String, String),
    UploadValidator(String),
    UploadProblem(String),
    Delete(ResourceKind, RemoteId),
    Link(RemoteId, String),
}

#[derive(Debug)]
pub struct FakeRemote {
    judge: JudgeUrl,
    problems: Vec<(RemoteId, String)>,
    validators: Vec<(RemoteId, String)>,
    contests: Vec<Contest>,
    categories: Vec<TeamCategory>,
    links: Vec<(ContestId, RemoteId)>,
    next_id: usize,
    pub ops: Vec<Op>,
    /// Deletions are acknowledged but have no effect.
    pub ignore_deletes: bool,
    /// Answer to every upload instead of creating the resource.
    pub upload_outcome: Option<RemoteOutcome>,
    pub link_outcome: Option<RemoteOutcome>,
    pub create_outcome: Option<RemoteOutcome>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            judge: "https://judge.example.org"
                .parse()
                .expect("valid judge url"),
            problems: Vec::new(),
            validators: Vec::new(),
            contests: Vec::new(),
            categories: Vec::new(),
            links: Vec::new(),
            next_id: 1,
            ops: Vec::new(),
            ignore_deletes: false,
            upload_outcome: None,
            link_outcome: None,
            create_outcome: None,
        }
    }

    fn next_id(&mut self) -> RemoteId {
        let id = RemoteId::from(self.next_id.to_string());
        self.next_id += 1;
        id
    }

    fn resources_mut(&mut self, kind: ResourceKind) -> &mut Vec<(RemoteId, String)> {
        match kind {
            ResourceKind::Problem => &mut self.problems,
            ResourceKind::Validator => &mut self.validators,
        }
    }

    fn add(&mut self, kind: ResourceKind, name: &str) -> RemoteId {
        let id = self.next_id();
        self.resources_mut(kind).push((id.clone(), name.to_owned()));
        id
    }

    pub fn add_problem(&mut self, name: &str) -> RemoteId {
        self.add(ResourceKind::Problem, name)
    }

    pub fn add_validator(&mut self, name: &str) -> RemoteId {
        self.add(ResourceKind::Validator, name)
    }

    pub fn add_contest(&mut self, contest: Contest) {
        self.contests.push(contest);
    }

    pub fn add_category(&mut self, category: TeamCategory) {
        self.categories.push(category);
    }

    pub fn links(&self) -> &[(ContestId, RemoteId)] {
        &self.links
    }

    pub fn problem_names(&self) -> Vec<&str> {
        self.problems.iter().map(|(_, name)| name.as_str()).collect()
    }
}

impl Remote for FakeRemote {
    fn judge(&self) -> &JudgeUrl {
        &self.judge
    }

    fn find_resource_ids(
        &mut self,
        kind: ResourceKind,
        name: &ResourceName,
        _cnsl: &mut Console,
    ) -> Result<Vec<RemoteId>> {
        Ok(self
            .resources_mut(kind)
            .iter()
            .filter(|(_, listed)| listed.contains(name.as_str()))
            .map(|(id, _)| id.clone())
            .collect())
    }

    fn upload_problem(
        &mut self,
        contest_id: &ContestId,
        archive: &Archive,
        _cnsl: &mut Console,
    ) -> Result<RemoteOutcome> {
        self.ops.push(Op::UploadProblem(archive.name().to_string()));
        if let Some(outcome) = &self.upload_outcome {
            return Ok(outcome.clone());
        }
        let id = self.add_problem(archive.name().as_str());
        self.links.push((contest_id.clone(), id));
        Ok(RemoteOutcome::Created)
    }

    fn upload_validator(&mut self, archive: &Archive, _cnsl: &mut Console) -> Result<RemoteOutcome> {
        self.ops.push(Op::UploadValidator(archive.name().to_string()));
        if let Some(outcome) = &self.upload_outcome {
            return Ok(outcome.clone());
        }
        self.add_validator(archive.name().as_str());
        Ok(RemoteOutcome::Created)
    }

    fn delete_resource(
        &mut self,
        kind: ResourceKind,
        id: &RemoteId,
        _cnsl: &mut Console,
    ) -> Result<()> {
        self.ops.push(Op::Delete(kind, id.clone()));
        if !self.ignore_deletes {
            self.resources_mut(kind).retain(|(listed, _)| listed != id);
            self.links.retain(|(_, linked)| linked != id);
        }
        Ok(())
    }

    fn link_problem(
        &mut self,
        contest_id: &ContestId,
        problem_id: &RemoteId,
        label: &str,
        _cnsl: &mut Console,
    ) -> Result<RemoteOutcome> {
        self.ops.push(Op::Link(problem_id.clone(), label.to_owned()));
        if let Some(outcome) = &self.link_outcome {
            return Ok(outcome.clone());
        }
        let link = (contest_id.clone(), problem_id.clone());
        if self.links.contains(&link) {
            Ok(RemoteOutcome::AlreadyLinked)
        } else {
            self.links.push(link);
            Ok(RemoteOutcome::Created)
        }
    }

    fn list_contests(&mut self, _cnsl: &mut Console) -> Result<Vec<Contest>> {
        Ok(self.contests.clone())
    }

    fn list_team_categories(&mut self, _cnsl: &mut Console) -> Result<Vec<TeamCategory>> {
        Ok(self.categories.clone())
    }

    fn create_contest(
        &mut self,
        contest: &NewContest,
        category: &TeamCategory,
        _cnsl: &mut Console,
    ) -> Result<RemoteOutcome> {
        self.ops.push(Op::CreateContest(
            contest.shortname().clone(),
            category.id().clone(),
        ));
        if let Some(outcome) = &self.create_outcome {
            return Ok(outcome.clone());
        }
        let utc = FixedOffset::east(0);
        let id = self.next_id();
        self.contests.push(Contest::new(
            id.as_str(),
            contest.shortname().as_str(),
            utc.from_local_datetime(contest.start()).single(),
            utc.from_local_datetime(contest.end()).single(),
        ));
        Ok(RemoteOutcome::Created)
    }
}

/// Fixed answers, recording what was offered.
#[derive(Debug, Default)]
pub struct Scripted {
    pub replace: bool,
    pub contest: usize,
    pub category: usize,
    pub offered_contests: Vec<String>,
    pub offered_categories: Vec<String>,
}

impl Scripted {
    pub fn keep() -> Self {
        Self::default()
    }

    pub fn replace() -> Self {
        Self {
            replace: true,
            ..Self::default()
        }
    }
}

impl Decide for Scripted {
    fn confirm_replace(
        &mut self,
        _kind: ResourceKind,
        _name: &ResourceName,
        _cnsl: &mut Console,
    ) -> Result<bool> {
        Ok(self.replace)
    }

    fn select_contest(&mut self, contests: &[Contest], _cnsl: &mut Console) -> Result<usize> {
        self.offered_contests = contests
            .iter()
            .map(|contest| contest.shortname().clone())
            .collect();
        Ok(self.contest)
    }

    fn select_category(
        &mut self,
        categories: &[TeamCategory],
        _cnsl: &mut Console,
    ) -> Result<usize> {
        self.offered_categories = categories
            .iter()
            .map(|category| category.name().clone())
            .collect();
        Ok(self.category)
    }
}
