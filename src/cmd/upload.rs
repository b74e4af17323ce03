use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Utc;
use djsync_util::abs_path::AbsPathBuf;
use djsync_util::decide::Prompt;
use djsync_util::error::SyncError;
use djsync_util::model::{Contest, ContestPolicy, ContestSelection, JudgeUrl, NewContest};
use djsync_util::service::Remote as _;
use serde::Serialize;
use structopt::StructOpt;

use crate::cmd::{Outcome, Run};
use crate::reconcile::{Engine, ProblemArtifacts, ResourceReport};
use crate::{Config, Console, GlobalOpt, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct UploadOpt {
    /// Problem archive, usually <problem>/build/<problem>.zip
    #[structopt(
        name = "problem",
        parse(from_os_str),
        required_unless = "batch",
        conflicts_with = "batch"
    )]
    problem: Option<PathBuf>,
    /// Validator archive of the problem
    #[structopt(name = "validator", parse(from_os_str))]
    validator: Option<PathBuf>,
    /// Uploads the built archives of every problem directory in the contest directory
    #[structopt(long)]
    batch: bool,
    /// Contest directory used with --batch, the current directory by default
    #[structopt(long, parse(from_os_str), requires = "batch")]
    dir: Option<PathBuf>,
    /// Short name of the target contest
    #[structopt(long, conflicts_with = "create")]
    contest: Option<String>,
    /// Accepts any running or upcoming contest as target instead of running testing ones
    #[structopt(long, conflicts_with = "create")]
    upcoming: bool,
    /// Creates a contest with this short name and uploads to it
    #[structopt(long, requires_all = &["start", "end"])]
    create: Option<String>,
    /// Display name of the created contest, the short name by default
    #[structopt(long, requires = "create")]
    name: Option<String>,
    /// Start of the created contest, as "YYYY-MM-DD HH:MM" in the configured timezone
    #[structopt(long, requires = "create")]
    start: Option<String>,
    /// End of the created contest, as "YYYY-MM-DD HH:MM" in the configured timezone
    #[structopt(long, requires = "create")]
    end: Option<String>,
}

/// What a run uploads, resolved before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Target {
    Problem(ProblemArtifacts),
    Batch(AbsPathBuf),
}

impl UploadOpt {
    fn selection(&self) -> Result<ContestSelection> {
        let policy = if self.upcoming {
            ContestPolicy::Upcoming
        } else {
            ContestPolicy::ActiveTesting
        };
        let selection = match (&self.create, &self.contest) {
            (Some(shortname), _) => {
                let (start, end) = match (&self.start, &self.end) {
                    (Some(start), Some(end)) => (start, end),
                    _ => {
                        return Err(SyncError::configuration(
                            "Creating a contest needs both --start and --end",
                        )
                        .into())
                    }
                };
                let name = self.name.as_ref().unwrap_or(shortname);
                ContestSelection::Create(NewContest::parse(
                    shortname.as_str(),
                    name.as_str(),
                    start,
                    end,
                )?)
            }
            (None, Some(shortname)) => ContestSelection::Named(shortname.clone(), policy),
            (None, None) => ContestSelection::Choose(policy),
        };
        Ok(selection)
    }

    fn target(&self) -> Result<Target> {
        if self.batch {
            let dir = match &self.dir {
                Some(dir) => resolve(dir)?,
                None => AbsPathBuf::cwd()
                    .map_err(|err| SyncError::configuration(format!("{:#}", err)))?,
            };
            return Ok(Target::Batch(dir));
        }

        let problem = self.problem.as_ref().ok_or_else(|| {
            SyncError::configuration("Specify a problem archive or --batch")
        })?;
        let problem = existing_archive("problem", problem)?;
        let validator = match &self.validator {
            Some(validator) => Some(existing_archive("validator", validator)?),
            None => None,
        };
        Ok(Target::Problem(ProblemArtifacts::new(problem, validator)))
    }
}

fn resolve(path: &Path) -> Result<AbsPathBuf> {
    AbsPathBuf::resolve(path).map_err(|err| {
        SyncError::configuration(format!("Invalid path {} : {:#}", path.display(), err)).into()
    })
}

fn existing_archive(kind: &str, path: &Path) -> Result<AbsPathBuf> {
    let path = resolve(path)?;
    if !path.is_file() {
        return Err(SyncError::configuration(format!(
            "Could not find {} archive : {}",
            kind, path
        ))
        .into());
    }
    Ok(path)
}

impl Run for UploadOpt {
    fn run(
        &self,
        global_opt: &GlobalOpt,
        conf: &Config,
        cnsl: &mut Console,
    ) -> Result<Box<dyn Outcome>> {
        // local mistakes fail before logging in
        let selection = self.selection()?;
        let target = self.target()?;

        let mut client = conf.connect(global_opt.judge.as_ref(), cnsl)?;
        let mut decide = Prompt;
        let mut engine = Engine::new(&mut client, &mut decide, cnsl);
        let contest = engine.resolve_contest(&selection, Utc::now())?;
        let resources = match &target {
            Target::Problem(artifacts) => engine.sync_problem(contest.id(), artifacts)?,
            Target::Batch(dir) => engine.sync_batch(contest.id(), dir)?,
        };

        Ok(Box::new(UploadOutcome {
            judge: client.judge().clone(),
            contest,
            resources,
        }))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct UploadOutcome {
    judge: JudgeUrl,
    contest: Contest,
    resources: Vec<ResourceReport>,
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for report in &self.resources {
            writeln!(f, "{}", report)?;
        }
        write!(
            f,
            "Synced {} resources to contest {} (id {}) on {}",
            self.resources.len(),
            self.contest.shortname(),
            self.contest.id(),
            self.judge
        )
    }
}

impl Outcome for UploadOutcome {
    fn is_error(&self) -> bool {
        false
    }
}
