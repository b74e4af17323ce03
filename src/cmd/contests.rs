use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use djsync_util::model::{Contest, ContestId, ContestPolicy, ContestStatus, JudgeUrl};
use djsync_util::service::Remote;
use serde::Serialize;
use structopt::StructOpt;

use crate::cmd::{Outcome, Run};
use crate::{Config, Console, GlobalOpt, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct ContestsOpt {
    /// Lists finished and unscheduled contests too
    #[structopt(long)]
    all: bool,
}

impl Run for ContestsOpt {
    fn run(
        &self,
        global_opt: &GlobalOpt,
        conf: &Config,
        cnsl: &mut Console,
    ) -> Result<Box<dyn Outcome>> {
        let mut client = conf.connect(global_opt.judge.as_ref(), cnsl)?;
        let contests = client.list_contests(cnsl)?;
        Ok(Box::new(ContestsOutcome::new(
            client.judge().clone(),
            &contests,
            self.all,
            Utc::now(),
        )))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContestRow {
    id: ContestId,
    shortname: String,
    name: String,
    testing: bool,
    status: ContestStatus,
    start_time: Option<DateTime<FixedOffset>>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContestsOutcome {
    judge: JudgeUrl,
    contests: Vec<ContestRow>,
}

impl ContestsOutcome {
    /// Without `all` only contests that may still receive uploads are kept.
    fn new(judge: JudgeUrl, contests: &[Contest], all: bool, now: DateTime<Utc>) -> Self {
        let contests = contests
            .iter()
            .filter(|contest| all || contest.matches(ContestPolicy::Upcoming, now))
            .map(|contest| ContestRow {
                id: contest.id().clone(),
                shortname: contest.shortname().clone(),
                name: contest.name().clone(),
                testing: contest.is_testing(),
                status: contest.status(now),
                start_time: *contest.start_time(),
            })
            .collect();
        Self { judge, contests }
    }
}

impl fmt::Display for ContestsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.contests.is_empty() {
            return write!(f, "Found no contests on {}", self.judge);
        }
        for row in &self.contests {
            let start_time = row
                .start_time
                .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_owned());
            writeln!(
                f,
                "{:>4}  {:24} {:11} {:16} {:7} {}",
                row.id.as_str(),
                row.shortname,
                row.status.to_string(),
                start_time,
                if row.testing { "testing" } else { "" },
                row.name
            )?;
        }
        write!(f, "Found {} contests on {}", self.contests.len(), self.judge)
    }
}

impl Outcome for ContestsOutcome {
    fn is_error(&self) -> bool {
        false
    }
}
