use std::fmt;

use djsync_util::model::JudgeUrl;
use djsync_util::service::Remote as _;
use serde::Serialize;
use structopt::StructOpt;

use crate::cmd::{Outcome, Run};
use crate::{Config, Console, GlobalOpt, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct LoginOpt {}

impl Run for LoginOpt {
    fn run(
        &self,
        global_opt: &GlobalOpt,
        conf: &Config,
        cnsl: &mut Console,
    ) -> Result<Box<dyn Outcome>> {
        let client = conf.connect(global_opt.judge.as_ref(), cnsl)?;
        Ok(Box::new(LoginOutcome::new(
            client.judge().clone(),
            client.username(),
        )))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoginOutcome {
    judge: JudgeUrl,
    username: String,
}

impl LoginOutcome {
    pub fn new(judge: JudgeUrl, username: impl Into<String>) -> Self {
        Self {
            judge,
            username: username.into(),
        }
    }
}

impl fmt::Display for LoginOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Successfully logged in to {} as {}",
            self.judge, self.username
        )
    }
}

impl Outcome for LoginOutcome {
    fn is_error(&self) -> bool {
        false
    }
}
