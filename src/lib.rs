#![warn(clippy::all)]

#[macro_use]
extern crate strum;

use std::io::{self, Write as _};
use std::path::PathBuf;

use djsync_util::abs_path::AbsPathBuf;
use djsync_util::model::JudgeUrl;
use structopt::StructOpt;
use strum::VariantNames;

mod cmd;
mod config;
mod reconcile;

use cmd::{Cmd, Run as _};
use config::Config;

pub use djsync_util::{Console, ConsoleConfig, SyncError};

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;

#[derive(
    EnumString, EnumVariantNames, IntoStaticStr, Debug, Copy, Clone, PartialEq, Eq, Hash,
)]
#[strum(serialize_all = "kebab-case")]
pub enum OutputFormat {
    Default,
    Debug,
    Json,
    Yaml,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Default
    }
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(
    about = "Keeps problems and validators on a DOMjudge server in sync with local builds",
    rename_all = "kebab"
)]
pub struct Opt {
    #[structopt(flatten)]
    global_opt: GlobalOpt,
    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(StructOpt, Default, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct GlobalOpt {
    /// Path to config file, searched in the current directory and its parents by default
    #[structopt(long, global = true, parse(from_os_str))]
    config: Option<PathBuf>,
    /// Base url of the judge to use, among those in config file
    #[structopt(long, global = true, env = "DJSYNC_JUDGE")]
    judge: Option<JudgeUrl>,
    /// Assumes "yes" as answer to all confirmations
    #[structopt(long, short = "y", global = true)]
    assume_yes: bool,
    /// Format of the outcome printed to stdout
    #[structopt(
        long,
        global = true,
        default_value = OutputFormat::Default.into(),
        possible_values = &OutputFormat::VARIANTS,
    )]
    output: OutputFormat,
    /// Enables debug logging, overridden by RUST_LOG
    #[structopt(long, global = true)]
    debug: bool,
}

impl Opt {
    pub fn is_debug(&self) -> bool {
        self.global_opt.debug
    }

    pub fn run(&self, stdout: &mut dyn io::Write, cnsl: &mut Console) -> Result<()> {
        let config_path = match &self.global_opt.config {
            Some(path) => Some(AbsPathBuf::resolve(path).map_err(|err| {
                SyncError::configuration(format!("Invalid config path : {:#}", err))
            })?),
            None => None,
        };
        let conf = Config::load(config_path, cnsl)?;
        let outcome = self.cmd.run(&self.global_opt, &conf, cnsl)?;
        cnsl.flush()?;
        outcome.print(stdout, self.global_opt.output)?;
        Ok(())
    }

    pub fn console_config(&self) -> ConsoleConfig {
        ConsoleConfig {
            assume_yes: self.global_opt.assume_yes,
        }
    }
}
