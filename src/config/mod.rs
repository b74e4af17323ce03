//! Config for djsync.
//!
//! The config file `djsync.yaml` is searched in the current directory and its ancestors,
//! unless a path is given explicitly.
//!
//! ```yaml
//! version: 0.1.0
//! session:
//!   timeout: 30s
//! contest:
//!   timezone: Europe/Amsterdam
//! judges:
//!   https://judge.example.org:
//!     username: admin
//!     password: secret
//! ```
//!
//! The password may be left out. It is then read from the environment variable
//! `DJSYNC_PASSWORD`, or asked for on the terminal.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write as _;

use anyhow::Context as _;
use djsync_domjudge::DomjudgeClient;
use djsync_util::abs_path::AbsPathBuf;
use djsync_util::error::SyncError;
use djsync_util::model::{Credentials, JudgeUrl};
use getset::Getters;
use lazy_static::lazy_static;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

mod session_config;

pub use session_config::SessionConfig;

use crate::{Console, Result};

lazy_static! {
    static ref VERSION: Version = Version::parse(env!("CARGO_PKG_VERSION")).unwrap();
}

static PASSWORD_ENV: &str = "DJSYNC_PASSWORD";

#[derive(Serialize, Getters, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    #[get = "pub"]
    base_dir: AbsPathBuf,
    body: ConfigBody,
}

impl Config {
    /// Loads the config file at `path`, or the one found by searching upwards from the
    /// current directory.
    pub fn load(path: Option<AbsPathBuf>, cnsl: &mut Console) -> Result<Self> {
        Self::try_load(path, cnsl)
            .map_err(|err| SyncError::configuration(format!("{:#}", err)).into())
    }

    fn try_load(path: Option<AbsPathBuf>, cnsl: &mut Console) -> Result<Self> {
        let file_path = match path {
            Some(path) => path,
            None => ConfigBody::search(cnsl)?.join(ConfigBody::FILE_NAME),
        };
        let base_dir = file_path
            .parent()
            .context("Could not find directory of config file")?;
        let body = ConfigBody::load(&file_path, &base_dir, cnsl)?;
        Ok(Self { base_dir, body })
    }

    pub fn session(&self) -> &SessionConfig {
        &self.body.session
    }

    pub fn timezone(&self) -> &str {
        &self.body.contest.timezone
    }

    /// The judge named by `judge`, the only configured judge, or the one the user picks.
    pub fn select_judge(
        &self,
        judge: Option<&JudgeUrl>,
        cnsl: &mut Console,
    ) -> Result<(&JudgeUrl, &JudgeConfig)> {
        if let Some(judge) = judge {
            return self.body.judges.get_key_value(judge).ok_or_else(|| {
                SyncError::configuration(format!(
                    "Could not find judge {} in config file",
                    judge
                ))
                .into()
            });
        }
        let judges = self.body.judges.iter().collect::<Vec<_>>();
        let items = judges
            .iter()
            .map(|(url, _)| url.to_string())
            .collect::<Vec<_>>();
        let i = cnsl
            .select("Which judge to use", &items)
            .context("Could not read judge selection")?;
        Ok(judges[i])
    }

    pub fn credentials(
        &self,
        judge: &JudgeUrl,
        judge_conf: &JudgeConfig,
        cnsl: &mut Console,
    ) -> Result<Credentials> {
        let password = match &judge_conf.password {
            Some(password) => password.clone(),
            None => {
                let prompt = format!("password for {} at {} : ", judge_conf.username, judge);
                cnsl.get_env_or_prompt_and_read(PASSWORD_ENV, &prompt, true)
                    .context("Could not read password")?
                    .trim_end_matches(|c: char| c == '\r' || c == '\n')
                    .to_owned()
            }
        };
        if password.is_empty() {
            return Err(SyncError::configuration(format!(
                "Found empty password for {} at {}",
                judge_conf.username, judge
            ))
            .into());
        }
        Ok(Credentials::new(judge_conf.username.as_str(), password))
    }

    /// Logs in to the selected judge.
    pub fn connect(&self, judge: Option<&JudgeUrl>, cnsl: &mut Console) -> Result<DomjudgeClient> {
        let (judge, judge_conf) = self.select_judge(judge, cnsl)?;
        let credentials = self.credentials(judge, judge_conf, cnsl)?;
        DomjudgeClient::login(
            judge.clone(),
            credentials,
            self.session().timeout(),
            self.timezone(),
            cnsl,
        )
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let yaml_str = serde_yaml::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", yaml_str)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct ConfigBody {
    #[serde(with = "string_serde")]
    version: Version,
    #[serde(default)]
    session: SessionConfig,
    #[serde(default)]
    contest: ContestConfig,
    #[serde(default)]
    judges: BTreeMap<JudgeUrl, JudgeConfig>,
}

impl ConfigBody {
    const FILE_NAME: &'static str = "djsync.yaml";

    fn search(cnsl: &mut Console) -> Result<AbsPathBuf> {
        let cwd = AbsPathBuf::cwd()?;
        let base_dir = cwd.search_dir_contains(Self::FILE_NAME).with_context(|| {
            format!(
                "Could not find config file ({}) in {} or any of the parent directories",
                Self::FILE_NAME,
                cwd
            )
        })?;
        writeln!(cnsl, "Found config file in base_dir: {}", base_dir)?;
        Ok(base_dir)
    }

    fn load(file_path: &AbsPathBuf, base_dir: &AbsPathBuf, cnsl: &mut Console) -> Result<Self> {
        let body: Self = file_path.load_pretty(
            |file| serde_yaml::from_reader(file).context("Could not read config file as yaml"),
            Some(base_dir),
            cnsl,
        )?;
        body.validate()?;
        body.warn_legacy(cnsl)?;
        Ok(body)
    }

    fn validate(&self) -> Result<()> {
        let version_req =
            VersionReq::parse(&self.version.to_string()).context("Could not parse version")?;
        if !version_req.matches(&VERSION) {
            return Err(anyhow::anyhow!(
                r#"Found mismatched version in config file.
    config version: {}
    djsync version: {}
Fix the config file so that it is compatible with the current version of djsync."#,
                self.version,
                &*VERSION
            ));
        }
        if self.judges.is_empty() {
            return Err(anyhow::anyhow!("Found no judges in config file"));
        }
        if self.contest.timezone.trim().is_empty() {
            return Err(anyhow::anyhow!("Found empty contest timezone in config file"));
        }
        Ok(())
    }

    fn warn_legacy(&self, cnsl: &mut Console) -> Result<()> {
        for (judge, judge_conf) in &self.judges {
            if !judge_conf.contests.is_empty() {
                cnsl.warn(&format!(
                    "Found contests list for {} in config file. It is no longer needed, \
                     contests are looked up on the judge.",
                    judge
                ))?;
            }
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(default)]
struct ContestConfig {
    /// Timezone name in which new contests are scheduled.
    timezone: String,
}

impl Default for ContestConfig {
    fn default() -> Self {
        Self {
            timezone: String::from("UTC"),
        }
    }
}

#[derive(Serialize, Deserialize, Getters, Clone, PartialEq, Eq, Hash)]
pub struct JudgeConfig {
    #[get = "pub"]
    username: String,
    #[serde(default, skip_serializing)]
    password: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    contests: Vec<String>,
}

impl fmt::Debug for JudgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("JudgeConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("contests", &self.contests)
            .finish()
    }
}

mod string_serde {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}
