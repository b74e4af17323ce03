use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use getset::Getters;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::Result;

/// Suffix of the short name that marks a contest used for testing problems.
pub static TESTING_SUFFIX: &str = "testing";

/// Format in which contest times are given on the command line.
pub static CONTEST_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format the contest form of the judge expects, followed by a timezone name.
static JUDGE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Serialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContestId(String);

impl ContestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for ContestId {
    fn from(id: T) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ContestId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Depending on its version the judge sends ids as strings or as integers.
impl<'de> Deserialize<'de> for ContestId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ContestIdVisitor;

        impl<'de> Visitor<'de> for ContestIdVisitor {
            type Value = ContestId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string or an integer contest id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ContestId, E> {
                Ok(ContestId::from(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<ContestId, E> {
                Ok(ContestId::from(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<ContestId, E> {
                Ok(ContestId::from(v.to_string()))
            }
        }

        deserializer.deserialize_any(ContestIdVisitor)
    }
}

#[derive(Serialize, Deserialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct Contest {
    id: ContestId,
    shortname: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    start_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    end_time: Option<DateTime<FixedOffset>>,
}

impl Contest {
    pub fn new(
        id: impl Into<ContestId>,
        shortname: impl Into<String>,
        start_time: Option<DateTime<FixedOffset>>,
        end_time: Option<DateTime<FixedOffset>>,
    ) -> Self {
        let shortname = shortname.into();
        Self {
            id: id.into(),
            name: shortname.clone(),
            shortname,
            start_time,
            end_time,
        }
    }

    pub fn is_testing(&self) -> bool {
        is_testing_shortname(&self.shortname)
    }

    pub fn status(&self, now: DateTime<Utc>) -> ContestStatus {
        match (self.start_time, self.end_time) {
            (None, _) => ContestStatus::Unscheduled,
            (Some(start), _) if now < start => ContestStatus::Upcoming,
            (Some(_), Some(end)) if now > end => ContestStatus::Finished,
            (Some(_), _) => ContestStatus::Active,
        }
    }

    pub fn matches(&self, policy: ContestPolicy, now: DateTime<Utc>) -> bool {
        match (policy, self.status(now)) {
            (ContestPolicy::ActiveTesting, ContestStatus::Active) => self.is_testing(),
            (ContestPolicy::Upcoming, ContestStatus::Active)
            | (ContestPolicy::Upcoming, ContestStatus::Upcoming) => true,
            _ => false,
        }
    }
}

pub fn is_testing_shortname(shortname: &str) -> bool {
    shortname.ends_with(TESTING_SUFFIX)
}

#[derive(
    Serialize, IntoStaticStr, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ContestStatus {
    Active,
    Upcoming,
    Finished,
    Unscheduled,
}

impl fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.into())
    }
}

/// Which existing contests may be picked as upload target.
#[derive(
    Serialize,
    EnumString,
    EnumVariantNames,
    IntoStaticStr,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ContestPolicy {
    /// Testing contests that are running right now.
    ActiveTesting,
    /// Any scheduled contest that has not finished, including future ones.
    Upcoming,
}

impl Default for ContestPolicy {
    fn default() -> Self {
        Self::ActiveTesting
    }
}

impl fmt::Display for ContestPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.into())
    }
}

/// How the upload target contest is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContestSelection {
    Named(String, ContestPolicy),
    Choose(ContestPolicy),
    Create(NewContest),
}

/// Parameters of a contest to be created on the judge.
#[derive(Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct NewContest {
    shortname: String,
    name: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl NewContest {
    pub fn parse(
        shortname: impl Into<String>,
        name: impl Into<String>,
        start: &str,
        end: &str,
    ) -> Result<Self> {
        let start = parse_contest_time(start)?;
        let end = parse_contest_time(end)?;
        if end <= start {
            return Err(SyncError::configuration(format!(
                "Contest end time {} is not after start time {}",
                end, start
            ))
            .into());
        }
        Ok(Self {
            shortname: shortname.into(),
            name: name.into(),
            start,
            end,
        })
    }

    pub fn is_testing(&self) -> bool {
        is_testing_shortname(&self.shortname)
    }

    pub fn start_string(&self, timezone: &str) -> String {
        render_judge_time(&self.start, timezone)
    }

    pub fn end_string(&self, timezone: &str) -> String {
        render_judge_time(&self.end, timezone)
    }
}

fn parse_contest_time(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), CONTEST_TIME_FORMAT).map_err(|err| {
        SyncError::configuration(format!(
            "Could not parse contest time \"{}\" (expected format {}) : {}",
            s, CONTEST_TIME_FORMAT, err
        ))
        .into()
    })
}

fn render_judge_time(time: &NaiveDateTime, timezone: &str) -> String {
    format!("{} {}", time.format(JUDGE_TIME_FORMAT), timezone)
}

/// Team category of the judge, used to restrict who sees a contest.
#[derive(Serialize, Deserialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct TeamCategory {
    id: String,
    name: String,
}

impl TeamCategory {
    /// Category reserved for jury members; testing contests are restricted to it.
    pub const STAFF: &'static str = "Staff";

    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn is_staff(&self) -> bool {
        self.name == Self::STAFF
    }
}
