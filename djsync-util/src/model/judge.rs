use std::fmt;
use std::str::FromStr;

use anyhow::Context as _;
use getset::Getters;
use reqwest::Url;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SyncError;
use crate::{Error, Result};

/// Base endpoint of a judge, e.g. `https://judge.example.org/domjudge`.
///
/// Endpoint paths are appended to the base instead of being resolved against it, so a
/// base with a path prefix keeps its prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JudgeUrl(String);

impl JudgeUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let url = format!("{}{}", self.0, path);
        Url::parse(&url).with_context(|| format!("Could not parse url : {}", url))
    }
}

impl FromStr for JudgeUrl {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('/');
        let url = Url::parse(trimmed).map_err(|err| {
            SyncError::configuration(format!("Invalid judge url \"{}\" : {}", s, err))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SyncError::configuration(format!(
                "Judge url must be http or https : {}",
                s
            ))
            .into());
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl fmt::Display for JudgeUrl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for JudgeUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for JudgeUrl {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

/// Resolved credentials for one judge. The same pair serves the form login and the
/// basic auth of the api.
#[derive(Getters, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}
