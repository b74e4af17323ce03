use std::fmt;
use std::fs;
use std::path::Path;

use getset::Getters;
use serde::Serialize;

use crate::abs_path::AbsPathBuf;
use crate::error::SyncError;
use crate::Result;

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
    PartialOrd,
    Ord,
    Hash,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ResourceKind {
    Problem,
    Validator,
}

impl ResourceKind {
    /// Path of the jury listing page that links every resource of this kind.
    pub fn listing_path(self) -> &'static str {
        match self {
            Self::Problem => "/jury/problems",
            Self::Validator => "/jury/executables",
        }
    }

    pub fn delete_path(self, id: &RemoteId) -> String {
        format!("{}/{}/delete", self.listing_path(), id)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.into())
    }
}

/// Name of a resource, the file stem of its archive.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceName(String);

impl ResourceName {
    pub fn from_archive_path(path: &Path) -> Result<Self> {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .map(|stem| Self(stem.to_owned()))
            .ok_or_else(|| {
                SyncError::configuration(format!(
                    "Could not derive resource name from archive path : {}",
                    path.display()
                ))
                .into()
            })
    }
}

impl ResourceName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for ResourceName {
    fn from(name: T) -> Self {
        Self(name.into())
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Opaque id the judge assigned to a resource.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RemoteId(String);

impl RemoteId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for RemoteId {
    fn from(id: T) -> Self {
        Self(id.into())
    }
}

impl AsRef<str> for RemoteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remote existence of a resource.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Presence {
    Absent,
    Present(RemoteId),
    /// Several distinct resources matched the name. Ids are in listing order.
    Ambiguous(Vec<RemoteId>),
}

impl Presence {
    /// Collapses all matches of a listing scan, keeping the first occurrence of each id.
    pub fn from_matches(matches: Vec<RemoteId>) -> Self {
        let mut ids: Vec<RemoteId> = Vec::with_capacity(matches.len());
        for id in matches {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        match ids.len() {
            0 => Self::Absent,
            1 => Self::Present(ids.remove(0)),
            _ => Self::Ambiguous(ids),
        }
    }

    /// The first match, which callers treat as authoritative.
    pub fn first(&self) -> Option<&RemoteId> {
        match self {
            Self::Absent => None,
            Self::Present(id) => Some(id),
            Self::Ambiguous(ids) => ids.first(),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// A local build artifact ready to be uploaded.
#[derive(Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct Archive {
    kind: ResourceKind,
    name: ResourceName,
    file_name: String,
    bytes: Vec<u8>,
}

impl Archive {
    pub fn new(
        kind: ResourceKind,
        name: impl Into<ResourceName>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn load(kind: ResourceKind, path: &AbsPathBuf) -> Result<Self> {
        let path_ref = path.as_path();
        if !path_ref.is_file() {
            return Err(SyncError::configuration(format!(
                "Could not find {} archive : {}",
                kind, path
            ))
            .into());
        }
        let name = ResourceName::from_archive_path(path_ref)?;
        let file_name = path_ref
            .file_name()
            .map(|file_name| file_name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.zip", name));
        let bytes = fs::read(path_ref).map_err(|err| {
            SyncError::configuration(format!("Could not read archive {} : {}", path, err))
        })?;
        Ok(Self::new(kind, name, file_name, bytes))
    }
}
