use std::env::current_dir;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context as _};
use serde::Serialize;

use crate::{Error, Result};

/// Wraps `shellexpand::full` method.
fn expand<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    Ok(shellexpand::full(&path.as_ref().to_string_lossy())?.parse()?)
}

/// An absolute (not necessarily canonicalized) path that may or may not exist.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AbsPathBuf(PathBuf);

impl AbsPathBuf {
    /// Construct an absolute path.
    ///
    /// Returns error if `path` is not absolute.
    ///
    /// If path need to be shell-expanded, use `AbsPathBuf::from_shell_path` instead.
    pub fn try_new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_absolute() {
            return Err(anyhow!("Path is not absolute : {}", path.display()));
        }
        let mut ret = Self(PathBuf::new());
        ret.push(path);
        Ok(ret)
    }

    /// Constructs an absolute path whilte expanding leading tilde and environment variables.
    ///
    /// Returns error if expanded `path` is not absolute.
    pub fn from_shell_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::try_new(expand(path)?)
    }

    /// Returns current directory as an absolute path.
    pub fn cwd() -> Result<Self> {
        Ok(Self(current_dir()?))
    }

    /// Resolves `path` against the current directory unless it is already absolute.
    pub fn resolve<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = expand(path)?;
        if path.is_absolute() {
            Self::try_new(path)
        } else {
            Ok(Self::cwd()?.join(path))
        }
    }

    /// Joins path.
    pub fn join<P: AsRef<Path>>(&self, path: P) -> Self {
        Self(self.0.join(path))
    }

    fn push<P: AsRef<Path>>(&mut self, path: P) {
        self.0.push(path)
    }

    /// Returns parent path.
    pub fn parent(&self) -> Option<Self> {
        self.0.parent().map(|parent| Self(parent.to_owned()))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Returns the last component as a string, if it is valid unicode.
    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name().and_then(|name| name.to_str())
    }

    pub fn is_file(&self) -> bool {
        self.0.is_file()
    }

    pub fn search_dir_contains(&self, file_name: &str) -> Option<Self> {
        for dir in self.0.ancestors() {
            let mut file_path = dir.join(file_name);
            if file_path.is_file() {
                file_path.pop();
                return Some(Self(file_path));
            }
        }
        None
    }

    /// Lists sub directories sorted by name, skipping hidden ones.
    pub fn list_dirs(&self) -> Result<Vec<Self>> {
        let entries = fs::read_dir(&self.0)
            .with_context(|| format!("Could not list directory : {}", self))?
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("Could not list directory : {}", self))?;
        let mut dirs = entries
            .iter()
            .filter(|entry| entry.path().is_dir())
            .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
            .map(|entry| self.join(entry.file_name()))
            .collect::<Vec<_>>();
        dirs.sort();
        Ok(dirs)
    }

    pub fn load_pretty<T>(
        &self,
        load: impl FnOnce(fs::File) -> Result<T>,
        base_dir: Option<&AbsPathBuf>,
        cnsl: &mut dyn Write,
    ) -> Result<T> {
        write!(
            cnsl,
            "Loading {} ... ",
            self.strip_prefix_if(base_dir).display()
        )?;
        let result = self.load(load);
        let msg = match result {
            Ok(_) => "loaded",
            Err(_) => "failed",
        };
        writeln!(cnsl, "{}", msg)?;
        result
    }

    pub fn load<T>(&self, load: impl FnOnce(fs::File) -> Result<T>) -> Result<T> {
        fs::OpenOptions::new()
            .read(true)
            .open(&self.0)
            .with_context(|| format!("Could not open file : {}", self))
            .and_then(load)
    }

    pub fn strip_prefix(&self, base: &AbsPathBuf) -> &Path {
        self.0
            .strip_prefix(&base.0)
            .unwrap_or_else(|_| self.0.as_path())
    }

    fn strip_prefix_if(&self, base: Option<&AbsPathBuf>) -> &Path {
        if let Some(base) = base {
            self.strip_prefix(base)
        } else {
            self.0.as_path()
        }
    }
}

impl AsRef<Path> for AbsPathBuf {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl FromStr for AbsPathBuf {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_shell_path(s)
    }
}

impl fmt::Display for AbsPathBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.display().fmt(f)
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use std::fs::{create_dir_all, File};

    use tempfile::tempdir;

    use super::*;
    use crate::assert_matches;

    #[test]
    fn test_try_new() -> anyhow::Result<()> {
        let tests = &[
            ("/a/b", "/a/b"),
            ("/a//b", "/a/b"),
            ("/a/./b", "/a/b"),
            ("/a/b/", "/a/b"),
            ("/a/../b", "/a/../b"),
        ];
        for (actual, expected) in tests {
            let actual = AbsPathBuf::try_new(actual)?;
            assert_eq!(actual.as_path(), Path::new(expected));
        }
        for test in &["./a/b/", "a/b", "~/a/b"] {
            assert_matches!(AbsPathBuf::try_new(test) => Err(_));
        }
        Ok(())
    }

    #[test]
    fn test_from_shell_path() -> anyhow::Result<()> {
        let actual: AbsPathBuf = "~/a".parse()?;
        assert_eq!(actual.as_path(), dirs::home_dir().unwrap().join("a"));
        assert_matches!(AbsPathBuf::from_str("$DJSYNC_UNKNOWN_VAR") => Err(_));
        Ok(())
    }

    #[test]
    fn test_resolve() -> anyhow::Result<()> {
        let cwd = AbsPathBuf::cwd()?;
        assert_eq!(AbsPathBuf::resolve("a/b.zip")?, cwd.join("a/b.zip"));
        assert_eq!(AbsPathBuf::resolve("/a/b.zip")?.as_path(), Path::new("/a/b.zip"));
        Ok(())
    }

    #[test]
    fn test_parent() -> anyhow::Result<()> {
        let tests = &[("/a/b", Some("/a")), ("/", None)];
        for (left, right) in tests {
            let actual = AbsPathBuf::try_new(left)?.parent();
            let expected = right.map(|path| AbsPathBuf::try_new(path).unwrap());
            assert_eq!(actual, expected);
        }
        Ok(())
    }

    #[test]
    fn test_search_dir_contains() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let base = AbsPathBuf::try_new(test_dir.path())?;
        create_dir_all(base.join("contest/probA").as_path())?;
        File::create(base.join("contest/djsync.yaml").as_path())?;

        let found = base.join("contest/probA").search_dir_contains("djsync.yaml");
        assert_eq!(found, Some(base.join("contest")));
        assert_eq!(base.search_dir_contains("djsync.yaml"), None);
        Ok(())
    }

    #[test]
    fn test_list_dirs() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let base = AbsPathBuf::try_new(test_dir.path())?;
        for dir in &["probB", "probA", ".git"] {
            create_dir_all(base.join(dir).as_path())?;
        }
        File::create(base.join("Makefile").as_path())?;

        let names = base
            .list_dirs()?
            .iter()
            .map(|dir| dir.file_name().unwrap().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["probA", "probB"]);
        Ok(())
    }
}
