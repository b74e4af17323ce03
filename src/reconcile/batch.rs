use djsync_util::abs_path::AbsPathBuf;
use djsync_util::error::SyncError;
use djsync_util::model::{Archive, ResourceKind};

use crate::Result;

static BUILD_DIR: &str = "build";
static VALIDATOR_SUFFIX: &str = "_validator";

/// Problem directories of a contest directory, sorted by name. Hidden directories and
/// plain files are skipped.
pub fn problem_dirs(contest_dir: &AbsPathBuf) -> Result<Vec<AbsPathBuf>> {
    contest_dir
        .list_dirs()
        .map_err(|err| SyncError::configuration(format!("{:#}", err)).into())
}

/// Local archives of one problem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProblemArtifacts {
    problem: AbsPathBuf,
    validator: Option<AbsPathBuf>,
}

impl ProblemArtifacts {
    pub fn new(problem: AbsPathBuf, validator: Option<AbsPathBuf>) -> Self {
        Self { problem, validator }
    }

    /// Finds `build/<dir>.zip` and, if present, `build/<dir>_validator.zip`.
    pub fn in_problem_dir(problem_dir: &AbsPathBuf) -> Result<Self> {
        let dir_name = problem_dir.file_name().ok_or_else(|| {
            SyncError::configuration(format!("Invalid problem directory : {}", problem_dir))
        })?;
        let build_dir = problem_dir.join(BUILD_DIR);
        let problem = build_dir.join(format!("{}.zip", dir_name));
        if !problem.is_file() {
            return Err(SyncError::configuration(format!(
                "Could not find problem archive : {}. Build the problem first.",
                problem
            ))
            .into());
        }
        let validator = build_dir.join(format!("{}{}.zip", dir_name, VALIDATOR_SUFFIX));
        let validator = if validator.is_file() {
            Some(validator)
        } else {
            None
        };
        Ok(Self { problem, validator })
    }

    pub fn load_problem(&self) -> Result<Archive> {
        Archive::load(ResourceKind::Problem, &self.problem)
    }

    pub fn load_validator(&self) -> Result<Option<Archive>> {
        self.validator
            .as_ref()
            .map(|path| Archive::load(ResourceKind::Validator, path))
            .transpose()
    }
}
