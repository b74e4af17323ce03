//! Error taxonomy shared by every djsync crate.
//!
//! Operations return `anyhow::Result` like the rest of the codebase; a failure that the
//! operator needs to act on is raised as a [`SyncError`] so that callers (and tests) can
//! recover its kind with `downcast_ref`.

use thiserror::Error;

use crate::model::RemoteOutcome;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Bad config file, unparseable timestamps, invalid option combination,
    /// missing build artifact.
    #[error("{message}")]
    Configuration { message: String },

    /// The judge rejected the credentials.
    #[error("Could not log in to {judge} : {message}")]
    Authentication { judge: String, message: String },

    /// Connection refused, unreachable host or timeout.
    #[error("Could not reach {url} : {message}")]
    Network { url: String, message: String },

    /// The judge answered an operation with something other than success.
    #[error("{operation} of {resource} failed : {outcome}")]
    Remote {
        operation: String,
        resource: String,
        outcome: RemoteOutcome,
    },

    /// Remote state does not match what the previous operation promised.
    #[error("{message}")]
    Consistency { message: String },

    /// A referenced contest, category, problem or validator does not resolve.
    #[error("{message}")]
    NotFound { message: String },
}

impl SyncError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn consistency(message: impl Into<String>) -> Self {
        Self::Consistency {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Process exit code for the kind of failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration { .. } => 2,
            Self::Authentication { .. } => 3,
            Self::Network { .. } => 4,
            Self::Remote { .. } => 5,
            Self::Consistency { .. } => 6,
            Self::NotFound { .. } => 7,
        }
    }

    /// Finds the first `SyncError` in the cause chain of `err`.
    pub fn find_in(err: &anyhow::Error) -> Option<&Self> {
        err.chain().find_map(|cause| cause.downcast_ref::<Self>())
    }
}
