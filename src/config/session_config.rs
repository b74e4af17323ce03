use std::time::Duration;

use getset::CopyGetters;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct SessionConfig {
    /// Upper bound of every request, including connecting.
    #[serde(with = "humantime_serde")]
    #[get_copy = "pub"]
    timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}
