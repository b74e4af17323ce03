//! Choices that a run needs from its operator.
//!
//! The reconciliation logic never reads a terminal itself; it asks a [`Decide`]
//! implementation, which is the console in production and a scripted value in tests.

use anyhow::Context as _;

use crate::model::{Contest, ResourceKind, ResourceName, TeamCategory};
use crate::{Console, Result};

pub trait Decide {
    /// Whether an existing remote resource should be deleted and uploaded again.
    fn confirm_replace(
        &mut self,
        kind: ResourceKind,
        name: &ResourceName,
        cnsl: &mut Console,
    ) -> Result<bool>;

    /// Picks the upload target among `contests`, which is never empty.
    fn select_contest(&mut self, contests: &[Contest], cnsl: &mut Console) -> Result<usize>;

    /// Picks the team category of a new non-testing contest among `categories`,
    /// which is never empty.
    fn select_category(
        &mut self,
        categories: &[TeamCategory],
        cnsl: &mut Console,
    ) -> Result<usize>;
}

/// Asks on the console.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Prompt;

impl Decide for Prompt {
    fn confirm_replace(
        &mut self,
        kind: ResourceKind,
        name: &ResourceName,
        cnsl: &mut Console,
    ) -> Result<bool> {
        let message = format!("{} {} already exists on the judge. Replace it?", kind, name);
        cnsl.confirm(&message, false)
            .context("Could not read confirmation")
    }

    fn select_contest(&mut self, contests: &[Contest], cnsl: &mut Console) -> Result<usize> {
        let items = contests
            .iter()
            .map(|contest| format!("{} ({})", contest.shortname(), contest.name()))
            .collect::<Vec<_>>();
        cnsl.select("Which contest to add to", &items)
            .context("Could not read contest selection")
    }

    fn select_category(
        &mut self,
        categories: &[TeamCategory],
        cnsl: &mut Console,
    ) -> Result<usize> {
        let items = categories
            .iter()
            .map(|category| category.name().to_owned())
            .collect::<Vec<_>>();
        cnsl.select("Which team category may see the contest", &items)
            .context("Could not read team category selection")
    }
}
