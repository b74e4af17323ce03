use std::io::Write as _;

use chrono::{DateTime, Utc};
use djsync_util::error::SyncError;
use djsync_util::model::{Contest, ContestPolicy, ContestSelection, NewContest, TeamCategory};

use super::Engine;
use crate::Result;

impl Engine<'_> {
    /// Finds, picks or creates the contest that uploads go to.
    pub fn resolve_contest(
        &mut self,
        selection: &ContestSelection,
        now: DateTime<Utc>,
    ) -> Result<Contest> {
        let contest = match selection {
            ContestSelection::Named(shortname, policy) => {
                let mut contests = self.list_contests(*policy, now)?;
                let position = contests
                    .iter()
                    .position(|contest| contest.shortname() == shortname)
                    .ok_or_else(|| {
                        SyncError::not_found(format!(
                            "Could not find contest {} among {} contests",
                            shortname, policy
                        ))
                    })?;
                contests.swap_remove(position)
            }
            ContestSelection::Choose(policy) => {
                let mut contests = self.list_contests(*policy, now)?;
                if contests.is_empty() {
                    return Err(SyncError::not_found(match policy {
                        ContestPolicy::ActiveTesting => "No running testing contests found",
                        ContestPolicy::Upcoming => "No running or upcoming contests found",
                    })
                    .into());
                }
                let i = self.decide.select_contest(&contests, self.cnsl)?;
                if i >= contests.len() {
                    return Err(SyncError::not_found(format!("No contest at index {}", i)).into());
                }
                contests.swap_remove(i)
            }
            ContestSelection::Create(new_contest) => self.create_contest(new_contest)?,
        };
        writeln!(
            self.cnsl,
            "Target contest {} (id {})",
            contest.shortname(),
            contest.id()
        )?;
        tracing::info!(shortname = %contest.shortname(), id = %contest.id(), "resolved contest");
        Ok(contest)
    }

    fn list_contests(&mut self, policy: ContestPolicy, now: DateTime<Utc>) -> Result<Vec<Contest>> {
        let contests = self.remote.list_contests(self.cnsl)?;
        Ok(contests
            .into_iter()
            .filter(|contest| contest.matches(policy, now))
            .collect())
    }

    fn create_contest(&mut self, new_contest: &NewContest) -> Result<Contest> {
        let category = self.select_category(new_contest)?;
        let outcome = self
            .remote
            .create_contest(new_contest, &category, self.cnsl)?;
        if !outcome.is_created() {
            return Err(SyncError::Remote {
                operation: "Contest creation".into(),
                resource: new_contest.shortname().clone(),
                outcome,
            }
            .into());
        }

        self.remote
            .list_contests(self.cnsl)?
            .into_iter()
            .find(|contest| contest.shortname() == new_contest.shortname())
            .ok_or_else(|| {
                SyncError::not_found(format!(
                    "Could not find contest {} after creating it",
                    new_contest.shortname()
                ))
                .into()
            })
    }

    /// Testing contests are restricted to the staff category, other contests ask.
    fn select_category(&mut self, new_contest: &NewContest) -> Result<TeamCategory> {
        let mut categories = self.remote.list_team_categories(self.cnsl)?;
        if new_contest.is_testing() {
            return categories
                .into_iter()
                .find(TeamCategory::is_staff)
                .ok_or_else(|| {
                    SyncError::not_found(format!(
                        "Could not find team category {}",
                        TeamCategory::STAFF
                    ))
                    .into()
                });
        }
        if categories.is_empty() {
            return Err(SyncError::not_found("Found no team categories on the judge").into());
        }
        let i = self.decide.select_category(&categories, self.cnsl)?;
        if i >= categories.len() {
            return Err(SyncError::not_found(format!("No team category at index {}", i)).into());
        }
        Ok(categories.swap_remove(i))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, FixedOffset, TimeZone as _};
    use djsync_util::assert_matches;

    use super::super::fake::{FakeRemote, Op, Scripted};
    use super::*;
    use crate::{Console, ConsoleConfig};

    fn now() -> DateTime<Utc> {
        Utc.ymd(2020, 10, 3).and_hms(12, 0, 0)
    }

    fn contest(id: &str, shortname: &str, start: i64, end: Option<i64>) -> Contest {
        let at = |hours: i64| (now() + Duration::hours(hours)).with_timezone(&FixedOffset::east(0));
        Contest::new(id, shortname, Some(at(start)), end.map(at))
    }

    fn remote_with_contests() -> FakeRemote {
        let mut remote = FakeRemote::new();
        remote.add_contest(contest("1", "bapc2020testing", -1, Some(1)));
        remote.add_contest(contest("2", "bapc2020", -1, Some(1)));
        remote.add_contest(contest("3", "finals", 24, Some(29)));
        remote.add_contest(contest("4", "oldtesting", -29, Some(-24)));
        remote.add_contest(contest("5", "opentesting", -3, None));
        remote
    }

    #[test]
    fn test_named() -> anyhow::Result<()> {
        let mut remote = remote_with_contests();
        let mut decide = Scripted::keep();
        let mut cnsl = Console::sink(ConsoleConfig::default());
        let mut engine = Engine::new(&mut remote, &mut decide, &mut cnsl);

        let tests = &[
            ("bapc2020testing", ContestPolicy::ActiveTesting, Some("1")),
            ("opentesting", ContestPolicy::ActiveTesting, Some("5")),
            ("bapc2020", ContestPolicy::ActiveTesting, None),
            ("bapc2020", ContestPolicy::Upcoming, Some("2")),
            ("finals", ContestPolicy::Upcoming, Some("3")),
            ("oldtesting", ContestPolicy::Upcoming, None),
            ("bapc2020test", ContestPolicy::ActiveTesting, None),
        ];
        for (shortname, policy, expected) in tests {
            let selection = ContestSelection::Named(shortname.to_string(), *policy);
            match (engine.resolve_contest(&selection, now()), expected) {
                (Ok(contest), Some(id)) => assert_eq!(contest.id().as_str(), *id),
                (Err(err), None) => assert_matches!(
                    SyncError::find_in(&err) => Some(SyncError::NotFound { .. })
                ),
                (actual, _) => panic!("unexpected result for {} : {:?}", shortname, actual),
            }
        }
        Ok(())
    }

    #[test]
    fn test_choose() -> anyhow::Result<()> {
        let mut remote = remote_with_contests();
        let mut decide = Scripted::keep();
        decide.contest = 1;
        let mut cnsl = Console::sink(ConsoleConfig::default());
        let contest = Engine::new(&mut remote, &mut decide, &mut cnsl).resolve_contest(
            &ContestSelection::Choose(ContestPolicy::ActiveTesting),
            now(),
        )?;
        assert_eq!(contest.shortname(), "opentesting");
        assert_eq!(
            decide.offered_contests,
            vec!["bapc2020testing".to_owned(), "opentesting".to_owned()]
        );
        Ok(())
    }

    #[test]
    fn test_choose_without_candidates() -> anyhow::Result<()> {
        let mut remote = FakeRemote::new();
        remote.add_contest(contest("2", "bapc2020", -1, Some(1)));
        let mut decide = Scripted::keep();
        let mut cnsl = Console::sink(ConsoleConfig::default());
        let err = Engine::new(&mut remote, &mut decide, &mut cnsl)
            .resolve_contest(&ContestSelection::Choose(ContestPolicy::ActiveTesting), now())
            .unwrap_err();
        assert_matches!(SyncError::find_in(&err) => Some(SyncError::NotFound { .. }));
        assert_eq!(err.to_string(), "No running testing contests found");
        Ok(())
    }

    #[test]
    fn test_create_testing_contest_uses_staff() -> anyhow::Result<()> {
        let mut remote = FakeRemote::new();
        remote.add_category(TeamCategory::new("2", "Participants"));
        remote.add_category(TeamCategory::new("4", "Staff"));
        let mut decide = Scripted::keep();
        let mut cnsl = Console::sink(ConsoleConfig::default());
        let new_contest = NewContest::parse(
            "demotesting",
            "Demo testing",
            "2020-10-03 10:00",
            "2020-10-03 15:00",
        )?;
        let contest = Engine::new(&mut remote, &mut decide, &mut cnsl)
            .resolve_contest(&ContestSelection::Create(new_contest), now())?;
        assert_eq!(contest.shortname(), "demotesting");
        assert_eq!(
            remote.ops,
            vec![Op::CreateContest("demotesting".into(), "4".into())]
        );
        assert!(decide.offered_categories.is_empty());
        Ok(())
    }

    #[test]
    fn test_create_testing_contest_without_staff() -> anyhow::Result<()> {
        let mut remote = FakeRemote::new();
        remote.add_category(TeamCategory::new("2", "Participants"));
        let mut decide = Scripted::keep();
        let mut cnsl = Console::sink(ConsoleConfig::default());
        let new_contest = NewContest::parse("xtesting", "X", "2020-10-03 10:00", "2020-10-03 11:00")?;
        let err = Engine::new(&mut remote, &mut decide, &mut cnsl)
            .resolve_contest(&ContestSelection::Create(new_contest), now())
            .unwrap_err();
        assert_matches!(SyncError::find_in(&err) => Some(SyncError::NotFound { .. }));
        assert!(remote.ops.is_empty());
        Ok(())
    }

    #[test]
    fn test_create_contest_asks_category() -> anyhow::Result<()> {
        let mut remote = FakeRemote::new();
        remote.add_category(TeamCategory::new("2", "Participants"));
        remote.add_category(TeamCategory::new("4", "Staff"));
        let mut decide = Scripted::keep();
        decide.category = 0;
        let mut cnsl = Console::sink(ConsoleConfig::default());
        let new_contest =
            NewContest::parse("bapc2020", "BAPC 2020", "2020-10-03 10:00", "2020-10-03 15:00")?;
        Engine::new(&mut remote, &mut decide, &mut cnsl)
            .resolve_contest(&ContestSelection::Create(new_contest), now())?;
        assert_eq!(
            remote.ops,
            vec![Op::CreateContest("bapc2020".into(), "2".into())]
        );
        assert_eq!(
            decide.offered_categories,
            vec!["Participants".to_owned(), "Staff".to_owned()]
        );
        Ok(())
    }

    #[test]
    fn test_create_contest_rejected() -> anyhow::Result<()> {
        let mut remote = FakeRemote::new();
        remote.add_category(TeamCategory::new("4", "Staff"));
        remote.create_outcome = Some(djsync_util::model::RemoteOutcome::rejected(403, "denied"));
        let mut decide = Scripted::keep();
        let mut cnsl = Console::sink(ConsoleConfig::default());
        let new_contest =
            NewContest::parse("ytesting", "Y", "2020-10-03 10:00", "2020-10-03 15:00")?;
        let err = Engine::new(&mut remote, &mut decide, &mut cnsl)
            .resolve_contest(&ContestSelection::Create(new_contest), now())
            .unwrap_err();
        assert_matches!(SyncError::find_in(&err) => Some(SyncError::Remote { .. }));
        Ok(())
    }
}
