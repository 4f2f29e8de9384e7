// Upcoming-schedule difficulty from opponent winning percentages.
//
// Each upcoming game is annotated with the opponent's winning percentage
// from the standings. An opponent that cannot be matched gets a neutral
// 0.5 so one bad lookup only degrades its own row.

pub mod mlb;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures_util::future::join;
use tracing::{debug, warn};

pub use mlb::MlbStatsApi;

/// Difficulty used when an opponent has no standings row.
pub const NEUTRAL_DIFFICULTY: f64 = 0.5;

/// Maximum number of upcoming games returned.
pub const MAX_FIXTURES: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("unknown team code `{0}`")]
    UnknownTeam(String),

    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("unexpected payload from {url}: {message}")]
    Payload { url: String, message: String },
}

/// One upcoming game from the perspective of the requested team.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub date: NaiveDate,
    pub opponent: String,
    pub home: bool,
}

/// A fixture with the opponent's winning percentage as difficulty.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledGame {
    pub date: NaiveDate,
    pub opponent: String,
    pub home: bool,
    pub difficulty: f64,
}

/// Winning percentage by team name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandingsTable {
    win_pct: HashMap<String, f64>,
}

impl StandingsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, team: impl Into<String>, win_pct: f64) {
        self.win_pct.insert(team.into(), win_pct);
    }

    /// Exact name first, then a case-insensitive match.
    pub fn win_pct(&self, team: &str) -> Option<f64> {
        if let Some(&pct) = self.win_pct.get(team) {
            return Some(pct);
        }
        let wanted = team.trim().to_lowercase();
        self.win_pct
            .iter()
            .find(|(name, _)| name.to_lowercase() == wanted)
            .map(|(_, &pct)| pct)
    }

    pub fn len(&self) -> usize {
        self.win_pct.len()
    }

    pub fn is_empty(&self) -> bool {
        self.win_pct.is_empty()
    }
}

impl FromIterator<(String, f64)> for StandingsTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            win_pct: iter.into_iter().collect(),
        }
    }
}

/// Remote schedule and standings provider.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Upcoming games for `team` in date order.
    async fn upcoming_fixtures(&self, team: &str, season: i32)
        -> Result<Vec<Fixture>, ScheduleError>;

    async fn standings(&self, season: i32) -> Result<StandingsTable, ScheduleError>;
}

/// Annotate fixtures with opponent difficulty.
pub fn rate_fixtures(fixtures: &[Fixture], standings: &StandingsTable) -> Vec<ScheduledGame> {
    fixtures
        .iter()
        .take(MAX_FIXTURES)
        .map(|f| {
            let difficulty = standings.win_pct(&f.opponent).unwrap_or_else(|| {
                warn!(
                    "no standings row for opponent '{}', using {NEUTRAL_DIFFICULTY}",
                    f.opponent
                );
                NEUTRAL_DIFFICULTY
            });
            ScheduledGame {
                date: f.date,
                opponent: f.opponent.clone(),
                home: f.home,
                difficulty,
            }
        })
        .collect()
}

/// Up to ten upcoming games for `team` with opponent difficulty.
///
/// A failed fixtures request is an error. A failed standings request
/// degrades every row to the neutral difficulty.
pub async fn schedule_difficulty<S>(
    source: &S,
    team: &str,
    season: i32,
) -> Result<Vec<ScheduledGame>, ScheduleError>
where
    S: ScheduleSource + ?Sized,
{
    let (fixtures, standings) =
        join(source.upcoming_fixtures(team, season), source.standings(season)).await;
    let fixtures = fixtures?;
    let standings = standings.unwrap_or_else(|e| {
        warn!("standings unavailable for {season}: {e}");
        StandingsTable::new()
    });
    debug!(
        "{team}: {} fixtures, {} standings rows",
        fixtures.len(),
        standings.len()
    );
    Ok(rate_fixtures(&fixtures, &standings))
}

/// Mean difficulty of `games`, or the neutral value when empty.
pub fn average_difficulty(games: &[ScheduledGame]) -> f64 {
    if games.is_empty() {
        return NEUTRAL_DIFFICULTY;
    }
    games.iter().map(|g| g.difficulty).sum::<f64>() / games.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSchedule {
        fixtures: Vec<Fixture>,
        standings: Option<StandingsTable>,
    }

    #[async_trait]
    impl ScheduleSource for FakeSchedule {
        async fn upcoming_fixtures(
            &self,
            _team: &str,
            _season: i32,
        ) -> Result<Vec<Fixture>, ScheduleError> {
            Ok(self.fixtures.clone())
        }

        async fn standings(&self, _season: i32) -> Result<StandingsTable, ScheduleError> {
            self.standings.clone().ok_or_else(|| ScheduleError::Payload {
                url: "fake".into(),
                message: "no standings".into(),
            })
        }
    }

    fn fixture(day: u32, opponent: &str) -> Fixture {
        Fixture {
            date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            opponent: opponent.into(),
            home: day % 2 == 0,
        }
    }

    fn standings() -> StandingsTable {
        [
            ("Boston Red Sox".to_string(), 0.550),
            ("Tampa Bay Rays".to_string(), 0.480),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn unmatched_opponent_gets_neutral_difficulty() {
        let source = FakeSchedule {
            fixtures: vec![
                fixture(1, "Boston Red Sox"),
                fixture(2, "Springfield Isotopes"),
                fixture(3, "Tampa Bay Rays"),
            ],
            standings: Some(standings()),
        };
        let games = schedule_difficulty(&source, "NYY", 2025).await.unwrap();
        let difficulties: Vec<f64> = games.iter().map(|g| g.difficulty).collect();
        assert_eq!(difficulties, vec![0.550, NEUTRAL_DIFFICULTY, 0.480]);
        assert_eq!(games[1].opponent, "Springfield Isotopes");
    }

    #[tokio::test]
    async fn at_most_ten_games_in_order() {
        let source = FakeSchedule {
            fixtures: (1..=15).map(|d| fixture(d, "Boston Red Sox")).collect(),
            standings: Some(standings()),
        };
        let games = schedule_difficulty(&source, "NYY", 2025).await.unwrap();
        assert_eq!(games.len(), MAX_FIXTURES);
        assert_eq!(games[0].date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(games[9].date, NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
    }

    #[tokio::test]
    async fn missing_standings_degrade_all_rows() {
        let source = FakeSchedule {
            fixtures: vec![fixture(1, "Boston Red Sox"), fixture(2, "Tampa Bay Rays")],
            standings: None,
        };
        let games = schedule_difficulty(&source, "NYY", 2025).await.unwrap();
        assert!(games.iter().all(|g| g.difficulty == NEUTRAL_DIFFICULTY));
    }

    #[test]
    fn win_pct_matches_case_insensitively() {
        let table = standings();
        assert_eq!(table.win_pct("boston red sox"), Some(0.550));
        assert_eq!(table.win_pct("Boston"), None);
    }

    #[test]
    fn average_difficulty_of_empty_is_neutral() {
        assert_eq!(average_difficulty(&[]), NEUTRAL_DIFFICULTY);
        let games = rate_fixtures(
            &[fixture(1, "Boston Red Sox"), fixture(2, "Tampa Bay Rays")],
            &standings(),
        );
        assert!((average_difficulty(&games) - 0.515).abs() < 1e-12);
    }
}
