// MLB Stats API client for fixtures and standings.

use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};
use serde_json::Value;
use tracing::{debug, warn};

use super::{Fixture, ScheduleError, ScheduleSource, StandingsTable};
use crate::stats::UNKNOWN;

pub const DEFAULT_BASE_URL: &str = "https://statsapi.mlb.com/api/v1";

const USER_AGENT: &str = concat!("diamond/", env!("CARGO_PKG_VERSION"));

/// Team abbreviation to MLB Stats API team id.
const TEAM_IDS: &[(&str, u32)] = &[
    ("ARI", 109),
    ("ATL", 144),
    ("BAL", 110),
    ("BOS", 111),
    ("CHC", 112),
    ("CWS", 145),
    ("CIN", 113),
    ("CLE", 114),
    ("COL", 115),
    ("DET", 116),
    ("HOU", 117),
    ("KC", 118),
    ("LAA", 108),
    ("LAD", 119),
    ("MIA", 146),
    ("MIL", 158),
    ("MIN", 142),
    ("NYM", 121),
    ("NYY", 147),
    ("OAK", 133),
    ("ATH", 133),
    ("PHI", 143),
    ("PIT", 134),
    ("SD", 135),
    ("SF", 137),
    ("SEA", 136),
    ("STL", 138),
    ("TB", 139),
    ("TEX", 140),
    ("TOR", 141),
    ("WSH", 120),
];

/// Look up a team id by abbreviation, ignoring case.
pub fn team_id(code: &str) -> Option<u32> {
    let code = code.trim();
    TEAM_IDS
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(code))
        .map(|&(_, id)| id)
}

pub struct MlbStatsApi {
    http: reqwest::Client,
    base_url: String,
    today: Option<NaiveDate>,
}

impl MlbStatsApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            today: None,
        }
    }

    /// Pin the date fixtures are counted from.
    pub fn starting_from(mut self, date: NaiveDate) -> Self {
        self.today = Some(date);
        self
    }

    /// Schedule query from today to the end of `season`. A past season is
    /// queried from its first day.
    pub fn schedule_url(&self, team_id: u32, season: i32) -> String {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let start = if season < today.year() {
            format!("{season}-01-01")
        } else {
            today.format("%Y-%m-%d").to_string()
        };
        format!(
            "{}/schedule?sportId=1&teamId={team_id}&season={season}&gameType=R&startDate={start}&endDate={season}-12-31",
            self.base_url,
        )
    }

    pub fn standings_url(&self, season: i32) -> String {
        format!(
            "{}/standings?leagueId=103,104&season={season}&standingsTypes=regularSeason",
            self.base_url
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value, ScheduleError> {
        debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|source| ScheduleError::Http {
                url: url.to_string(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScheduleError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.json::<Value>()
            .await
            .map_err(|source| ScheduleError::Http {
                url: url.to_string(),
                source,
            })
    }
}

impl Default for MlbStatsApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl ScheduleSource for MlbStatsApi {
    async fn upcoming_fixtures(
        &self,
        team: &str,
        season: i32,
    ) -> Result<Vec<Fixture>, ScheduleError> {
        let id = team_id(team).ok_or_else(|| ScheduleError::UnknownTeam(team.to_string()))?;
        let url = self.schedule_url(id, season);
        let body = self.get_json(&url).await?;
        parse_schedule(&body, id).map_err(|message| ScheduleError::Payload { url, message })
    }

    async fn standings(&self, season: i32) -> Result<StandingsTable, ScheduleError> {
        let url = self.standings_url(season);
        let body = self.get_json(&url).await?;
        parse_standings(&body).map_err(|message| ScheduleError::Payload { url, message })
    }
}

// ---------------------------------------------------------------------------
// Payload parsing
// ---------------------------------------------------------------------------

/// Unfinished games for `team_id` in date order.
///
/// Only a missing `dates` array is an error. An undated game is skipped and
/// a game without an opponent name is kept against `UNKNOWN`.
pub fn parse_schedule(body: &Value, team_id: u32) -> Result<Vec<Fixture>, String> {
    let dates = body
        .get("dates")
        .and_then(Value::as_array)
        .ok_or("missing `dates` array")?;

    let mut fixtures = Vec::new();
    for day in dates {
        let Some(games) = day.get("games").and_then(Value::as_array) else {
            continue;
        };
        for game in games {
            if game
                .pointer("/status/abstractGameState")
                .and_then(Value::as_str)
                == Some("Final")
            {
                continue;
            }
            let Some(date_str) = game
                .get("officialDate")
                .or_else(|| day.get("date"))
                .and_then(Value::as_str)
            else {
                warn!("skipping game without a date for team {team_id}");
                continue;
            };
            let date = match NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
                Ok(date) => date,
                Err(e) => {
                    warn!("skipping game with bad date `{date_str}`: {e}");
                    continue;
                }
            };

            let home_id = game.pointer("/teams/home/team/id").and_then(Value::as_u64);
            let home = home_id == Some(u64::from(team_id));
            let side = if home { "away" } else { "home" };
            let opponent = match game
                .pointer(&format!("/teams/{side}/team/name"))
                .and_then(Value::as_str)
            {
                Some(name) => name,
                None => {
                    warn!("game on {date} has no opponent name; rating it neutral");
                    UNKNOWN
                }
            };

            fixtures.push(Fixture {
                date,
                opponent: opponent.to_string(),
                home,
            });
        }
    }
    fixtures.sort_by_key(|f| f.date);
    Ok(fixtures)
}

/// Winning percentage per team from a standings payload.
///
/// `winningPercentage` arrives as a string such as ".550". When it is
/// missing the value is computed from wins and losses.
pub fn parse_standings(body: &Value) -> Result<StandingsTable, String> {
    let records = body
        .get("records")
        .and_then(Value::as_array)
        .ok_or("missing `records` array")?;

    let mut table = StandingsTable::new();
    for division in records {
        let Some(teams) = division.get("teamRecords").and_then(Value::as_array) else {
            continue;
        };
        for entry in teams {
            let Some(name) = entry.pointer("/team/name").and_then(Value::as_str) else {
                continue;
            };
            let pct = entry
                .get("winningPercentage")
                .and_then(Value::as_str)
                .and_then(|s| s.trim().parse::<f64>().ok())
                .or_else(|| {
                    let wins = entry.get("wins").and_then(Value::as_f64)?;
                    let losses = entry.get("losses").and_then(Value::as_f64)?;
                    (wins + losses > 0.0).then(|| wins / (wins + losses))
                });
            if let Some(pct) = pct {
                table.insert(name, pct);
            }
        }
    }
    Ok(table)
}
