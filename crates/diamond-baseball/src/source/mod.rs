// Record sources: where per-season statistic tables come from.
//
// Sources return raw rows keyed by (season, role). Tables are CSV in the
// FanGraphs/pybaseball column layout; extra columns are ignored and numeric
// cells that fail to parse are treated as missing.

pub mod cache;
pub mod csv_dir;
pub mod http;
pub mod memory;

use std::io::Read;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::stats::{RawBatterRecord, RawPitcherRecord, RawStatRecord, Role, UNKNOWN};

pub use cache::{CacheKey, CachedSource, RecordCache};
pub use csv_dir::CsvDirSource;
pub use http::HttpSource;
pub use memory::MemorySource;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {origin}: {source}")]
    Csv { origin: String, source: TableError },

    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("no {role} data for {season}: {reason}")]
    Unavailable {
        role: Role,
        season: i32,
        reason: String,
    },
}

/// A statistics table that cannot be read as a whole.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("header has no `{0}` column")]
    MissingColumn(&'static str),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Supplies raw statistic rows for one season and role.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(&self, season: i32, role: Role) -> Result<Vec<RawStatRecord>, SourceError>;
}

#[async_trait]
impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    async fn fetch(&self, season: i32, role: Role) -> Result<Vec<RawStatRecord>, SourceError> {
        (**self).fetch(season, role).await
    }
}

#[async_trait]
impl<S: RecordSource + ?Sized> RecordSource for Arc<S> {
    async fn fetch(&self, season: i32, role: Role) -> Result<Vec<RawStatRecord>, SourceError> {
        (**self).fetch(season, role).await
    }
}

// ---------------------------------------------------------------------------
// CSV rows (private)
// ---------------------------------------------------------------------------

/// Parse a numeric cell; blanks, text and non-finite values are `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell: Option<String> = Option::deserialize(deserializer)?;
    Ok(cell
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite()))
}

fn text_cell<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell: Option<String> = Option::deserialize(deserializer)?;
    Ok(cell.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

#[derive(Debug, Deserialize)]
struct BatterRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Season", default, deserialize_with = "lenient_number")]
    season: Option<f64>,
    #[serde(rename = "Team", alias = "Tm", default, deserialize_with = "text_cell")]
    team: Option<String>,
    #[serde(rename = "Pos", alias = "Position", default, deserialize_with = "text_cell")]
    position: Option<String>,
    #[serde(rename = "H", default, deserialize_with = "lenient_number")]
    hits: Option<f64>,
    #[serde(rename = "2B", default, deserialize_with = "lenient_number")]
    doubles: Option<f64>,
    #[serde(rename = "3B", default, deserialize_with = "lenient_number")]
    triples: Option<f64>,
    #[serde(rename = "HR", default, deserialize_with = "lenient_number")]
    home_runs: Option<f64>,
    #[serde(rename = "R", default, deserialize_with = "lenient_number")]
    runs: Option<f64>,
    #[serde(rename = "RBI", default, deserialize_with = "lenient_number")]
    rbi: Option<f64>,
    #[serde(rename = "BB", default, deserialize_with = "lenient_number")]
    walks: Option<f64>,
    #[serde(rename = "SO", alias = "K", default, deserialize_with = "lenient_number")]
    strikeouts: Option<f64>,
    #[serde(rename = "SB", default, deserialize_with = "lenient_number")]
    stolen_bases: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PitcherRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Season", default, deserialize_with = "lenient_number")]
    season: Option<f64>,
    #[serde(rename = "Team", alias = "Tm", default, deserialize_with = "text_cell")]
    team: Option<String>,
    #[serde(rename = "Pos", alias = "Position", default, deserialize_with = "text_cell")]
    position: Option<String>,
    #[serde(rename = "IP", default, deserialize_with = "text_cell")]
    innings_pitched: Option<String>,
    #[serde(rename = "H", default, deserialize_with = "lenient_number")]
    hits_allowed: Option<f64>,
    #[serde(rename = "ER", default, deserialize_with = "lenient_number")]
    earned_runs: Option<f64>,
    #[serde(rename = "BB", default, deserialize_with = "lenient_number")]
    walks: Option<f64>,
    #[serde(rename = "SO", alias = "K", default, deserialize_with = "lenient_number")]
    strikeouts: Option<f64>,
    #[serde(rename = "W", default, deserialize_with = "lenient_number")]
    wins: Option<f64>,
    #[serde(rename = "L", default, deserialize_with = "lenient_number")]
    losses: Option<f64>,
    #[serde(rename = "SV", default, deserialize_with = "lenient_number")]
    saves: Option<f64>,
    #[serde(rename = "HLD", alias = "HD", default, deserialize_with = "lenient_number")]
    holds: Option<f64>,
}

/// Resolve a row's identity. `None` means the row should be skipped.
fn identity(
    name: &str,
    row_season: Option<f64>,
    season: i32,
    role: Role,
) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        warn!("skipping {role} row with blank name ({season})");
        return None;
    }
    if let Some(s) = row_season {
        if s != f64::from(season) {
            debug!("skipping {role} row for '{name}': season {s} != {season}");
            return None;
        }
    }
    Some(name.to_string())
}

fn or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| UNKNOWN.to_string())
}

// ---------------------------------------------------------------------------
// Reader-based parsing
// ---------------------------------------------------------------------------

/// Parse a CSV statistics table for `season` and `role`.
///
/// Rows that cannot be read or have a blank name are skipped with a warning.
/// Rows carrying a different `Season` value are dropped. Only a broken
/// header, or one without a `Name` column, is a hard error.
pub fn parse_records<R: Read>(
    role: Role,
    season: i32,
    rdr: R,
) -> Result<Vec<RawStatRecord>, TableError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(rdr);
    if !reader.headers()?.iter().any(|h| h == "Name") {
        return Err(TableError::MissingColumn("Name"));
    }
    let mut records = Vec::new();

    match role {
        Role::Batter => {
            for result in reader.deserialize::<BatterRow>() {
                let raw = match result {
                    Ok(raw) => raw,
                    Err(e) => {
                        warn!("skipping malformed batter row ({season}): {e}");
                        continue;
                    }
                };
                let Some(name) = identity(&raw.name, raw.season, season, role) else {
                    continue;
                };
                records.push(RawStatRecord::Batter(RawBatterRecord {
                    name,
                    season,
                    team: or_unknown(raw.team),
                    position: or_unknown(raw.position),
                    hits: raw.hits,
                    doubles: raw.doubles,
                    triples: raw.triples,
                    home_runs: raw.home_runs,
                    runs: raw.runs,
                    rbi: raw.rbi,
                    walks: raw.walks,
                    strikeouts: raw.strikeouts,
                    stolen_bases: raw.stolen_bases,
                }));
            }
        }
        Role::Pitcher => {
            for result in reader.deserialize::<PitcherRow>() {
                let raw = match result {
                    Ok(raw) => raw,
                    Err(e) => {
                        warn!("skipping malformed pitcher row ({season}): {e}");
                        continue;
                    }
                };
                let Some(name) = identity(&raw.name, raw.season, season, role) else {
                    continue;
                };
                records.push(RawStatRecord::Pitcher(RawPitcherRecord {
                    name,
                    season,
                    team: or_unknown(raw.team),
                    position: or_unknown(raw.position),
                    innings_pitched: raw.innings_pitched,
                    hits_allowed: raw.hits_allowed,
                    earned_runs: raw.earned_runs,
                    walks: raw.walks,
                    strikeouts: raw.strikeouts,
                    wins: raw.wins,
                    losses: raw.losses,
                    saves: raw.saves,
                    holds: raw.holds,
                }));
            }
        }
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn batters(csv: &str, season: i32) -> Vec<RawBatterRecord> {
        parse_records(Role::Batter, season, csv.as_bytes())
            .unwrap()
            .into_iter()
            .map(|r| match r {
                RawStatRecord::Batter(b) => b,
                RawStatRecord::Pitcher(_) => panic!("expected batter"),
            })
            .collect()
    }

    fn pitchers(csv: &str, season: i32) -> Vec<RawPitcherRecord> {
        parse_records(Role::Pitcher, season, csv.as_bytes())
            .unwrap()
            .into_iter()
            .map(|r| match r {
                RawStatRecord::Pitcher(p) => p,
                RawStatRecord::Batter(_) => panic!("expected pitcher"),
            })
            .collect()
    }

    #[test]
    fn batter_csv_basic() {
        let csv = "\
Name,Team,Season,G,H,1B,2B,3B,HR,R,RBI,BB,SO,SB,AVG
Aaron Judge,NYY,2024,158,180,85,36,1,58,122,144,133,171,10,.322
Juan Soto,NYY,2024,157,166,100,31,4,41,128,109,129,119,7,.288";
        let rows = batters(csv, 2024);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Aaron Judge");
        assert_eq!(rows[0].team, "NYY");
        assert_eq!(rows[0].position, UNKNOWN);
        assert_eq!(rows[0].season, 2024);
        assert_eq!(rows[0].hits, Some(180.0));
        assert_eq!(rows[0].home_runs, Some(58.0));
        assert_eq!(rows[0].strikeouts, Some(171.0));
        assert_eq!(rows[1].stolen_bases, Some(7.0));
    }

    #[test]
    fn missing_columns_are_none() {
        let csv = "\
Name,H,HR
Old Timer,150,12";
        let rows = batters(csv, 1931);
        assert_eq!(rows[0].hits, Some(150.0));
        assert_eq!(rows[0].stolen_bases, None);
        assert_eq!(rows[0].strikeouts, None);
        assert_eq!(rows[0].team, UNKNOWN);
        assert_eq!(rows[0].season, 1931);
    }

    #[test]
    fn unparseable_cells_are_none_not_fatal() {
        let csv = "\
Name,Team,H,2B,SO
Good,BOS,100,20,50
Odd,BOS,n/a,,NaN";
        let rows = batters(csv, 2023);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].hits, None);
        assert_eq!(rows[1].doubles, None);
        assert_eq!(rows[1].strikeouts, None);
    }

    #[test]
    fn blank_names_and_other_seasons_skipped() {
        let csv = "\
Name,Season,H
Kept,2023,10
,2023,20
Elsewhere,2022,30
NoSeason,,40";
        let rows = batters(csv, 2023);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Kept", "NoSeason"]);
    }

    #[test]
    fn aliases_and_trimming() {
        let csv = "\
Name , Tm ,Position,H,K
  Shohei Ohtani  , LAD ,DH,197,162";
        let rows = batters(csv, 2024);
        assert_eq!(rows[0].name, "Shohei Ohtani");
        assert_eq!(rows[0].team, "LAD");
        assert_eq!(rows[0].position, "DH");
        assert_eq!(rows[0].strikeouts, Some(162.0));
    }

    #[test]
    fn pitcher_csv_basic() {
        let csv = "\
Name,Team,Season,W,L,SV,HLD,IP,H,ER,BB,SO,ERA
Tarik Skubal,DET,2024,18,4,0,0,192.0,142,46,35,228,2.39
Emmanuel Clase,CLE,2024,4,2,47,0,74.1,44,5,10,66,0.61";
        let rows = pitchers(csv, 2024);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].innings_pitched.as_deref(), Some("192.0"));
        assert_eq!(rows[0].strikeouts, Some(228.0));
        assert_eq!(rows[1].saves, Some(47.0));
        assert_eq!(rows[1].innings_pitched.as_deref(), Some("74.1"));
        assert_eq!(rows[1].holds, Some(0.0));
    }

    #[test]
    fn pitcher_hd_alias_and_blank_ip() {
        let csv = "\
Name,IP,HD
Setup Man,,22";
        let rows = pitchers(csv, 2024);
        assert_eq!(rows[0].innings_pitched, None);
        assert_eq!(rows[0].holds, Some(22.0));
    }

    #[test]
    fn header_only_is_empty() {
        assert!(batters("Name,H,HR", 2024).is_empty());
    }

    #[test]
    fn missing_name_column_fails_the_table() {
        let csv = "\
Player,H
Nobody,10";
        let err = parse_records(Role::Batter, 2024, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, TableError::MissingColumn("Name")));

        let html = "<html><body>Service Unavailable</body></html>";
        assert!(parse_records(Role::Pitcher, 2024, html.as_bytes()).is_err());
    }

    #[test]
    fn fractional_season_value_does_not_match() {
        let csv = "\
Name,Season,H
Close Call,2023.9,10
Exact,2023,12";
        let rows = batters(csv, 2023);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Exact");
    }
}
