// CSV export of aggregated leaderboards, and the matching reader.
//
// Column order is fixed per role. Reading an export back recomputes each
// score from its fields, so export -> read -> rank reproduces the ranking.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregatedRecord;
use crate::scoring::ScoringEngine;
use crate::stats::{BatterStats, PitcherStats, Role, StatLine};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("row for '{name}' is a {found} line, expected {expected}")]
    RoleMismatch {
        name: String,
        expected: Role,
        found: Role,
    },
}

pub const BATTER_COLUMNS: &[&str] = &[
    "Name", "Team", "Pos", "Seasons", "R", "H", "1B", "2B", "3B", "HR", "TB", "RBI", "BB", "SO",
    "SB", "Fantasy_Points",
];

pub const PITCHER_COLUMNS: &[&str] = &[
    "Name", "Team", "Pos", "Seasons", "IP", "H", "ER", "BB", "SO", "W", "L", "SV", "HLD",
    "Fantasy_Points",
];

pub fn columns(role: Role) -> &'static [&'static str] {
    match role {
        Role::Batter => BATTER_COLUMNS,
        Role::Pitcher => PITCHER_COLUMNS,
    }
}

// ---------------------------------------------------------------------------
// Row structs (field order = column order)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct BatterRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Team")]
    team: String,
    #[serde(rename = "Pos")]
    position: String,
    #[serde(rename = "Seasons")]
    seasons: u32,
    #[serde(rename = "R")]
    runs: f64,
    #[serde(rename = "H")]
    hits: f64,
    #[serde(rename = "1B")]
    singles: f64,
    #[serde(rename = "2B")]
    doubles: f64,
    #[serde(rename = "3B")]
    triples: f64,
    #[serde(rename = "HR")]
    home_runs: f64,
    #[serde(rename = "TB")]
    total_bases: f64,
    #[serde(rename = "RBI")]
    rbi: f64,
    #[serde(rename = "BB")]
    walks: f64,
    #[serde(rename = "SO")]
    strikeouts: f64,
    #[serde(rename = "SB")]
    stolen_bases: f64,
    #[serde(rename = "Fantasy_Points")]
    fantasy_points: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct PitcherRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Team")]
    team: String,
    #[serde(rename = "Pos")]
    position: String,
    #[serde(rename = "Seasons")]
    seasons: u32,
    #[serde(rename = "IP")]
    innings_pitched: f64,
    #[serde(rename = "H")]
    hits_allowed: f64,
    #[serde(rename = "ER")]
    earned_runs: f64,
    #[serde(rename = "BB")]
    walks: f64,
    #[serde(rename = "SO")]
    strikeouts: f64,
    #[serde(rename = "W")]
    wins: f64,
    #[serde(rename = "L")]
    losses: f64,
    #[serde(rename = "SV")]
    saves: f64,
    #[serde(rename = "HLD")]
    holds: f64,
    #[serde(rename = "Fantasy_Points")]
    fantasy_points: f64,
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write `rows` as CSV with a header row in the declared column order.
///
/// The header is written even when `rows` is empty. Every row must be of
/// `role`; a mismatch is reported before anything reaches `out`.
pub fn write_csv<'a, W, I>(role: Role, rows: I, out: W) -> Result<(), ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a AggregatedRecord>,
{
    let rows: Vec<&AggregatedRecord> = rows.into_iter().collect();
    if let Some(record) = rows.iter().find(|r| r.stats.role() != role) {
        return Err(mismatch(role, record));
    }

    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    wtr.write_record(columns(role))?;

    for record in rows {
        match (role, &record.stats) {
            (Role::Batter, StatLine::Batter(b)) => wtr.serialize(BatterRow {
                name: record.name.clone(),
                team: record.team.clone(),
                position: record.position.clone(),
                seasons: record.seasons,
                runs: b.runs,
                hits: b.hits,
                singles: b.singles,
                doubles: b.doubles,
                triples: b.triples,
                home_runs: b.home_runs,
                total_bases: b.total_bases,
                rbi: b.rbi,
                walks: b.walks,
                strikeouts: b.strikeouts,
                stolen_bases: b.stolen_bases,
                fantasy_points: record.score,
            })?,
            (Role::Pitcher, StatLine::Pitcher(p)) => wtr.serialize(PitcherRow {
                name: record.name.clone(),
                team: record.team.clone(),
                position: record.position.clone(),
                seasons: record.seasons,
                innings_pitched: p.innings_pitched,
                hits_allowed: p.hits_allowed,
                earned_runs: p.earned_runs,
                walks: p.walks,
                strikeouts: p.strikeouts,
                wins: p.wins,
                losses: p.losses,
                saves: p.saves,
                holds: p.holds,
                fantasy_points: record.score,
            })?,
            (expected, _) => return Err(mismatch(expected, record)),
        }
    }

    wtr.flush()?;
    Ok(())
}

fn mismatch(expected: Role, record: &AggregatedRecord) -> ExportError {
    ExportError::RoleMismatch {
        name: record.name.clone(),
        expected,
        found: record.stats.role(),
    }
}

/// Render `rows` to a CSV string.
pub fn to_csv_string<'a, I>(role: Role, rows: I) -> Result<String, ExportError>
where
    I: IntoIterator<Item = &'a AggregatedRecord>,
{
    let mut buf = Vec::new();
    write_csv(role, rows, &mut buf)?;
    // The writer only emits UTF-8 from `String` fields and formatted numbers.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Parse an export produced by [`write_csv`]. Scores are recomputed with
/// `engine`; the `Fantasy_Points` column is informational.
pub fn read_csv<R: Read>(
    engine: &ScoringEngine,
    role: Role,
    input: R,
) -> Result<Vec<AggregatedRecord>, ExportError> {
    let mut rdr = csv::Reader::from_reader(input);
    let mut out = Vec::new();
    match role {
        Role::Batter => {
            for row in rdr.deserialize::<BatterRow>() {
                let row = row?;
                let stats = StatLine::Batter(BatterStats {
                    hits: row.hits,
                    doubles: row.doubles,
                    triples: row.triples,
                    home_runs: row.home_runs,
                    runs: row.runs,
                    rbi: row.rbi,
                    walks: row.walks,
                    strikeouts: row.strikeouts,
                    stolen_bases: row.stolen_bases,
                    singles: row.singles,
                    total_bases: row.total_bases,
                });
                out.push(AggregatedRecord {
                    score: engine.score(&stats),
                    name: row.name,
                    team: row.team,
                    position: row.position,
                    seasons: row.seasons,
                    stats,
                });
            }
        }
        Role::Pitcher => {
            for row in rdr.deserialize::<PitcherRow>() {
                let row = row?;
                let stats = StatLine::Pitcher(PitcherStats {
                    innings_pitched: row.innings_pitched,
                    hits_allowed: row.hits_allowed,
                    earned_runs: row.earned_runs,
                    walks: row.walks,
                    strikeouts: row.strikeouts,
                    wins: row.wins,
                    losses: row.losses,
                    saves: row.saves,
                    holds: row.holds,
                });
                out.push(AggregatedRecord {
                    score: engine.score(&stats),
                    name: row.name,
                    team: row.team,
                    position: row.position,
                    seasons: row.seasons,
                    stats,
                });
            }
        }
    }
    Ok(out)
}
