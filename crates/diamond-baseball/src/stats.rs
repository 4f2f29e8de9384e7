// Per-player season records: raw rows from a source and their enriched form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder used when a source omits a team or position.
pub const UNKNOWN: &str = "Unknown";

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Batter or pitcher. Selects the raw fields and the scoring formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Batter,
    Pitcher,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Batter, Role::Pitcher];

    /// Name used in file names and URL templates ("batting" / "pitching").
    pub fn table_name(&self) -> &'static str {
        match self {
            Role::Batter => "batting",
            Role::Pitcher => "pitching",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Batter => write!(f, "batter"),
            Role::Pitcher => write!(f, "pitcher"),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

/// A batter row as supplied by a source. `None` marks a missing or
/// unparseable column; enrichment treats it as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBatterRecord {
    pub name: String,
    pub season: i32,
    pub team: String,
    pub position: String,
    pub hits: Option<f64>,
    pub doubles: Option<f64>,
    pub triples: Option<f64>,
    pub home_runs: Option<f64>,
    pub runs: Option<f64>,
    pub rbi: Option<f64>,
    pub walks: Option<f64>,
    pub strikeouts: Option<f64>,
    pub stolen_bases: Option<f64>,
}

/// A pitcher row as supplied by a source. Innings pitched stays textual
/// until enrichment coerces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPitcherRecord {
    pub name: String,
    pub season: i32,
    pub team: String,
    pub position: String,
    pub innings_pitched: Option<String>,
    pub hits_allowed: Option<f64>,
    pub earned_runs: Option<f64>,
    pub walks: Option<f64>,
    pub strikeouts: Option<f64>,
    pub wins: Option<f64>,
    pub losses: Option<f64>,
    pub saves: Option<f64>,
    pub holds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawStatRecord {
    Batter(RawBatterRecord),
    Pitcher(RawPitcherRecord),
}

impl RawStatRecord {
    pub fn role(&self) -> Role {
        match self {
            RawStatRecord::Batter(_) => Role::Batter,
            RawStatRecord::Pitcher(_) => Role::Pitcher,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RawStatRecord::Batter(b) => &b.name,
            RawStatRecord::Pitcher(p) => &p.name,
        }
    }

    pub fn season(&self) -> i32 {
        match self {
            RawStatRecord::Batter(b) => b.season,
            RawStatRecord::Pitcher(p) => p.season,
        }
    }
}

// ---------------------------------------------------------------------------
// Enriched records
// ---------------------------------------------------------------------------

/// Fully numeric batter line, including derived fields.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatterStats {
    pub hits: f64,
    pub doubles: f64,
    pub triples: f64,
    pub home_runs: f64,
    pub runs: f64,
    pub rbi: f64,
    pub walks: f64,
    pub strikeouts: f64,
    pub stolen_bases: f64,
    /// H - 2B - 3B - HR. Not clamped: inconsistent source counts go negative.
    pub singles: f64,
    /// 1B + 2*2B + 3*3B + 4*HR.
    pub total_bases: f64,
}

/// Fully numeric pitcher line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PitcherStats {
    pub innings_pitched: f64,
    pub hits_allowed: f64,
    pub earned_runs: f64,
    pub walks: f64,
    pub strikeouts: f64,
    pub wins: f64,
    pub losses: f64,
    pub saves: f64,
    pub holds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatLine {
    Batter(BatterStats),
    Pitcher(PitcherStats),
}

impl StatLine {
    pub fn role(&self) -> Role {
        match self {
            StatLine::Batter(_) => Role::Batter,
            StatLine::Pitcher(_) => Role::Pitcher,
        }
    }

    /// An all-zero line for `role`.
    pub fn zero(role: Role) -> Self {
        match role {
            Role::Batter => StatLine::Batter(BatterStats::default()),
            Role::Pitcher => StatLine::Pitcher(PitcherStats::default()),
        }
    }

    /// Field-wise sum. Returns `None` when the roles differ.
    pub fn checked_add(&self, other: &StatLine) -> Option<StatLine> {
        match (self, other) {
            (StatLine::Batter(a), StatLine::Batter(b)) => Some(StatLine::Batter(BatterStats {
                hits: a.hits + b.hits,
                doubles: a.doubles + b.doubles,
                triples: a.triples + b.triples,
                home_runs: a.home_runs + b.home_runs,
                runs: a.runs + b.runs,
                rbi: a.rbi + b.rbi,
                walks: a.walks + b.walks,
                strikeouts: a.strikeouts + b.strikeouts,
                stolen_bases: a.stolen_bases + b.stolen_bases,
                singles: a.singles + b.singles,
                total_bases: a.total_bases + b.total_bases,
            })),
            (StatLine::Pitcher(a), StatLine::Pitcher(b)) => Some(StatLine::Pitcher(PitcherStats {
                innings_pitched: a.innings_pitched + b.innings_pitched,
                hits_allowed: a.hits_allowed + b.hits_allowed,
                earned_runs: a.earned_runs + b.earned_runs,
                walks: a.walks + b.walks,
                strikeouts: a.strikeouts + b.strikeouts,
                wins: a.wins + b.wins,
                losses: a.losses + b.losses,
                saves: a.saves + b.saves,
                holds: a.holds + b.holds,
            })),
            _ => None,
        }
    }
}

/// A raw record after numeric coercion and derived-field computation.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedStatRecord {
    pub name: String,
    pub season: i32,
    pub team: String,
    pub position: String,
    pub stats: StatLine,
}

impl EnrichedStatRecord {
    pub fn role(&self) -> Role {
        self.stats.role()
    }
}
