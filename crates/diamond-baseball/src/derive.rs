// Derived statistics: numeric coercion plus singles / total bases.

use tracing::warn;

use crate::stats::{
    BatterStats, EnrichedStatRecord, PitcherStats, RawBatterRecord, RawPitcherRecord,
    RawStatRecord, StatLine,
};

/// Missing or non-finite counts become zero.
fn count(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Parse an innings-pitched cell. Anything unparseable is zero.
pub fn parse_innings(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Fill in singles and total bases from the hit-type counts.
fn with_derived(mut stats: BatterStats) -> BatterStats {
    stats.singles = stats.hits - stats.doubles - stats.triples - stats.home_runs;
    stats.total_bases =
        stats.singles + 2.0 * stats.doubles + 3.0 * stats.triples + 4.0 * stats.home_runs;
    stats
}

fn enrich_batter(raw: &RawBatterRecord) -> EnrichedStatRecord {
    let stats = with_derived(BatterStats {
        hits: count(raw.hits),
        doubles: count(raw.doubles),
        triples: count(raw.triples),
        home_runs: count(raw.home_runs),
        runs: count(raw.runs),
        rbi: count(raw.rbi),
        walks: count(raw.walks),
        strikeouts: count(raw.strikeouts),
        stolen_bases: count(raw.stolen_bases),
        ..BatterStats::default()
    });
    if stats.singles < 0.0 {
        warn!(
            "'{}' ({}): extra-base hits exceed hits, singles = {}",
            raw.name, raw.season, stats.singles
        );
    }
    EnrichedStatRecord {
        name: raw.name.clone(),
        season: raw.season,
        team: raw.team.clone(),
        position: raw.position.clone(),
        stats: StatLine::Batter(stats),
    }
}

fn enrich_pitcher(raw: &RawPitcherRecord) -> EnrichedStatRecord {
    EnrichedStatRecord {
        name: raw.name.clone(),
        season: raw.season,
        team: raw.team.clone(),
        position: raw.position.clone(),
        stats: StatLine::Pitcher(PitcherStats {
            innings_pitched: parse_innings(raw.innings_pitched.as_deref()),
            hits_allowed: count(raw.hits_allowed),
            earned_runs: count(raw.earned_runs),
            walks: count(raw.walks),
            strikeouts: count(raw.strikeouts),
            wins: count(raw.wins),
            losses: count(raw.losses),
            saves: count(raw.saves),
            holds: count(raw.holds),
        }),
    }
}

/// Map a raw record to its enriched form. Pure; never fails.
pub fn enrich(raw: &RawStatRecord) -> EnrichedStatRecord {
    match raw {
        RawStatRecord::Batter(b) => enrich_batter(b),
        RawStatRecord::Pitcher(p) => enrich_pitcher(p),
    }
}

/// Enrich a batch, preserving order.
pub fn enrich_all(raw: &[RawStatRecord]) -> Vec<EnrichedStatRecord> {
    raw.iter().map(enrich).collect()
}

impl EnrichedStatRecord {
    /// Recompute derived fields from this record's own counting stats.
    ///
    /// Applying this to the output of [`enrich`] returns an identical record.
    pub fn reenrich(&self) -> EnrichedStatRecord {
        let stats = match self.stats {
            StatLine::Batter(b) => StatLine::Batter(with_derived(b)),
            StatLine::Pitcher(p) => StatLine::Pitcher(p),
        };
        EnrichedStatRecord {
            stats,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
