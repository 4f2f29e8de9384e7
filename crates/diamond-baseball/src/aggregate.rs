// Season aggregation: one row per player across the selected seasons.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::scoring::{ScoredRecord, ScoringEngine};
use crate::stats::{Role, StatLine};

/// A player's summed line across seasons. The season is dropped; `score`
/// is recomputed from the summed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRecord {
    pub name: String,
    /// Team of the latest season merged.
    pub team: String,
    /// Position of the latest season merged.
    pub position: String,
    /// Number of season rows merged into this one.
    pub seasons: u32,
    pub stats: StatLine,
    pub score: f64,
}

impl AggregatedRecord {
    pub fn role(&self) -> Role {
        self.stats.role()
    }
}

struct Group {
    name: String,
    team: String,
    position: String,
    latest_season: i32,
    seasons: u32,
    stats: StatLine,
}

/// Sum `records` of `role` per player name and rescore the totals.
///
/// Players are keyed by exact display name, so two different players who
/// share a name are merged. Output keeps first-appearance order. Records of
/// the other role are skipped. Empty input gives an empty result.
pub fn aggregate(
    engine: &ScoringEngine,
    role: Role,
    records: &[ScoredRecord],
) -> Vec<AggregatedRecord> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut skipped = 0usize;

    for scored in records {
        let record = scored.record();
        if record.role() != role {
            skipped += 1;
            continue;
        }
        match index.get(record.name.as_str()) {
            Some(&i) => {
                let group = &mut groups[i];
                let Some(sum) = group.stats.checked_add(&record.stats) else {
                    skipped += 1;
                    continue;
                };
                group.stats = sum;
                group.seasons += 1;
                if record.season >= group.latest_season {
                    group.latest_season = record.season;
                    group.team = record.team.clone();
                    group.position = record.position.clone();
                }
            }
            None => {
                index.insert(record.name.as_str(), groups.len());
                groups.push(Group {
                    name: record.name.clone(),
                    team: record.team.clone(),
                    position: record.position.clone(),
                    latest_season: record.season,
                    seasons: 1,
                    stats: record.stats,
                });
            }
        }
    }

    if skipped > 0 {
        warn!("aggregate({role}): skipped {skipped} records of another role");
    }
    debug!(
        "aggregate({role}): {} records -> {} players",
        records.len(),
        groups.len()
    );

    groups
        .into_iter()
        .map(|g| AggregatedRecord {
            score: engine.score(&g.stats),
            name: g.name,
            team: g.team,
            position: g.position,
            seasons: g.seasons,
            stats: g.stats,
        })
        .collect()
}
