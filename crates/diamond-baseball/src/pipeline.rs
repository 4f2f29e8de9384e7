// Leaderboard pipeline: fetch -> enrich -> score -> aggregate.
//
// A season whose fetch fails is reported and left out; the others still
// aggregate. No seasons (or only failed ones) yields an empty output.

use futures_util::future::join_all;
use tracing::{info, warn};

use crate::aggregate::{aggregate, AggregatedRecord};
use crate::derive::enrich;
use crate::rank::{RankQuery, RankedResult};
use crate::scoring::{ScoredRecord, ScoringEngine};
use crate::source::{RecordSource, SourceError};
use crate::stats::{EnrichedStatRecord, Role};

/// A season left out of a leaderboard because its fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonFailure {
    pub season: i32,
    pub message: String,
}

/// Aggregated rows for one role plus a per-season account of what loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    pub role: Role,
    pub seasons_loaded: Vec<i32>,
    pub failures: Vec<SeasonFailure>,
    pub records: Vec<AggregatedRecord>,
}

impl Leaderboard {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rank(&self, query: &RankQuery) -> RankedResult {
        query.run(&self.records)
    }
}

/// Fetch and enrich one season's rows.
pub async fn load_enriched<S>(
    source: &S,
    season: i32,
    role: Role,
) -> Result<Vec<EnrichedStatRecord>, SourceError>
where
    S: RecordSource + ?Sized,
{
    let raw = source.fetch(season, role).await?;
    Ok(raw
        .iter()
        .filter(|r| r.role() == role)
        .map(enrich)
        .collect())
}

/// Fetch, enrich and score one season's rows.
pub async fn load_scored<S>(
    source: &S,
    engine: &ScoringEngine,
    season: i32,
    role: Role,
) -> Result<Vec<ScoredRecord>, SourceError>
where
    S: RecordSource + ?Sized,
{
    let enriched = load_enriched(source, season, role).await?;
    Ok(engine.score_all(enriched))
}

/// Build the aggregated leaderboard for `role` over `seasons`.
///
/// Duplicate seasons are requested once. Fetches run concurrently on the
/// current task; rows are combined in the order the seasons were given.
pub async fn build_leaderboard<S>(
    source: &S,
    engine: &ScoringEngine,
    role: Role,
    seasons: &[i32],
) -> Leaderboard
where
    S: RecordSource + ?Sized,
{
    let mut unique: Vec<i32> = Vec::with_capacity(seasons.len());
    for &season in seasons {
        if !unique.contains(&season) {
            unique.push(season);
        }
    }

    let results = join_all(
        unique
            .iter()
            .map(|&season| load_scored(source, engine, season, role)),
    )
    .await;

    let mut scored = Vec::new();
    let mut seasons_loaded = Vec::new();
    let mut failures = Vec::new();
    for (season, result) in unique.into_iter().zip(results) {
        match result {
            Ok(rows) => {
                info!("loaded {} {role} rows for {season}", rows.len());
                seasons_loaded.push(season);
                scored.extend(rows);
            }
            Err(e) => {
                warn!("failed to load {role} data for {season}: {e}");
                failures.push(SeasonFailure {
                    season,
                    message: e.to_string(),
                });
            }
        }
    }

    let records = aggregate(engine, role, &scored);
    Leaderboard {
        role,
        seasons_loaded,
        failures,
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use crate::stats::{RawBatterRecord, RawStatRecord};

    fn row(name: &str, season: i32, runs: f64) -> RawStatRecord {
        RawStatRecord::Batter(RawBatterRecord {
            name: name.into(),
            season,
            team: "TOR".into(),
            position: "2B".into(),
            runs: Some(runs),
            ..RawBatterRecord::default()
        })
    }

    #[tokio::test]
    async fn no_seasons_is_empty_not_error() {
        let source = MemorySource::new();
        let board = build_leaderboard(&source, &ScoringEngine::default(), Role::Batter, &[]).await;
        assert!(board.is_empty());
        assert!(board.failures.is_empty());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn duplicate_seasons_fetched_once() {
        let source = MemorySource::new().with_rows(2024, Role::Batter, vec![row("A", 2024, 10.0)]);
        let board = build_leaderboard(
            &source,
            &ScoringEngine::default(),
            Role::Batter,
            &[2024, 2024],
        )
        .await;
        assert_eq!(source.calls(), 1);
        assert_eq!(board.seasons_loaded, vec![2024]);
        assert_eq!(board.records[0].score, 10.0);
    }

    #[tokio::test]
    async fn all_failed_is_empty_with_failures() {
        let source = MemorySource::new()
            .fail(2023, Role::Batter, "down")
            .fail(2024, Role::Batter, "down");
        let board = build_leaderboard(
            &source,
            &ScoringEngine::default(),
            Role::Batter,
            &[2023, 2024],
        )
        .await;
        assert!(board.is_empty());
        assert_eq!(board.failures.len(), 2);
        assert!(board.rank(&RankQuery::new()).is_empty());
    }

    #[tokio::test]
    async fn load_scored_scores_each_row() {
        let source = MemorySource::new().with_rows(
            2025,
            Role::Batter,
            vec![row("A", 2025, 10.0), row("B", 2025, 20.0)],
        );
        let scored = load_scored(&source, &ScoringEngine::default(), 2025, Role::Batter)
            .await
            .unwrap();
        let scores: Vec<f64> = scored.iter().map(ScoredRecord::score).collect();
        assert_eq!(scores, vec![10.0, 20.0]);
    }
}
