// Leaderboard query: optional filters, score-descending stable sort, top N.

use crate::aggregate::AggregatedRecord;

pub const DEFAULT_LIMIT: usize = 100;

/// Filters and size bound for a leaderboard. All filters are independent
/// predicates, so their order does not matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankQuery {
    /// Exact team code.
    pub team: Option<String>,
    /// Exact position code.
    pub position: Option<String>,
    /// Case-insensitive substring of the player name or team.
    pub search: Option<String>,
    pub limit: usize,
}

impl Default for RankQuery {
    fn default() -> Self {
        Self {
            team: None,
            position: None,
            search: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl RankQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn search(mut self, needle: impl Into<String>) -> Self {
        self.search = Some(needle.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Whether `record` passes every configured filter.
    pub fn matches(&self, record: &AggregatedRecord) -> bool {
        if let Some(team) = &self.team {
            if record.team != *team {
                return false;
            }
        }
        if let Some(position) = &self.position {
            if record.position != *position {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            if !record.name.to_lowercase().contains(&needle)
                && !record.team.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }

    /// Filter, sort by score descending and truncate. Equal scores keep
    /// their input order. The input is not modified.
    pub fn run(&self, records: &[AggregatedRecord]) -> RankedResult {
        let mut rows: Vec<AggregatedRecord> =
            records.iter().filter(|r| self.matches(r)).cloned().collect();
        // `sort_by` is stable.
        rows.sort_by(|a, b| b.score.total_cmp(&a.score));
        rows.truncate(self.limit);
        RankedResult { rows }
    }
}

/// Ranked leaderboard rows, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedResult {
    rows: Vec<AggregatedRecord>,
}

impl RankedResult {
    pub fn rows(&self) -> &[AggregatedRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AggregatedRecord> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<AggregatedRecord> {
        self.rows
    }
}

impl<'a> IntoIterator for &'a RankedResult {
    type Item = &'a AggregatedRecord;
    type IntoIter = std::slice::Iter<'a, AggregatedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{BatterStats, StatLine};

    fn row(name: &str, team: &str, position: &str, score: f64) -> AggregatedRecord {
        AggregatedRecord {
            name: name.into(),
            team: team.into(),
            position: position.into(),
            seasons: 1,
            stats: StatLine::Batter(BatterStats::default()),
            score,
        }
    }

    fn names(result: &RankedResult) -> Vec<&str> {
        result.iter().map(|r| r.name.as_str()).collect()
    }

    fn sample() -> Vec<AggregatedRecord> {
        vec![
            row("Aaron Judge", "NYY", "RF", 410.0),
            row("Juan Soto", "NYM", "RF", 380.0),
            row("Bobby Witt Jr.", "KC", "SS", 395.0),
            row("Anthony Volpe", "NYY", "SS", 250.0),
            row("Unknown Guy", "Unknown", "Unknown", -5.0),
        ]
    }

    #[test]
    fn sorts_by_score_descending() {
        let result = RankQuery::new().run(&sample());
        assert_eq!(
            names(&result),
            vec!["Aaron Judge", "Bobby Witt Jr.", "Juan Soto", "Anthony Volpe", "Unknown Guy"]
        );
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let input = vec![
            row("first", "A", "C", 100.0),
            row("top", "A", "C", 200.0),
            row("second", "A", "C", 100.0),
            row("third", "A", "C", 100.0),
        ];
        let once = RankQuery::new().run(&input);
        assert_eq!(names(&once), vec!["top", "first", "second", "third"]);
        for _ in 0..5 {
            assert_eq!(RankQuery::new().run(&input), once);
        }
    }

    #[test]
    fn truncates_to_limit() {
        let result = RankQuery::new().limit(2).run(&sample());
        assert_eq!(names(&result), vec!["Aaron Judge", "Bobby Witt Jr."]);
        assert!(RankQuery::new().limit(0).run(&sample()).is_empty());
    }

    #[test]
    fn team_and_position_filters_commute() {
        let input = sample();
        let team_then_pos: Vec<AggregatedRecord> = RankQuery::new()
            .team("NYY")
            .run(&input)
            .into_rows();
        let team_then_pos = RankQuery::new().position("SS").run(&team_then_pos);
        let pos_then_team: Vec<AggregatedRecord> = RankQuery::new()
            .position("SS")
            .run(&input)
            .into_rows();
        let pos_then_team = RankQuery::new().team("NYY").run(&pos_then_team);
        let combined = RankQuery::new().team("NYY").position("SS").run(&input);

        assert_eq!(team_then_pos, pos_then_team);
        assert_eq!(team_then_pos, combined);
        assert_eq!(names(&combined), vec!["Anthony Volpe"]);
    }

    #[test]
    fn search_is_case_insensitive_on_name_or_team() {
        let input = sample();
        assert_eq!(names(&RankQuery::new().search("JUDGE").run(&input)), vec!["Aaron Judge"]);
        assert_eq!(
            names(&RankQuery::new().search("nym").run(&input)),
            vec!["Juan Soto"]
        );
        assert!(RankQuery::new().search("zzz").run(&input).is_empty());
    }

    #[test]
    fn team_filter_is_exact() {
        assert!(RankQuery::new().team("nyy").run(&sample()).is_empty());
    }

    #[test]
    fn input_is_untouched() {
        let input = sample();
        let before = input.clone();
        let _ = RankQuery::new().team("NYY").limit(1).run(&input);
        assert_eq!(input, before);
    }
}
