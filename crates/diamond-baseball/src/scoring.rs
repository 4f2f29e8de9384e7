// Fantasy point scoring from named linear weights.

use diamond_core::config::{BatterWeights, PitcherWeights, ScoringWeights};

use crate::stats::{BatterStats, EnrichedStatRecord, PitcherStats, StatLine};

/// Computes fantasy points. Holds only the weights, so scoring is a pure
/// function of a stat line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoringEngine {
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score a stat line with the formula for its role. No clamping.
    pub fn score(&self, line: &StatLine) -> f64 {
        match line {
            StatLine::Batter(b) => batter_points(b, &self.weights.batter),
            StatLine::Pitcher(p) => pitcher_points(p, &self.weights.pitcher),
        }
    }

    pub fn score_record(&self, record: EnrichedStatRecord) -> ScoredRecord {
        let score = self.score(&record.stats);
        ScoredRecord { record, score }
    }

    pub fn score_all(&self, records: Vec<EnrichedStatRecord>) -> Vec<ScoredRecord> {
        records.into_iter().map(|r| self.score_record(r)).collect()
    }
}

/// R + TB + RBI + BB - SO + SB under the default weights.
pub fn batter_points(b: &BatterStats, w: &BatterWeights) -> f64 {
    w.runs * b.runs
        + w.total_bases * b.total_bases
        + w.rbi * b.rbi
        + w.walks * b.walks
        + w.strikeouts * b.strikeouts
        + w.stolen_bases * b.stolen_bases
}

/// 3*IP + SO + 2*W + 5*SV + 2*HLD - H - 2*ER - BB - 2*L under the default weights.
pub fn pitcher_points(p: &PitcherStats, w: &PitcherWeights) -> f64 {
    w.innings_pitched * p.innings_pitched
        + w.strikeouts * p.strikeouts
        + w.wins * p.wins
        + w.saves * p.saves
        + w.holds * p.holds
        + w.hits_allowed * p.hits_allowed
        + w.earned_runs * p.earned_runs
        + w.walks * p.walks
        + w.losses * p.losses
}

/// An enriched record paired with the score computed from it. Only the
/// engine builds these, so the score cannot drift from the fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    record: EnrichedStatRecord,
    score: f64,
}

impl ScoredRecord {
    pub fn record(&self) -> &EnrichedStatRecord {
        &self.record
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn into_record(self) -> EnrichedStatRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::enrich;
    use crate::stats::{RawBatterRecord, RawStatRecord};

    fn engine() -> ScoringEngine {
        ScoringEngine::default()
    }

    #[test]
    fn batter_scenario_scores_219() {
        let raw = RawStatRecord::Batter(RawBatterRecord {
            name: "X".into(),
            season: 2023,
            hits: Some(100.0),
            doubles: Some(20.0),
            triples: Some(2.0),
            home_runs: Some(10.0),
            runs: Some(50.0),
            rbi: Some(60.0),
            walks: Some(40.0),
            strikeouts: Some(90.0),
            stolen_bases: Some(5.0),
            ..RawBatterRecord::default()
        });
        let scored = engine().score_record(enrich(&raw));
        assert_eq!(scored.score(), 219.0);
        assert_eq!(scored.record().name, "X");
    }

    #[test]
    fn pitcher_formula() {
        let p = PitcherStats {
            innings_pitched: 200.0,
            hits_allowed: 150.0,
            earned_runs: 60.0,
            walks: 50.0,
            strikeouts: 220.0,
            wins: 15.0,
            losses: 8.0,
            saves: 0.0,
            holds: 0.0,
        };
        // 600 + 220 + 30 - 150 - 120 - 50 - 16
        assert_eq!(engine().score(&StatLine::Pitcher(p)), 514.0);
    }

    #[test]
    fn reliever_saves_and_holds() {
        let p = PitcherStats {
            innings_pitched: 60.0,
            saves: 30.0,
            holds: 5.0,
            ..PitcherStats::default()
        };
        assert_eq!(engine().score(&StatLine::Pitcher(p)), 180.0 + 150.0 + 10.0);
    }

    #[test]
    fn negative_scores_are_not_clamped() {
        let p = PitcherStats {
            innings_pitched: 1.0,
            hits_allowed: 10.0,
            earned_runs: 9.0,
            walks: 4.0,
            losses: 1.0,
            ..PitcherStats::default()
        };
        assert_eq!(engine().score(&StatLine::Pitcher(p)), 3.0 - 10.0 - 18.0 - 4.0 - 2.0);
    }

    #[test]
    fn custom_weights_change_policy() {
        let mut weights = ScoringWeights::default();
        weights.batter.stolen_bases = 2.0;
        weights.batter.strikeouts = 0.0;
        let b = BatterStats {
            stolen_bases: 10.0,
            strikeouts: 100.0,
            ..BatterStats::default()
        };
        assert_eq!(ScoringEngine::new(weights).score(&StatLine::Batter(b)), 20.0);
        assert_eq!(engine().score(&StatLine::Batter(b)), -90.0);
    }
}
