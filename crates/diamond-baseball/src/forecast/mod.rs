// Score forecasting: feature extraction and pluggable predictors.
//
// A forecaster is trained on one season of enriched records for one role,
// with the computed fantasy score as target, then predicts a score for
// records of the same shape. Feature order is fixed per role:
//
//   batter:  R, 1B, 2B, 3B, HR, RBI, BB, SO, SB
//   pitcher: IP, H, ER, BB, SO, W, L, SV, HLD

pub mod mean;
pub mod ridge;

use tracing::info;

use crate::scoring::ScoringEngine;
use crate::stats::{EnrichedStatRecord, Role, StatLine};

pub use mean::MeanForecaster;
pub use ridge::RidgeForecaster;

pub const BATTER_FEATURES: &[&str] = &["R", "1B", "2B", "3B", "HR", "RBI", "BB", "SO", "SB"];
pub const PITCHER_FEATURES: &[&str] = &["IP", "H", "ER", "BB", "SO", "W", "L", "SV", "HLD"];

pub fn feature_names(role: Role) -> &'static [&'static str] {
    match role {
        Role::Batter => BATTER_FEATURES,
        Role::Pitcher => PITCHER_FEATURES,
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    /// Features at predict time differ from those seen at fit time. This is
    /// a caller bug, not a data problem.
    #[error("feature shape mismatch: fitted on {expected}, got {found}")]
    FeatureShapeMismatch {
        expected: FeatureShape,
        found: FeatureShape,
    },

    #[error("forecaster `{0}` has not been fitted")]
    NotFitted(String),

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("training diverged to a non-finite loss")]
    Diverged,

    #[error("tensor backend error: {0}")]
    Backend(String),
}

// ---------------------------------------------------------------------------
// Features
// ---------------------------------------------------------------------------

/// Role and width of a feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureShape {
    pub role: Role,
    pub width: usize,
}

impl std::fmt::Display for FeatureShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x{}", self.role, self.width)
    }
}

/// One feature vector in the documented field order for its role.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    role: Role,
    values: Vec<f64>,
}

impl FeatureRow {
    /// Build a row from raw values. The caller is responsible for the order.
    pub fn new(role: Role, values: Vec<f64>) -> Self {
        Self { role, values }
    }

    pub fn from_stats(line: &StatLine) -> Self {
        let values = match line {
            StatLine::Batter(b) => vec![
                b.runs,
                b.singles,
                b.doubles,
                b.triples,
                b.home_runs,
                b.rbi,
                b.walks,
                b.strikeouts,
                b.stolen_bases,
            ],
            StatLine::Pitcher(p) => vec![
                p.innings_pitched,
                p.hits_allowed,
                p.earned_runs,
                p.walks,
                p.strikeouts,
                p.wins,
                p.losses,
                p.saves,
                p.holds,
            ],
        };
        Self {
            role: line.role(),
            values,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn shape(&self) -> FeatureShape {
        FeatureShape {
            role: self.role,
            width: self.values.len(),
        }
    }
}

/// Feature rows with their target scores, all of one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    shape: FeatureShape,
    rows: Vec<FeatureRow>,
    targets: Vec<f64>,
}

impl TrainingSet {
    /// Build from enriched records, using each record's fantasy score as
    /// the target.
    pub fn from_records(
        engine: &ScoringEngine,
        records: &[EnrichedStatRecord],
    ) -> Result<Self, ForecastError> {
        let pairs = records
            .iter()
            .map(|r| (FeatureRow::from_stats(&r.stats), engine.score(&r.stats)))
            .collect();
        Self::from_pairs(pairs)
    }

    /// Build from explicit (features, target) pairs.
    pub fn from_pairs(pairs: Vec<(FeatureRow, f64)>) -> Result<Self, ForecastError> {
        let Some((first, _)) = pairs.first() else {
            return Err(ForecastError::EmptyTrainingSet);
        };
        let shape = first.shape();
        let mut rows = Vec::with_capacity(pairs.len());
        let mut targets = Vec::with_capacity(pairs.len());
        for (row, target) in pairs {
            if row.shape() != shape {
                return Err(ForecastError::FeatureShapeMismatch {
                    expected: shape,
                    found: row.shape(),
                });
            }
            rows.push(row);
            targets.push(target);
        }
        Ok(Self {
            shape,
            rows,
            targets,
        })
    }

    pub fn shape(&self) -> FeatureShape {
        self.shape
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reject `row` unless it matches the fitted shape.
pub(crate) fn check_shape(expected: FeatureShape, row: &FeatureRow) -> Result<(), ForecastError> {
    if row.shape() == expected {
        Ok(())
    } else {
        Err(ForecastError::FeatureShapeMismatch {
            expected,
            found: row.shape(),
        })
    }
}

// ---------------------------------------------------------------------------
// Forecaster trait
// ---------------------------------------------------------------------------

/// A swappable score predictor.
pub trait Forecaster {
    fn name(&self) -> &str;

    fn fit(&mut self, training: &TrainingSet) -> Result<(), ForecastError>;

    fn predict(&self, row: &FeatureRow) -> Result<f64, ForecastError>;
}

/// A predicted score for one current-season record.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub name: String,
    pub team: String,
    pub current_score: f64,
    pub predicted_score: f64,
}

/// Fit `forecaster` on `training` and predict every record in `current`.
pub fn forecast_scores(
    forecaster: &mut dyn Forecaster,
    engine: &ScoringEngine,
    training: &[EnrichedStatRecord],
    current: &[EnrichedStatRecord],
) -> Result<Vec<Prediction>, ForecastError> {
    let set = TrainingSet::from_records(engine, training)?;
    forecaster.fit(&set)?;
    info!(
        "fitted {} forecaster on {} rows ({})",
        forecaster.name(),
        set.len(),
        set.shape()
    );

    current
        .iter()
        .map(|record| {
            let predicted_score = forecaster.predict(&FeatureRow::from_stats(&record.stats))?;
            Ok(Prediction {
                name: record.name.clone(),
                team: record.team.clone(),
                current_score: engine.score(&record.stats),
                predicted_score,
            })
        })
        .collect()
}
