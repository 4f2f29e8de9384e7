// Library root: stat sources, derivation, scoring, aggregation, ranking,
// export, forecasting and schedule difficulty.

pub mod aggregate;
pub mod derive;
pub mod export;
pub mod forecast;
pub mod pipeline;
pub mod rank;
pub mod schedule;
pub mod scoring;
pub mod source;
pub mod stats;

pub use aggregate::AggregatedRecord;
pub use pipeline::{build_leaderboard, Leaderboard};
pub use rank::{RankQuery, RankedResult};
pub use scoring::ScoringEngine;
pub use stats::Role;
