// Shared configuration for the leaderboard workspace.

pub mod config;
