// Plain-text rendering of leaderboards, forecasts and schedules for stdout.

use std::fmt::Write;

use diamond_baseball::forecast::Prediction;
use diamond_baseball::pipeline::Leaderboard;
use diamond_baseball::schedule::{average_difficulty, ScheduledGame};
use diamond_baseball::stats::StatLine;
use diamond_baseball::{RankedResult, Role};

const NAME_WIDTH: usize = 24;

fn title(role: Role) -> &'static str {
    match role {
        Role::Batter => "Batters",
        Role::Pitcher => "Pitchers",
    }
}

/// Truncate to `width` characters so columns stay aligned.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}~")
    }
}

/// Header summarizing which seasons loaded and which failed.
pub fn render_header(board: &Leaderboard) -> String {
    let mut out = String::new();
    let loaded: Vec<String> = board.seasons_loaded.iter().map(i32::to_string).collect();
    let _ = writeln!(
        out,
        "== {} ({}) ==",
        title(board.role),
        if loaded.is_empty() {
            "no seasons".to_string()
        } else {
            loaded.join(", ")
        }
    );
    for failure in &board.failures {
        let _ = writeln!(out, "   ! {} unavailable: {}", failure.season, failure.message);
    }
    out
}

/// Ranked rows as an aligned table.
pub fn render_table(role: Role, ranked: &RankedResult) -> String {
    let mut out = String::new();
    match role {
        Role::Batter => {
            let _ = writeln!(
                out,
                "{:>3}  {:<NAME_WIDTH$} {:<4} {:<4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>8}",
                "#", "Name", "Team", "Pos", "R", "HR", "RBI", "SB", "TB", "Points"
            );
        }
        Role::Pitcher => {
            let _ = writeln!(
                out,
                "{:>3}  {:<NAME_WIDTH$} {:<4} {:<4} {:>6} {:>4} {:>4} {:>4} {:>4} {:>8}",
                "#", "Name", "Team", "Pos", "IP", "SO", "W", "SV", "HLD", "Points"
            );
        }
    }

    for (i, row) in ranked.iter().enumerate() {
        let name = fit(&row.name, NAME_WIDTH);
        let team = fit(&row.team, 4);
        let pos = fit(&row.position, 4);
        match &row.stats {
            StatLine::Batter(b) => {
                let _ = writeln!(
                    out,
                    "{:>3}  {:<NAME_WIDTH$} {:<4} {:<4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>8.1}",
                    i + 1,
                    name,
                    team,
                    pos,
                    b.runs,
                    b.home_runs,
                    b.rbi,
                    b.stolen_bases,
                    b.total_bases,
                    row.score
                );
            }
            StatLine::Pitcher(p) => {
                let _ = writeln!(
                    out,
                    "{:>3}  {:<NAME_WIDTH$} {:<4} {:<4} {:>6.1} {:>4} {:>4} {:>4} {:>4} {:>8.1}",
                    i + 1,
                    name,
                    team,
                    pos,
                    p.innings_pitched,
                    p.strikeouts,
                    p.wins,
                    p.saves,
                    p.holds,
                    row.score
                );
            }
        }
    }
    out
}

pub fn render_empty(role: Role) -> String {
    format!(
        "No {} data. Select one or more seasons in config/dashboard.toml.\n",
        role.to_string().to_lowercase()
    )
}

/// Top `limit` predictions by predicted score.
pub fn render_forecast(role: Role, predictions: &[Prediction], limit: usize) -> String {
    let mut sorted: Vec<&Prediction> = predictions.iter().collect();
    sorted.sort_by(|a, b| b.predicted_score.total_cmp(&a.predicted_score));

    let mut out = String::new();
    let _ = writeln!(out, "== {} forecast ==", title(role));
    let _ = writeln!(
        out,
        "{:<NAME_WIDTH$} {:<4} {:>9} {:>9}",
        "Name", "Team", "Current", "Predicted"
    );
    for p in sorted.into_iter().take(limit) {
        let _ = writeln!(
            out,
            "{:<NAME_WIDTH$} {:<4} {:>9.1} {:>9.1}",
            fit(&p.name, NAME_WIDTH),
            fit(&p.team, 4),
            p.current_score,
            p.predicted_score
        );
    }
    out
}

pub fn render_schedule(team: &str, games: &[ScheduledGame]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {team} upcoming schedule ==");
    if games.is_empty() {
        let _ = writeln!(out, "No upcoming games.");
        return out;
    }
    for game in games {
        let _ = writeln!(
            out,
            "{}  {} {:<NAME_WIDTH$} {:.3}",
            game.date.format("%a %b %d"),
            if game.home { "vs" } else { "@ " },
            fit(&game.opponent, NAME_WIDTH),
            game.difficulty
        );
    }
    let _ = writeln!(out, "Average difficulty: {:.3}", average_difficulty(games));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use diamond_baseball::pipeline::SeasonFailure;
    use diamond_baseball::stats::BatterStats;
    use diamond_baseball::{AggregatedRecord, RankQuery};

    fn board() -> Leaderboard {
        Leaderboard {
            role: Role::Batter,
            seasons_loaded: vec![2023, 2025],
            failures: vec![SeasonFailure {
                season: 2024,
                message: "timed out".into(),
            }],
            records: vec![AggregatedRecord {
                name: "Bobby Witt Jr.".into(),
                team: "KC".into(),
                position: "SS".into(),
                seasons: 2,
                stats: StatLine::Batter(BatterStats {
                    runs: 125.0,
                    home_runs: 32.0,
                    ..BatterStats::default()
                }),
                score: 157.0,
            }],
        }
    }

    #[test]
    fn header_lists_failures() {
        let text = render_header(&board());
        assert!(text.starts_with("== Batters (2023, 2025) =="));
        assert!(text.contains("2024 unavailable: timed out"));
    }

    #[test]
    fn table_has_one_line_per_row() {
        let b = board();
        let text = render_table(Role::Batter, &b.rank(&RankQuery::new()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("Bobby Witt Jr."));
        assert!(lines[1].trim_end().ends_with("157.0"));
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(fit("abcdef", 4), "abc~");
        assert_eq!(fit("abc", 4), "abc");
    }

    #[test]
    fn forecast_sorted_and_limited() {
        let predictions = vec![
            Prediction {
                name: "Low".into(),
                team: "SF".into(),
                current_score: 1.0,
                predicted_score: 10.0,
            },
            Prediction {
                name: "High".into(),
                team: "SF".into(),
                current_score: 1.0,
                predicted_score: 90.0,
            },
        ];
        let text = render_forecast(Role::Pitcher, &predictions, 1);
        assert!(text.contains("High"));
        assert!(!text.contains("Low"));
    }

    #[test]
    fn schedule_shows_average() {
        let games = vec![ScheduledGame {
            date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            opponent: "Boston Red Sox".into(),
            home: true,
            difficulty: 0.55,
        }];
        let text = render_schedule("NYY", &games);
        assert!(text.contains("vs Boston Red Sox"));
        assert!(text.contains("Average difficulty: 0.550"));
        assert!(render_schedule("NYY", &[]).contains("No upcoming games."));
    }

    #[test]
    fn empty_prompt_names_role() {
        assert!(render_empty(Role::Pitcher).starts_with("No pitcher data."));
    }
}
