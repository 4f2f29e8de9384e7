// Configuration loading and parsing (dashboard.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

/// Name of the single config file under `config/` (and `defaults/`).
pub const CONFIG_FILE: &str = "dashboard.toml";

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub weights: ScoringWeights,
    pub source: SourceConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

// ---------------------------------------------------------------------------
// [dashboard] / [filters]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Seasons to aggregate, in the order they are requested.
    pub seasons: Vec<i32>,
    #[serde(default = "default_batter_limit")]
    pub batter_limit: usize,
    #[serde(default = "default_pitcher_limit")]
    pub pitcher_limit: usize,
}

fn default_batter_limit() -> usize {
    50
}

fn default_pitcher_limit() -> usize {
    100
}

/// Optional leaderboard filters. Empty strings are treated as unset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

// ---------------------------------------------------------------------------
// [weights.batter] / [weights.pitcher]
// ---------------------------------------------------------------------------

/// Named coefficients for both scoring formulas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ScoringWeights {
    #[serde(default)]
    pub batter: BatterWeights,
    #[serde(default)]
    pub pitcher: PitcherWeights,
}

/// Batter coefficients. Negative weights are penalties.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatterWeights {
    pub runs: f64,
    pub total_bases: f64,
    pub rbi: f64,
    pub walks: f64,
    pub strikeouts: f64,
    pub stolen_bases: f64,
}

impl Default for BatterWeights {
    fn default() -> Self {
        Self {
            runs: 1.0,
            total_bases: 1.0,
            rbi: 1.0,
            walks: 1.0,
            strikeouts: -1.0,
            stolen_bases: 1.0,
        }
    }
}

/// Pitcher coefficients. Negative weights are penalties.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PitcherWeights {
    pub innings_pitched: f64,
    pub strikeouts: f64,
    pub wins: f64,
    pub saves: f64,
    pub holds: f64,
    pub hits_allowed: f64,
    pub earned_runs: f64,
    pub walks: f64,
    pub losses: f64,
}

impl Default for PitcherWeights {
    fn default() -> Self {
        Self {
            innings_pitched: 3.0,
            strikeouts: 1.0,
            wins: 2.0,
            saves: 5.0,
            holds: 2.0,
            hits_allowed: -1.0,
            earned_runs: -2.0,
            walks: -1.0,
            losses: -2.0,
        }
    }
}

// ---------------------------------------------------------------------------
// [source]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Csv,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Directory holding `batting_<season>.csv` / `pitching_<season>.csv`.
    #[serde(default)]
    pub dir: Option<String>,
    /// URL with `{season}` and `{role}` placeholders.
    #[serde(default)]
    pub url_template: Option<String>,
}

// ---------------------------------------------------------------------------
// [schedule]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub enabled: bool,
    pub team: Option<String>,
    pub season: Option<i32>,
    pub base_url: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            team: None,
            season: None,
            base_url: "https://statsapi.mlb.com/api/v1".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// [forecast]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastModel {
    Mean,
    Ridge,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub enabled: bool,
    pub model: ForecastModel,
    pub ridge_lambda: f64,
    pub training_season: Option<i32>,
    pub target_season: Option<i32>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: ForecastModel::Ridge,
            ridge_lambda: 1.0,
            training_season: None,
            target_season: None,
        }
    }
}

// ---------------------------------------------------------------------------
// [export]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: "exports".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Parse and validate configuration from a TOML string.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.filters.normalize();
    validate(&config)?;
    Ok(config)
}

/// Load and validate configuration from `config/dashboard.toml` relative to
/// `base_dir`.
///
/// This does not auto-copy defaults; prefer `load_config()` for that.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    parse_config(&text, &path)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                tracing::info!("copied default config {}", target.display());
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

impl FilterConfig {
    fn normalize(&mut self) {
        for field in [&mut self.team, &mut self.position, &mut self.search] {
            if field.as_deref().is_some_and(|s| s.trim().is_empty()) {
                *field = None;
            }
        }
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let dash = &config.dashboard;
    if dash.batter_limit == 0 {
        return Err(invalid("dashboard.batter_limit", "must be > 0"));
    }
    if dash.pitcher_limit == 0 {
        return Err(invalid("dashboard.pitcher_limit", "must be > 0"));
    }

    let b = &config.weights.batter;
    let p = &config.weights.pitcher;
    let weight_fields: &[(&str, f64)] = &[
        ("weights.batter.runs", b.runs),
        ("weights.batter.total_bases", b.total_bases),
        ("weights.batter.rbi", b.rbi),
        ("weights.batter.walks", b.walks),
        ("weights.batter.strikeouts", b.strikeouts),
        ("weights.batter.stolen_bases", b.stolen_bases),
        ("weights.pitcher.innings_pitched", p.innings_pitched),
        ("weights.pitcher.strikeouts", p.strikeouts),
        ("weights.pitcher.wins", p.wins),
        ("weights.pitcher.saves", p.saves),
        ("weights.pitcher.holds", p.holds),
        ("weights.pitcher.hits_allowed", p.hits_allowed),
        ("weights.pitcher.earned_runs", p.earned_runs),
        ("weights.pitcher.walks", p.walks),
        ("weights.pitcher.losses", p.losses),
    ];
    for (name, val) in weight_fields {
        if !val.is_finite() {
            return Err(invalid(name, format!("must be finite, got {val}")));
        }
    }

    let source = &config.source;
    match source.kind {
        SourceKind::Csv if source.dir.as_deref().map_or(true, str::is_empty) => {
            return Err(invalid("source.dir", "required when source.kind = \"csv\""));
        }
        SourceKind::Http => {
            let Some(template) = source.url_template.as_deref() else {
                return Err(invalid(
                    "source.url_template",
                    "required when source.kind = \"http\"",
                ));
            };
            if !template.contains("{season}") {
                return Err(invalid(
                    "source.url_template",
                    "must contain a {season} placeholder",
                ));
            }
        }
        SourceKind::Csv => {}
    }

    if config.schedule.enabled && config.schedule.team.is_none() {
        return Err(invalid("schedule.team", "required when schedule.enabled = true"));
    }

    let forecast = &config.forecast;
    if !(forecast.ridge_lambda.is_finite() && forecast.ridge_lambda >= 0.0) {
        return Err(invalid(
            "forecast.ridge_lambda",
            format!("must be >= 0, got {}", forecast.ridge_lambda),
        ));
    }
    if forecast.enabled && (forecast.training_season.is_none() || forecast.target_season.is_none())
    {
        return Err(invalid(
            "forecast",
            "training_season and target_season are required when forecast.enabled = true",
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
