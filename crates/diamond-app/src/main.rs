// Diamond leaderboard entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file so stdout carries only the report)
// 2. Load config
// 3. Build the record source behind the cache
// 4. Per role: build leaderboard, rank, print, export ranked and full CSVs
// 5. Optional forecast report
// 6. Optional schedule difficulty report

mod report;

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Datelike;
use tracing::{error, info, warn};

use diamond_baseball::export::write_csv;
use diamond_baseball::forecast::{forecast_scores, Forecaster, MeanForecaster, RidgeForecaster};
use diamond_baseball::pipeline::load_enriched;
use diamond_baseball::schedule::{schedule_difficulty, MlbStatsApi};
use diamond_baseball::source::{CachedSource, CsvDirSource, HttpSource, RecordSource};
use diamond_baseball::{build_leaderboard, AggregatedRecord, RankQuery, Role, ScoringEngine};
use diamond_core::config::{self, Config, ForecastModel, SourceConfig, SourceKind};

/// Number of forecast rows printed per role.
const FORECAST_ROWS: usize = 20;

type DynSource = CachedSource<Box<dyn RecordSource>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("diamond starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: seasons {:?}, source {:?}",
        config.dashboard.seasons, config.source.kind
    );

    // 3. Build the record source
    let source = build_source(&config.source).context("failed to build record source")?;
    let engine = ScoringEngine::new(config.weights);

    let export_dir = PathBuf::from(&config.export.dir);
    std::fs::create_dir_all(&export_dir)
        .with_context(|| format!("failed to create export dir {}", export_dir.display()))?;

    // 4. Leaderboards
    for role in Role::ALL {
        let board = build_leaderboard(&source, &engine, role, &config.dashboard.seasons).await;
        print!("{}", report::render_header(&board));
        if board.is_empty() {
            print!("{}", report::render_empty(role));
            println!();
            continue;
        }

        let ranked = board.rank(&query_for(&config, role));
        print!("{}", report::render_table(role, &ranked));
        println!();

        let path = export_dir.join(format!("{}_leaderboard.csv", role.table_name()));
        export(role, &ranked, &path)?;
        info!("exported {} {role} rows to {}", ranked.len(), path.display());

        let path = export_dir.join(format!("{}_aggregate.csv", role.table_name()));
        export(role, &board.records, &path)?;
        info!("exported {} aggregated {role} rows to {}", board.records.len(), path.display());
    }

    // 5. Forecast
    if config.forecast.enabled {
        for role in Role::ALL {
            if let Err(e) = run_forecast(&config, &source, &engine, role).await {
                error!("{role} forecast failed: {e:#}");
                println!("{role} forecast unavailable: {e:#}\n");
            }
        }
    }

    // 6. Schedule difficulty
    if config.schedule.enabled {
        run_schedule(&config).await;
    }

    info!("diamond finished");
    Ok(())
}

/// Initialize tracing to log to a file rather than the terminal.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = File::create(log_dir.join("diamond.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("diamond=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

fn build_source(cfg: &SourceConfig) -> anyhow::Result<DynSource> {
    let inner: Box<dyn RecordSource> = match cfg.kind {
        SourceKind::Csv => {
            let dir = cfg.dir.as_deref().context("source.dir is not set")?;
            info!("reading stats from {dir}");
            Box::new(CsvDirSource::new(dir))
        }
        SourceKind::Http => {
            let template = cfg
                .url_template
                .as_deref()
                .context("source.url_template is not set")?;
            info!("fetching stats from {template}");
            Box::new(HttpSource::new(template))
        }
    };
    Ok(CachedSource::new(inner))
}

/// Rank query from the `[filters]` table and the role's row limit.
fn query_for(config: &Config, role: Role) -> RankQuery {
    let limit = match role {
        Role::Batter => config.dashboard.batter_limit,
        Role::Pitcher => config.dashboard.pitcher_limit,
    };
    let filters = &config.filters;
    let mut query = RankQuery::new().limit(limit);
    if let Some(team) = &filters.team {
        query = query.team(team.as_str());
    }
    if let Some(position) = &filters.position {
        query = query.position(position.as_str());
    }
    if let Some(search) = &filters.search {
        query = query.search(search.as_str());
    }
    query
}

fn export<'a, I>(role: Role, rows: I, path: &Path) -> anyhow::Result<()>
where
    I: IntoIterator<Item = &'a AggregatedRecord>,
{
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(role, rows, file).with_context(|| format!("failed to write {}", path.display()))
}

async fn run_forecast(
    config: &Config,
    source: &DynSource,
    engine: &ScoringEngine,
    role: Role,
) -> anyhow::Result<()> {
    let fc = &config.forecast;
    let (Some(training_season), Some(target_season)) = (fc.training_season, fc.target_season)
    else {
        anyhow::bail!("forecast seasons are not configured");
    };

    let training = load_enriched(source, training_season, role)
        .await
        .with_context(|| format!("failed to load {role} training season {training_season}"))?;
    let current = load_enriched(source, target_season, role)
        .await
        .with_context(|| format!("failed to load {role} target season {target_season}"))?;
    if current.is_empty() {
        warn!("no {role} rows for {target_season}; skipping forecast");
        return Ok(());
    }

    let mut model: Box<dyn Forecaster> = match fc.model {
        ForecastModel::Mean => Box::new(MeanForecaster::new()),
        ForecastModel::Ridge => Box::new(RidgeForecaster::new(fc.ridge_lambda)),
    };
    let predictions = forecast_scores(model.as_mut(), engine, &training, &current)?;
    print!("{}", report::render_forecast(role, &predictions, FORECAST_ROWS));
    println!();
    Ok(())
}

async fn run_schedule(config: &Config) {
    let sched = &config.schedule;
    let Some(team) = sched.team.as_deref() else {
        warn!("schedule enabled without a team");
        return;
    };
    let season = sched
        .season
        .or_else(|| config.dashboard.seasons.iter().copied().max())
        .unwrap_or_else(|| chrono::Local::now().year());

    let api = MlbStatsApi::new(sched.base_url.as_str());
    match schedule_difficulty(&api, team, season).await {
        Ok(games) => print!("{}", report::render_schedule(team, &games)),
        Err(e) => {
            error!("schedule lookup for {team} failed: {e}");
            println!("Schedule unavailable for {team}: {e}");
        }
    }
}
