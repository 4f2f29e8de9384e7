// Statistics tables stored as CSV files in a local directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{parse_records, RecordSource, SourceError};
use crate::stats::{RawStatRecord, Role};

/// Reads `<dir>/batting_<season>.csv` and `<dir>/pitching_<season>.csv`.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    dir: PathBuf,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, season: i32, role: Role) -> PathBuf {
        self.dir
            .join(format!("{}_{season}.csv", role.table_name()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl RecordSource for CsvDirSource {
    async fn fetch(&self, season: i32, role: Role) -> Result<Vec<RawStatRecord>, SourceError> {
        let path = self.path_for(season, role);
        let bytes = tokio::fs::read(&path).await.map_err(|e| SourceError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let records = parse_records(role, season, bytes.as_slice()).map_err(|e| SourceError::Csv {
            origin: path.display().to_string(),
            source: e,
        })?;
        debug!("read {} {role} rows from {}", records.len(), path.display());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TableError;
    use std::fs;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("diamond_csv_dir_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn file_naming() {
        let source = CsvDirSource::new("data/stats");
        assert_eq!(
            source.path_for(2024, Role::Batter),
            PathBuf::from("data/stats/batting_2024.csv")
        );
        assert_eq!(
            source.path_for(2023, Role::Pitcher),
            PathBuf::from("data/stats/pitching_2023.csv")
        );
    }

    #[tokio::test]
    async fn reads_season_file() {
        let dir = scratch("reads");
        fs::write(
            dir.join("batting_2025.csv"),
            "Name,Team,H,2B,3B,HR\nCal Raleigh,SEA,130,20,0,60\n",
        )
        .unwrap();
        let source = CsvDirSource::new(&dir);
        let rows = source.fetch(2025, Role::Batter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name(), "Cal Raleigh");
        assert_eq!(rows[0].season(), 2025);
    }

    #[tokio::test]
    async fn table_without_name_column_is_csv_error() {
        let dir = scratch("no_name");
        fs::write(dir.join("pitching_2024.csv"), "Player,IP\nSomebody,100\n").unwrap();
        let source = CsvDirSource::new(&dir);
        let err = source.fetch(2024, Role::Pitcher).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Csv {
                source: TableError::MissingColumn("Name"),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = scratch("missing");
        let source = CsvDirSource::new(&dir);
        let err = source.fetch(2019, Role::Pitcher).await.unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
