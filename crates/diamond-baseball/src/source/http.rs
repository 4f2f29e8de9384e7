// Statistics tables fetched as CSV over HTTP.

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use tracing::{debug, info};

use super::{parse_records, RecordSource, SourceError};
use crate::stats::{RawStatRecord, Role};

/// GETs a CSV table from a URL template. `{season}` is replaced with the
/// year and `{role}` with `batting` or `pitching`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    http: reqwest::Client,
    url_template: String,
}

impl HttpSource {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url_template)
    }

    pub fn with_client(http: reqwest::Client, url_template: impl Into<String>) -> Self {
        Self {
            http,
            url_template: url_template.into(),
        }
    }

    pub fn url_for(&self, season: i32, role: Role) -> String {
        self.url_template
            .replace("{season}", &season.to_string())
            .replace("{role}", role.table_name())
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn fetch(&self, season: i32, role: Role) -> Result<Vec<RawStatRecord>, SourceError> {
        let url = self.url_for(season, role);
        info!("fetching {role} stats for {season} from {url}");

        let resp = self
            .http
            .get(&url)
            .header(USER_AGENT, "diamond-leaderboards")
            .send()
            .await
            .map_err(|e| SourceError::Http {
                url: url.clone(),
                source: e,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await.map_err(|e| SourceError::Http {
            url: url.clone(),
            source: e,
        })?;

        let records = parse_records(role, season, body.as_ref()).map_err(|e| SourceError::Csv {
            origin: url.clone(),
            source: e,
        })?;
        debug!("parsed {} {role} rows from {url}", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_template_substitution() {
        let source = HttpSource::new("https://stats.example.com/{role}/{season}.csv?qual=0");
        assert_eq!(
            source.url_for(2024, Role::Batter),
            "https://stats.example.com/batting/2024.csv?qual=0"
        );
        assert_eq!(
            source.url_for(2023, Role::Pitcher),
            "https://stats.example.com/pitching/2023.csv?qual=0"
        );
    }

    #[test]
    fn template_without_role_placeholder() {
        let source = HttpSource::new("https://stats.example.com/all_{season}.csv");
        assert_eq!(
            source.url_for(2025, Role::Pitcher),
            "https://stats.example.com/all_2025.csv"
        );
    }
}
