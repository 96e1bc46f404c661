//! Refresh pipeline: fetch, extract, clean, store.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use super::cleaner::{clean_and_filter, RowFailure};
use super::fetcher::{fetch_page, FetchError};
use super::parsers::ReleaseTableParser;
use super::source_url;
use crate::config::ScraperConfig;
use crate::storage::repository::StoreFailure;
use crate::storage::SharedRepository;

/// Outcome of one refresh run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshSummary {
    pub source_url: String,
    pub scraped_rows: usize,
    pub kept_rows: usize,
    pub inserted: usize,
    pub already_present: usize,
    pub excluded: usize,
    pub row_failures: Vec<RowFailure>,
    pub store_failures: Vec<StoreFailure>,
}

/// Run the pipeline once for the year containing `today`.
///
/// A fetch failure aborts the run before the store is touched. Rows that
/// cannot be dated or stored are reported in the summary.
pub async fn refresh(
    client: &reqwest::Client,
    repo: &SharedRepository,
    config: &ScraperConfig,
    today: NaiveDate,
) -> Result<RefreshSummary, FetchError> {
    let url = source_url(&config.source_url, today.year());
    info!(url = %url, "Refreshing releases");

    let html = fetch_page(client, &url).await?;
    let rows = ReleaseTableParser::parse(&html);
    let cleaned = clean_and_filter(&rows, today, config.window_weeks);

    for failure in &cleaned.failures {
        warn!(title = %failure.title, error = %failure.error, "Skipping undatable row");
    }

    let stored = repo.lock().await.store_releases(&cleaned.releases);

    let summary = RefreshSummary {
        source_url: url,
        scraped_rows: rows.len(),
        kept_rows: cleaned.releases.len(),
        inserted: stored.inserted,
        already_present: stored.already_present,
        excluded: stored.excluded,
        row_failures: cleaned.failures,
        store_failures: stored.failures,
    };

    info!(
        scraped = summary.scraped_rows,
        kept = summary.kept_rows,
        inserted = summary.inserted,
        already_present = summary.already_present,
        excluded = summary.excluded,
        row_failures = summary.row_failures.len(),
        store_failures = summary.store_failures.len(),
        "Refresh complete"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::fetcher::build_client;
    use crate::storage::ReleaseRepository;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><body>
<table class="wikitable">
  <tr><th>Month</th><th>Day</th><th>Title</th><th>Platform(s)</th><th>Genre(s)</th></tr>
  <tr><th rowspan="4">MAY</th><td rowspan="2">10</td><td>Half-Life 3</td><td>Win</td><td>FPS</td></tr>
  <tr><td>Mass Effect 5[a]</td><td>PS5, XSX</td><td>RPG</td></tr>
  <tr><td>TBA</td><td>Someday</td><td>NS</td><td>Action</td></tr>
  <tr><td>32</td><td>Broken Date</td><td>NS</td><td>Puzzle</td></tr>
</table>
</body></html>"#;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    async fn setup() -> (MockServer, ScraperConfig, SharedRepository) {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wiki/2024_in_video_games"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&mock_server)
            .await;

        let config = ScraperConfig {
            source_url: format!("{}/wiki/{{year}}_in_video_games", mock_server.uri()),
            ..ScraperConfig::default()
        };
        let repo = Arc::new(Mutex::new(ReleaseRepository::in_memory().unwrap()));
        (mock_server, config, repo)
    }

    #[tokio::test]
    async fn test_refresh_stores_cleaned_rows() {
        let (_server, config, repo) = setup().await;
        let client = build_client(5, "test").unwrap();

        let summary = refresh(&client, &repo, &config, today()).await.unwrap();

        assert_eq!(summary.scraped_rows, 4);
        assert_eq!(summary.kept_rows, 2);
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.row_failures.len(), 1);
        assert_eq!(summary.row_failures[0].title, "Broken Date");

        let titles: Vec<String> = repo
            .lock()
            .await
            .list_releases("")
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert!(titles.contains(&"Mass Effect 5".to_string()));
        assert!(titles.contains(&"Half-Life 3".to_string()));
    }

    #[tokio::test]
    async fn test_refresh_twice_is_idempotent() {
        let (_server, config, repo) = setup().await;
        let client = build_client(5, "test").unwrap();

        refresh(&client, &repo, &config, today()).await.unwrap();
        let second = refresh(&client, &repo, &config, today()).await.unwrap();

        assert_eq!(second.inserted, 0);
        assert_eq!(second.already_present, 2);
        assert_eq!(repo.lock().await.get_release_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_deleted_title_not_reimported() {
        let (_server, config, repo) = setup().await;
        let client = build_client(5, "test").unwrap();

        refresh(&client, &repo, &config, today()).await.unwrap();
        {
            let repo = repo.lock().await;
            let id = repo
                .list_releases("")
                .unwrap()
                .into_iter()
                .find(|r| r.title == "Half-Life 3")
                .unwrap()
                .id;
            repo.delete_release(id).unwrap();
        }

        let summary = refresh(&client, &repo, &config, today()).await.unwrap();
        assert_eq!(summary.excluded, 1);
        assert_eq!(summary.inserted, 0);

        let repo = repo.lock().await;
        assert!(repo
            .list_releases("")
            .unwrap()
            .iter()
            .all(|r| r.title != "Half-Life 3"));
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_store_untouched() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let config = ScraperConfig {
            source_url: format!("{}/wiki/{{year}}", mock_server.uri()),
            ..ScraperConfig::default()
        };
        let repo = Arc::new(Mutex::new(ReleaseRepository::in_memory().unwrap()));
        let client = build_client(5, "test").unwrap();

        let result = refresh(&client, &repo, &config, today()).await;
        assert!(matches!(result, Err(FetchError::HttpStatus(503))));
        assert_eq!(repo.lock().await.get_release_count().unwrap(), 0);
    }
}
