use async_trait::async_trait;
use chrono::{Duration, Local};
use scraper::{Html, Selector};
use std::collections::HashSet;

use crate::app::ports::{MarketplacePort, ReleaseActivity};
use crate::constants::RELEASE_LOOKBACK_DAYS;
use crate::error::{Result, ScraperError};
use crate::infra::http_client::FetchClient;

/// Marketplace adapter: release history over the lookback window, read
/// from the embedded page-state JSON rather than the rendered markup.
pub struct BeatportClient {
    fetcher: FetchClient,
}

impl BeatportClient {
    pub fn new(fetcher: FetchClient) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl MarketplacePort for BeatportClient {
    async fn release_activity(&self, label_url: &str) -> Result<ReleaseActivity> {
        let (start, end) = lookback_range();
        let url = format!(
            "{}/releases?publish_date={start}%3A{end}",
            label_url.trim_end_matches('/')
        );
        let html = self.fetcher.get_text(&url).await?;
        parse_release_activity(&html)
    }
}

fn lookback_range() -> (String, String) {
    let today = Local::now().date_naive();
    let start = today - Duration::days(RELEASE_LOOKBACK_DAYS);
    (
        start.format("%Y-%m-%d").to_string(),
        today.format("%Y-%m-%d").to_string(),
    )
}

const RESULTS_POINTER: &str = "/props/pageProps/dehydratedState/queries/1/state/data/results";

fn parse_release_activity(html: &str) -> Result<ReleaseActivity> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script#__NEXT_DATA__").unwrap();
    let raw = document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .ok_or_else(|| ScraperError::Api {
            message: "release page carries no embedded state".to_string(),
        })?;

    let state: serde_json::Value = serde_json::from_str(&raw)?;
    let results = state
        .pointer(RESULTS_POINTER)
        .and_then(|value| value.as_array())
        .ok_or_else(|| ScraperError::Api {
            message: "release results missing from embedded state".to_string(),
        })?;

    let mut artists: HashSet<String> = HashSet::new();
    for release in results {
        if let Some(names) = release.get("artists").and_then(|a| a.as_array()) {
            for artist in names {
                if let Some(name) = artist.get("name").and_then(|n| n.as_str()) {
                    artists.insert(name.to_string());
                }
            }
        }
    }

    Ok(ReleaseActivity {
        releases_count: results.len(),
        distinct_artist_count: artists.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page_with_results(results: serde_json::Value) -> String {
        let state = json!({
            "props": {"pageProps": {"dehydratedState": {"queries": [
                {},
                {"state": {"data": {"results": results}}}
            ]}}}
        });
        format!(
            "<html><body><script id=\"__NEXT_DATA__\" type=\"application/json\">{state}</script></body></html>"
        )
    }

    #[test]
    fn counts_releases_and_distinct_artists() {
        let page = page_with_results(json!([
            {"artists": [{"name": "Adam Beyer"}, {"name": "Bart Skils"}]},
            {"artists": [{"name": "Adam Beyer"}]},
            {"artists": []}
        ]));
        let activity = parse_release_activity(&page).unwrap();
        assert_eq!(activity.releases_count, 3);
        assert_eq!(activity.distinct_artist_count, 2);
    }

    #[test]
    fn page_without_embedded_state_is_an_api_error() {
        let result = parse_release_activity("<html><body></body></html>");
        assert!(matches!(result, Err(ScraperError::Api { .. })));
    }

    #[test]
    fn lookback_range_spans_a_year() {
        let (start, end) = lookback_range();
        assert!(start < end);
        assert_eq!(start.len(), 10);
        assert_eq!(end.len(), 10);
    }
}
