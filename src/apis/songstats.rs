use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashMap;

use crate::app::ports::{PortalCandidate, PortalDetail, SearchPortalPort};
use crate::constants::{SONGSTATS_SEARCH_URL, SONGSTATS_URL};
use crate::error::Result;
use crate::infra::http_client::FetchClient;
use crate::types::LinkType;

/// Stats-portal adapter: JSON search endpoint plus an HTML detail page
/// carrying the label's external links and country.
pub struct SongstatsClient {
    fetcher: FetchClient,
}

impl SongstatsClient {
    pub fn new(fetcher: FetchClient) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl SearchPortalPort for SongstatsClient {
    async fn search_candidates(&self, name: &str) -> Result<Vec<PortalCandidate>> {
        let query: String = url_encode(name);
        let body = self
            .fetcher
            .get_json(&format!("{SONGSTATS_SEARCH_URL}{query}"))
            .await?;
        Ok(parse_candidates(&body))
    }

    async fn fetch_detail(&self, route: &str) -> Result<PortalDetail> {
        let html = self
            .fetcher
            .get_text(&format!("{SONGSTATS_URL}{route}"))
            .await?;
        Ok(parse_detail(&html))
    }
}

fn url_encode(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("%20")
}

/// Search results filtered down to label entries.
fn parse_candidates(body: &serde_json::Value) -> Vec<PortalCandidate> {
    body.get("results")
        .and_then(|results| results.as_array())
        .map(|items| {
            items
                .iter()
                .filter(|item| item.get("type").and_then(|t| t.as_str()) == Some("label"))
                .filter_map(|item| {
                    let name = item.get("name")?.as_str()?.to_string();
                    let route = item
                        .pointer("/routeInfo/url")?
                        .as_str()?
                        .to_string();
                    Some(PortalCandidate { name, route })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Pulls the four external links and the location string off a label's
/// detail page. Links are recognized by domain fragment; the first anchor
/// per domain wins.
fn parse_detail(html: &str) -> PortalDetail {
    let document = Html::parse_document(html);
    let mut links: HashMap<LinkType, String> = HashMap::new();

    for kind in [
        LinkType::Beatport,
        LinkType::Soundcloud,
        LinkType::Facebook,
        LinkType::Instagram,
    ] {
        let selector = Selector::parse(&format!("a[href*='{}']", kind.domain())).unwrap();
        if let Some(href) = document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .next()
        {
            links.insert(kind, href.to_string());
        }
    }

    let country_sel =
        Selector::parse("div[style*='flex-direction: column'] > div:last-child > span").unwrap();
    let country = document
        .select(&country_sel)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .find(|text| !text.is_empty())
        .unwrap_or_default();

    PortalDetail { country, links }
}
