use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::app::ports::{MerchHit, MerchSitePort};
use crate::constants::BANDCAMP_URL;
use crate::country::normalize_country;
use crate::error::Result;
use crate::infra::http_client::FetchClient;

/// Merch-site adapter: label search restricted to electronic acts, used
/// to backfill store links and countries.
pub struct BandcampClient {
    fetcher: FetchClient,
}

impl BandcampClient {
    pub fn new(fetcher: FetchClient) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl MerchSitePort for BandcampClient {
    async fn search(&self, name: &str) -> Result<Vec<MerchHit>> {
        let query = name.split_whitespace().collect::<Vec<_>>().join("+");
        let url = format!("{BANDCAMP_URL}/search?q={query}&item_type=b");
        let html = self.fetcher.get_text(&url).await?;
        Ok(parse_search_results(&html))
    }
}

fn text_of(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    root.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn parse_search_results(html: &str) -> Vec<MerchHit> {
    let document = Html::parse_document(html);
    let result_sel = Selector::parse(".result-info").unwrap();
    let name_sel = Selector::parse(".heading a").unwrap();
    let url_sel = Selector::parse(".itemurl a").unwrap();
    let genre_sel = Selector::parse(".genre").unwrap();
    let subhead_sel = Selector::parse(".subhead").unwrap();

    let mut hits = Vec::new();
    for result in document.select(&result_sel) {
        // The search is not genre-filtered server side.
        let genre = text_of(result, &genre_sel).unwrap_or_default();
        if !genre.to_lowercase().contains("electronic") {
            continue;
        }

        let Some(name) = text_of(result, &name_sel) else {
            continue;
        };
        let Some(raw_link) = text_of(result, &url_sel) else {
            continue;
        };

        hits.push(MerchHit {
            name,
            link: strip_query(&raw_link),
            country: text_of(result, &subhead_sel)
                .as_deref()
                .and_then(normalize_country),
        });
    }
    hits
}

/// Search result URLs carry tracking parameters; keep scheme and host only
/// when the link is a plain store root, otherwise drop the query string.
fn strip_query(link: &str) -> String {
    link.split('?').next().unwrap_or(link).to_string()
}
