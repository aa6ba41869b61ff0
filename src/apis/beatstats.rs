use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;

use crate::app::ports::ChartSitePort;
use crate::constants::{BEATPORT_BASE_URL, BEATSTATS_LIST_GENRE_URL};
use crate::error::Result;
use crate::infra::http_client::FetchClient;
use crate::matching::format_title_case;
use crate::types::{ChartEntry, ChartGenre};

/// Chart-site adapter: one page per genre, 100 ranked labels each.
pub struct BeatstatsClient {
    fetcher: FetchClient,
}

impl BeatstatsClient {
    pub fn new(fetcher: FetchClient) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ChartSitePort for BeatstatsClient {
    async fn top_100(&self, genre: ChartGenre) -> Result<Vec<ChartEntry>> {
        let url = format!("{BEATSTATS_LIST_GENRE_URL}{}", genre.code());
        let html = self.fetcher.get_text(&url).await?;
        let entries = parse_top_100(&html, genre);
        debug!(?genre, count = entries.len(), "chart page parsed");
        Ok(entries)
    }
}

/// Extracts the ranked label list from a chart page. The three selectors
/// walk parallel element sequences; the lists are zipped and truncated to
/// the shortest so a missing element cannot shift later rows.
fn parse_top_100(html: &str, genre: ChartGenre) -> Vec<ChartEntry> {
    let document = Html::parse_document(html);
    let name_sel = Selector::parse("span.labelcharttextname").unwrap();
    let link_sel = Selector::parse("a[href^='/label']").unwrap();
    let position_sel = Selector::parse("div#top10artistchart-number").unwrap();

    let names: Vec<String> = document
        .select(&name_sel)
        .map(|el| format_title_case(el.text().collect::<String>().trim()))
        .collect();
    let links: Vec<String> = document
        .select(&link_sel)
        .filter_map(|el| el.value().attr("href"))
        .map(|href| format!("{BEATPORT_BASE_URL}{href}"))
        .collect();
    let positions: Vec<String> = document
        .select(&position_sel)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .collect();

    names
        .into_iter()
        .zip(links)
        .zip(positions)
        .map(|((name, link), position)| ChartEntry {
            name,
            genre: genre.display_name().to_string(),
            beatport_link: Some(link),
            position,
            is_hype: genre.is_hype(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div id="top10artistchart-number">1</div>
          <a href="/label/drumcode/1234"><span class="labelcharttextname">drumcode</span></a>
          <div id="top10artistchart-number">2</div>
          <a href="/label/afterlife-records/5678"><span class="labelcharttextname">afterlife records</span></a>
        </body></html>
    "#;

    #[test]
    fn parses_names_links_and_positions() {
        let entries = parse_top_100(PAGE, ChartGenre::TechnoPeakTime);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Drumcode");
        assert_eq!(
            entries[0].beatport_link.as_deref(),
            Some("https://www.beatport.com/label/drumcode/1234")
        );
        assert_eq!(entries[0].position, "1");
        assert_eq!(entries[1].name, "Afterlife Records");
        assert!(!entries[0].is_hype);
    }

    #[test]
    fn hype_genre_marks_entries() {
        let entries = parse_top_100(PAGE, ChartGenre::HypeTechnoPeakTime);
        assert!(entries[0].is_hype);
        assert_eq!(entries[0].genre, "Peak Time");
    }

    #[test]
    fn truncates_to_the_shortest_sequence() {
        let page = r#"
            <div id="top10artistchart-number">1</div>
            <a href="/label/drumcode/1234"><span class="labelcharttextname">drumcode</span></a>
            <span class="labelcharttextname">orphan name</span>
        "#;
        let entries = parse_top_100(page, ChartGenre::DeepHouse);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn empty_page_yields_no_entries() {
        assert!(parse_top_100("<html></html>", ChartGenre::DeepHouse).is_empty());
    }
}
