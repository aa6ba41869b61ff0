use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::app::ports::{SocialAudioPort, SocialProfile};
use crate::error::Result;
use crate::infra::http_client::FetchClient;

// Hydration payload embedded in every profile page.
static HYDRATION_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"window\.__sc_hydration\s*=\s*(\[[\s\S]*?\]);").unwrap());

/// Social-audio adapter: profile description and follower count from the
/// page's hydration blob.
pub struct SoundcloudClient {
    fetcher: FetchClient,
}

impl SoundcloudClient {
    pub fn new(fetcher: FetchClient) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl SocialAudioPort for SoundcloudClient {
    async fn fetch_profile(&self, profile_url: &str) -> Result<Option<SocialProfile>> {
        let html = self.fetcher.get_text(profile_url).await?;
        let profile = parse_profile(&html)?;
        if profile.is_none() {
            debug!(profile_url, "no user entry in hydration payload");
        }
        Ok(profile)
    }
}

fn parse_profile(html: &str) -> Result<Option<SocialProfile>> {
    let Some(caps) = HYDRATION_JSON.captures(html) else {
        return Ok(None);
    };
    let entries: serde_json::Value = serde_json::from_str(&caps[1])?;

    let user = entries
        .as_array()
        .into_iter()
        .flatten()
        .find(|entry| entry.get("hydratable").and_then(|h| h.as_str()) == Some("user"));

    Ok(user.map(|entry| {
        let data = entry.get("data");
        SocialProfile {
            description: data
                .and_then(|d| d.get("description"))
                .and_then(|d| d.as_str())
                .unwrap_or_default()
                .to_string(),
            follower_count: data
                .and_then(|d| d.get("followers_count"))
                .and_then(|f| f.as_u64()),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_description_and_followers() {
        let html = r#"
            <script>
              window.__sc_hydration = [
                {"hydratable":"anonymousId","data":"x"},
                {"hydratable":"user","data":{"description":"Send demos to demos@drumcode.se","followers_count":125000}}
              ];
            </script>
        "#;
        let profile = parse_profile(html).unwrap().unwrap();
        assert_eq!(profile.description, "Send demos to demos@drumcode.se");
        assert_eq!(profile.follower_count, Some(125_000));
    }

    #[test]
    fn page_without_hydration_yields_none() {
        assert!(parse_profile("<html></html>").unwrap().is_none());
    }

    #[test]
    fn hydration_without_user_entry_yields_none() {
        let html = r#"<script>window.__sc_hydration = [{"hydratable":"anonymousId","data":"x"}];</script>"#;
        assert!(parse_profile(html).unwrap().is_none());
    }

    #[test]
    fn user_without_description_gets_empty_string() {
        let html = r#"<script>window.__sc_hydration = [{"hydratable":"user","data":{"followers_count":10}}];</script>"#;
        let profile = parse_profile(html).unwrap().unwrap();
        assert!(profile.description.is_empty());
        assert_eq!(profile.follower_count, Some(10));
    }
}
