use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;
use crate::matching::MatchCandidate;
use crate::types::{ChartEntry, ChartGenre, LinkType};

/// Search result from the stats portal, before detail fetch.
#[derive(Debug, Clone)]
pub struct PortalCandidate {
    pub name: String,
    /// Portal-relative route to the label's detail page.
    pub route: String,
}

impl MatchCandidate for PortalCandidate {
    fn match_name(&self) -> &str {
        &self.name
    }
}

/// Scraped from a label's portal detail page.
#[derive(Debug, Clone, Default)]
pub struct PortalDetail {
    pub country: String,
    pub links: HashMap<LinkType, String>,
}

/// Release counts over the marketplace lookback window.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseActivity {
    pub releases_count: usize,
    pub distinct_artist_count: usize,
}

/// Public profile data from the social-audio site.
#[derive(Debug, Clone, Default)]
pub struct SocialProfile {
    pub description: String,
    pub follower_count: Option<u64>,
}

/// One search hit on the merch site.
#[derive(Debug, Clone)]
pub struct MerchHit {
    pub name: String,
    pub link: String,
    pub country: Option<String>,
}

impl MatchCandidate for MerchHit {
    fn match_name(&self) -> &str {
        &self.name
    }
}

/// Top-100 genre charts.
#[async_trait]
pub trait ChartSitePort: Send + Sync {
    async fn top_100(&self, genre: ChartGenre) -> Result<Vec<ChartEntry>>;
}

/// Label search portal with per-label detail pages.
#[async_trait]
pub trait SearchPortalPort: Send + Sync {
    async fn search_candidates(&self, name: &str) -> Result<Vec<PortalCandidate>>;
    async fn fetch_detail(&self, route: &str) -> Result<PortalDetail>;
}

/// Marketplace release history.
#[async_trait]
pub trait MarketplacePort: Send + Sync {
    async fn release_activity(&self, label_url: &str) -> Result<ReleaseActivity>;
}

/// Social-audio profile pages.
#[async_trait]
pub trait SocialAudioPort: Send + Sync {
    /// `None` when the profile exists but exposes no usable data.
    async fn fetch_profile(&self, profile_url: &str) -> Result<Option<SocialProfile>>;
}

/// Merch/store site search.
#[async_trait]
pub trait MerchSitePort: Send + Sync {
    async fn search(&self, name: &str) -> Result<Vec<MerchHit>>;
}
