use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Closed set of external link kinds tracked per label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkType {
    Beatport,
    Soundcloud,
    Facebook,
    Instagram,
    Bandcamp,
}

impl LinkType {
    /// Domain fragment used to recognize this link kind in scraped anchors.
    pub fn domain(&self) -> &'static str {
        match self {
            LinkType::Beatport => "beatport.com",
            LinkType::Soundcloud => "soundcloud.com",
            LinkType::Facebook => "facebook.com",
            LinkType::Instagram => "instagram.com",
            LinkType::Bandcamp => "bandcamp.com",
        }
    }

    pub fn all() -> [LinkType; 5] {
        [
            LinkType::Beatport,
            LinkType::Soundcloud,
            LinkType::Facebook,
            LinkType::Instagram,
            LinkType::Bandcamp,
        ]
    }
}

/// Chart-site genre codes for the top-100 ranking lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartGenre {
    TechnoPeakTime,
    TechnoRawDeepHypnotic,
    TranceRawDeepHypnotic,
    ProgressiveHouse,
    MelodicHouseTechno,
    HypeTechnoPeakTime,
    HypeMelodicHouseTechno,
    DeepHouse,
}

impl ChartGenre {
    /// Numeric genre code used by the chart site's list endpoint.
    pub fn code(&self) -> &'static str {
        match self {
            ChartGenre::TechnoPeakTime => "6",
            ChartGenre::TechnoRawDeepHypnotic => "92",
            ChartGenre::TranceRawDeepHypnotic => "99",
            ChartGenre::ProgressiveHouse => "15",
            ChartGenre::MelodicHouseTechno => "90",
            ChartGenre::HypeTechnoPeakTime => "1006",
            ChartGenre::HypeMelodicHouseTechno => "1090",
            ChartGenre::DeepHouse => "12",
        }
    }

    /// Hype lists rank by current trend rather than all-time standing.
    pub fn is_hype(&self) -> bool {
        matches!(
            self,
            ChartGenre::HypeTechnoPeakTime | ChartGenre::HypeMelodicHouseTechno
        )
    }

    /// Display genre written to the sheet's genre column.
    pub fn display_name(&self) -> &'static str {
        match self {
            ChartGenre::TechnoPeakTime | ChartGenre::HypeTechnoPeakTime => "Peak Time",
            ChartGenre::TechnoRawDeepHypnotic => "Techno",
            ChartGenre::TranceRawDeepHypnotic => "Trance",
            ChartGenre::ProgressiveHouse => "Progressive",
            ChartGenre::MelodicHouseTechno | ChartGenre::HypeMelodicHouseTechno => "Melodic",
            ChartGenre::DeepHouse => "Deep House",
        }
    }

    pub fn all() -> [ChartGenre; 8] {
        [
            ChartGenre::TechnoPeakTime,
            ChartGenre::TechnoRawDeepHypnotic,
            ChartGenre::TranceRawDeepHypnotic,
            ChartGenre::ProgressiveHouse,
            ChartGenre::MelodicHouseTechno,
            ChartGenre::HypeTechnoPeakTime,
            ChartGenre::HypeMelodicHouseTechno,
            ChartGenre::DeepHouse,
        ]
    }
}

/// Which enrichment pass to run over the Labels sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAction {
    Songstats,
    Links,
    Vinyls,
}

/// One label as accumulated across adapters and reconciliation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelRecord {
    /// 1-based sheet row; `None` until the reconciler places a new label.
    pub row: Option<u32>,
    pub name: String,
    pub genre: Option<String>,
    pub links: HashMap<LinkType, String>,
    pub position: Option<String>,
    pub is_hype: bool,
    pub country: Option<String>,
    pub actif: Option<bool>,
    pub ouvert_nouveaux: Option<bool>,
    pub email_demo: Option<String>,
    pub followers_count: Option<u64>,
}

impl LabelRecord {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Field-wise merge of a partial update; fields set on `other` win.
    pub fn merge(&mut self, other: LabelRecord) {
        if other.row.is_some() {
            self.row = other.row;
        }
        if !other.name.is_empty() {
            self.name = other.name;
        }
        if other.genre.is_some() {
            self.genre = other.genre;
        }
        self.links.extend(other.links);
        if other.position.is_some() {
            self.position = other.position;
        }
        self.is_hype |= other.is_hype;
        if other.country.is_some() {
            self.country = other.country;
        }
        if other.actif.is_some() {
            self.actif = other.actif;
        }
        if other.ouvert_nouveaux.is_some() {
            self.ouvert_nouveaux = other.ouvert_nouveaux;
        }
        if other.email_demo.is_some() {
            self.email_demo = other.email_demo;
        }
        if other.followers_count.is_some() {
            self.followers_count = other.followers_count;
        }
    }
}

/// One entry of a scraped top-100 genre list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartEntry {
    pub name: String,
    pub genre: String,
    pub beatport_link: Option<String>,
    pub position: String,
    pub is_hype: bool,
}

/// Terminal outcome of one unit of work. Appended once to the shared
/// collections, never mutated afterwards.
#[derive(Debug, Clone)]
pub enum ProcessingOutcome {
    Success { label: LabelRecord },
    Failure { name: String, reason: String },
}
