use anyhow::bail;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::app::ports::{MarketplacePort, MerchSitePort, SearchPortalPort, SocialAudioPort};
use crate::constants::{
    ACTIF_MIN_RELEASES, LABELS_SHEET, MATCH_THRESHOLD_DEFAULT, MATCH_THRESHOLD_MERCH,
    OPEN_MIN_ARTISTS, OUI,
};
use crate::country::normalize_country;
use crate::error::Result;
use crate::infra::sheets::SheetsGateway;
use crate::matching::{find_best_match, find_demo_email};
use crate::pipeline::batch;
use crate::pipeline::orchestrator::{OutcomeCollector, WorkerPool};
use crate::report::RunReport;
use crate::types::{LabelAction, LabelRecord, LinkType};

/// One sheet row selected for an enrichment pass.
#[derive(Debug, Clone)]
pub struct SheetUnit {
    pub row: u32,
    pub name: String,
    pub links: HashMap<LinkType, String>,
}

/// Runs the per-label enrichment workflows: select rows from the sheet,
/// fan work out over the pool, then persist the collected updates in one
/// chunked batch.
pub struct LabelUseCase {
    gateway: Arc<SheetsGateway>,
    portal: Arc<dyn SearchPortalPort>,
    marketplace: Arc<dyn MarketplacePort>,
    social_audio: Arc<dyn SocialAudioPort>,
    merch: Arc<dyn MerchSitePort>,
    pool: WorkerPool,
}

impl LabelUseCase {
    pub fn new(
        gateway: Arc<SheetsGateway>,
        portal: Arc<dyn SearchPortalPort>,
        marketplace: Arc<dyn MarketplacePort>,
        social_audio: Arc<dyn SocialAudioPort>,
        merch: Arc<dyn MerchSitePort>,
        pool: WorkerPool,
    ) -> Self {
        Self {
            gateway,
            portal,
            marketplace,
            social_audio,
            merch,
            pool,
        }
    }

    pub async fn run(&self, action: LabelAction) -> Result<RunReport> {
        let units = self.load_units(action).await?;
        let total = units.len();
        info!(total, ?action, "labels selected for processing");
        if units.is_empty() {
            return Ok(RunReport::empty());
        }

        let collector = OutcomeCollector::new();
        match action {
            LabelAction::Songstats => self.run_songstats(units, collector.clone()).await,
            LabelAction::Links => self.run_links(units, collector.clone()).await,
            LabelAction::Vinyls => self.run_vinyls(units, collector.clone()).await,
        }

        let (successes, failures) = collector.finish().await;

        let ops = match action {
            LabelAction::Songstats => batch::songstats_updates(&successes),
            LabelAction::Links => batch::links_updates(&successes),
            LabelAction::Vinyls => batch::vinyls_updates(&successes),
        };
        if !ops.is_empty() {
            let cells = self.gateway.persist(&ops).await?;
            info!(cells, "label updates persisted");
        }

        Ok(RunReport::new(total, successes, failures))
    }

    /// Row selection per pass. Songstats takes unflagged named rows,
    /// links takes rows with at least one known link, vinyls takes rows
    /// still missing a merch link.
    async fn load_units(&self, action: LabelAction) -> Result<Vec<SheetUnit>> {
        let ranges = |columns: &[char]| -> Vec<String> {
            columns
                .iter()
                .map(|c| format!("{LABELS_SHEET}!{c}2:{c}"))
                .collect()
        };

        let units = match action {
            LabelAction::Songstats => {
                let rows = self.gateway.read_columns(&ranges(&['A', 'U'])).await?;
                rows.into_iter()
                    .filter(|r| !r.cell(0).is_empty() && r.cell(1) != OUI)
                    .map(|r| SheetUnit {
                        row: r.row,
                        name: r.cell(0).to_string(),
                        links: HashMap::new(),
                    })
                    .collect()
            }
            LabelAction::Links => {
                let rows = self
                    .gateway
                    .read_columns(&ranges(&['A', 'R', 'O', 'P', 'Q']))
                    .await?;
                let columns = [
                    (1, LinkType::Beatport),
                    (2, LinkType::Soundcloud),
                    (3, LinkType::Facebook),
                    (4, LinkType::Instagram),
                ];
                rows.into_iter()
                    .filter(|r| !r.cell(0).is_empty())
                    .filter_map(|r| {
                        let links: HashMap<LinkType, String> = columns
                            .iter()
                            .filter(|(idx, _)| !r.cell(*idx).is_empty())
                            .map(|(idx, kind)| (*kind, r.cell(*idx).to_string()))
                            .collect();
                        if links.is_empty() {
                            return None;
                        }
                        Some(SheetUnit {
                            row: r.row,
                            name: r.cell(0).to_string(),
                            links,
                        })
                    })
                    .collect()
            }
            LabelAction::Vinyls => {
                let rows = self.gateway.read_columns(&ranges(&['A', 'S'])).await?;
                rows.into_iter()
                    .filter(|r| !r.cell(0).is_empty() && r.cell(1).is_empty())
                    .map(|r| SheetUnit {
                        row: r.row,
                        name: r.cell(0).to_string(),
                        links: HashMap::new(),
                    })
                    .collect()
            }
        };
        Ok(units)
    }

    async fn run_songstats(&self, units: Vec<SheetUnit>, collector: OutcomeCollector) {
        let portal = self.portal.clone();
        let worker_collector = collector.clone();
        self.pool
            .run_collected(
                units,
                collector,
                |unit| unit.name.clone(),
                move |unit: SheetUnit| {
                    let portal = portal.clone();
                    let collector = worker_collector.clone();
                    async move {
                        let candidates = portal.search_candidates(&unit.name).await?;
                        if candidates.is_empty() {
                            bail!("No matching labels found");
                        }
                        let Some(best) =
                            find_best_match(&unit.name, &candidates, MATCH_THRESHOLD_DEFAULT)
                        else {
                            bail!("No best match found");
                        };

                        let detail = portal.fetch_detail(&best.route).await?;
                        if detail.links.is_empty() {
                            bail!("No links found on portal page");
                        }

                        let mut partial = LabelRecord::default();
                        if !detail.country.is_empty() {
                            partial.country = normalize_country(&detail.country)
                                .or(Some(detail.country.clone()));
                        }
                        partial.links = detail.links;

                        collector.record_partial(unit.row, partial).await;
                        collector.promote(unit.row).await;
                        Ok(())
                    }
                },
            )
            .await;
    }

    async fn run_links(&self, units: Vec<SheetUnit>, collector: OutcomeCollector) {
        let marketplace = self.marketplace.clone();
        let social_audio = self.social_audio.clone();
        let worker_collector = collector.clone();
        self.pool
            .run_collected(
                units,
                collector,
                |unit| unit.name.clone(),
                move |unit: SheetUnit| {
                    let marketplace = marketplace.clone();
                    let social_audio = social_audio.clone();
                    let collector = worker_collector.clone();
                    async move {
                        let mut enriched = false;

                        if let Some(link) = unit.links.get(&LinkType::Beatport) {
                            let activity = marketplace.release_activity(link).await?;
                            let mut partial = LabelRecord::default();
                            partial.actif = Some(activity.releases_count > ACTIF_MIN_RELEASES);
                            partial.ouvert_nouveaux =
                                Some(activity.distinct_artist_count > OPEN_MIN_ARTISTS);
                            collector.record_partial(unit.row, partial).await;
                            enriched = true;
                        }

                        if let Some(link) = unit.links.get(&LinkType::Soundcloud) {
                            if let Some(profile) = social_audio.fetch_profile(link).await? {
                                let mut partial = LabelRecord::default();
                                partial.email_demo = find_demo_email(&profile.description);
                                partial.followers_count = profile.follower_count;
                                collector.record_partial(unit.row, partial).await;
                                enriched = true;
                            }
                        }

                        // Every unit must land in exactly one collection.
                        if !enriched {
                            bail!("No link info found");
                        }

                        collector.promote(unit.row).await;
                        Ok(())
                    }
                },
            )
            .await;
    }

    async fn run_vinyls(&self, units: Vec<SheetUnit>, collector: OutcomeCollector) {
        let merch = self.merch.clone();
        let worker_collector = collector.clone();
        self.pool
            .run_collected(
                units,
                collector,
                |unit| unit.name.clone(),
                move |unit: SheetUnit| {
                    let merch = merch.clone();
                    let collector = worker_collector.clone();
                    async move {
                        let hits = merch.search(&unit.name).await?;
                        if hits.is_empty() {
                            bail!("No matching labels found");
                        }
                        let Some(best) = find_best_match(&unit.name, &hits, MATCH_THRESHOLD_MERCH)
                        else {
                            bail!("No best match found");
                        };

                        let mut partial = LabelRecord::default();
                        partial
                            .links
                            .insert(LinkType::Bandcamp, best.link.clone());
                        partial.country = best.country.clone();

                        collector.record_partial(unit.row, partial).await;
                        collector.promote(unit.row).await;
                        Ok(())
                    }
                },
            )
            .await;
    }
}
