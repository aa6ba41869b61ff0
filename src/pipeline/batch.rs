use tracing::warn;

use crate::constants::{LABELS_SHEET, NON, OUI};
use crate::infra::sheets::BatchUpdateOp;
use crate::pipeline::reconcile::{ReconciledLabel, WriteKind};
use crate::types::{LabelRecord, LinkType};

/// Fixed column layout of the Labels sheet.
///
/// A=name, B=country, C=genre, D=actif, E=open to newcomers, F=demo email,
/// N=followers, O=soundcloud, P=facebook, Q=instagram, R=beatport,
/// S=bandcamp, T=rank, U=songstats flag, V=beatstats flag.
fn cell(column: char, row: u32) -> String {
    format!("{LABELS_SHEET}!{column}{row}")
}

fn yes_no(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => OUI,
        _ => NON,
    }
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Rows without a sheet row cannot be addressed; skip them and keep going.
fn rows_of(labels: &[LabelRecord]) -> impl Iterator<Item = (u32, &LabelRecord)> {
    labels.iter().filter_map(|label| match label.row {
        Some(row) => Some((row, label)),
        None => {
            warn!(name = %label.name, "skipping record without a sheet row");
            None
        }
    })
}

fn link_or_empty(label: &LabelRecord, kind: LinkType) -> String {
    label.links.get(&kind).cloned().unwrap_or_default()
}

/// Writes for the search-portal enrichment pass: country, social and
/// marketplace links, plus the processed flag. Absent values are written
/// as empty strings so stale cells from earlier runs get cleared.
pub fn songstats_updates(labels: &[LabelRecord]) -> Vec<BatchUpdateOp> {
    let mut ops = Vec::new();
    for (row, label) in rows_of(labels) {
        ops.push(BatchUpdateOp::cell(cell('B', row), opt(&label.country)));
        ops.push(BatchUpdateOp::cell(
            cell('O', row),
            link_or_empty(label, LinkType::Soundcloud),
        ));
        ops.push(BatchUpdateOp::cell(
            cell('P', row),
            link_or_empty(label, LinkType::Facebook),
        ));
        ops.push(BatchUpdateOp::cell(
            cell('Q', row),
            link_or_empty(label, LinkType::Instagram),
        ));
        ops.push(BatchUpdateOp::cell(
            cell('R', row),
            link_or_empty(label, LinkType::Beatport),
        ));
        ops.push(BatchUpdateOp::cell(cell('U', row), OUI));
    }
    ops
}

/// Writes for the link-profile pass: activity flags, demo email and
/// follower count. Unknown flags default to "Non" and absent values are
/// written as empty strings.
pub fn links_updates(labels: &[LabelRecord]) -> Vec<BatchUpdateOp> {
    let mut ops = Vec::new();
    for (row, label) in rows_of(labels) {
        ops.push(BatchUpdateOp::cell(cell('D', row), yes_no(label.actif)));
        ops.push(BatchUpdateOp::cell(
            cell('E', row),
            yes_no(label.ouvert_nouveaux),
        ));
        ops.push(BatchUpdateOp::cell(cell('F', row), opt(&label.email_demo)));
        ops.push(BatchUpdateOp::cell(
            cell('N', row),
            label
                .followers_count
                .map(|count| count.to_string())
                .unwrap_or_default(),
        ));
    }
    ops
}

/// Writes for the merch-site pass: country and merch-store link.
pub fn vinyls_updates(labels: &[LabelRecord]) -> Vec<BatchUpdateOp> {
    let mut ops = Vec::new();
    for (row, label) in rows_of(labels) {
        if let Some(country) = &label.country {
            ops.push(BatchUpdateOp::cell(cell('B', row), country.clone()));
        }
        if let Some(link) = label.links.get(&LinkType::Bandcamp) {
            ops.push(BatchUpdateOp::cell(cell('S', row), link.clone()));
        }
    }
    ops
}

/// Writes for reconciled chart labels. New rows also get their name and
/// marketplace link; every emitted row gets genre, rank and the flag.
pub fn beatstats_updates(labels: &[ReconciledLabel]) -> Vec<BatchUpdateOp> {
    let mut ops = Vec::new();
    for label in labels {
        if label.kind == WriteKind::Full {
            ops.push(BatchUpdateOp::cell(cell('A', label.row), label.name.clone()));
            if let Some(link) = &label.beatport_link {
                ops.push(BatchUpdateOp::cell(cell('R', label.row), link.clone()));
            }
        }
        ops.push(BatchUpdateOp::cell(cell('C', label.row), label.genre.clone()));
        ops.push(BatchUpdateOp::cell(
            cell('T', label.row),
            label.position.clone(),
        ));
        ops.push(BatchUpdateOp::cell(cell('V', label.row), OUI));
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_op(ops: &[BatchUpdateOp], range: &str, value: &str) -> bool {
        ops.iter()
            .any(|op| op.range == range && op.values == vec![vec![value.to_string()]])
    }

    #[test]
    fn songstats_writes_links_country_and_flag() {
        let mut label = LabelRecord::named("Drumcode");
        label.row = Some(2);
        label.country = Some("Sweden".to_string());
        label
            .links
            .insert(LinkType::Beatport, "https://www.beatport.com/label/drumcode/1234".into());

        let ops = songstats_updates(&[label]);
        assert!(has_op(&ops, "Labels!B2", "Sweden"));
        assert!(has_op(
            &ops,
            "Labels!R2",
            "https://www.beatport.com/label/drumcode/1234"
        ));
        assert!(has_op(&ops, "Labels!U2", "Oui"));
        // No soundcloud link scraped: the cell is cleared, not skipped.
        assert!(has_op(&ops, "Labels!O2", ""));
    }

    #[test]
    fn songstats_clears_every_unscraped_cell() {
        let mut label = LabelRecord::named("Drumcode");
        label.row = Some(2);

        let ops = songstats_updates(&[label]);
        for range in ["Labels!B2", "Labels!O2", "Labels!P2", "Labels!Q2", "Labels!R2"] {
            assert!(has_op(&ops, range, ""));
        }
        assert!(has_op(&ops, "Labels!U2", "Oui"));
    }

    #[test]
    fn records_without_a_row_are_skipped() {
        let label = LabelRecord::named("Rowless");
        assert!(songstats_updates(&[label]).is_empty());
        assert!(links_updates(&[LabelRecord::named("Rowless")]).is_empty());
    }

    #[test]
    fn links_pass_writes_flags_as_oui_non() {
        let mut label = LabelRecord::named("Drumcode");
        label.row = Some(4);
        label.actif = Some(true);
        label.ouvert_nouveaux = Some(false);
        label.followers_count = Some(125_000);

        let ops = links_updates(&[label]);
        assert!(has_op(&ops, "Labels!D4", "Oui"));
        assert!(has_op(&ops, "Labels!E4", "Non"));
        assert!(has_op(&ops, "Labels!N4", "125000"));
        // No email found: the cell is cleared, not skipped.
        assert!(has_op(&ops, "Labels!F4", ""));
    }

    #[test]
    fn links_flags_default_to_non_when_unknown() {
        let mut label = LabelRecord::named("Drumcode");
        label.row = Some(4);

        let ops = links_updates(&[label]);
        assert!(has_op(&ops, "Labels!D4", "Non"));
        assert!(has_op(&ops, "Labels!E4", "Non"));
        assert!(has_op(&ops, "Labels!F4", ""));
        assert!(has_op(&ops, "Labels!N4", ""));
    }

    #[test]
    fn vinyls_pass_writes_merch_link_and_country() {
        let mut label = LabelRecord::named("Kompakt");
        label.row = Some(7);
        label.country = Some("Germany".to_string());
        label
            .links
            .insert(LinkType::Bandcamp, "https://kompakt.bandcamp.com".into());

        let ops = vinyls_updates(&[label]);
        assert!(has_op(&ops, "Labels!B7", "Germany"));
        assert!(has_op(&ops, "Labels!S7", "https://kompakt.bandcamp.com"));
    }

    #[test]
    fn beatstats_full_rows_include_identity_columns() {
        let label = ReconciledLabel {
            row: 10,
            name: "Hotflush".to_string(),
            genre: "Techno".to_string(),
            position: "4".to_string(),
            beatport_link: Some("https://www.beatport.com/label/hotflush/99".to_string()),
            kind: WriteKind::Full,
        };

        let ops = beatstats_updates(&[label]);
        assert!(has_op(&ops, "Labels!A10", "Hotflush"));
        assert!(has_op(
            &ops,
            "Labels!R10",
            "https://www.beatport.com/label/hotflush/99"
        ));
        assert!(has_op(&ops, "Labels!C10", "Techno"));
        assert!(has_op(&ops, "Labels!T10", "4"));
        assert!(has_op(&ops, "Labels!V10", "Oui"));
    }

    #[test]
    fn beatstats_updates_skip_identity_columns() {
        let label = ReconciledLabel {
            row: 2,
            name: "Drumcode".to_string(),
            genre: "Peak Time".to_string(),
            position: "3".to_string(),
            beatport_link: None,
            kind: WriteKind::Update,
        };

        let ops = beatstats_updates(&[label]);
        assert!(!ops.iter().any(|op| op.range == "Labels!A2"));
        assert!(has_op(&ops, "Labels!T2", "3"));
        assert!(has_op(&ops, "Labels!V2", "Oui"));
    }
}
