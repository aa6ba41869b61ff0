use std::collections::HashMap;
use tracing::debug;

use crate::constants::MATCH_THRESHOLD_RECONCILE;
use crate::matching::{extract_rank, find_best_match, format_position, MatchCandidate};
use crate::types::ChartEntry;

/// One existing row of the sheet snapshot the reconciler works against.
#[derive(Debug, Clone)]
pub struct SheetLabel {
    pub row: u32,
    pub name: String,
    pub genre: String,
    pub position: String,
    pub beatport_link: Option<String>,
    /// Already marked as processed on the sheet.
    pub flagged: bool,
}

impl MatchCandidate for SheetLabel {
    fn match_name(&self) -> &str {
        &self.name
    }
}

/// Whether a reconciled row needs its identity columns written too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    /// New row: name and link columns included.
    Full,
    /// Existing row: rank and genre columns only.
    Update,
}

/// A chart entry resolved against the sheet, ready for the batch builder.
#[derive(Debug, Clone)]
pub struct ReconciledLabel {
    pub row: u32,
    pub name: String,
    pub genre: String,
    pub position: String,
    pub beatport_link: Option<String>,
    pub kind: WriteKind,
}

/// Resolves chart entries against a sheet snapshot.
///
/// Identity is resolved by marketplace link first and near-exact fuzzy
/// name second. An existing row's rank is only overwritten by a strictly
/// better (lower) one; rows already flagged and left unchanged are dropped
/// from the output. New labels are appended below the snapshot through a
/// monotone row counter, so reconciling several genre batches in sequence
/// never reuses a row.
pub struct Reconciler {
    last_row: u32,
}

impl Reconciler {
    /// `sheet_row_count` is the number of data rows in the snapshot; data
    /// starts at row 2, so the first appended label lands at
    /// `sheet_row_count + 2`.
    pub fn new(sheet_row_count: usize) -> Self {
        Self {
            last_row: sheet_row_count as u32 + 1,
        }
    }

    pub fn reconcile(
        &mut self,
        sheet: &[SheetLabel],
        entries: &[ChartEntry],
    ) -> Vec<ReconciledLabel> {
        let by_link: HashMap<&str, &SheetLabel> = sheet
            .iter()
            .filter_map(|label| {
                label
                    .beatport_link
                    .as_deref()
                    .filter(|link| !link.is_empty())
                    .map(|link| (link, label))
            })
            .collect();

        let mut out = Vec::new();
        for entry in entries {
            let existing = entry
                .beatport_link
                .as_deref()
                .and_then(|link| by_link.get(link).copied())
                .or_else(|| {
                    if entry.name.is_empty() {
                        None
                    } else {
                        find_best_match(&entry.name, sheet, MATCH_THRESHOLD_RECONCILE)
                    }
                });

            match existing {
                Some(label) => {
                    if let Some(update) = merge_ranks(label, entry) {
                        out.push(update);
                    }
                }
                None => out.push(self.place_new(entry)),
            }
        }
        out
    }

    fn place_new(&mut self, entry: &ChartEntry) -> ReconciledLabel {
        self.last_row += 1;
        debug!(name = %entry.name, row = self.last_row, "placing new label");
        ReconciledLabel {
            row: self.last_row,
            name: entry.name.clone(),
            genre: entry.genre.clone(),
            position: format_position(&entry.position, entry.is_hype),
            beatport_link: entry.beatport_link.clone(),
            kind: WriteKind::Full,
        }
    }
}

/// Update for an existing row, or `None` when the row is flagged and the
/// new rank is not an improvement.
fn merge_ranks(existing: &SheetLabel, entry: &ChartEntry) -> Option<ReconciledLabel> {
    let current_rank = extract_rank(&existing.position);
    let new_position = format_position(&entry.position, entry.is_hype);
    let improved = match (current_rank, extract_rank(&new_position)) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(current), Some(new)) => new < current,
    };

    if !improved && existing.flagged {
        return None;
    }

    let (genre, position) = if improved {
        (entry.genre.clone(), new_position)
    } else {
        (existing.genre.clone(), existing.position.clone())
    };

    Some(ReconciledLabel {
        row: existing.row,
        name: existing.name.clone(),
        genre,
        position,
        beatport_link: existing.beatport_link.clone(),
        kind: WriteKind::Update,
    })
}
