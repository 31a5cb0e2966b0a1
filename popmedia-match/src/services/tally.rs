//! Per-category outcome counts

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{AssetOutcome, Category, Outcome};

/// Counters for one category (or the whole run)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub processed: usize,
    pub linked: usize,
    pub renamed: usize,
    pub backed_up: usize,
    pub left: usize,
}

impl OutcomeCounts {
    fn with_record(mut self, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Renamed => self.renamed += 1,
            Outcome::Linked => self.linked += 1,
            Outcome::BackedUp => self.backed_up += 1,
            Outcome::Left => self.left += 1,
            Outcome::Skipped => {}
        }
        self
    }

    fn with_asset(self, asset: &AssetOutcome) -> Self {
        let counts = OutcomeCounts {
            processed: self.processed + 1,
            ..self
        };
        asset
            .records
            .iter()
            .fold(counts, |counts, record| counts.with_record(record.outcome))
    }
}

/// Run summary, folded from the completed outcome list
///
/// Every category appears, including those with no assets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tally {
    pub by_category: BTreeMap<Category, OutcomeCounts>,
    pub total: OutcomeCounts,
}

impl Tally {
    pub fn from_outcomes(outcomes: &[AssetOutcome]) -> Self {
        let empty: BTreeMap<Category, OutcomeCounts> = Category::ALL
            .iter()
            .map(|category| (*category, OutcomeCounts::default()))
            .collect();

        let by_category = outcomes.iter().fold(empty, |mut acc, asset| {
            let counts = acc.entry(asset.asset.category).or_default();
            *counts = counts.with_asset(asset);
            acc
        });

        let total = outcomes
            .iter()
            .fold(OutcomeCounts::default(), |counts, asset| counts.with_asset(asset));

        Self { by_category, total }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<14} {:>9} {:>7} {:>7} {:>9} {:>5}",
            "Category", "Processed", "Linked", "Renamed", "BackedUp", "Left"
        )?;
        let rows = self
            .by_category
            .iter()
            .map(|(category, counts)| (category.as_str(), counts))
            .chain(std::iter::once(("Total", &self.total)));
        for (name, c) in rows {
            writeln!(
                f,
                "{:<14} {:>9} {:>7} {:>7} {:>9} {:>5}",
                name, c.processed, c.linked, c.renamed, c.backed_up, c.left
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionKind, ActionLabel, ActionRecord, MediaAsset};
    use std::path::{Path, PathBuf};

    fn outcome(relative: &str, outcomes: &[Outcome]) -> AssetOutcome {
        let asset = MediaAsset::from_path(&Path::new("/media").join(relative)).unwrap();
        let records = outcomes
            .iter()
            .map(|o| ActionRecord {
                kind: ActionKind::Rename,
                canonical_name: None,
                source: asset.path.clone(),
                destination: PathBuf::from("/dest"),
                label: ActionLabel::Confidence(100.0),
                outcome: *o,
            })
            .collect();
        AssetOutcome { asset, records }
    }

    #[test]
    fn test_counts_per_category() {
        let outcomes = vec![
            outcome(
                "Wheel/a.png",
                &[Outcome::Renamed, Outcome::Linked, Outcome::Skipped],
            ),
            outcome("Wheel/b.png", &[Outcome::Left]),
            outcome("DMD/c.mp4", &[Outcome::BackedUp]),
            outcome("Wheel/Twilight Zone.png", &[]),
        ];
        let tally = Tally::from_outcomes(&outcomes);

        let wheel = tally.by_category[&Category::Wheel];
        assert_eq!(
            wheel,
            OutcomeCounts {
                processed: 3,
                linked: 1,
                renamed: 1,
                backed_up: 0,
                left: 1,
            }
        );
        assert_eq!(tally.by_category[&Category::Dmd].backed_up, 1);
        assert_eq!(tally.total.processed, 4);
        let total = tally.total;
        assert_eq!(total.linked + total.renamed + total.backed_up + total.left, 4);
    }

    #[test]
    fn test_every_category_listed() {
        let tally = Tally::from_outcomes(&[]);
        assert_eq!(tally.by_category.len(), Category::ALL.len());
        assert_eq!(tally.total, OutcomeCounts::default());
    }

    #[test]
    fn test_display_has_total_row() {
        let outcomes = [outcome("Topper/x.png", &[Outcome::BackedUp])];
        let tally = Tally::from_outcomes(&outcomes);
        let text = tally.to_string();
        assert!(text.starts_with("Category"));
        assert!(text.contains("mscomctl.ocx"));
        assert!(text.lines().last().unwrap().starts_with("Total"));
    }
}
