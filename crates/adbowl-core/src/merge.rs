use std::collections::HashSet;

use crate::dataset::AdRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Updated { added: usize, total: usize },
    NothingNew,
}

/// Select the candidates whose `videoId` is not already known.
///
/// The seen set starts from `existing` and grows as candidates are accepted,
/// so a video returned by several queries is kept once, at its first
/// position. Existing records are only read.
#[must_use]
pub fn merge_candidates<I>(existing: &[AdRecord], candidates: I) -> Vec<AdRecord>
where
    I: IntoIterator<Item = AdRecord>,
{
    let mut seen: HashSet<String> = existing
        .iter()
        .map(|ad| ad.video_id().to_string())
        .collect();
    candidates
        .into_iter()
        .filter(|ad| seen.insert(ad.video_id().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use chrono::NaiveDate;

    fn curated(video_id: &str, brand: &str, category: &str, celebrity: &str) -> AdRecord {
        serde_json::from_value(serde_json::json!({
            "videoId": video_id,
            "brand": brand,
            "adTitle": "spot",
            "category": category,
            "celebrity": celebrity
        }))
        .unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 9).unwrap()
    }

    #[test]
    fn appends_only_unseen_ids_and_preserves_curation() {
        let mut dataset = Dataset::empty("Big Game LX", 2026, NaiveDate::MIN);
        dataset.ads.push(curated("a1", "Old", "Food", "X"));
        let before = dataset.ads[0].clone();

        let batch = vec![
            AdRecord::discovered("a1", "Old-renamed", "renamed"),
            AdRecord::discovered("b2", "New Co", "New Co spot"),
        ];
        let new_ads = merge_candidates(&dataset.ads, batch);
        assert_eq!(new_ads.len(), 1);
        dataset.append(new_ads, today());

        assert_eq!(dataset.ads.len(), 2);
        assert_eq!(dataset.ads[0], before);
        assert_eq!(dataset.ads[0].category(), "Food");
        assert_eq!(dataset.ads[0].celebrity(), Some("X"));
        assert_eq!(dataset.ads[1].video_id(), "b2");
        assert_eq!(dataset.ads[1].brand(), "New Co");
        assert_eq!(dataset.ads[1].category(), "");
        assert!(dataset.ads[1].celebrity().is_none());
        assert_eq!(dataset.last_updated, today());
    }

    #[test]
    fn duplicates_within_batch_collapse_to_first() {
        let batch = vec![
            AdRecord::discovered("c3", "First", "from query one"),
            AdRecord::discovered("d4", "Other", "other"),
            AdRecord::discovered("c3", "Second", "from query two"),
        ];
        let new_ads = merge_candidates(&[], batch);
        let ids: Vec<&str> = new_ads.iter().map(AdRecord::video_id).collect();
        assert_eq!(ids, ["c3", "d4"]);
        assert_eq!(new_ads[0].brand(), "First");
    }

    #[test]
    fn second_merge_of_same_batch_adds_nothing() {
        let batch = vec![
            AdRecord::discovered("e5", "Brand", "t"),
            AdRecord::discovered("f6", "Brand", "t"),
        ];
        let ads = merge_candidates(&[], batch.clone());
        assert_eq!(ads.len(), 2);

        let again = merge_candidates(&ads, batch);
        assert!(again.is_empty());
    }

    #[test]
    fn brand_and_title_collisions_are_allowed() {
        let existing = vec![AdRecord::discovered("g7", "Same", "Same title")];
        let new_ads = merge_candidates(
            &existing,
            vec![AdRecord::discovered("h8", "Same", "Same title")],
        );
        assert_eq!(new_ads.len(), 1);
    }

    #[test]
    fn output_ids_are_unique() {
        let existing = vec![
            AdRecord::discovered("a", "x", "x"),
            AdRecord::discovered("b", "x", "x"),
        ];
        let batch = ["b", "c", "a", "c", "d", "d"]
            .iter()
            .map(|id| AdRecord::discovered(id, "y", "y"));
        let mut all = existing.clone();
        all.extend(merge_candidates(&existing, batch));

        let unique: HashSet<&str> = all.iter().map(AdRecord::video_id).collect();
        assert_eq!(unique.len(), all.len());
        assert_eq!(all.len(), 4);
    }
}
