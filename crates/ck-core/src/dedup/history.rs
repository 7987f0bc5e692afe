use std::collections::HashMap;

use super::equality::content_equals;
use super::key::ContentKey;
use crate::clipboard::{sort_newest_first, ClipboardContent, ClipboardEntry};
use crate::ids::EntryId;

/// Finds an existing entry with the same content as `candidate`.
///
/// Only entries of the same data type are compared.
pub fn find_history_duplicate<'a, I>(
    candidate: &ClipboardContent,
    existing: I,
) -> Option<&'a ClipboardEntry>
where
    I: IntoIterator<Item = &'a ClipboardEntry>,
{
    let data_type = candidate.data_type();
    existing
        .into_iter()
        .filter(|entry| entry.data_type() == data_type)
        .find(|entry| content_equals(&entry.content, candidate))
}

/// Seen-set keyed by [`ContentKey`], confirmed with a full comparison.
#[derive(Default)]
struct SeenContent<'a> {
    buckets: HashMap<ContentKey, Vec<&'a ClipboardContent>>,
}

impl<'a> SeenContent<'a> {
    /// Returns `true` if equal content was already seen, else records it.
    fn check_and_insert(&mut self, content: &'a ClipboardContent) -> bool {
        let bucket = self.buckets.entry(ContentKey::of(content)).or_default();
        if bucket.iter().any(|seen| content_equals(seen, content)) {
            return true;
        }
        bucket.push(content);
        false
    }
}

/// Plans a bulk duplicate cleanup.
///
/// Within every group of equal entries the newest one is kept and the ids of
/// the others are returned. Pinned entries count as newest.
pub fn plan_cleanup(entries: &[ClipboardEntry]) -> Vec<EntryId> {
    let mut order: Vec<&ClipboardEntry> = entries.iter().collect();
    order.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut seen = SeenContent::default();
    order
        .into_iter()
        .filter(|entry| seen.check_and_insert(&entry.content))
        .map(|entry| entry.id.clone())
        .collect()
}

/// Newest `limit` entries with later duplicates filtered out.
pub fn unique_newest(mut entries: Vec<ClipboardEntry>, limit: usize) -> Vec<ClipboardEntry> {
    sort_newest_first(&mut entries);

    let mut keep = vec![false; entries.len()];
    {
        let mut seen = SeenContent::default();
        let mut kept = 0usize;
        for (idx, entry) in entries.iter().enumerate() {
            if kept == limit {
                break;
            }
            if !seen.check_and_insert(&entry.content) {
                keep[idx] = true;
                kept += 1;
            }
        }
    }

    entries
        .into_iter()
        .zip(keep)
        .filter_map(|(entry, keep)| keep.then_some(entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn text_at(text: &str, minutes_ago: i64) -> ClipboardEntry {
        ClipboardEntry::new_text(text, Utc::now() - Duration::minutes(minutes_ago))
    }

    #[test]
    fn history_duplicate_ignores_other_types() {
        let existing = vec![
            ClipboardEntry::new_file_paths(vec!["a".into()], Utc::now()),
            text_at("b", 1),
        ];
        assert!(find_history_duplicate(&ClipboardContent::Text("a".into()), &existing).is_none());
        let found = find_history_duplicate(&ClipboardContent::Text("b".into()), &existing);
        assert_eq!(found.map(|e| e.id.clone()), Some(existing[1].id.clone()));
    }

    #[test]
    fn cleanup_removes_all_but_newest_of_each_group() {
        // groups: "a" x3, "b" x2, "c" x1
        let entries = vec![
            text_at("a", 30),
            text_at("b", 25),
            text_at("a", 20),
            text_at("c", 15),
            text_at("a", 10),
            text_at("b", 5),
        ];

        let removed = plan_cleanup(&entries);

        // (3 - 1) + (2 - 1) + (1 - 1)
        assert_eq!(removed.len(), 3);
        assert!(!removed.contains(&entries[4].id), "newest 'a' kept");
        assert!(!removed.contains(&entries[5].id), "newest 'b' kept");
        assert!(!removed.contains(&entries[3].id), "singleton kept");
    }

    #[test]
    fn cleanup_keeps_pinned_member() {
        let mut pinned = text_at("a", 60);
        pinned.pin();
        let newer = text_at("a", 1);
        let entries = vec![pinned.clone(), newer.clone()];

        assert_eq!(plan_cleanup(&entries), vec![newer.id]);
    }

    #[test]
    fn cleanup_does_not_merge_images_sharing_a_prefix_hash() {
        let mut a = vec![0u8; 2048];
        let mut b = vec![0u8; 2048];
        a[1500] = 1;
        b[1500] = 2;
        let entries = vec![
            ClipboardEntry::new_image(a, Utc::now() - Duration::minutes(1)),
            ClipboardEntry::new_image(b, Utc::now()),
        ];
        assert!(plan_cleanup(&entries).is_empty());
    }

    #[test]
    fn unique_newest_filters_then_limits() {
        let entries = vec![
            text_at("a", 3),
            text_at("b", 2),
            text_at("a", 1),
            text_at("c", 0),
        ];

        let recent = unique_newest(entries, 2);
        let texts: Vec<_> = recent.iter().filter_map(|e| e.plain_text()).collect();
        assert_eq!(texts, vec!["c", "a"]);
    }

    #[test]
    fn unique_newest_with_zero_limit_is_empty() {
        assert!(unique_newest(vec![text_at("a", 0)], 0).is_empty());
    }
}
