use std::sync::Arc;

use ck_core::clipboard::ClipboardEntry;
use ck_core::ports::{ClockPort, HistoryEvent, HistoryEvents, HistoryStorePort};
use ck_infra::db::{EmbeddedHistoryStore, StoreOptions, DATABASE_FILE_NAME};
use ck_infra::MonotonicClock;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    clock: Arc<MonotonicClock>,
    events: HistoryEvents,
    store: EmbeddedHistoryStore,
}

async fn fixture(max_history_size: usize, ignore_duplicates: bool) -> Fixture {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(MonotonicClock::system());
    let events = HistoryEvents::new();
    let store = EmbeddedHistoryStore::open(
        &dir.path().join(DATABASE_FILE_NAME),
        StoreOptions {
            max_history_size,
            ignore_duplicates,
        },
        clock.clone(),
        events.clone(),
    )
    .await
    .unwrap();

    Fixture {
        _dir: dir,
        clock,
        events,
        store,
    }
}

impl Fixture {
    fn text(&self, text: &str) -> ClipboardEntry {
        ClipboardEntry::new_text(text, self.clock.now())
    }
}

#[tokio::test]
async fn stored_entries_come_back_unchanged() {
    let fx = fixture(10, true).await;
    let text = fx.text("  keep\nthe whitespace ");
    let image = ClipboardEntry::new_image(vec![1u8, 2, 3, 0, 255], fx.clock.now());
    let files = ClipboardEntry::new_file_paths(vec!["/tmp/a.txt".into()], fx.clock.now());

    for entry in [&text, &image, &files] {
        assert!(fx.store.add(entry.clone()).await.unwrap());
    }

    let recent = fx.store.get_recent(10).await.unwrap();
    assert_eq!(recent, vec![files.clone(), image.clone(), text.clone()]);
    assert_eq!(fx.store.get(&image.id).await.unwrap(), Some(image));
}

#[tokio::test]
async fn duplicate_text_is_rejected_when_ignoring_duplicates() {
    let fx = fixture(10, true).await;

    assert!(fx.store.add(fx.text("A")).await.unwrap());
    assert!(!fx.store.add(fx.text("A")).await.unwrap());

    assert_eq!(fx.store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn duplicate_text_is_kept_when_duplicates_are_allowed() {
    let fx = fixture(10, false).await;

    assert!(fx.store.add(fx.text("A")).await.unwrap());
    assert!(fx.store.add(fx.text("A")).await.unwrap());

    assert_eq!(fx.store.count().await.unwrap(), 2);
    assert_eq!(fx.store.get_recent(10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn file_path_order_does_not_matter() {
    let fx = fixture(10, true).await;
    let first = ClipboardEntry::new_file_paths(vec!["/a".into(), "/b".into()], fx.clock.now());
    let second = ClipboardEntry::new_file_paths(vec!["/b".into(), "/a".into()], fx.clock.now());

    assert!(fx.store.add(first).await.unwrap());
    assert!(!fx.store.add(second).await.unwrap());
}

#[tokio::test]
async fn eviction_keeps_bound_and_spares_pinned_entries() {
    let fx = fixture(3, true).await;

    let oldest = fx.text("oldest");
    fx.store.add(oldest.clone()).await.unwrap();
    fx.store.set_pinned(&oldest.id, true).await.unwrap();

    for i in 0..5 {
        fx.store.add(fx.text(&format!("entry {i}"))).await.unwrap();
    }

    assert_eq!(fx.store.count().await.unwrap(), 3);
    let recent = fx.store.get_recent(10).await.unwrap();
    assert_eq!(recent[0].id, oldest.id);
    assert!(recent[0].is_pinned());
    let texts: Vec<_> = recent.iter().filter_map(|e| e.plain_text()).collect();
    assert_eq!(texts, vec!["oldest", "entry 4", "entry 3"]);
}

#[tokio::test]
async fn cleanup_keeps_newest_of_each_group() {
    let fx = fixture(50, false).await;

    let mut newest = Vec::new();
    for (text, copies) in [("a", 3), ("b", 2), ("c", 1)] {
        let mut last = None;
        for _ in 0..copies {
            let entry = fx.text(text);
            fx.store.add(entry.clone()).await.unwrap();
            last = Some(entry.id);
        }
        newest.push(last.unwrap());
    }

    let mut rx = fx.events.subscribe();
    let removed = fx.store.cleanup_duplicates().await.unwrap();

    // (3-1) + (2-1) + (1-1)
    assert_eq!(removed, 3);
    assert_eq!(fx.store.count().await.unwrap(), 3);

    let mut survivors: Vec<_> = fx
        .store
        .get_recent(10)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    survivors.sort();
    newest.sort();
    assert_eq!(survivors, newest);

    let mut removed_events = 0;
    loop {
        match rx.recv().await.unwrap() {
            HistoryEvent::EntryRemoved { .. } => removed_events += 1,
            HistoryEvent::DuplicatesCleaned(n) => {
                assert_eq!(n, 3);
                break;
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(removed_events, 3);
}

#[tokio::test]
async fn unpinning_moves_entry_to_now() {
    let fx = fixture(10, true).await;
    let entry = fx.text("pin me");
    let before = entry.timestamp;
    fx.store.add(entry.clone()).await.unwrap();

    let pinned = fx.store.set_pinned(&entry.id, true).await.unwrap().unwrap();
    assert!(pinned.is_pinned());

    let unpinned = fx.store.set_pinned(&entry.id, false).await.unwrap().unwrap();
    assert!(!unpinned.is_pinned());
    assert!(unpinned.timestamp > before);
}

#[tokio::test]
async fn pinning_unknown_entry_returns_none() {
    let fx = fixture(10, true).await;
    let ghost = fx.text("never stored");
    assert_eq!(fx.store.set_pinned(&ghost.id, true).await.unwrap(), None);
}

#[tokio::test]
async fn delete_removes_row_and_publishes_event() {
    let fx = fixture(10, true).await;
    let entry = fx.text("bye");
    fx.store.add(entry.clone()).await.unwrap();

    let mut rx = fx.events.subscribe();
    assert!(fx.store.delete(&entry.id).await.unwrap());
    assert!(!fx.store.delete(&entry.id).await.unwrap());

    assert_eq!(
        rx.recv().await.unwrap(),
        HistoryEvent::EntryRemoved {
            id: entry.id.clone(),
            data_type: entry.data_type(),
            source_file: None,
        }
    );
    assert_eq!(fx.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn history_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join(DATABASE_FILE_NAME);
    let options = StoreOptions {
        max_history_size: 10,
        ignore_duplicates: true,
    };
    let clock = Arc::new(MonotonicClock::system());

    let store = EmbeddedHistoryStore::open(&path, options, clock.clone(), HistoryEvents::new())
        .await
        .unwrap();
    let entry = ClipboardEntry::new_text("persisted", clock.now());
    store.add(entry.clone()).await.unwrap();
    store.shutdown().await.unwrap();

    let reopened = EmbeddedHistoryStore::open(&path, options, clock, HistoryEvents::new())
        .await
        .unwrap();
    assert_eq!(reopened.get_recent(10).await.unwrap(), vec![entry]);
}
