use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use ck_core::clipboard::ClipboardEntry;
use ck_core::ports::{ClockPort, HistoryEvents, HistoryStorePort};
use ck_core::Settings;
use ck_infra::{FsBlobSideStore, MonotonicClock};
use clipkeep::bootstrap::{build_store, load_config, resolve_cache_folder};
use clipkeep::{IngestOutcome, IngestPipeline};
use tempfile::{NamedTempFile, TempDir};

fn write_config(folder: &Path, machine: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[storage]
backend = "sync_folder"
cache_folder_path = "{}"
machine_name = "{}"

[capture]
enabled = false

[sync]
watch = false
"#,
        folder.display().to_string().replace('\\', "/"),
        machine
    )
    .unwrap();
    file
}

async fn open_machine(folder: &Path, machine: &str) -> (Settings, Arc<dyn HistoryStorePort>) {
    let config = write_config(folder, machine);
    let settings = load_config(config.path()).unwrap();
    let cache_folder = resolve_cache_folder(&settings).unwrap();
    let store = build_store(
        &settings,
        cache_folder,
        Arc::new(MonotonicClock::system()),
        HistoryEvents::new(),
    )
    .await
    .unwrap();
    (settings, store)
}

#[tokio::test]
async fn entries_ingested_on_one_machine_are_read_on_another() {
    let shared = TempDir::new().unwrap();
    let clock = MonotonicClock::system();

    let (settings_a, store_a) = open_machine(shared.path(), "alpha").await;
    let blobs = Arc::new(FsBlobSideStore::new(shared.path().join("alpha-blobs")));
    let pipeline = IngestPipeline::new(store_a.clone(), blobs, settings_a);

    let copied = ClipboardEntry::new_text("copied on alpha", clock.now());
    assert_eq!(pipeline.ingest(copied.clone()).await.unwrap(), IngestOutcome::Stored);
    assert_eq!(
        pipeline
            .ingest(ClipboardEntry::new_text("copied on alpha", clock.now()))
            .await
            .unwrap(),
        IngestOutcome::ConsecutiveDuplicate
    );

    let (_, store_b) = open_machine(shared.path(), "beta").await;
    let recent = store_b.get_recent(10).await.unwrap();

    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, copied.id);
    assert_eq!(recent[0].plain_text(), Some("copied on alpha"));
    assert!(!recent[0].is_local());

    store_a.shutdown().await.unwrap();
    store_b.shutdown().await.unwrap();
}
