use ck_core::clipboard::{from_millis, ClipboardEntry, DataType};
use ck_core::ids::EntryId;
use ck_core::ports::BlobSideStorePort;
use ck_infra::FsBlobSideStore;
use tempfile::TempDir;

fn store(dir: &TempDir) -> FsBlobSideStore {
    FsBlobSideStore::new(dir.path().to_path_buf())
}

#[tokio::test]
async fn payloads_and_timestamps_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let ts = from_millis(1_717_000_000_456);

    let entries = [
        ClipboardEntry::new_text("line one\n  line two ", ts),
        ClipboardEntry::new_image(vec![0x89u8, b'P', b'N', b'G', 0, 7], ts),
        ClipboardEntry::new_file_paths(vec!["/tmp/a.txt".into(), "/tmp/b c.txt".into()], ts),
        ClipboardEntry::new_file_paths(vec![String::new()], ts),
        ClipboardEntry::new_file_paths(vec!["/tmp/odd\nname.txt".into()], ts),
    ];

    for entry in &entries {
        store.save(entry).await.unwrap();
        let loaded = store.load(&entry.id, entry.data_type()).await.unwrap().unwrap();
        assert_eq!(loaded.content, entry.content);
        assert_eq!(loaded.timestamp, ts);
    }

    let image = &entries[1];
    assert!(dir
        .path()
        .join("Images")
        .join(format!("{}.png", image.id))
        .exists());
    assert!(dir
        .path()
        .join("Images")
        .join(format!("{}.meta", image.id))
        .exists());
}

#[tokio::test]
async fn missing_sidecar_loads_as_none() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let entry = ClipboardEntry::new_text("orphan", from_millis(1));
    store.save(&entry).await.unwrap();

    std::fs::remove_file(dir.path().join("Text").join(format!("{}.meta", entry.id))).unwrap();

    assert!(store.load(&entry.id, DataType::Text).await.unwrap().is_none());
    assert!(store.load(&EntryId::new(), DataType::Image).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_removes_everything_and_tolerates_missing_files() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);

    let source = dir.path().join("report.pdf");
    std::fs::write(&source, b"%PDF-1.7").unwrap();
    let entry = ClipboardEntry::new_file_paths(
        vec![source.to_string_lossy().into_owned()],
        from_millis(5),
    );
    store.save(&entry).await.unwrap();
    store
        .cache_files(&entry.id, entry.file_paths().unwrap(), 1024)
        .await
        .unwrap();

    store.delete(&entry.id, DataType::FilePaths).await.unwrap();
    assert!(store.load(&entry.id, DataType::FilePaths).await.unwrap().is_none());
    assert!(!dir.path().join("Files").join(entry.id.as_str()).exists());

    store.delete(&entry.id, DataType::FilePaths).await.unwrap();
}

#[tokio::test]
async fn cache_files_respects_size_limit() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let sources = TempDir::new().unwrap();

    let small = sources.path().join("small.txt");
    let large = sources.path().join("large.bin");
    std::fs::write(&small, b"tiny").unwrap();
    std::fs::write(&large, vec![0u8; 2048]).unwrap();
    let paths = vec![
        small.to_string_lossy().into_owned(),
        large.to_string_lossy().into_owned(),
        sources.path().to_string_lossy().into_owned(),
        "/definitely/not/here.txt".to_string(),
    ];

    let id = EntryId::new();
    let copied = store.cache_files(&id, &paths, 1024).await.unwrap();

    assert_eq!(copied.len(), 1);
    assert_eq!(copied[0], dir.path().join("Files").join(id.as_str()).join("small.txt"));
    assert_eq!(std::fs::read(&copied[0]).unwrap(), b"tiny");
}

#[tokio::test]
async fn non_uuid_ids_are_rejected() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let evil = EntryId::from("../../etc/passwd");

    assert!(store.load(&evil, DataType::Text).await.is_err());
    assert!(store.delete(&evil, DataType::Text).await.is_err());

    let mut entry = ClipboardEntry::new_text("x", from_millis(1));
    entry.id = evil;
    assert!(store.save(&entry).await.is_err());
}
