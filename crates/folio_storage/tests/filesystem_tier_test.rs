//! Tests for the filesystem binary tier.

use folio_core::{FileDescriptor, StorageTier};
use folio_error::StorageErrorKind;
use folio_storage::{BlobTier, FileSystemTier};
use tempfile::TempDir;

fn descriptor(name: &str, size: usize) -> FileDescriptor {
    FileDescriptor::new(
        name,
        "contents/images/2026/10/18/",
        size as u64,
        StorageTier::EphemeralBinary,
    )
}

#[tokio::test]
async fn test_write_and_read() {
    let temp_dir = TempDir::new().unwrap();
    let tier = FileSystemTier::new(temp_dir.path(), 1024 * 1024).unwrap();

    let data = b"Hello, world!";
    let d = descriptor("hello.png", data.len());
    tier.write(&d, data).await.unwrap();

    assert_eq!(tier.read(&d).await.unwrap(), data);
    assert_eq!(tier.used_bytes().await.unwrap(), data.len() as u64);
}

#[tokio::test]
async fn test_records_come_from_sidecars() {
    let temp_dir = TempDir::new().unwrap();
    let tier = FileSystemTier::new(temp_dir.path(), 1024 * 1024).unwrap();

    let image = descriptor("a.png", 3);
    let video = descriptor("b.mp4", 4);
    tier.write(&image, b"abc").await.unwrap();
    tier.write(&video, b"abcd").await.unwrap();

    let mut ids: Vec<_> = tier.records().await.unwrap().iter().map(|r| r.id).collect();
    ids.sort();
    let mut expected = vec![image.id, video.id];
    expected.sort();
    assert_eq!(ids, expected);

    let found = tier.record(video.id).await.unwrap().unwrap();
    assert_eq!(found.name, "b.mp4");
    assert!(found.handle.is_empty());

    // Organized by media folder
    assert!(temp_dir.path().join("images").exists());
    assert!(temp_dir.path().join("videos").exists());
}

#[tokio::test]
async fn test_capacity_rejection() {
    let temp_dir = TempDir::new().unwrap();
    let tier = FileSystemTier::new(temp_dir.path(), 8).unwrap();

    let d = descriptor("big.png", 16);
    let err = tier.write(&d, &[0u8; 16]).await.unwrap_err();
    assert!(matches!(
        err.as_storage().map(|e| &e.kind),
        Some(StorageErrorKind::TierRejected {
            tier: StorageTier::EphemeralBinary,
            ..
        })
    ));
    assert!(tier.records().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remove() {
    let temp_dir = TempDir::new().unwrap();
    let tier = FileSystemTier::new(temp_dir.path(), 1024).unwrap();

    let d = descriptor("gone.png", 4);
    tier.write(&d, b"data").await.unwrap();
    assert!(tier.remove(&d).await.unwrap());
    assert!(!tier.remove(&d).await.unwrap());

    let err = tier.read(&d).await.unwrap_err();
    assert!(matches!(
        err.as_storage().map(|e| &e.kind),
        Some(StorageErrorKind::BlobNotFound(_))
    ));
}

#[tokio::test]
async fn test_clear_keeps_base_directory() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("folio");
    let tier = FileSystemTier::new(&base, 1024).unwrap();

    tier.write(&descriptor("x.png", 1), b"x").await.unwrap();
    tier.clear().await.unwrap();

    assert!(base.exists());
    assert!(tier.records().await.unwrap().is_empty());
}
