//! End-to-end tests: upload, promote, render.

use folio::{
    FolioConfig, InMemoryObjectGateway, MediaLibrary, ReferenceFailure, StorageConfig, StorageTier,
};
use std::sync::Arc;
use tempfile::TempDir;

fn config(temp_dir: &TempDir) -> FolioConfig {
    FolioConfig::default().with_storage(StorageConfig::default().with_binary_dir(temp_dir.path()))
}

#[tokio::test]
async fn test_render_ephemeral_and_missing() {
    let temp_dir = TempDir::new().unwrap();
    let library = MediaLibrary::new(&config(&temp_dir)).unwrap();

    let logo = library.upload(vec![1; 2_000_000], "logo.png").await.unwrap();
    assert!(logo.logical_path.starts_with("contents/images/"));
    library.upload(vec![2; 64], "intro.mp4").await.unwrap();

    let html = library
        .render("[image:logo.png] [media:intro.mp4] [video:missing.mp4]")
        .await
        .unwrap();

    assert!(html.contains("<img src=\"blob:folio/"));
    assert!(html.contains("<video src=\"blob:folio/"));
    assert!(html.contains("file not found: missing.mp4"));
}

#[tokio::test]
async fn test_render_after_restart_uses_fresh_handles() {
    let temp_dir = TempDir::new().unwrap();
    let library = MediaLibrary::new(&config(&temp_dir)).unwrap();
    let stored = library.upload(b"pixels".to_vec(), "photo.png").await.unwrap();

    library.store().handles().restart();
    let resolved = library.render_detailed("[image:photo.png]").await.unwrap();

    assert_eq!(resolved.outcomes[0].matched_id(), Some(stored.id));
    assert!(resolved.outcomes[0].failure().is_none());
    assert!(!resolved.text.contains(&stored.handle));
}

#[tokio::test]
async fn test_promoted_files_render_with_signed_urls() {
    let temp_dir = TempDir::new().unwrap();
    let remote = Arc::new(InMemoryObjectGateway::new("media"));
    let library = MediaLibrary::with_remote(&config(&temp_dir), remote.clone()).unwrap();

    let stored = library.upload(b"durable".to_vec(), "banner.png").await.unwrap();
    let promoted = library.store().promote(stored.id).await.unwrap();
    assert_eq!(promoted.tier, StorageTier::Remote);

    let files = library.files().await.unwrap();
    assert!(files[0].access_url.as_deref().unwrap().starts_with("https://media.s3.local/"));

    let html = library.render("[image:banner.png]").await.unwrap();
    assert!(html.starts_with("<img src=\"https://media.s3.local/contents/images/"));
    assert!(html.contains("X-Amz-Expires=86400"));
}

#[tokio::test]
async fn test_denied_remote_file_requires_reupload() {
    let temp_dir = TempDir::new().unwrap();
    let remote = Arc::new(InMemoryObjectGateway::new("media"));
    let library = MediaLibrary::with_remote(&config(&temp_dir), remote.clone()).unwrap();

    let keep = library.upload(b"ok".to_vec(), "ok.png").await.unwrap();
    let deny = library.upload(b"no".to_vec(), "denied.png").await.unwrap();
    library.store().promote(keep.id).await.unwrap();
    let denied = library.store().promote(deny.id).await.unwrap();
    remote.deny(denied.handle.clone());

    let resolved = library
        .render_detailed("[image:ok.png] [image:denied.png]")
        .await
        .unwrap();

    assert!(resolved.outcomes[0].failure().is_none());
    assert_eq!(resolved.outcomes[1].failure(), Some(ReferenceFailure::Broken));
    assert!(resolved.text.contains("re-upload required: denied.png"));
}

#[tokio::test]
async fn test_gateway_only_with_remote_tier() {
    let temp_dir = TempDir::new().unwrap();
    let library = MediaLibrary::new(&config(&temp_dir)).unwrap();
    assert!(library.gateway().is_none());
}
