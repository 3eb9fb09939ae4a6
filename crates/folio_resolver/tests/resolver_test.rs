//! Tests for media reference resolution.

use folio_core::{FileDescriptor, StorageTier};
use folio_resolver::{MatchStrategy, MediaResolver, ReferenceFailure, Resolution};
use folio_storage::{FileSystemTier, MemoryKeyValueStore, StorageConfig, TieredBlobStore};
use std::sync::Arc;
use tempfile::TempDir;

const PATH: &str = "contents/images/2026/10/18/";

fn local(name: &str, handle: &str) -> FileDescriptor {
    let mut d = FileDescriptor::new(name, PATH, 1, StorageTier::EphemeralKv);
    d.handle = handle.to_string();
    d
}

fn store(temp_dir: &TempDir) -> Arc<TieredBlobStore> {
    let binary = FileSystemTier::new(temp_dir.path(), 64 * 1024 * 1024).unwrap();
    Arc::new(
        TieredBlobStore::new(
            StorageConfig::default(),
            Arc::new(MemoryKeyValueStore::new(1024 * 1024)),
        )
        .with_binary(Arc::new(binary)),
    )
}

#[tokio::test]
async fn test_uploaded_logo_resolves_to_image_embed() {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    store
        .put(vec![0x89; 2 * 1024 * 1024], "logo.png", PATH)
        .await
        .unwrap();

    let files = store.list().await.unwrap();
    let resolver = MediaResolver::new().unwrap();
    let html = resolver.resolve("Brand: [image:logo.png]", &files).await;

    assert!(html.starts_with("Brand: <img src=\"blob:folio/"));
    assert!(html.contains(&format!("data-folio-id=\"{}\"", files[0].id)));
    assert!(!html.contains("src=\"\""));
}

#[tokio::test]
async fn test_missing_file_marker() {
    let resolver = MediaResolver::new().unwrap();
    let html = resolver
        .resolve("Watch [video:missing.mp4] now", &[local("other.png", "blob:x")])
        .await;

    assert!(html.contains("file not found: missing.mp4"));
    assert!(html.contains("data-folio-status=\"not-found\""));
    assert!(html.starts_with("Watch "));
    assert!(html.ends_with(" now"));
}

#[tokio::test]
async fn test_empty_handle_without_recovery_requires_reupload() {
    let resolver = MediaResolver::new().unwrap();
    let files = [local("photo.png", "")];
    let resolved = resolver.resolve_detailed("[image:photo.png]", &files).await;

    assert!(
        resolved
            .text
            .contains("media unavailable, re-upload required: photo.png")
    );
    assert!(!resolved.text.contains("<img"));
    assert_eq!(resolved.outcomes[0].failure(), Some(ReferenceFailure::Broken));
    assert_eq!(resolved.outcomes[0].matched_id(), Some(files[0].id));
}

#[tokio::test]
async fn test_remote_without_access_url_requires_reupload() {
    let mut remote = FileDescriptor::new("talk.mp4", PATH, 1, StorageTier::Remote);
    remote.handle = "contents/videos/2026/10/18/1-talk.mp4".to_string();

    let resolver = MediaResolver::new().unwrap();
    let html = resolver.resolve("[video:talk.mp4]", &[remote.clone()]).await;
    assert!(html.contains("re-upload required: talk.mp4"));

    remote.access_url = Some("https://media.s3.local/talk.mp4?sig=1".to_string());
    let html = resolver.resolve("[video:talk.mp4]", &[remote]).await;
    assert!(html.starts_with("<video src=\"https://media.s3.local/talk.mp4?sig=1\" controls"));
}

#[tokio::test]
async fn test_stale_handle_is_recovered_from_mirror() {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    store.put(b"pixels".to_vec(), "photo.png", PATH).await.unwrap();
    let files = store.list().await.unwrap();

    // Simulate a reload: the listed handle no longer resolves
    store.handles().restart();
    assert!(!store.is_live(&files[0].handle));

    let resolver = MediaResolver::new().unwrap().with_recovery(store.clone());
    let resolved = resolver.resolve_detailed("[image:photo.png]", &files).await;

    match &resolved.outcomes[0].resolution {
        Resolution::Embedded { url, recovered, .. } => {
            assert!(*recovered);
            assert_ne!(url, &files[0].handle);
            assert!(store.is_live(url));
        }
        other => panic!("expected embed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_handle_with_no_mirror_record_requires_reupload() {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    let resolver = MediaResolver::new().unwrap().with_recovery(store);

    let html = resolver
        .resolve("[media:ghost.png]", &[local("ghost.png", "")])
        .await;
    assert!(html.contains("re-upload required: ghost.png"));
}

#[tokio::test]
async fn test_exact_match_wins_over_earlier_substring() {
    let files = [
        local("diagram-final.png", "blob:final"),
        local("diagram.png", "blob:plain"),
    ];
    let resolver = MediaResolver::new().unwrap();
    let resolved = resolver.resolve_detailed("[image:diagram.png]", &files).await;

    assert_eq!(resolved.outcomes[0].matched_id(), Some(files[1].id));
    assert!(matches!(
        resolved.outcomes[0].resolution,
        Resolution::Embedded {
            strategy: MatchStrategy::Exact,
            ..
        }
    ));
}

#[tokio::test]
async fn test_extensionless_tag_picks_first_listed_diagram() {
    let files = [
        local("diagram.png", "blob:plain"),
        local("diagram-final.png", "blob:final"),
    ];
    let resolver = MediaResolver::new().unwrap();
    let resolved = resolver.resolve_detailed("[image:diagram]", &files).await;

    assert_eq!(resolved.outcomes[0].matched_id(), Some(files[0].id));
    assert!(resolved.text.starts_with("<img src=\"blob:plain\""));
    assert!(
        resolved
            .text
            .contains(&format!("data-folio-id=\"{}\"", files[0].id))
    );
    assert!(!resolved.text.contains(&files[1].id.to_string()));
}

#[tokio::test]
async fn test_recovery_by_name_embeds_the_recovered_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    let stored = store.put(b"pixels".to_vec(), "photo.png", PATH).await.unwrap();

    // A record from elsewhere with the same name but an unknown id
    let stray = local("photo.png", "");
    assert_ne!(stray.id, stored.id);

    let resolver = MediaResolver::new().unwrap().with_recovery(store.clone());
    let resolved = resolver.resolve_detailed("[image:photo.png]", &[stray.clone()]).await;

    assert_eq!(resolved.outcomes[0].matched_id(), Some(stored.id));
    assert!(
        resolved
            .text
            .contains(&format!("data-folio-id=\"{}\"", stored.id))
    );
    assert!(!resolved.text.contains(&stray.id.to_string()));
    match &resolved.outcomes[0].resolution {
        Resolution::Embedded { recovered, url, .. } => {
            assert!(*recovered);
            assert!(store.is_live(url));
        }
        other => panic!("expected embed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_resolution_is_idempotent() {
    let files = [
        local("a.png", "blob:a"),
        local("b.mp4", "blob:b"),
        local("c.pdf", "blob:c"),
    ];
    let content = "x [image:a.png] y [media:b.mp4] z [media:c.pdf] [video:nope.mp4]";
    let resolver = MediaResolver::new().unwrap();

    let once = resolver.resolve(content, &files).await;
    let twice = resolver.resolve(&once, &files).await;
    assert_eq!(once, twice);

    let first = resolver.resolve_detailed(content, &files).await;
    let second = resolver.resolve_detailed(content, &files).await;
    let ids = |r: &folio_resolver::ResolvedContent| {
        r.outcomes.iter().map(|o| o.matched_id()).collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
}

#[tokio::test]
async fn test_media_kind_and_escaping() {
    let files = [local("clip.mp4", "blob:clip")];
    let resolver = MediaResolver::new().unwrap();

    let html = resolver.resolve("[media:clip.mp4]", &files).await;
    assert!(html.starts_with("<video src=\"blob:clip\""));

    let html = resolver.resolve("[image:<b>\"x\".png]", &files).await;
    assert!(html.contains("file not found: &lt;b&gt;&quot;x&quot;.png"));
}
