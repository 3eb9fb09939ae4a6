use folio_core::{FileDescriptor, MediaType, StorageTier, UsageReport};

#[test]
fn new_descriptor_infers_mime_type() {
    let descriptor = FileDescriptor::new("clip.webm", "contents/videos/", 10, StorageTier::EphemeralKv);
    assert_eq!(descriptor.mime_type, "video/webm");
    assert_eq!(descriptor.media_type(), MediaType::Video);
    assert_eq!(descriptor.created_at, descriptor.refreshed_at);
}

#[test]
fn unknown_mime_falls_back_to_extension() {
    let mut descriptor = FileDescriptor::new("photo.JPG", "", 10, StorageTier::EphemeralBinary);
    descriptor.mime_type = "application/octet-stream".to_string();
    assert_eq!(descriptor.media_type(), MediaType::Image);
}

#[test]
fn remote_descriptor_only_displays_access_url() {
    let mut descriptor = FileDescriptor::new("a.png", "", 1, StorageTier::Remote);
    descriptor.handle = "contents/images/a.png".to_string();
    assert_eq!(descriptor.display_url(), None);

    descriptor.access_url = Some("https://bucket.example/a.png?sig=1".to_string());
    assert_eq!(descriptor.display_url(), Some("https://bucket.example/a.png?sig=1"));
}

#[test]
fn blank_handle_is_not_displayable() {
    let mut descriptor = FileDescriptor::new("a.png", "", 1, StorageTier::EphemeralBinary);
    descriptor.handle = "   ".to_string();
    assert_eq!(descriptor.display_url(), None);
}

#[test]
fn mirror_record_strips_session_artifacts() {
    let mut local = FileDescriptor::new("a.png", "", 1, StorageTier::EphemeralBinary);
    local.handle = "blob:folio/abc".to_string();
    assert!(local.to_mirror_record().handle.is_empty());

    let mut remote = FileDescriptor::new("a.png", "", 1, StorageTier::Remote);
    remote.handle = "contents/images/a.png".to_string();
    remote.access_url = Some("https://signed".to_string());
    let record = remote.to_mirror_record();
    assert_eq!(record.handle, "contents/images/a.png");
    assert!(record.access_url.is_none());
}

#[test]
fn descriptor_round_trips_through_json() {
    let descriptor = FileDescriptor::new("a.png", "contents/images/", 5, StorageTier::Remote);
    let json = serde_json::to_string(&descriptor).unwrap();
    assert!(json.contains("\"tier\":\"remote\""));
    assert!(json.contains("\"logicalPath\""));
    let back: FileDescriptor = serde_json::from_str(&json).unwrap();
    assert_eq!(back, descriptor);
}

#[test]
fn usage_report_totals_and_tier_breakdown() {
    let a = FileDescriptor::new("a.png", "", 100, StorageTier::EphemeralBinary);
    let b = FileDescriptor::new("b.png", "", 50, StorageTier::EphemeralKv);
    let report = UsageReport::new([&a, &b], 80, 1000);

    assert_eq!(*report.total_bytes(), 150);
    assert_eq!(*report.total_count(), 2);
    assert_eq!(report.bytes_in(StorageTier::EphemeralKv), 50);
    assert_eq!(report.bytes_in(StorageTier::Remote), 0);
    assert!(report.to_string().contains("150 Bytes in 2 files"));
}
