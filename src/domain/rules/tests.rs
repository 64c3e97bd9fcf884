// Unit tests for business rules

use super::*;

fn info(duration: u64) -> VideoInfo {
    VideoInfo::new("Talk", duration, None)
}

#[test]
fn test_validate_range_accepts_full_video() {
    assert!(RequestValidator::validate_range(0, 60, 60).is_ok());
}

#[test]
fn test_validate_range_rejects_reversed_or_empty() {
    assert!(matches!(
        RequestValidator::validate_range(20, 10, 60),
        Err(DomainError::InvalidTimeRange(_))
    ));
    assert!(matches!(
        RequestValidator::validate_range(10, 10, 60),
        Err(DomainError::InvalidTimeRange(_))
    ));
}

#[test]
fn test_validate_range_rejects_past_duration() {
    assert!(matches!(
        RequestValidator::validate_range(10, 61, 60),
        Err(DomainError::InvalidTimeRange(_))
    ));
}

#[test]
fn test_clip_request_rejects_invalid_range() {
    let err = ClipRequest::new("https://v.example/1", "/tmp", 30, 10, OutputFormat::Video, &info(60))
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidTimeRange(_)));

    let err = ClipRequest::new("https://v.example/1", "/tmp", 0, 61, OutputFormat::Video, &info(60))
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidTimeRange(_)));
}

#[test]
fn test_clip_request_rejects_missing_fields() {
    assert_eq!(
        ClipRequest::new("  ", "/tmp", 0, 10, OutputFormat::Video, &info(60)).unwrap_err(),
        DomainError::MissingField("source URL")
    );
    assert_eq!(
        ClipRequest::new("https://v.example/1", "", 0, 10, OutputFormat::Video, &info(60))
            .unwrap_err(),
        DomainError::MissingField("output folder")
    );
}

#[test]
fn test_clip_file_name() {
    assert_eq!(
        ClipNaming::clip_file_name("My Clip", 10, 20, OutputFormat::Video),
        "My_Clip_000010_000020.mp4"
    );
    assert_eq!(
        ClipNaming::clip_file_name("a/b: c?", 3600, 3725, OutputFormat::Audio),
        "ab_c_010000_010205.mp3"
    );
}

#[test]
fn test_title_stem_fallback() {
    assert_eq!(ClipNaming::title_stem("???"), "clip");
    assert_eq!(ClipNaming::title_stem("   "), "clip");
    assert_eq!(ClipNaming::title_stem("  Live   at  Café "), "Live_at_Café");
}
