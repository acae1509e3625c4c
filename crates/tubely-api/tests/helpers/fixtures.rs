use axum_test::multipart::{MultipartForm, Part};
use tubely_core::models::Video;
use tubely_processing::test_helpers::MockVideoRepository;
use uuid::Uuid;

/// Bytes that look enough like an MP4 for the fakes.
pub fn fake_mp4() -> Vec<u8> {
    let mut data = b"\x00\x00\x00\x18ftypmp42".to_vec();
    data.extend_from_slice(&[0u8; 256]);
    data
}

/// Multipart form with one `video` part
pub fn video_form(data: Vec<u8>, content_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "video",
        Part::bytes(data)
            .file_name("boots.mp4")
            .mime_type(content_type),
    )
}

/// Insert a record owned by `owner` and return it
pub fn seed_video(videos: &MockVideoRepository, owner: Uuid, title: &str) -> Video {
    videos.insert(Video::new(owner, title, "seeded for tests"))
}
