use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Where a processed video lives in object storage.
///
/// Kept structured (not a URL string) so the stored form is unambiguous;
/// it is rendered to a URL only when building a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VideoLocation {
    pub bucket: String,
    pub key: String,
    pub region: Option<String>,
}

impl VideoLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, region: Option<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            region,
        }
    }

    /// Virtual-hosted style S3 URL. Only readable if the bucket allows public reads.
    pub fn public_url(&self) -> String {
        match self.region.as_deref() {
            Some(region) => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, region, self.key
            ),
            None => format!("https://{}.s3.amazonaws.com/{}", self.bucket, self.key),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub location: Option<VideoLocation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn new(user_id: Uuid, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: description.into(),
            thumbnail_url: None,
            location: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub fn storage_key(&self) -> Option<&str> {
        self.location.as_ref().map(|l| l.key.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    /// Time-limited URL for playback, present once a video has been uploaded.
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<VideoLocation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoResponse {
    pub fn new(video: Video, video_url: Option<String>) -> Self {
        VideoResponse {
            id: video.id,
            user_id: video.user_id,
            title: video.title,
            description: video.description,
            thumbnail_url: video.thumbnail_url,
            video_url,
            location: video.location,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_with_region() {
        let location = VideoLocation::new(
            "tubely-videos",
            "landscape/abc.mp4",
            Some("us-east-2".to_string()),
        );
        assert_eq!(
            location.public_url(),
            "https://tubely-videos.s3.us-east-2.amazonaws.com/landscape/abc.mp4"
        );
    }

    #[test]
    fn test_public_url_without_region() {
        let location = VideoLocation::new("tubely-videos", "other/x.mp4", None);
        assert_eq!(
            location.public_url(),
            "https://tubely-videos.s3.amazonaws.com/other/x.mp4"
        );
    }

    #[test]
    fn test_new_video_has_no_location() {
        let owner = Uuid::new_v4();
        let video = Video::new(owner, "Boots", "A pair of boots");
        assert!(video.location.is_none());
        assert!(video.is_owned_by(owner));
        assert!(!video.is_owned_by(Uuid::new_v4()));
        assert_eq!(video.storage_key(), None);
    }

    #[test]
    fn test_response_carries_rendered_url() {
        let mut video = Video::new(Uuid::new_v4(), "t", "d");
        video.location = Some(VideoLocation::new("b", "portrait/k.mp4", None));
        let response = VideoResponse::new(video, Some("https://signed".to_string()));
        assert_eq!(response.video_url.as_deref(), Some("https://signed"));
        assert_eq!(response.location.unwrap().key, "portrait/k.mp4");
    }
}
