/*
 * Responsibility
 * - Video request/response DTOs
 * - validate() for shape checks before reaching the repository
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ContentType, NewVideo, Video};

const MAX_URL_LEN: usize = 2048;
const MAX_DESCRIPTION_LEN: usize = 1024;

#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub url: String,
    pub content_type: ContentType,
    #[serde(default)]
    pub description: String,
}

impl CreateVideoRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.url.trim().is_empty() {
            return Err("url is required");
        }
        if self.url.len() > MAX_URL_LEN {
            return Err("url is too long");
        }
        if self.description.len() > MAX_DESCRIPTION_LEN {
            return Err("description is too long");
        }
        Ok(())
    }

    pub fn into_new_video(self) -> NewVideo {
        NewVideo {
            url: self.url.trim().to_string(),
            content_type: self.content_type,
            description: self.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub id: Uuid,
    pub url: String,
    pub content_type: ContentType,
    pub description: String,
}

impl From<Video> for VideoResponse {
    fn from(v: Video) -> Self {
        Self {
            id: v.id,
            url: v.url,
            content_type: v.content_type,
            description: v.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VideosResponse {
    pub videos: Vec<VideoResponse>,
}
