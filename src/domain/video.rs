/*
 * Responsibility
 * - Video resource domain types
 * - Persistence-agnostic (repos/ decides how these are stored)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    Temperature,
    Weighting,
    BreastFeeding,
    BottleFeeding,
    DiaperChange,
    Sleeping,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    pub id: Uuid,
    pub url: String,
    pub content_type: ContentType,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when creating a video.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub url: String,
    pub content_type: ContentType,
    pub description: String,
}

impl Video {
    pub fn create(new: NewVideo) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: new.url,
            content_type: new.content_type,
            description: new.description,
            created_at: Utc::now(),
        }
    }
}
