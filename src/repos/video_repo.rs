/*
 * Responsibility
 * - Storage port for the video resource
 * - In-process implementation; a document-store adapter plugs in behind the same trait
 */
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{NewVideo, Video};
use crate::repos::error::RepoError;

#[async_trait]
pub trait VideoRepository: Send + Sync {
    // Newest first.
    async fn list(&self) -> Result<Vec<Video>, RepoError>;

    async fn get(&self, id: Uuid) -> Result<Video, RepoError>;

    async fn create(&self, new: NewVideo) -> Result<Video, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

#[derive(Debug, Default)]
pub struct InMemoryVideoRepository {
    videos: RwLock<HashMap<Uuid, Video>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn list(&self) -> Result<Vec<Video>, RepoError> {
        let mut videos: Vec<Video> = self.videos.read().await.values().cloned().collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn get(&self, id: Uuid) -> Result<Video, RepoError> {
        self.videos
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn create(&self, new: NewVideo) -> Result<Video, RepoError> {
        let video = Video::create(new);
        self.videos.write().await.insert(video.id, video.clone());
        Ok(video)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.videos
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}
