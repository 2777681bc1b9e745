use super::{ApiClient, ApiError};
use crate::models::{ListQuery, Resource};

/// `/diary` endpoints for daily work reports
pub struct DiaryApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn diary(&self) -> DiaryApi<'_> {
        DiaryApi { client: self }
    }
}

impl DiaryApi<'_> {
    pub async fn list(&self, query: &ListQuery) -> Result<Resource, ApiError> {
        self.client.get_with_query("/diary/diaries", query).await
    }

    pub async fn create(&self, data: &Resource) -> Result<Resource, ApiError> {
        self.client.post("/diary/diaries", data).await
    }

    pub async fn get(&self, id: i64) -> Result<Resource, ApiError> {
        self.client.get(&format!("/diary/diaries/{}", id)).await
    }

    pub async fn update(&self, id: i64, data: &Resource) -> Result<Resource, ApiError> {
        self.client.put(&format!("/diary/diaries/{}", id), data).await
    }

    pub async fn delete(&self, id: i64) -> Result<Resource, ApiError> {
        self.client.delete(&format!("/diary/diaries/{}", id)).await
    }

    pub async fn today(&self) -> Result<Resource, ApiError> {
        self.client.get("/diary/today").await
    }

    pub async fn statistics(&self, query: &ListQuery) -> Result<Resource, ApiError> {
        self.client.get_with_query("/diary/statistics", query).await
    }
}
