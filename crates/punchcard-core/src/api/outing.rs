use super::{ApiClient, ApiError};
use crate::models::{ListQuery, Resource};

/// `/outing` endpoints for off-site reports
pub struct OutingApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn outing(&self) -> OutingApi<'_> {
        OutingApi { client: self }
    }
}

impl OutingApi<'_> {
    pub async fn list(&self, query: &ListQuery) -> Result<Resource, ApiError> {
        self.client.get_with_query("/outing/reports", query).await
    }

    pub async fn create(&self, data: &Resource) -> Result<Resource, ApiError> {
        self.client.post("/outing/reports", data).await
    }

    pub async fn get(&self, id: i64) -> Result<Resource, ApiError> {
        self.client.get(&format!("/outing/reports/{}", id)).await
    }

    pub async fn update(&self, id: i64, data: &Resource) -> Result<Resource, ApiError> {
        self.client.put(&format!("/outing/reports/{}", id), data).await
    }

    pub async fn approve(&self, id: i64, data: &Resource) -> Result<Resource, ApiError> {
        self.client.post(&format!("/outing/reports/{}/approve", id), data).await
    }

    /// Mark the outing as finished (the employee is back)
    pub async fn complete(&self, id: i64) -> Result<Resource, ApiError> {
        self.client.post_empty(&format!("/outing/reports/{}/complete", id)).await
    }

    pub async fn delete(&self, id: i64) -> Result<Resource, ApiError> {
        self.client.delete(&format!("/outing/reports/{}", id)).await
    }

    pub async fn current(&self) -> Result<Resource, ApiError> {
        self.client.get("/outing/current").await
    }
}
