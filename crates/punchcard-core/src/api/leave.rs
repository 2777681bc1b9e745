use super::{ApiClient, ApiError};
use crate::models::{ListQuery, Resource};

/// `/leave` endpoints
pub struct LeaveApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn leave(&self) -> LeaveApi<'_> {
        LeaveApi { client: self }
    }
}

impl LeaveApi<'_> {
    pub async fn list(&self, query: &ListQuery) -> Result<Resource, ApiError> {
        self.client.get_with_query("/leave/requests", query).await
    }

    pub async fn create(&self, data: &Resource) -> Result<Resource, ApiError> {
        self.client.post("/leave/requests", data).await
    }

    pub async fn get(&self, id: i64) -> Result<Resource, ApiError> {
        self.client.get(&format!("/leave/requests/{}", id)).await
    }

    pub async fn update(&self, id: i64, data: &Resource) -> Result<Resource, ApiError> {
        self.client.put(&format!("/leave/requests/{}", id), data).await
    }

    pub async fn approve(&self, id: i64, data: &Resource) -> Result<Resource, ApiError> {
        self.client.post(&format!("/leave/requests/{}/approve", id), data).await
    }

    pub async fn delete(&self, id: i64) -> Result<Resource, ApiError> {
        self.client.delete(&format!("/leave/requests/{}", id)).await
    }

    pub async fn types(&self) -> Result<Resource, ApiError> {
        self.client.get("/leave/types").await
    }
}
