use super::{ApiClient, ApiError};
use crate::models::{ListQuery, Resource};

/// `/expense` endpoints
pub struct ExpenseApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn expense(&self) -> ExpenseApi<'_> {
        ExpenseApi { client: self }
    }
}

impl ExpenseApi<'_> {
    pub async fn list(&self, query: &ListQuery) -> Result<Resource, ApiError> {
        self.client.get_with_query("/expense/reports", query).await
    }

    pub async fn create(&self, data: &Resource) -> Result<Resource, ApiError> {
        self.client.post("/expense/reports", data).await
    }

    pub async fn get(&self, id: i64) -> Result<Resource, ApiError> {
        self.client.get(&format!("/expense/reports/{}", id)).await
    }

    pub async fn update(&self, id: i64, data: &Resource) -> Result<Resource, ApiError> {
        self.client.put(&format!("/expense/reports/{}", id), data).await
    }

    pub async fn approve(&self, id: i64, data: &Resource) -> Result<Resource, ApiError> {
        self.client.post(&format!("/expense/reports/{}/approve", id), data).await
    }

    pub async fn delete(&self, id: i64) -> Result<Resource, ApiError> {
        self.client.delete(&format!("/expense/reports/{}", id)).await
    }

    pub async fn types(&self) -> Result<Resource, ApiError> {
        self.client.get("/expense/types").await
    }

    pub async fn statistics(&self, query: &ListQuery) -> Result<Resource, ApiError> {
        self.client.get_with_query("/expense/statistics", query).await
    }
}
