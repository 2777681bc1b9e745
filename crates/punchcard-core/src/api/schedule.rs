use super::{ApiClient, ApiError};
use crate::models::{ListQuery, Resource};

/// `/schedule` endpoints for shift planning
pub struct ScheduleApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn schedule(&self) -> ScheduleApi<'_> {
        ScheduleApi { client: self }
    }
}

impl ScheduleApi<'_> {
    pub async fn list(&self, query: &ListQuery) -> Result<Resource, ApiError> {
        self.client.get_with_query("/schedule/schedules", query).await
    }

    pub async fn create(&self, data: &Resource) -> Result<Resource, ApiError> {
        self.client.post("/schedule/schedules", data).await
    }

    pub async fn get(&self, id: i64) -> Result<Resource, ApiError> {
        self.client.get(&format!("/schedule/schedules/{}", id)).await
    }

    pub async fn update(&self, id: i64, data: &Resource) -> Result<Resource, ApiError> {
        self.client.put(&format!("/schedule/schedules/{}", id), data).await
    }

    pub async fn delete(&self, id: i64) -> Result<Resource, ApiError> {
        self.client.delete(&format!("/schedule/schedules/{}", id)).await
    }

    /// Shifts assigned to the signed-in user
    pub async fn mine(&self, query: &ListQuery) -> Result<Resource, ApiError> {
        self.client.get_with_query("/schedule/my-schedule", query).await
    }

    pub async fn today(&self) -> Result<Resource, ApiError> {
        self.client.get("/schedule/today").await
    }

    pub async fn shift_types(&self) -> Result<Resource, ApiError> {
        self.client.get("/schedule/shift-types").await
    }

    pub async fn calendar(&self, query: &ListQuery) -> Result<Resource, ApiError> {
        self.client.get_with_query("/schedule/calendar", query).await
    }
}
