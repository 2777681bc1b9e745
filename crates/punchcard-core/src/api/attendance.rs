use super::{ApiClient, ApiError};
use crate::models::{ListQuery, Resource};

/// `/attendance` endpoints: clocking in and out, history, statistics
pub struct AttendanceApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn attendance(&self) -> AttendanceApi<'_> {
        AttendanceApi { client: self }
    }
}

impl AttendanceApi<'_> {
    pub async fn clock_in(&self) -> Result<Resource, ApiError> {
        self.client.post_empty("/attendance/clock-in").await
    }

    pub async fn clock_out(&self) -> Result<Resource, ApiError> {
        self.client.post_empty("/attendance/clock-out").await
    }

    /// Today's record for the signed-in user
    pub async fn today(&self) -> Result<Resource, ApiError> {
        self.client.get("/attendance/today").await
    }

    pub async fn history(&self, query: &ListQuery) -> Result<Resource, ApiError> {
        self.client.get_with_query("/attendance/history", query).await
    }

    pub async fn statistics(&self, query: &ListQuery) -> Result<Resource, ApiError> {
        self.client.get_with_query("/attendance/statistics", query).await
    }
}
