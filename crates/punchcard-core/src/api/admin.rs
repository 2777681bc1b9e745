use super::{ApiClient, ApiError};
use crate::models::{ListQuery, Resource};

/// `/admin` endpoints: user management, system settings, attendance oversight
pub struct AdminApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi { client: self }
    }
}

impl AdminApi<'_> {
    // ===== Users =====

    pub async fn users(&self, query: &ListQuery) -> Result<Resource, ApiError> {
        self.client.get_with_query("/admin/users", query).await
    }

    pub async fn create_user(&self, data: &Resource) -> Result<Resource, ApiError> {
        self.client.post("/admin/users", data).await
    }

    pub async fn update_user(&self, id: i64, data: &Resource) -> Result<Resource, ApiError> {
        self.client.put(&format!("/admin/users/{}", id), data).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<Resource, ApiError> {
        self.client.delete(&format!("/admin/users/{}", id)).await
    }

    // ===== Settings =====

    pub async fn settings(&self) -> Result<Resource, ApiError> {
        self.client.get("/admin/settings").await
    }

    pub async fn update_settings(&self, data: &Resource) -> Result<Resource, ApiError> {
        self.client.post("/admin/settings", data).await
    }

    // ===== Attendance =====

    pub async fn attendance_records(&self, query: &ListQuery) -> Result<Resource, ApiError> {
        self.client.get_with_query("/admin/attendance/records", query).await
    }

    pub async fn attendance_statistics(&self, query: &ListQuery) -> Result<Resource, ApiError> {
        self.client.get_with_query("/admin/attendance/statistics", query).await
    }
}
