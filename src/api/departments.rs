use crate::error::ApiResult;
use crate::models::{Department, DepartmentPayload};

use super::ApiClient;

impl ApiClient {
    pub async fn list_departments(&self) -> ApiResult<Vec<Department>> {
        self.get_json("/departments").await
    }

    pub async fn create_department(&self, payload: &DepartmentPayload) -> ApiResult<Department> {
        self.post_json("/departments", payload).await
    }

    pub async fn update_department(&self, id: i64, payload: &DepartmentPayload) -> ApiResult<()> {
        self.put_empty(&format!("/departments/{}", id), payload).await
    }

    pub async fn delete_department(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/departments/{}", id)).await
    }
}
