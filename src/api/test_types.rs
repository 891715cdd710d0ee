use crate::error::ApiResult;
use crate::models::{TestType, TestTypePayload};

use super::ApiClient;

impl ApiClient {
    pub async fn list_test_types(&self) -> ApiResult<Vec<TestType>> {
        self.get_json("/test-types").await
    }

    pub async fn create_test_type(&self, payload: &TestTypePayload) -> ApiResult<TestType> {
        self.post_json("/test-types", payload).await
    }

    pub async fn update_test_type(&self, id: i64, payload: &TestTypePayload) -> ApiResult<()> {
        self.put_empty(&format!("/test-types/{}", id), payload).await
    }

    pub async fn delete_test_type(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/test-types/{}", id)).await
    }
}
