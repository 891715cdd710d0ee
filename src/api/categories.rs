use crate::error::ApiResult;
use crate::models::{Category, CategoryPayload};

use super::ApiClient;

impl ApiClient {
    pub async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        self.get_json("/categories").await
    }

    pub async fn create_category(&self, payload: &CategoryPayload) -> ApiResult<Category> {
        self.post_json("/categories", payload).await
    }

    pub async fn update_category(&self, id: i64, payload: &CategoryPayload) -> ApiResult<()> {
        self.put_empty(&format!("/categories/{}", id), payload).await
    }

    pub async fn delete_category(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/categories/{}", id)).await
    }
}
