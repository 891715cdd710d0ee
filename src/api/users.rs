use crate::error::ApiResult;
use crate::models::{User, UserPayload};

use super::ApiClient;

impl ApiClient {
    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.get_json("/users").await
    }

    pub async fn create_user(&self, payload: &UserPayload) -> ApiResult<User> {
        self.post_json("/users", payload).await
    }

    pub async fn update_user(&self, id: i64, payload: &UserPayload) -> ApiResult<()> {
        self.put_empty(&format!("/users/{}", id), payload).await
    }

    pub async fn delete_user(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/users/{}", id)).await
    }
}
