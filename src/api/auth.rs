use serde::Deserialize;
use serde_json::json;

use crate::error::ApiResult;
use crate::models::User;

use super::ApiClient;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

impl ApiClient {
    /// Exchange credentials for a bearer token and the user's profile.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        self.post_json(
            "/auth/login",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Profile of the token's owner; used to re-validate a persisted session.
    pub async fn me(&self) -> ApiResult<User> {
        self.get_json("/auth/me").await
    }
}
