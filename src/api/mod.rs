//! Typed wrappers over the backend REST API. One module per entity, all
//! going through [`ApiClient`] which owns the base URL, the bearer token and
//! the HTTP-status → error mapping.

pub mod auth;
pub mod categories;
pub mod companies;
pub mod departments;
pub mod notifications;
pub mod requests;
pub mod stats;
pub mod test_results;
pub mod test_types;
pub mod users;

pub use auth::LoginResponse;
pub use requests::{CreatedRequest, RequestForm};
pub use stats::DashboardStats;

use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::session::Session;

/// Error body shape the backend uses for every failure.
#[derive(Debug, Deserialize)]
struct ServerMessage {
    message: String,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url,
            token: None,
        }
    }

    pub fn with_session(base_url: impl Into<String>, session: &Session) -> Self {
        let mut client = Self::new(base_url);
        client.token = Some(session.token.clone());
        client
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, self.endpoint(path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Maps non-2xx responses onto the error taxonomy, pulling the backend's
    /// message out of the body when there is one.
    async fn check(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let fallback = status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
        let message = response
            .json::<ServerMessage>()
            .await
            .map(|body| body.message)
            .unwrap_or(fallback);

        Err(match status.as_u16() {
            401 => ApiError::Unauthenticated(message),
            403 => ApiError::AuthorizationDenied(message),
            404 => ApiError::NotFound(message),
            code => ApiError::Server {
                status: code,
                message,
            },
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.request(Method::GET, path).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// POST where the caller does not care about the response body.
    pub(crate) async fn post_empty<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<()> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    pub(crate) async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.request(Method::PUT, path).json(body).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub(crate) async fn put_empty<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<()> {
        let response = self.request(Method::PUT, path).json(body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    pub(crate) async fn delete(&self, path: &str) -> ApiResult<()> {
        let response = self.request(Method::DELETE, path).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> ApiResult<T> {
        let response = self
            .request(Method::POST, path)
            .multipart(form)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub(crate) async fn put_multipart(&self, path: &str, form: Form) -> ApiResult<()> {
        let response = self
            .request(Method::PUT, path)
            .multipart(form)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Binary download (attachments, PDF exports).
    pub(crate) async fn get_bytes(&self, path: &str) -> ApiResult<Vec<u8>> {
        let response = self.request(Method::GET, path).send().await?;
        let response = Self::check(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:5000/api/");
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(
            client.endpoint("/requests/1"),
            "http://localhost:5000/api/requests/1"
        );
    }

    #[test]
    fn test_with_session_carries_token() {
        use crate::models::{Role, User};

        let session = Session::new(
            "abc".to_string(),
            User {
                id: 1,
                name: "n".to_string(),
                email: "e@example.com".to_string(),
                role: Role::SuperAdmin,
                company_id: None,
                company_name: None,
                department_id: None,
                department_name: None,
                phone: None,
                active: true,
            },
        );
        let client = ApiClient::with_session("http://localhost:5000/api", &session);
        assert_eq!(client.token.as_deref(), Some("abc"));
    }
}
