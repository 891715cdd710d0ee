use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::error::{ApiError, ApiResult};
use crate::models::{Company, CompanyPayload};

use super::ApiClient;

impl ApiClient {
    pub async fn list_companies(&self) -> ApiResult<Vec<Company>> {
        self.get_json("/companies").await
    }

    pub async fn update_company(&self, id: i64, payload: &CompanyPayload) -> ApiResult<()> {
        self.put_empty(&format!("/companies/{}", id), payload).await
    }

    pub async fn upload_company_logo(&self, id: i64, path: &Path) -> ApiResult<()> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::ValidationFailed(format!("cannot read logo: {}", e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "logo".to_string());
        let form = Form::new().part("logo", Part::bytes(bytes).file_name(file_name));
        let _: serde_json::Value = self
            .post_multipart(&format!("/companies/{}/logo", id), form)
            .await?;
        Ok(())
    }

    pub async fn download_company_logo(&self, id: i64) -> ApiResult<Vec<u8>> {
        self.get_bytes(&format!("/companies/{}/logo", id)).await
    }
}
