use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::models::{TestResult, TestResultStatus};

use super::ApiClient;

/// Result attachments may be larger than request attachments.
pub const MAX_RESULT_ATTACHMENT_BYTES: u64 = 50 * 1024 * 1024;

/// Validation decision on a single result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationDecision {
    Approve,
    Reject,
}

impl ValidationDecision {
    fn as_str(&self) -> &'static str {
        match self {
            ValidationDecision::Approve => "approve",
            ValidationDecision::Reject => "reject",
        }
    }
}

impl ApiClient {
    pub async fn list_test_results(&self, request_id: i64) -> ApiResult<Vec<TestResult>> {
        self.get_json(&format!("/requests/{}/test-results", request_id))
            .await
    }

    /// Record a result text and mark the item's status. The backend rejects
    /// this unless the caller's department owns the test type.
    pub async fn save_test_result(
        &self,
        request_id: i64,
        test_type_id: i64,
        result_text: &str,
        status: TestResultStatus,
    ) -> ApiResult<()> {
        self.post_empty(
            "/test-results",
            &json!({
                "lab_request_id": request_id,
                "test_type_id": test_type_id,
                "result_text": result_text,
                "status": status.as_str(),
            }),
        )
        .await
    }

    pub async fn upload_result_attachment(
        &self,
        result_id: i64,
        path: &Path,
    ) -> ApiResult<()> {
        let size = std::fs::metadata(path)
            .map_err(|e| {
                ApiError::ValidationFailed(format!(
                    "attachment {} is not readable: {}",
                    path.display(),
                    e
                ))
            })?
            .len();
        if size > MAX_RESULT_ATTACHMENT_BYTES {
            return Err(ApiError::ValidationFailed(
                "attachment exceeds the 50 MB limit".to_string(),
            ));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::ValidationFailed(format!("cannot read attachment: {}", e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));

        let response = self
            .post_multipart::<serde_json::Value>(
                &format!("/test-results/{}/attachment", result_id),
                form,
            )
            .await?;
        tracing::debug!("Result attachment stored: {}", response);
        Ok(())
    }

    pub async fn download_result_attachment(&self, result_id: i64) -> ApiResult<Vec<u8>> {
        self.get_bytes(&format!("/test-results/{}/attachment", result_id))
            .await
    }

    /// Accept one result or send it back for rework with a reason.
    pub async fn validate_test_result(
        &self,
        result_id: i64,
        decision: ValidationDecision,
        rejection_reason: Option<&str>,
    ) -> ApiResult<()> {
        if decision == ValidationDecision::Reject
            && rejection_reason.map_or(true, |r| r.trim().is_empty())
        {
            return Err(ApiError::ValidationFailed(
                "a rejection reason is required".to_string(),
            ));
        }
        self.put_empty(
            &format!("/test-results/{}/validate", result_id),
            &json!({
                "action": decision.as_str(),
                "rejection_reason": rejection_reason.unwrap_or(""),
            }),
        )
        .await
    }

    /// Department staff hand their finished work over for validation.
    pub async fn submit_for_validation(&self, request_id: i64) -> ApiResult<()> {
        self.post_empty(&format!("/requests/{}/submit-validation", request_id), &json!({}))
            .await
    }

    /// Close the request once every result passed validation.
    pub async fn complete_validation(&self, request_id: i64) -> ApiResult<()> {
        self.post_empty(
            &format!("/requests/{}/complete-validation", request_id),
            &json!({}),
        )
        .await
    }
}
