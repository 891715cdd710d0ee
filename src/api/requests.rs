use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::lifecycle::RequestStatus;
use crate::models::{LabRequest, LogisticsType, Urgency};

use super::ApiClient;

/// Attachments above this are rejected before any upload starts.
pub const MAX_ATTACHMENT_BYTES: u64 = 20 * 1024 * 1024;

/// Everything a request create/update sends to the backend. Assembled into a
/// multipart form because the attachment rides along in the same call.
#[derive(Debug, Clone, Default)]
pub struct RequestForm {
    pub internal_id: String,
    pub sample_description: String,
    pub sampling_datetime: Option<NaiveDateTime>,
    pub sampling_location: String,
    pub logistics_type: LogisticsType,
    pub shipping_address: String,
    pub contact_person: String,
    pub contact_phone: String,
    pub urgency: Urgency,
    pub deadline: Option<NaiveDate>,
    pub special_instructions: String,
    pub test_type_ids: Vec<i64>,
    pub attachment: Option<PathBuf>,
}

impl RequestForm {
    /// Client-side checks, raised before any network call. Mirrors what the
    /// backend enforces so the user hears about problems immediately.
    pub fn validate(&self) -> ApiResult<()> {
        if self.sample_description.trim().is_empty() {
            return Err(ApiError::ValidationFailed(
                "sample description is required".to_string(),
            ));
        }
        if self.sampling_datetime.is_none() {
            return Err(ApiError::ValidationFailed(
                "sampling date and time are required".to_string(),
            ));
        }
        if self.sampling_location.trim().is_empty() {
            return Err(ApiError::ValidationFailed(
                "sampling location is required".to_string(),
            ));
        }
        if self.logistics_type == LogisticsType::Provider
            && self.shipping_address.trim().is_empty()
        {
            return Err(ApiError::ValidationFailed(
                "shipping address is required when the provider ships".to_string(),
            ));
        }
        if self.contact_person.trim().is_empty() {
            return Err(ApiError::ValidationFailed(
                "contact person is required".to_string(),
            ));
        }
        if self.contact_phone.trim().is_empty() {
            return Err(ApiError::ValidationFailed(
                "contact phone is required".to_string(),
            ));
        }
        if self.test_type_ids.is_empty() {
            return Err(ApiError::ValidationFailed(
                "select at least one test type".to_string(),
            ));
        }
        if let Some(path) = &self.attachment {
            let size = std::fs::metadata(path)
                .map_err(|e| {
                    ApiError::ValidationFailed(format!(
                        "attachment {} is not readable: {}",
                        path.display(),
                        e
                    ))
                })?
                .len();
            if size > MAX_ATTACHMENT_BYTES {
                return Err(ApiError::ValidationFailed(
                    "attachment exceeds the 20 MB limit".to_string(),
                ));
            }
        }
        Ok(())
    }

    async fn into_form(self, status: &RequestStatus) -> ApiResult<Form> {
        let mut form = Form::new()
            .text("internal_id", self.internal_id.clone())
            // legacy field the backend still expects
            .text(
                "sample_id",
                if self.internal_id.is_empty() {
                    "AUTO".to_string()
                } else {
                    self.internal_id
                },
            )
            .text("sample_description", self.sample_description)
            .text(
                "sampling_datetime",
                self.sampling_datetime
                    .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
                    .unwrap_or_default(),
            )
            .text("sampling_location", self.sampling_location)
            .text("logistics_type", self.logistics_type.as_str())
            .text("shipping_address", self.shipping_address)
            .text("contact_person", self.contact_person)
            .text("contact_phone", self.contact_phone)
            .text("urgency", self.urgency.as_str())
            .text(
                "deadline",
                self.deadline.map(|d| d.to_string()).unwrap_or_default(),
            )
            .text("special_instructions", self.special_instructions)
            .text("test_types", serde_json::to_string(&self.test_type_ids)?)
            .text("status", status.as_str().to_string());

        if let Some(path) = self.attachment {
            let bytes = tokio::fs::read(&path).await.map_err(|e| {
                ApiError::ValidationFailed(format!("cannot read attachment: {}", e))
            })?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            form = form.part("attachment", Part::bytes(bytes).file_name(file_name));
        }

        Ok(form)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub request_number: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiClient {
    /// Requests visible to the caller; the backend applies the same
    /// role/company scoping as [`crate::access::can_view`].
    pub async fn list_requests(&self) -> ApiResult<Vec<LabRequest>> {
        self.get_json("/requests").await
    }

    pub async fn get_request(&self, id: i64) -> ApiResult<LabRequest> {
        self.get_json(&format!("/requests/{}", id)).await
    }

    /// Department worklist for the logged-in staff member.
    pub async fn my_worklist(&self) -> ApiResult<Vec<LabRequest>> {
        self.get_json("/my-worklist").await
    }

    /// Create a request in the given initial status (`draft`,
    /// `pending_approval` or `awaiting_shipment` depending on who submits).
    pub async fn create_request(
        &self,
        form: RequestForm,
        status: &RequestStatus,
    ) -> ApiResult<CreatedRequest> {
        form.validate()?;
        let form = form.into_form(status).await?;
        self.post_multipart("/requests", form).await
    }

    pub async fn update_request(
        &self,
        id: i64,
        form: RequestForm,
        status: &RequestStatus,
    ) -> ApiResult<()> {
        form.validate()?;
        let form = form.into_form(status).await?;
        self.put_multipart(&format!("/requests/{}", id), form).await
    }

    /// Persist a bare status transition; the caller is expected to have run
    /// the change through [`crate::lifecycle::next_actions`] first.
    pub async fn update_request_status(&self, id: i64, status: &RequestStatus) -> ApiResult<()> {
        let form = Form::new().text("status", status.as_str().to_string());
        self.put_multipart(&format!("/requests/{}", id), form).await
    }

    /// Status scan on the logistics endpoint (shipment start / arrival).
    pub async fn logistics_update_status(
        &self,
        id: i64,
        status: &RequestStatus,
    ) -> ApiResult<()> {
        self.put_empty(
            &format!("/logistics/{}/update-status", id),
            &json!({ "status": status.as_str() }),
        )
        .await
    }

    pub async fn delete_request(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/requests/{}", id)).await
    }

    pub async fn download_request_attachment(&self, id: i64) -> ApiResult<Vec<u8>> {
        self.get_bytes(&format!("/requests/{}/attachment", id)).await
    }

    pub async fn download_request_pdf(&self, id: i64) -> ApiResult<Vec<u8>> {
        self.get_bytes(&format!("/requests/{}/pdf", id)).await
    }
}
