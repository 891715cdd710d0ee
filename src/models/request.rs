use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::lifecycle::RequestStatus;

use super::Category;

/// One lab-test submission as returned by `/requests`.
///
/// Field names follow the backend wire format. Anything the backend may omit
/// or null out is optional so an older record never fails to parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabRequest {
    pub id: i64,
    #[serde(default)]
    pub request_number: Option<String>,
    #[serde(default)]
    pub internal_id: Option<String>,
    /// Legacy identifier kept for pre-v6.7 records.
    #[serde(default)]
    pub sample_id: Option<String>,
    #[serde(default)]
    pub sample_description: Option<String>,
    #[serde(default)]
    pub sampling_datetime: Option<NaiveDateTime>,
    #[serde(default)]
    pub sampling_location: Option<String>,
    #[serde(default)]
    pub logistics_type: LogisticsType,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub attachment_filename: Option<String>,
    pub status: RequestStatus,
    #[serde(default)]
    pub total_price: Option<f64>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default, alias = "test_types")]
    pub test_results: Vec<TestResult>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub approved_at: Option<NaiveDateTime>,
}

impl LabRequest {
    /// Identifier shown to people: request number when assigned, otherwise the
    /// company-local id.
    pub fn display_id(&self) -> &str {
        self.request_number
            .as_deref()
            .or(self.internal_id.as_deref())
            .or(self.sample_id.as_deref())
            .unwrap_or("-")
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == Some(user_id)
    }

    pub fn belongs_to_company(&self, company_id: Option<i64>) -> bool {
        match (self.company_id, company_id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// True when at least one test item is owned by the given department.
    pub fn has_department(&self, department_id: i64) -> bool {
        self.test_results
            .iter()
            .any(|tr| tr.department_id == Some(department_id))
    }
}

/// One requested test type within a request, independently completable by the
/// owning department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Result row id; 0 until the lab stores a result for this item.
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub test_type_id: i64,
    #[serde(default, alias = "name")]
    pub test_type_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(default)]
    pub department_name: Option<String>,
    #[serde(default)]
    pub status: TestResultStatus,
    #[serde(default)]
    pub result_text: Option<String>,
    #[serde(default)]
    pub result_filename: Option<String>,
    #[serde(default)]
    pub completed_by: Option<String>,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TestResultStatus {
    Completed,
    /// Returned for rework during validation.
    InProgress,
    #[default]
    Pending,
}

impl TestResultStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, TestResultStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestResultStatus::Completed => "completed",
            TestResultStatus::InProgress => "in_progress",
            TestResultStatus::Pending => "pending",
        }
    }
}

impl From<String> for TestResultStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "completed" => TestResultStatus::Completed,
            "in_progress" => TestResultStatus::InProgress,
            // anything unrecognized still needs processing
            _ => TestResultStatus::Pending,
        }
    }
}

impl From<TestResultStatus> for String {
    fn from(status: TestResultStatus) -> Self {
        status.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Urgency {
    #[default]
    Normal,
    Urgent,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::Urgent => "urgent",
            Urgency::Critical => "critical",
        }
    }
}

impl From<String> for Urgency {
    fn from(value: String) -> Self {
        match value.as_str() {
            "urgent" => Urgency::Urgent,
            "critical" => Urgency::Critical,
            _ => Urgency::Normal,
        }
    }
}

impl From<Urgency> for String {
    fn from(value: Urgency) -> Self {
        value.as_str().to_string()
    }
}

/// Who ships the sample to the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogisticsType {
    #[default]
    Sender,
    Provider,
}

impl LogisticsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogisticsType::Sender => "sender",
            LogisticsType::Provider => "provider",
        }
    }
}

impl From<String> for LogisticsType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "provider" => LogisticsType::Provider,
            _ => LogisticsType::Sender,
        }
    }
}

impl From<LogisticsType> for String {
    fn from(value: LogisticsType) -> Self {
        value.as_str().to_string()
    }
}
