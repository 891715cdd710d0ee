use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ApiResult;

use super::ApiClient;

/// Dashboard numbers, already scoped server-side to what the caller may see.
/// Status keys are wire strings; unknown ones pass through untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_requests: u64,
    #[serde(default)]
    pub by_status: HashMap<String, u64>,
    #[serde(default)]
    pub by_category: HashMap<String, u64>,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub revenue_by_status: HashMap<String, f64>,
}

impl ApiClient {
    pub async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        self.get_json("/stats").await
    }
}
