use serde_json::json;

use crate::error::ApiResult;
use crate::models::{Notification, UnreadCount};

use super::ApiClient;

impl ApiClient {
    pub async fn list_notifications(&self) -> ApiResult<Vec<Notification>> {
        self.get_json("/notifications").await
    }

    /// Cheap endpoint the poller hits on its interval.
    pub async fn unread_notification_count(&self) -> ApiResult<u64> {
        let body: UnreadCount = self.get_json("/notifications/unread-count").await?;
        Ok(body.count)
    }

    pub async fn mark_notification_read(&self, id: i64) -> ApiResult<()> {
        self.put_empty(&format!("/notifications/{}/read", id), &json!({}))
            .await
    }

    pub async fn mark_all_notifications_read(&self) -> ApiResult<()> {
        self.put_empty("/notifications/read-all", &json!({})).await
    }
}
