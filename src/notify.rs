//! Webhook notifier — forwards each completed record to a configured URL.
//!
//! One POST per record, no retry, no queue. Disabled entirely when no
//! webhook URL is configured.

use std::time::Duration;

use tracing::debug;

use crate::error::NotifyError;
use crate::store::QueryRecord;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts completed records to the configured webhook.
pub struct WebhookNotifier {
    url: Option<String>,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: Option<String>) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Deliver the record. A missing URL is a silent no-op.
    pub async fn send(&self, record: &QueryRecord) -> Result<(), NotifyError> {
        let Some(url) = self.url.as_deref() else {
            debug!(record_id = %record.id, "No webhook URL configured, skipping delivery");
            return Ok(());
        };

        let resp = self
            .client
            .post(url)
            .json(&payload(record))
            .timeout(WEBHOOK_TIMEOUT)
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(NotifyError::Status {
                status: resp.status().as_u16(),
            });
        }

        debug!(record_id = %record.id, "Webhook delivered");
        Ok(())
    }
}

/// Webhook payload shape expected by the downstream automation.
fn payload(record: &QueryRecord) -> serde_json::Value {
    serde_json::json!({
        "Student Name": record.student_name,
        "Academic Year": record.academic_year,
        "Student Query": record.student_query,
        "unit": record.routed_unit.as_str(),
    })
}
