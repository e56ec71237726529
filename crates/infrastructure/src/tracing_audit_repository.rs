use async_trait::async_trait;
use gatehouse_application::{AuditEvent, AuditRepository};
use gatehouse_core::AppResult;
use tracing::info;

/// Audit sink that writes each event to the structured log.
///
/// Used when no database is configured; events do not outlive the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditRepository;

#[async_trait]
impl AuditRepository for TracingAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        info!(
            subject = %event.subject,
            action = event.action.as_str(),
            resource_type = %event.resource_type,
            resource_id = %event.resource_id,
            detail = event.detail.as_deref().unwrap_or_default(),
            "audit event"
        );
        Ok(())
    }
}
