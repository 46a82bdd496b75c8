//! Audit recording for authorization-gated mutations

use crate::{
    models::{
        actor::Actor,
        audit::AuditEvent,
        role::{Action, ResourceKind},
    },
    repository::AuditSink,
};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// What happened, as described by the service that did it.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub actor_id: Uuid,
    pub organization_id: Uuid,
    pub action: Action,
    pub resource_kind: ResourceKind,
    pub resource_id: Uuid,
    pub detail: String,
    pub origin: Option<String>,
}

impl AuditEntry {
    pub fn new(
        actor: &Actor,
        action: Action,
        resource_kind: ResourceKind,
        resource_id: Uuid,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            actor_id: actor.user_id,
            organization_id: actor.organization_id,
            action,
            resource_kind,
            resource_id,
            detail: detail.into(),
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: Option<String>) -> Self {
        self.origin = origin;
        self
    }
}

/// The audit sink rejected an append.
#[derive(Debug, Error)]
#[error("audit recording failed: {0}")]
pub struct RecordingFailed(pub String);

/// Appends one immutable [`AuditEvent`] per call.
///
/// Recording is best-effort: a failure is logged and counted, and callers
/// must not let it affect the operation being described.
#[derive(Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
    clock: Arc<MonotonicClock>,
}

impl AuditRecorder {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self {
            sink,
            clock: Arc::new(MonotonicClock::default()),
        }
    }

    pub async fn record(&self, entry: AuditEntry) -> Result<AuditEvent, RecordingFailed> {
        let event = AuditEvent {
            id: Uuid::new_v4(),
            actor_id: entry.actor_id,
            organization_id: entry.organization_id,
            action: entry.action,
            resource_kind: entry.resource_kind,
            resource_id: entry.resource_id,
            detail: entry.detail,
            origin: entry.origin,
            occurred_at: self.clock.now(),
        };

        match self.sink.append(&event).await {
            Ok(()) => {
                tracing::info!(
                    audit_id = %event.id,
                    actor_id = %event.actor_id,
                    action = %event.action,
                    resource_kind = %event.resource_kind,
                    resource_id = %event.resource_id,
                    detail = %event.detail,
                    "[AUDIT]"
                );
                Ok(event)
            }
            Err(e) => {
                tracing::error!(
                    actor_id = %event.actor_id,
                    action = %event.action,
                    resource_kind = %event.resource_kind,
                    resource_id = %event.resource_id,
                    error = %e,
                    "Failed to record audit event"
                );
                metrics::counter!("audit_record_failures_total").increment(1);
                Err(RecordingFailed(e.to_string()))
            }
        }
    }
}

/// Wall clock that never goes backwards within the process.
///
/// Microsecond resolution so timestamps survive a Postgres round trip unchanged.
#[derive(Debug, Default)]
struct MonotonicClock {
    last_micros: AtomicI64,
}

impl MonotonicClock {
    fn now(&self) -> DateTime<Utc> {
        let now = Utc::now().timestamp_micros();
        let previous = self.last_micros.fetch_max(now, Ordering::SeqCst);
        let micros = previous.max(now);

        DateTime::from_timestamp_micros(micros).unwrap_or_else(Utc::now)
    }
}
